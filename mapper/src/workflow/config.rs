use anyhow::Context;
use antmapcore::prelude::RenderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub output: PathBuf,
    pub dpi: u32,
    pub width_in: f64,
    pub height_in: f64,
    pub annotate_origin: bool,
    pub report: Option<PathBuf>,
}

impl Default for MapConfig {
    fn default() -> Self {
        let render = RenderConfig::default();
        Self {
            output: render.output,
            dpi: render.dpi,
            width_in: render.width_in,
            height_in: render.height_in,
            annotate_origin: render.annotate_origin,
            report: None,
        }
    }
}

impl MapConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading map config {}", path_ref.display()))?;
        let config: MapConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing map config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        output: PathBuf,
        dpi: u32,
        annotate_origin: bool,
        report: Option<PathBuf>,
    ) -> Self {
        Self {
            output,
            dpi,
            annotate_origin,
            report,
            ..Default::default()
        }
    }

    pub fn to_render_config(&self) -> RenderConfig {
        RenderConfig {
            output: self.output.clone(),
            dpi: self.dpi,
            width_in: self.width_in,
            height_in: self.height_in,
            annotate_origin: self.annotate_origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_render_config() {
        let cfg = MapConfig::from_args(PathBuf::from("out.png"), 150, true, None);
        let render = cfg.to_render_config();
        assert_eq!(render.dpi, 150);
        assert_eq!(render.pixel_size(), (2250, 1050));
        assert!(render.annotate_origin);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"output: maps/array.png\ndpi: 72\nreport: maps/array.json\n")
            .unwrap();
        let path = temp.into_temp_path();
        let cfg = MapConfig::load(&path).unwrap();
        assert_eq!(cfg.dpi, 72);
        assert_eq!(cfg.output, PathBuf::from("maps/array.png"));
        assert_eq!(cfg.report, Some(PathBuf::from("maps/array.json")));
        assert_eq!(cfg.width_in, 15.0);
        assert!(!cfg.annotate_origin);
    }

    #[test]
    fn config_load_reports_bad_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"dpi: [not, a, number]\n").unwrap();
        let path = temp.into_temp_path();
        let err = MapConfig::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("parsing map config"));
    }
}
