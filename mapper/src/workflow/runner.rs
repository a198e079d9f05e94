use crate::workflow::config::MapConfig;
use anyhow::Context;
use antmapcore::array::{survey_sites, ArrayReport};
use antmapcore::processing::{ArrayMap, FigureLayout, MapPipeline};
use antmapcore::render::FigureRenderer;
use std::fs;
use std::path::Path;

pub struct WorkflowResult {
    pub map: ArrayMap,
    pub layout: FigureLayout,
    pub report: ArrayReport,
}

#[derive(Clone)]
pub struct Runner {
    config: MapConfig,
}

impl Runner {
    pub fn new(config: MapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let sites = survey_sites().context("loading antenna survey")?;
        let map = MapPipeline::default()
            .run(&sites)
            .context("projecting and framing antennas")?;
        let layout = FigureLayout::build(&map, self.config.annotate_origin);
        let report = ArrayReport::from_map(&map);

        Ok(WorkflowResult {
            map,
            layout,
            report,
        })
    }

    pub fn render_figure(&self, result: &WorkflowResult) -> anyhow::Result<()> {
        let render_config = self.config.to_render_config();
        ensure_parent(&render_config.output)?;
        let renderer = FigureRenderer::new(render_config).context("configuring renderer")?;
        renderer
            .render_png(&result.layout)
            .with_context(|| format!("rendering {}", self.config.output.display()))?;
        Ok(())
    }

    pub fn write_report(&self, result: &WorkflowResult) -> anyhow::Result<()> {
        let Some(path) = self.config.report.as_ref() else {
            return Ok(());
        };
        ensure_parent(path)?;
        let json = result.report.to_json().context("serializing array report")?;
        fs::write(path, json).with_context(|| format!("writing report {}", path.display()))?;
        log::info!("array report written to {}", path.display());
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }
    Ok(())
}
