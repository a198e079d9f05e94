use crate::prelude::{MapError, MapResult, RenderConfig};
use crate::processing::layout::{FigureLayout, PanelLayout};
use crate::telemetry::log::LogManager;
use image::{imageops, RgbImage};
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

type PanelChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Typographic sizes, in points, converted to pixels per render.
struct Sizes {
    px_per_pt: f64,
}

impl Sizes {
    const LABEL_PT: f64 = 10.0;
    const TITLE_PT: f64 = 12.0;
    const MARKER_PT: f64 = 5.0;
    const LINE_PT: f64 = 1.5;
    const LABEL_OFFSET_PT: f64 = 10.0;
    const MARGIN_PT: f64 = 10.0;

    fn new(config: &RenderConfig) -> Self {
        Self {
            px_per_pt: config.points_to_pixels(1.0),
        }
    }

    fn px(&self, points: f64) -> f64 {
        (points * self.px_per_pt).max(1.0)
    }

    fn font(&self, points: f64) -> FontDesc<'static> {
        FontDesc::new(FontFamily::SansSerif, self.px(points), FontStyle::Normal)
    }

    fn line(&self) -> u32 {
        self.px(Self::LINE_PT).round() as u32
    }
}

/// Whitespace kept around the trimmed figure, in inches.
const TRIM_PAD_IN: f64 = 0.1;

fn render_err<E: std::fmt::Display>(err: E) -> MapError {
    MapError::Render(err.to_string())
}

/// Pixel rectangle kept when the figure is trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TrimBox {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl TrimBox {
    /// Smallest box holding every non-white pixel, grown by `pad` and
    /// clipped to the canvas. A blank canvas is kept whole.
    fn around_ink(image: &RgbImage, pad: u32) -> Self {
        let (width, height) = image.dimensions();
        let ink = image
            .enumerate_pixels()
            .filter(|(_, _, pixel)| pixel.0 != [255, 255, 255])
            .fold(None, |bounds: Option<(u32, u32, u32, u32)>, (x, y, _)| {
                Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                })
            });
        match ink {
            None => Self {
                x: 0,
                y: 0,
                width,
                height,
            },
            Some((x0, y0, x1, y1)) => {
                let left = x0.saturating_sub(pad);
                let top = y0.saturating_sub(pad);
                let right = (x1 + pad).min(width - 1);
                let bottom = (y1 + pad).min(height - 1);
                Self {
                    x: left,
                    y: top,
                    width: right - left + 1,
                    height: bottom - top + 1,
                }
            }
        }
    }
}

/// Rasterises a [`FigureLayout`] with `plotters`.
pub struct FigureRenderer {
    config: RenderConfig,
    logger: LogManager,
}

impl FigureRenderer {
    pub fn new(config: RenderConfig) -> MapResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            logger: LogManager::new("renderer"),
        })
    }

    /// Writes the figure to the configured PNG path, trimmed to its drawn
    /// content plus a 0.1 in border.
    pub fn render_png(&self, layout: &FigureLayout) -> MapResult<()> {
        let output = &self.config.output;
        let save_err = |reason: String| {
            MapError::Render(format!("cannot write {}: {reason}", output.display()))
        };
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.is_dir() {
                return Err(save_err(format!("{} is not a directory", parent.display())));
            }
        }

        let canvas = self.rasterize(layout)?;
        let pad = (f64::from(self.config.dpi) * TRIM_PAD_IN).round() as u32;
        let trim = TrimBox::around_ink(&canvas, pad);
        self.logger.detail(&format!(
            "trimming {}x{} canvas to {}x{} at ({}, {})",
            canvas.width(),
            canvas.height(),
            trim.width,
            trim.height,
            trim.x,
            trim.y
        ));

        imageops::crop_imm(&canvas, trim.x, trim.y, trim.width, trim.height)
            .to_image()
            .save(output)
            .map_err(|err| save_err(err.to_string()))?;
        self.logger.record(&format!(
            "wrote {}x{} figure to {}",
            trim.width,
            trim.height,
            output.display()
        ));
        Ok(())
    }

    /// Draws the full, untrimmed figure into an RGB image.
    fn rasterize(&self, layout: &FigureLayout) -> MapResult<RgbImage> {
        let (width, height) = self.config.pixel_size();
        let mut buffer = vec![0u8; width as usize * height as usize * 3];
        {
            let root =
                BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.draw(&root, layout)?;
            root.present().map_err(render_err)?;
        }
        RgbImage::from_raw(width, height, buffer)
            .ok_or_else(|| MapError::Render(format!("{width}x{height} buffer has the wrong size")))
    }

    /// Draws both panels and the connectors onto any backend.
    pub fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        layout: &FigureLayout,
    ) -> MapResult<()> {
        let sizes = Sizes::new(&self.config);
        root.fill(&WHITE).map_err(render_err)?;

        let panels = root.split_evenly((1, 2));
        let overview = draw_panel(&panels[0], &layout.overview, &sizes)?;
        let zoom = draw_panel(&panels[1], &layout.zoom, &sizes)?;

        for connector in &layout.connectors {
            let from = overview.backend_coord(&(connector.from.x, connector.from.y));
            let to = zoom.backend_coord(&(connector.to.x, connector.to.y));
            root.draw(&PathElement::new(
                vec![from, to],
                BLACK.mix(0.7).stroke_width(sizes.line()),
            ))
            .map_err(render_err)?;
        }

        if !layout.overview.notes.is_empty() {
            draw_notes(root, &overview, &layout.overview.notes, &sizes)?;
        }
        Ok(())
    }
}

fn draw_panel<'a, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    panel: &PanelLayout,
    sizes: &Sizes,
) -> MapResult<PanelChart<'a, DB>> {
    let label_px = sizes.px(Sizes::LABEL_PT);
    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, sizes.font(Sizes::TITLE_PT))
        .margin(sizes.px(Sizes::MARGIN_PT) as u32)
        .x_label_area_size((label_px * 3.5) as u32)
        .y_label_area_size((label_px * 5.5) as u32)
        .build_cartesian_2d(panel.x.min..panel.x.max, panel.y.min..panel.y.max)
        .map_err(render_err)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(panel.x_desc.as_str())
            .label_style(sizes.font(Sizes::LABEL_PT))
            .axis_desc_style(sizes.font(Sizes::LABEL_PT))
            .light_line_style(&WHITE)
            .bold_line_style(&BLACK.mix(0.15));
        if let Some(desc) = &panel.y_desc {
            mesh.y_desc(desc.as_str());
        }
        mesh.draw().map_err(render_err)?;
    }

    if let Some(frame) = &panel.frame {
        let bounds = frame.bounds();
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (bounds.min().x, bounds.min().y),
                    (bounds.max().x, bounds.max().y),
                ],
                BLACK.mix(0.7).stroke_width(sizes.line()),
            )))
            .map_err(render_err)?;
    }

    let marker_size = sizes.px(Sizes::MARKER_PT) as i32;
    chart
        .draw_series(panel.markers.iter().map(|marker| {
            TriangleMarker::new(
                (marker.position.x, marker.position.y),
                marker_size,
                RED.filled(),
            )
        }))
        .map_err(render_err)?;

    let offset = sizes.px(Sizes::LABEL_OFFSET_PT) as i32;
    let label_style =
        TextStyle::from(sizes.font(Sizes::LABEL_PT)).pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(panel.markers.iter().filter_map(|marker| {
            marker.label.as_ref().map(|label| {
                EmptyElement::at((marker.position.x, marker.position.y))
                    + Text::new(label.clone(), (0, -offset), label_style.clone())
            })
        }))
        .map_err(render_err)?;

    Ok(chart)
}

fn draw_notes<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    chart: &PanelChart<'_, DB>,
    notes: &[String],
    sizes: &Sizes,
) -> MapResult<()> {
    let (x_range, y_range) = chart.plotting_area().get_pixel_range();
    let pad = sizes.px(Sizes::MARGIN_PT) as i32;
    let line_height = (sizes.px(Sizes::LABEL_PT) * 1.3) as i32;
    let top = y_range.end - pad - line_height * notes.len() as i32;
    let style = TextStyle::from(sizes.font(Sizes::LABEL_PT - 1.0)).pos(Pos::new(HPos::Left, VPos::Top));

    for (i, note) in notes.iter().enumerate() {
        root.draw(&Text::new(
            note.as_str(),
            (x_range.start + pad, top + i as i32 * line_height),
            style.clone(),
        ))
        .map_err(render_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::survey_sites;
    use crate::processing::MapPipeline;
    use tempfile::tempdir;

    fn survey_layout(annotate_origin: bool) -> FigureLayout {
        let map = MapPipeline::default().run(&survey_sites().unwrap()).unwrap();
        FigureLayout::build(&map, annotate_origin)
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = RenderConfig {
            width_in: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            FigureRenderer::new(config),
            Err(MapError::InvalidInput(_))
        ));
    }

    #[test]
    fn unwritable_output_is_a_render_error() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("missing").join("map.png");
        let config = RenderConfig {
            output: output.clone(),
            dpi: 20,
            ..Default::default()
        };
        let renderer = FigureRenderer::new(config).unwrap();
        match renderer.render_png(&survey_layout(false)) {
            Err(MapError::Render(message)) => {
                assert!(message.contains(&output.display().to_string()), "{message}")
            }
            other => panic!("expected a render error, got {other:?}"),
        }
    }

    fn blank(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb([255, 255, 255]))
    }

    #[test]
    fn trim_box_pads_drawn_content() {
        let mut canvas = blank(100, 50);
        canvas.put_pixel(20, 10, image::Rgb([0, 0, 0]));
        canvas.put_pixel(60, 30, image::Rgb([255, 0, 0]));
        let trim = TrimBox::around_ink(&canvas, 5);
        assert_eq!(
            trim,
            TrimBox {
                x: 15,
                y: 5,
                width: 51,
                height: 31
            }
        );
    }

    #[test]
    fn trim_box_is_clipped_to_the_canvas() {
        let mut canvas = blank(40, 30);
        canvas.put_pixel(1, 28, image::Rgb([0, 0, 0]));
        canvas.put_pixel(38, 2, image::Rgb([0, 0, 0]));
        let trim = TrimBox::around_ink(&canvas, 6);
        assert_eq!(
            trim,
            TrimBox {
                x: 0,
                y: 0,
                width: 40,
                height: 30
            }
        );
        assert_eq!(TrimBox::around_ink(&blank(8, 4), 2).width, 8);
    }

    /// Renders `layout`, or returns `None` when no usable system font exists.
    fn rasterize_or_skip(renderer: &FigureRenderer, layout: &FigureLayout) -> Option<RgbImage> {
        match renderer.rasterize(layout) {
            Ok(canvas) => Some(canvas),
            Err(MapError::Render(message)) if message.contains("Font loading error") => {
                eprintln!("skipping, no usable font: {message}");
                None
            }
            Err(err) => panic!("drawing failed: {err}"),
        }
    }

    /// True when any pixel within `radius` of `(x, y)` satisfies `test`.
    fn near(
        canvas: &RgbImage,
        (x, y): (i32, i32),
        radius: i32,
        test: impl Fn([u8; 3]) -> bool,
    ) -> bool {
        (-radius..=radius).any(|dx| {
            (-radius..=radius).any(|dy| {
                let (px, py) = (x + dx, y + dy);
                px >= 0
                    && py >= 0
                    && (px as u32) < canvas.width()
                    && (py as u32) < canvas.height()
                    && test(canvas.get_pixel(px as u32, py as u32).0)
            })
        })
    }

    #[test]
    fn figure_draws_markers_and_connectors() {
        let config = RenderConfig {
            dpi: 60,
            ..Default::default()
        };
        let renderer = FigureRenderer::new(config).unwrap();
        let layout = survey_layout(false);
        let Some(canvas) = rasterize_or_skip(&renderer, &layout) else {
            return;
        };
        assert_eq!(canvas.dimensions(), (900, 420));

        let mut buffer = canvas.clone().into_raw();
        let root = BitMapBackend::with_buffer(&mut buffer, (900, 420)).into_drawing_area();
        let panels = root.split_evenly((1, 2));
        let sizes = Sizes::new(&renderer.config);
        let overview = draw_panel(&panels[0], &layout.overview, &sizes).unwrap();
        let zoom = draw_panel(&panels[1], &layout.zoom, &sizes).unwrap();

        for connector in &layout.connectors {
            let (fx, fy) = overview.backend_coord(&(connector.from.x, connector.from.y));
            let (tx, ty) = zoom.backend_coord(&(connector.to.x, connector.to.y));
            assert!(fx < tx, "connector must run left to right");
            let mid = ((fx + tx) / 2, (fy + ty) / 2);
            assert!(
                near(&canvas, mid, 2, |rgb| rgb != [255, 255, 255]),
                "no connector ink at {mid:?}"
            );
        }
        for marker in &layout.zoom.markers {
            let at = zoom.backend_coord(&(marker.position.x, marker.position.y));
            assert!(
                near(&canvas, at, 2, |[r, g, b]| r > 200 && g < 80 && b < 80),
                "no red marker at {at:?}"
            );
        }
    }

    #[test]
    fn saved_png_is_trimmed_to_content() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("antenna_map_final.png");
        let config = RenderConfig {
            output: output.clone(),
            dpi: 60,
            annotate_origin: true,
            ..Default::default()
        };
        let full = config.pixel_size();
        let renderer = FigureRenderer::new(config).unwrap();
        let layout = survey_layout(true);
        let Some(canvas) = rasterize_or_skip(&renderer, &layout) else {
            return;
        };
        renderer.render_png(&layout).unwrap();

        let saved = image::open(&output).unwrap().to_rgb8();
        let (width, height) = saved.dimensions();
        assert!(width < full.0 || height < full.1, "{width}x{height} was not trimmed");
        let trim = TrimBox::around_ink(&canvas, 6);
        assert_eq!((width, height), (trim.width, trim.height));

        // At 60 DPI the 0.1 in pad is 6 px; no side may carry more white than that.
        let white_row = |y: u32| (0..width).all(|x| saved.get_pixel(x, y).0 == [255, 255, 255]);
        let white_col = |x: u32| (0..height).all(|y| saved.get_pixel(x, y).0 == [255, 255, 255]);
        let top = (0..height).take_while(|&y| white_row(y)).count();
        let bottom = (0..height).rev().take_while(|&y| white_row(y)).count();
        let left = (0..width).take_while(|&x| white_col(x)).count();
        let right = (0..width).rev().take_while(|&x| white_col(x)).count();
        assert!(top < height as usize, "saved figure is blank");
        for (side, run) in [("top", top), ("bottom", bottom), ("left", left), ("right", right)] {
            assert!(run <= 6, "{run} white lines on the {side}");
        }
    }
}
