use antmapcore::array::survey_sites;
use antmapcore::geodesy::PlanarPosition;
use antmapcore::prelude::RenderConfig;
use antmapcore::processing::{FigureLayout, MapPipeline, PanelLayout};
use antmapcore::render::FigureRenderer;
use iced::{
    mouse,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, row, text, Container,
    },
    Alignment, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Size, Task, Theme,
};

const GRID_DIVISIONS: usize = 5;
const LABEL_SIZE: f32 = 13.0;
const TITLE_SIZE: f32 = 16.0;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Antenna Map".into()
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Light
}

#[derive(Debug)]
struct Visualizer {
    config: RenderConfig,
    layout: Option<FigureLayout>,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    SavePng,
    PngSaved(Result<String, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let config = RenderConfig::default();
        let mut state = match build_layout(&config) {
            Ok(layout) => Visualizer {
                config,
                layout: Some(layout),
                status: String::new(),
            },
            Err(err) => Visualizer {
                config,
                layout: None,
                status: format!("Projection failed: {err}"),
            },
        };
        let task = state.start_save();
        (state, task)
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::SavePng => state.start_save(),
            Message::PngSaved(result) => {
                state.status = result.unwrap_or_else(|err| err);
                Task::none()
            }
        }
    }

    /// Writes the PNG off the UI thread; the window stays responsive meanwhile.
    fn start_save(&mut self) -> Task<Message> {
        let Some(layout) = self.layout.clone() else {
            return Task::none();
        };
        let config = self.config.clone();
        self.status = format!("Saving {}...", config.output.display());
        Task::perform(
            async move { save_png(&config, &layout) },
            Message::PngSaved,
        )
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let header = row![
            text("Antenna Map").size(24),
            button("Save PNG").on_press(Message::SavePng).padding(8),
        ]
        .spacing(20)
        .align_y(Alignment::Center);

        let body: Element<'_, Message> = match &state.layout {
            Some(layout) => Canvas::new(FigureCanvas {
                layout: layout.clone(),
            })
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
            None => text("No figure to display").size(16).into(),
        };

        let layout = column![header, body, text(&state.status).size(14)]
            .spacing(12)
            .padding(16);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn build_layout(config: &RenderConfig) -> Result<FigureLayout, String> {
    let sites = survey_sites().map_err(|e| e.to_string())?;
    let map = MapPipeline::default()
        .run(&sites)
        .map_err(|e| e.to_string())?;
    log::info!(
        "cluster half-width {:.2} m around ({:.2}, {:.2})",
        map.frame.half_width,
        map.frame.center.x,
        map.frame.center.y
    );
    Ok(FigureLayout::build(&map, config.annotate_origin))
}

fn save_png(config: &RenderConfig, layout: &FigureLayout) -> Result<String, String> {
    FigureRenderer::new(config.clone())
        .and_then(|renderer| renderer.render_png(layout))
        .map(|_| format!("Saved {}", config.output.display()))
        .map_err(|e| format!("Save failed: {e}"))
}

/// Plot rectangle of one panel inside the canvas, in pixels.
#[derive(Debug, Clone, Copy)]
struct PanelRect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl PanelRect {
    fn split(bounds: Size, index: usize) -> Self {
        let half = bounds.width / 2.0;
        let left_pad = 70.0;
        let right_pad = 24.0;
        let top_pad = 40.0;
        let bottom_pad = 56.0;
        Self {
            x: half * index as f32 + left_pad,
            y: top_pad,
            width: (half - left_pad - right_pad).max(1.0),
            height: (bounds.height - top_pad - bottom_pad).max(1.0),
        }
    }

    fn map(&self, panel: &PanelLayout, position: &PlanarPosition) -> Point {
        let (u, v) = panel.to_unit(position);
        Point::new(
            self.x + u as f32 * self.width,
            self.y + (1.0 - v as f32) * self.height,
        )
    }
}

#[derive(Clone)]
struct FigureCanvas {
    layout: FigureLayout,
}

impl canvas::Program<Message> for FigureCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), Color::WHITE);

        let overview_rect = PanelRect::split(bounds.size(), 0);
        let zoom_rect = PanelRect::split(bounds.size(), 1);
        draw_panel(&mut frame, overview_rect, &self.layout.overview);
        draw_panel(&mut frame, zoom_rect, &self.layout.zoom);

        for connector in &self.layout.connectors {
            let from = overview_rect.map(&self.layout.overview, &connector.from);
            let to = zoom_rect.map(&self.layout.zoom, &connector.to);
            frame.stroke(
                &Path::line(from, to),
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgba(0.0, 0.0, 0.0, 0.7)),
            );
        }

        vec![frame.into_geometry()]
    }
}

fn draw_panel(frame: &mut Frame, rect: PanelRect, panel: &PanelLayout) {
    for step in 0..=GRID_DIVISIONS {
        let t = step as f32 / GRID_DIVISIONS as f32;
        let x = rect.x + t * rect.width;
        let y = rect.y + t * rect.height;
        frame.stroke(
            &Path::line(Point::new(x, rect.y), Point::new(x, rect.y + rect.height)),
            grid_stroke(),
        );
        frame.stroke(
            &Path::line(Point::new(rect.x, y), Point::new(rect.x + rect.width, y)),
            grid_stroke(),
        );

        let x_value = panel.x.min + f64::from(t) * panel.x.span();
        let y_value = panel.y.max - f64::from(t) * panel.y.span();
        put_text(
            frame,
            tick_label(x_value, panel.x.span()),
            Point::new(x, rect.y + rect.height + 6.0),
            LABEL_SIZE,
            true,
        );
        put_text(
            frame,
            tick_label(y_value, panel.y.span()),
            Point::new(rect.x - 60.0, y - LABEL_SIZE / 2.0),
            LABEL_SIZE,
            false,
        );
    }
    frame.stroke(
        &Path::rectangle(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height)),
        Stroke::default().with_width(1.0).with_color(Color::BLACK),
    );

    put_text(
        frame,
        panel.title.clone(),
        Point::new(rect.x + rect.width / 2.0, rect.y - TITLE_SIZE - 12.0),
        TITLE_SIZE,
        true,
    );
    put_text(
        frame,
        panel.x_desc.clone(),
        Point::new(rect.x + rect.width / 2.0, rect.y + rect.height + 26.0),
        LABEL_SIZE,
        true,
    );
    if let Some(desc) = &panel.y_desc {
        put_text(
            frame,
            desc.clone(),
            Point::new(rect.x, rect.y - LABEL_SIZE - 4.0),
            LABEL_SIZE - 2.0,
            false,
        );
    }

    if let Some(cluster) = &panel.frame {
        let bounds = cluster.bounds();
        let top_left = rect.map(panel, &PlanarPosition::new(bounds.min().x, bounds.max().y));
        let bottom_right = rect.map(panel, &PlanarPosition::new(bounds.max().x, bounds.min().y));
        frame.stroke(
            &Path::rectangle(
                top_left,
                Size::new(bottom_right.x - top_left.x, bottom_right.y - top_left.y),
            ),
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgba(0.0, 0.0, 0.0, 0.7)),
        );
    }

    for marker in &panel.markers {
        let center = rect.map(panel, &marker.position);
        let triangle = Path::new(|builder| {
            builder.move_to(Point::new(center.x, center.y - 7.0));
            builder.line_to(Point::new(center.x - 6.0, center.y + 5.0));
            builder.line_to(Point::new(center.x + 6.0, center.y + 5.0));
            builder.close();
        });
        frame.fill(&triangle, Color::from_rgb(0.9, 0.1, 0.1));

        if let Some(label) = &marker.label {
            put_text(
                frame,
                label.clone(),
                Point::new(center.x, center.y - 10.0 - LABEL_SIZE),
                LABEL_SIZE,
                true,
            );
        }
    }

    for (i, note) in panel.notes.iter().enumerate() {
        let line_height = LABEL_SIZE + 4.0;
        let top = rect.y + rect.height - 8.0 - line_height * (panel.notes.len() - i) as f32;
        put_text(frame, note.clone(), Point::new(rect.x + 8.0, top), LABEL_SIZE - 1.0, false);
    }
}

fn grid_stroke() -> Stroke<'static> {
    Stroke::default()
        .with_width(1.0)
        .with_color(Color::from_rgb(0.85, 0.85, 0.85))
}

fn tick_label(value: f64, span: f64) -> String {
    if span >= 100.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Draws `content` with its top edge at `position.y`; horizontally centred on
/// `position.x` when `centered` is set, otherwise left-aligned.
fn put_text(frame: &mut Frame, content: String, position: Point, size: f32, centered: bool) {
    let x = if centered {
        position.x - content.chars().count() as f32 * size * 0.28
    } else {
        position.x
    };
    frame.fill_text(canvas::Text {
        content,
        position: Point::new(x, position.y),
        color: Color::BLACK,
        size: Pixels(size),
        ..canvas::Text::default()
    });
}
