pub mod plot;

pub use plot::FigureRenderer;
