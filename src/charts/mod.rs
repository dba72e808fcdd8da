//! Charts module - Chart series and SVG rendering

mod plotter;
mod renderer;

pub use plotter::{
    format_currency, format_thousands, hex, ChartData, ChartKind, ChartPlotter, UnknownChart,
    DANGER, DARK, INFO, LIGHT, MUTED, PRIMARY, SUCCESS, WARNING,
};
pub use renderer::{ChartRenderer, RenderError};
