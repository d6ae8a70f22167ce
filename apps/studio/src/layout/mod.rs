// Text measurement and CSS length handling for the preview surface.

pub mod font_metrics;
pub mod units;

pub use font_metrics::{get_metrics, FontFamily, FontMetricTable};
pub use units::{mm_to_pt, mm_to_px, px_to_mm, Edges, Length};
