pub mod bucket;
pub mod color_difference;
pub mod convert_color;
pub mod engine;
pub mod feather;
pub mod mask;
pub mod merge;
pub mod paint;
pub mod preview;
pub mod recolorer;
pub mod segmentation;
