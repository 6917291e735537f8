pub mod calendar;
pub mod filter;
pub mod heatmap;
pub mod merge;
pub mod view;
