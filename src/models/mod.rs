pub mod entry;
pub mod mood;
pub mod view;
