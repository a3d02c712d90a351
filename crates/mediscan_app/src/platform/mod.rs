pub mod app;
pub mod effects;
pub mod ticker;
pub mod ui;
