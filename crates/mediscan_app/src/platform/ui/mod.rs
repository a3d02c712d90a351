pub mod console;
pub mod render;
pub mod theme;
