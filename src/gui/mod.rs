pub mod canvas;
pub mod frontend;
