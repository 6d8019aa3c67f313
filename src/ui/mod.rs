pub mod format;
pub mod screen;
pub mod symbols;
