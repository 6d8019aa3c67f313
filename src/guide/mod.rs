pub mod completion;
pub mod render;
pub mod segment;
pub mod tree;
