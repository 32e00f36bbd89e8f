pub mod quiz;
pub mod terminal;
pub mod tree;
