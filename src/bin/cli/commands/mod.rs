pub mod folders;
pub mod quiz;
pub mod topics;
