pub mod config;
pub mod folders;
pub mod quiz;

pub use config::AppConfig;
