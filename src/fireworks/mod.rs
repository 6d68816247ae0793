pub mod config;
pub mod corrector;
pub mod prompt;
pub mod transcriber;
