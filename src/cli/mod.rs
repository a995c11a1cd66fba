//! CLI layer: terminal output around the library workflow

mod progress;
mod run;
pub mod style;

pub use progress::CliProgress;
pub use run::run_writeback;
