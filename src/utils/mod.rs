//! Terminal helpers shared by the CLI commands.

pub mod progress;

pub use progress::Spinner;
