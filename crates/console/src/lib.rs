pub mod cli;
pub mod error;
pub mod logging;
pub mod settings;

pub use error::{ConsoleError, Result};
