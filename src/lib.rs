// Library surface for headless/integration tests and reuse.
// The terminal front end lives in the binary (main.rs + ui).
pub mod app_dirs;
pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod logging;
pub mod runtime;
pub mod session;

pub use error::{Error, Result};
