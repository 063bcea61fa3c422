pub mod cli;
pub mod config;
pub mod copier;
pub mod error;
pub mod events;
pub mod filter;
pub mod handler;
pub mod monitor;
pub mod readiness;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use config::*;
pub use copier::*;
pub use error::*;
pub use events::*;
pub use filter::*;
pub use handler::*;
pub use monitor::*;
pub use readiness::*;
pub use watcher::*;
