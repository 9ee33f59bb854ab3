//! Todo list and daily routine checklist library
//!
//! This library provides the todo and routine collections, their JSON
//! key-value persistence, and the once-a-day routine reset with its
//! scheduler.

mod cli;
mod clock;
mod config;
mod context;
mod errors;
mod helper;
mod reset_scheduler;
mod routine;
mod store;
mod todo;
mod types;
mod view;

// Re-export key components
pub use cli::*;
pub use clock::*;
pub use config::*;
pub use context::*;
pub use errors::*;
pub use helper::*;
pub use reset_scheduler::*;
pub use routine::*;
pub use store::*;
pub use todo::*;
pub use types::*;
pub use view::*;
