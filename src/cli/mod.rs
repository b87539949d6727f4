pub mod commands;
pub mod context;

pub use context::{ActorArgs, CliContext};
