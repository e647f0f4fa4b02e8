//! Command dispatcher for XRSCOPE.
//!
//! A registry-based command interpreter plus the single-producer /
//! single-consumer pipeline that feeds it: the foreground enqueues raw
//! input lines, a background worker executes them in FIFO order against
//! the bootstrapped runtime.

mod commands;
mod dispatch;

/// A single executable command trait.
pub use commands::Command;
/// Output produced by a command (text, nothing, or the exit signal).
pub use commands::CommandOutput;
/// Registry of available commands with dispatch.
pub use commands::CommandRegistry;
/// Read-only runtime view passed to every command.
pub use commands::Environment;
/// Register the built-in commands into a registry.
pub use commands::register_builtins;
/// Producer/consumer pipeline between stdin and the worker.
pub use dispatch::{command_queue, pump_lines, spawn_worker};
