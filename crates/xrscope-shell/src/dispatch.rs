//! Producer/consumer pipeline between the input stream and the worker.
//!
//! The foreground thread reads lines and enqueues them; one background
//! worker drains the queue in FIFO order and executes each line as a
//! command against the bootstrapped runtime. The channel is the only
//! shared state; the runtime context moves into the worker before the
//! first command flows and is never mutated afterwards.

use std::io::BufRead;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use xrscope_runtime::RuntimeContext;
use xrscope_types::error::XrscopeError;

use crate::commands::{CommandOutput, CommandRegistry, Environment};

/// Name of the background worker thread.
const WORKER_NAME: &str = "xrscope-worker";

/// Create the unbounded command channel.
pub fn command_queue() -> (Sender<String>, Receiver<String>) {
    channel()
}

/// Spawn the background worker that drains the queue.
///
/// The registry and context move into the worker. The worker stops when
/// it executes `exit` or when every sender is dropped.
pub fn spawn_worker(
    registry: CommandRegistry,
    context: RuntimeContext,
    queue: Receiver<String>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(WORKER_NAME.to_string())
        .spawn(move || run_worker(&registry, &context, &queue))
}

fn run_worker(registry: &CommandRegistry, context: &RuntimeContext, queue: &Receiver<String>) {
    let env = Environment { context };
    // Blocking receive: an empty queue parks the worker instead of
    // spinning, and disconnect ends the loop.
    while let Ok(line) = queue.recv() {
        log::info!("input: {line}");
        match registry.execute(&line, &env) {
            Ok(CommandOutput::Exit) => {
                log::info!("exiting");
                return;
            }
            Ok(CommandOutput::Text(text)) => log::info!("{text}"),
            Ok(CommandOutput::None) => {}
            Err(XrscopeError::Command(msg)) => log::warn!("{msg}"),
            Err(e) => log::error!("command failed: {e}"),
        }
    }
    log::info!("input queue disconnected, worker stopping");
}

/// Read lines from `input` and enqueue them until end-of-input, then
/// enqueue an implicit `exit` so the worker always terminates.
///
/// Returns early when the worker is already gone (send fails).
pub fn pump_lines(input: impl BufRead, queue: &Sender<String>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("input read failed: {e}");
                break;
            }
        };
        if queue.send(line).is_err() {
            return;
        }
    }
    let _ = queue.send("exit".to_string());
}
