//! Command trait, registry, and the built-in diagnostic commands.

use std::collections::HashMap;

use xrscope_runtime::{RuntimeContext, RuntimeInstance, TrackerService};
use xrscope_types::error::{Result, XrscopeError};

/// Output produced by a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// Plain text lines.
    Text(String),
    /// Command produced no visible output.
    None,
    /// Signal to the worker to stop draining the queue.
    Exit,
}

/// Read-only view of the bootstrapped runtime passed to every command.
pub struct Environment<'a> {
    pub context: &'a RuntimeContext,
}

/// A single executable command.
pub trait Command: Send {
    /// The command name (what the operator types).
    fn name(&self) -> &str;

    /// One-line description for `help`.
    fn description(&self) -> &str;

    /// Usage string.
    fn usage(&self) -> &str;

    /// Execute the command with the given arguments and environment.
    fn execute(&self, args: &[&str], env: &Environment<'_>) -> Result<CommandOutput>;
}

/// Registry of available commands with dispatch.
pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    /// Create an empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register a command. Replaces any existing command with the same name.
    pub fn register(&mut self, cmd: Box<dyn Command>) {
        self.commands.insert(cmd.name().to_string(), cmd);
    }

    /// Dispatch one input line: the first token is the verb.
    ///
    /// An unrecognized verb is a command error, never fatal to the
    /// caller; a blank line produces no output.
    pub fn execute(&self, line: &str, env: &Environment<'_>) -> Result<CommandOutput> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(CommandOutput::None);
        };
        let args: Vec<&str> = tokens.collect();

        if name == "help" {
            return self.execute_help();
        }
        match self.commands.get(name) {
            Some(cmd) => cmd.execute(&args, env),
            None => Err(XrscopeError::Command(format!("unknown command: {name}"))),
        }
    }

    fn execute_help(&self) -> Result<CommandOutput> {
        let mut names: Vec<&String> = self.commands.keys().collect();
        names.sort_unstable();
        let mut lines = vec!["Available commands:".to_string()];
        lines.push("  help          List available commands".to_string());
        for name in names {
            let cmd = &self.commands[name];
            lines.push(format!("  {:<12}  {}", cmd.name(), cmd.description()));
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register all built-in commands into a registry.
pub fn register_builtins(reg: &mut CommandRegistry) {
    reg.register(Box::new(ExitCmd));
    reg.register(Box::new(ListCmd));
    reg.register(Box::new(RuntimeCmd));
    reg.register(Box::new(SystemCmd));
    reg.register(Box::new(ExtensionsCmd));
}

// ---------------------------------------------------------------------------
// exit
// ---------------------------------------------------------------------------

struct ExitCmd;
impl Command for ExitCmd {
    fn name(&self) -> &str {
        "exit"
    }
    fn description(&self) -> &str {
        "Stop the command worker"
    }
    fn usage(&self) -> &str {
        "exit"
    }
    fn execute(&self, _args: &[&str], _env: &Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::Exit)
    }
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

struct ListCmd;
impl Command for ListCmd {
    fn name(&self) -> &str {
        "list"
    }
    fn description(&self) -> &str {
        "Enumerate connected vive tracker paths"
    }
    fn usage(&self) -> &str {
        "list"
    }
    fn execute(&self, _args: &[&str], env: &Environment<'_>) -> Result<CommandOutput> {
        let Some(trackers) = env.context.instance.trackers() else {
            return Err(XrscopeError::Capability(
                "vive tracker enumeration was not negotiated with the runtime".into(),
            ));
        };
        let paths = trackers.enumerate_paths()?;
        for tracker in &paths {
            match tracker.role {
                Some(role) => log::debug!(
                    "tracker: persistent={} role={}",
                    tracker.persistent,
                    env.context
                        .instance
                        .path_to_string(role)
                        .unwrap_or_else(|_| role.to_string()),
                ),
                None => log::debug!("tracker: persistent={} (no role)", tracker.persistent),
            }
        }
        Ok(CommandOutput::Text(format!(
            "vive tracker paths: {}",
            paths.len()
        )))
    }
}

// ---------------------------------------------------------------------------
// runtime
// ---------------------------------------------------------------------------

struct RuntimeCmd;
impl Command for RuntimeCmd {
    fn name(&self) -> &str {
        "runtime"
    }
    fn description(&self) -> &str {
        "Show runtime name and version"
    }
    fn usage(&self) -> &str {
        "runtime"
    }
    fn execute(&self, _args: &[&str], env: &Environment<'_>) -> Result<CommandOutput> {
        match &env.context.identity {
            Some(identity) => Ok(CommandOutput::Text(format!(
                "runtime: {} {}",
                identity.name, identity.version
            ))),
            None => Ok(CommandOutput::Text("runtime: unknown".to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// system
// ---------------------------------------------------------------------------

struct SystemCmd;
impl Command for SystemCmd {
    fn name(&self) -> &str {
        "system"
    }
    fn description(&self) -> &str {
        "Show the discovered system"
    }
    fn usage(&self) -> &str {
        "system"
    }
    fn execute(&self, _args: &[&str], env: &Environment<'_>) -> Result<CommandOutput> {
        let system = &env.context.system;
        let name = if system.name.is_empty() {
            "(unknown)"
        } else {
            system.name.as_str()
        };
        Ok(CommandOutput::Text(format!(
            "system: id={} name={} class={}",
            system.id, name, system.device_class
        )))
    }
}

// ---------------------------------------------------------------------------
// extensions
// ---------------------------------------------------------------------------

struct ExtensionsCmd;
impl Command for ExtensionsCmd {
    fn name(&self) -> &str {
        "extensions"
    }
    fn description(&self) -> &str {
        "Show the negotiated extension set"
    }
    fn usage(&self) -> &str {
        "extensions"
    }
    fn execute(&self, _args: &[&str], env: &Environment<'_>) -> Result<CommandOutput> {
        let negotiated = &env.context.negotiated;
        if negotiated.is_empty() {
            return Ok(CommandOutput::Text("no extensions negotiated".to_string()));
        }
        let mut lines = vec![format!("{} extension(s) enabled:", negotiated.len())];
        for name in negotiated.iter() {
            lines.push(format!("  {name}"));
        }
        Ok(CommandOutput::Text(lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrscope_runtime::test_support::MockInstance;
    use xrscope_runtime::{NegotiatedSet, RuntimeInstance, TrackerPaths};
    use xrscope_types::model::{DeviceClass, RuntimeIdentity, SystemIdentity, XrVersion};

    fn context(mock: MockInstance, resolve_trackers: bool) -> RuntimeContext {
        let mut mock = mock;
        if resolve_trackers {
            mock.resolve_tracker_table().unwrap();
        }
        RuntimeContext {
            instance: Box::new(mock),
            identity: Some(RuntimeIdentity {
                name: "Mock Runtime".to_string(),
                version: XrVersion::new(1, 0, 0),
            }),
            system: SystemIdentity {
                id: 1,
                name: "Mock HMD".to_string(),
                device_class: DeviceClass::HeadMountedDisplay,
            },
            negotiated: NegotiatedSet::default(),
        }
    }

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        register_builtins(&mut reg);
        reg
    }

    #[test]
    fn blank_line_is_no_output() {
        let ctx = context(MockInstance::new(), true);
        let out = registry().execute("   ", &Environment { context: &ctx }).unwrap();
        assert_eq!(out, CommandOutput::None);
    }

    #[test]
    fn unknown_command_is_a_command_error() {
        let ctx = context(MockInstance::new(), true);
        let err = registry()
            .execute("bogus", &Environment { context: &ctx })
            .unwrap_err();
        assert!(matches!(err, XrscopeError::Command(_)));
        assert!(format!("{err}").contains("bogus"));
    }

    #[test]
    fn exit_produces_the_exit_signal() {
        let ctx = context(MockInstance::new(), true);
        let out = registry().execute("exit", &Environment { context: &ctx }).unwrap();
        assert_eq!(out, CommandOutput::Exit);
    }

    #[test]
    fn list_counts_tracker_paths() {
        let mock = MockInstance::new().with_tracker_paths(vec![
            TrackerPaths {
                persistent: 7,
                role: Some(8),
            },
            TrackerPaths {
                persistent: 9,
                role: None,
            },
        ]);
        let ctx = context(mock, true);
        let out = registry().execute("list", &Environment { context: &ctx }).unwrap();
        assert_eq!(out, CommandOutput::Text("vive tracker paths: 2".to_string()));
    }

    #[test]
    fn list_without_negotiated_extension_is_a_capability_error() {
        let ctx = context(MockInstance::new(), false);
        let err = registry()
            .execute("list", &Environment { context: &ctx })
            .unwrap_err();
        assert!(matches!(err, XrscopeError::Capability(_)));
    }

    #[test]
    fn list_surfaces_enumeration_failures() {
        let ctx = context(MockInstance::new().with_tracker_enumeration_failure(), true);
        let err = registry()
            .execute("list", &Environment { context: &ctx })
            .unwrap_err();
        assert!(matches!(err, XrscopeError::Runtime(_)));
    }

    #[test]
    fn runtime_command_prints_identity() {
        let ctx = context(MockInstance::new(), true);
        match registry().execute("runtime", &Environment { context: &ctx }).unwrap() {
            CommandOutput::Text(s) => assert_eq!(s, "runtime: Mock Runtime 1.0.0"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn runtime_command_degrades_to_unknown() {
        let mut ctx = context(MockInstance::new(), true);
        ctx.identity = None;
        match registry().execute("runtime", &Environment { context: &ctx }).unwrap() {
            CommandOutput::Text(s) => assert_eq!(s, "runtime: unknown"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn system_command_prints_identity() {
        let ctx = context(MockInstance::new(), true);
        match registry().execute("system", &Environment { context: &ctx }).unwrap() {
            CommandOutput::Text(s) => {
                assert!(s.contains("id=1"));
                assert!(s.contains("Mock HMD"));
                assert!(s.contains("head-mounted display"));
            }
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn extensions_command_reports_empty_set() {
        let ctx = context(MockInstance::new(), true);
        match registry()
            .execute("extensions", &Environment { context: &ctx })
            .unwrap()
        {
            CommandOutput::Text(s) => assert_eq!(s, "no extensions negotiated"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn help_lists_every_builtin() {
        let ctx = context(MockInstance::new(), true);
        match registry().execute("help", &Environment { context: &ctx }).unwrap() {
            CommandOutput::Text(s) => {
                for name in ["exit", "list", "runtime", "system", "extensions"] {
                    assert!(s.contains(name), "help output missing {name}: {s}");
                }
            }
            other => panic!("expected text, got {other:?}"),
        }
    }
}
