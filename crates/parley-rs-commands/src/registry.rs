//! Registry for command implementations.

use crate::command::{Command, CommandArgs, CommandSpec};
use crate::context::CommandContext;
use futures_util::FutureExt;
use log::{debug, warn};
use parking_lot::RwLock;
use parley_rs_protocol::CommandError;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// In-memory name to command table.
#[derive(Default, Clone)]
pub struct CommandRegistry {
    commands: Arc<RwLock<HashMap<String, Arc<dyn Command>>>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command by name. A later registration under the same name
    /// replaces the earlier one.
    pub fn register(&self, command: Arc<dyn Command>) {
        let name = command.name().to_string();
        let replaced = self.commands.write().insert(name.clone(), command).is_some();
        debug!("registered command (name={}, replaced={})", name, replaced);
    }

    /// Lookup a command by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.read().get(name).cloned()
    }

    /// Whether a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.commands.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Specs for every registered command, sorted by name.
    pub fn specs(&self) -> Vec<CommandSpec> {
        let mut specs: Vec<_> = self
            .commands
            .read()
            .values()
            .map(|command| command.spec())
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Look up `name` and run it.
    ///
    /// Only an unknown name is returned as `Err`. Anything the handler does
    /// wrong (an error, a panic, running past the context timeout) is logged
    /// and turned into a user-facing reply.
    pub async fn execute(
        &self,
        name: &str,
        ctx: &CommandContext,
        args: CommandArgs,
    ) -> Result<String, CommandError> {
        let Some(command) = self.get(name) else {
            debug!("command lookup failed (name={})", name);
            return Err(CommandError::CommandNotFound(name.to_string()));
        };
        let timeout = ctx.services.timeout;
        debug!(
            "executing command (name={}, args={}, timeout_secs={})",
            name,
            args.len(),
            timeout.as_secs()
        );

        let call = AssertUnwindSafe(command.call(ctx, args)).catch_unwind();
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CommandError::ExecutionFailed(
                "command panicked".to_string(),
            )),
            Err(_) => Err(CommandError::TimedOut(timeout.as_secs())),
        };

        match outcome {
            Ok(reply) => Ok(reply),
            Err(err) => {
                warn!("command failed (name={}, err={})", name, err);
                Ok(failure_reply(name, &err))
            }
        }
    }
}

/// User-facing text for a failed handler.
fn failure_reply(name: &str, err: &CommandError) -> String {
    match err {
        CommandError::InvalidArguments(message) => format!("❌ {name}: {message}"),
        CommandError::TimedOut(secs) => format!("⏱️ {name} did not finish within {secs}s"),
        CommandError::Unavailable(_) => {
            format!("⚠️ {name} is unavailable right now, please try again later")
        }
        other => format!("❌ {name} failed: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::CommandRegistry;
    use crate::{Command, CommandArgs, CommandContext, CommandServices};
    use async_trait::async_trait;
    use parley_rs_memory::MemoryStore;
    use parley_rs_protocol::CommandError;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    #[derive(Debug)]
    enum Behavior {
        Reply(&'static str),
        Fail,
        Panic,
        Hang,
    }

    #[derive(Debug)]
    struct TestCommand {
        name: &'static str,
        behavior: Behavior,
    }

    #[async_trait]
    impl Command for TestCommand {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "test"
        }

        async fn call(
            &self,
            _ctx: &CommandContext,
            _args: CommandArgs,
        ) -> Result<String, CommandError> {
            match self.behavior {
                Behavior::Reply(text) => Ok(text.to_string()),
                Behavior::Fail => Err(CommandError::ExecutionFailed("disk on fire".to_string())),
                Behavior::Panic => panic!("handler bug"),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
            }
        }
    }

    fn context(temp: &TempDir) -> CommandContext {
        let memory = Arc::new(MemoryStore::open(temp.path().join("memory.json"), None));
        let services = CommandServices::new(temp.path(), memory)
            .with_timeout(Duration::from_millis(50));
        CommandContext::new(Arc::new(services))
    }

    fn register(registry: &CommandRegistry, name: &'static str, behavior: Behavior) {
        registry.register(Arc::new(TestCommand { name, behavior }));
    }

    #[tokio::test]
    async fn later_registration_wins() {
        let temp = TempDir::new().expect("tmp");
        let registry = CommandRegistry::new();
        register(&registry, "greet", Behavior::Reply("first"));
        register(&registry, "greet", Behavior::Reply("second"));

        let reply = registry
            .execute("greet", &context(&temp), CommandArgs::new())
            .await
            .expect("reply");
        assert_eq!(reply, "second");
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn unknown_name_is_the_only_error() {
        let temp = TempDir::new().expect("tmp");
        let registry = CommandRegistry::new();
        let err = registry
            .execute("nonexistent_command", &context(&temp), CommandArgs::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::CommandNotFound(name) if name == "nonexistent_command"));
    }

    #[tokio::test]
    async fn handler_errors_become_replies() {
        let temp = TempDir::new().expect("tmp");
        let registry = CommandRegistry::new();
        register(&registry, "broken", Behavior::Fail);
        let reply = registry
            .execute("broken", &context(&temp), CommandArgs::new())
            .await
            .expect("reply");
        assert!(reply.starts_with("❌ broken failed"), "{reply}");
        assert!(reply.contains("disk on fire"));
    }

    #[tokio::test]
    async fn handler_panics_become_replies() {
        let temp = TempDir::new().expect("tmp");
        let registry = CommandRegistry::new();
        register(&registry, "buggy", Behavior::Panic);
        let reply = registry
            .execute("buggy", &context(&temp), CommandArgs::new())
            .await
            .expect("reply");
        assert!(reply.contains("panicked"), "{reply}");
    }

    #[tokio::test]
    async fn slow_handlers_time_out() {
        let temp = TempDir::new().expect("tmp");
        let registry = CommandRegistry::new();
        register(&registry, "slow", Behavior::Hang);
        let reply = registry
            .execute("slow", &context(&temp), CommandArgs::new())
            .await
            .expect("reply");
        assert!(reply.starts_with("⏱️ slow"), "{reply}");
    }

    #[test]
    fn list_is_sorted() {
        let registry = CommandRegistry::new();
        register(&registry, "b", Behavior::Reply(""));
        register(&registry, "a", Behavior::Reply(""));
        assert_eq!(registry.list(), vec!["a", "b"]);
        assert!(registry.contains("a"));
    }
}
