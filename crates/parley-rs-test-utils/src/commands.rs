use async_trait::async_trait;
use parley_rs_commands::{Command, CommandArgs, CommandContext};
use parley_rs_protocol::CommandError;
use std::time::Duration;

/// Echoes a fixed reply, or the bound arguments when `echo_args` is set.
#[derive(Debug, Clone)]
pub struct DummyCommand {
    name: String,
    description: String,
    reply: String,
    echo_args: bool,
}

impl DummyCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "dummy".to_string(),
            reply: "ok".to_string(),
            echo_args: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    pub fn echoing_args(mut self) -> Self {
        self.echo_args = true;
        self
    }
}

#[async_trait]
impl Command for DummyCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn call(&self, _ctx: &CommandContext, args: CommandArgs) -> Result<String, CommandError> {
        if !self.echo_args {
            return Ok(self.reply.clone());
        }
        Ok(args
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(","))
    }
}

#[derive(Debug, Clone)]
pub struct FailingCommand {
    name: String,
    message: String,
}

impl FailingCommand {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl Command for FailingCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn call(&self, _ctx: &CommandContext, _args: CommandArgs) -> Result<String, CommandError> {
        Err(CommandError::ExecutionFailed(self.message.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct PanickingCommand {
    name: String,
}

impl PanickingCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Command for PanickingCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "panics when called"
    }

    async fn call(&self, _ctx: &CommandContext, _args: CommandArgs) -> Result<String, CommandError> {
        panic!("handler bug in {}", self.name);
    }
}

#[derive(Debug, Clone)]
pub struct SlowCommand {
    name: String,
    delay: Duration,
}

impl SlowCommand {
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
        }
    }
}

#[async_trait]
impl Command for SlowCommand {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "sleeps before answering"
    }

    async fn call(&self, _ctx: &CommandContext, _args: CommandArgs) -> Result<String, CommandError> {
        tokio::time::sleep(self.delay).await;
        Ok("done".to_string())
    }
}
