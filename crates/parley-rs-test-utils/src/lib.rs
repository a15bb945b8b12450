//! Test helpers shared across parley crates.

pub mod commands;
pub mod context;
pub mod llm;
pub mod plugins;
pub mod web;

pub use commands::{DummyCommand, FailingCommand, PanickingCommand, SlowCommand};
pub use context::{TestServices, test_services};
pub use llm::{
    FailingCompletion, FixedCompletion, PanickingCompletion, RecordingCompletion, SlowCompletion,
};
pub use plugins::{AppendPlugin, PanickingPlugin};
pub use web::StubWebProvider;
