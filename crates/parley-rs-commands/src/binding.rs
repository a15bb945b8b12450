//! Turning raw command text into a name plus named arguments.
//!
//! Binding is table-driven: each command name maps to one `ArgumentRule`
//! that says how positional tokens fill its parameters. Names without a rule
//! bind nothing.

use crate::command::CommandArgs;
use parley_rs_protocol::CommandError;
use std::collections::HashMap;

/// How positional tokens map onto named parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentRule {
    /// The command takes no arguments; tokens are ignored.
    None,
    /// First token fills `param`; `default` applies when there are no tokens.
    First {
        param: &'static str,
        default: Option<&'static str>,
    },
    /// All tokens joined with single spaces fill `param`.
    Joined { param: &'static str },
    /// First token fills `head`, the remaining tokens joined fill `rest`.
    /// Needs at least two tokens.
    HeadAndRest {
        head: &'static str,
        rest: &'static str,
    },
}

impl ArgumentRule {
    /// Apply this rule to `tokens`.
    pub fn bind(&self, command: &str, tokens: &[String]) -> Result<CommandArgs, CommandError> {
        let mut args = CommandArgs::new();
        match self {
            ArgumentRule::None => {}
            ArgumentRule::First { param, default } => {
                let value = tokens.first().map(String::as_str).or(*default);
                if let Some(value) = value {
                    args.insert(param.to_string(), value.to_string());
                }
            }
            ArgumentRule::Joined { param } => {
                args.insert(param.to_string(), tokens.join(" "));
            }
            ArgumentRule::HeadAndRest { head, rest } => {
                let [first, remaining @ ..] = tokens else {
                    return Err(usage_error(command, head, rest));
                };
                if remaining.is_empty() {
                    return Err(usage_error(command, head, rest));
                }
                args.insert(head.to_string(), first.clone());
                args.insert(rest.to_string(), remaining.join(" "));
            }
        }
        Ok(args)
    }
}

fn usage_error(command: &str, head: &str, rest: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {command} <{head}> <{rest}>"))
}

/// Per-command binding rules.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    rules: HashMap<String, ArgumentRule>,
}

impl BindingTable {
    /// Empty table; every command binds nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the built-in commands.
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert(
            "write_file",
            ArgumentRule::HeadAndRest {
                head: "filename",
                rest: "text",
            },
        );
        table.insert("search_memory", ArgumentRule::Joined { param: "query" });
        table.insert("web_search", ArgumentRule::Joined { param: "query" });
        table.insert(
            "list_files",
            ArgumentRule::First {
                param: "directory",
                default: Some("."),
            },
        );
        table.insert(
            "challenge",
            ArgumentRule::First {
                param: "level",
                default: None,
            },
        );
        table.insert("system_info", ArgumentRule::None);
        table
    }

    /// Add or replace the rule for `command`.
    pub fn insert(&mut self, command: impl Into<String>, rule: ArgumentRule) {
        self.rules.insert(command.into(), rule);
    }

    /// Bind `tokens` for `command`. Commands without a rule get no arguments.
    pub fn bind(&self, command: &str, tokens: &[String]) -> Result<CommandArgs, CommandError> {
        match self.rules.get(command) {
            Some(rule) => rule.bind(command, tokens),
            None => Ok(CommandArgs::new()),
        }
    }
}

/// A command name and its positional tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<String>,
}

/// Split raw command text into a name and arguments.
///
/// Tokens are separated by whitespace. Double quotes group words into one
/// token and are removed, so `write_file "a.txt" "Hello World"` yields the
/// tokens `a.txt` and `Hello World`. Returns `None` for blank input.
pub fn parse_invocation(raw: &str) -> Option<Invocation> {
    let mut tokens = tokenize(raw).into_iter();
    let name = tokens.next()?;
    Some(Invocation {
        name,
        args: tokens.collect(),
    })
}

/// Whitespace-separated tokens with double-quoted groups kept together and
/// the quotes removed.
pub fn tokenize(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in raw.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            ch if ch.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            ch => {
                current.push(ch);
                has_token = true;
            }
        }
    }
    if has_token {
        tokens.push(current);
    }
    tokens
}
