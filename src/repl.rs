//! Line-oriented command loop over a cache instance

use crate::cache::ReapingCache;
use crate::error::{CacheError, Result};
use std::sync::Arc;

/// Name and description of every command, sorted by name
pub const COMMANDS: &[(&str, &str)] = &[
    ("add", "Store a value: add <key> <value...>"),
    ("exit", "Exit the program"),
    ("get", "Look up a cached value: get <key>"),
    ("help", "Displays a help message"),
    ("stats", "Show cache statistics"),
];

/// Split a raw input line into a lowercased command name and its arguments.
///
/// Arguments keep their case. Blank input yields `None`.
pub fn parse_line(text: &str) -> Option<(String, Vec<String>)> {
    let mut words = text.split_whitespace();
    let name = words.next()?.to_lowercase();
    Some((name, words.map(str::to_string).collect()))
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Add { key: String, value: String },
    Get { key: String },
    Stats,
}

impl Command {
    /// Resolve a command name and arguments against the command table
    pub fn parse(name: &str, args: Vec<String>) -> Result<Self> {
        let mut args = args.into_iter();

        match name {
            "help" => Ok(Command::Help),
            "exit" => Ok(Command::Exit),
            "stats" => Ok(Command::Stats),
            "get" => {
                let key = args.next().ok_or(CacheError::MissingArgument {
                    command: "get",
                    argument: "key",
                })?;
                Ok(Command::Get { key })
            }
            "add" => {
                let key = args.next().ok_or(CacheError::MissingArgument {
                    command: "add",
                    argument: "key",
                })?;
                let value = args.collect::<Vec<_>>().join(" ");
                if value.is_empty() {
                    return Err(CacheError::MissingArgument {
                        command: "add",
                        argument: "value",
                    });
                }
                Ok(Command::Add { key, value })
            }
            other => Err(CacheError::UnknownCommand(other.to_string())),
        }
    }
}

/// What the loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplOutcome {
    /// Print the text and read the next line
    Continue(String),

    /// Print the text and stop
    Exit(String),
}

impl ReplOutcome {
    pub fn output(&self) -> &str {
        match self {
            ReplOutcome::Continue(text) | ReplOutcome::Exit(text) => text,
        }
    }
}

/// Dispatches input lines to cache operations
pub struct Repl {
    cache: Arc<ReapingCache>,
}

impl Repl {
    pub fn new(cache: Arc<ReapingCache>) -> Self {
        Self { cache }
    }

    /// Execute one input line. Errors are rendered into the output.
    pub fn execute(&self, line: &str) -> ReplOutcome {
        let Some((name, args)) = parse_line(line) else {
            return ReplOutcome::Continue(String::new());
        };

        match Command::parse(&name, args).and_then(|command| self.run(command)) {
            Ok(outcome) => outcome,
            Err(e) => ReplOutcome::Continue(format!("Error: {}", e)),
        }
    }

    fn run(&self, command: Command) -> Result<ReplOutcome> {
        let output = match command {
            Command::Help => help_text(),
            Command::Exit => {
                return Ok(ReplOutcome::Exit(
                    "Closing the cache... Goodbye!".to_string(),
                ))
            }
            Command::Add { key, value } => {
                let len = value.len();
                self.cache.add(key.as_str(), value);
                format!("Cached {} ({} bytes)", key, len)
            }
            Command::Get { key } => match self.cache.get(&key) {
                Some(value) => String::from_utf8_lossy(&value).into_owned(),
                None => format!("{}: not cached", key),
            },
            Command::Stats => serde_json::to_string_pretty(&self.cache.stats())?,
        };

        Ok(ReplOutcome::Continue(output))
    }
}

fn help_text() -> String {
    let mut text = String::from("Available commands:\n");
    for (name, description) in COMMANDS {
        text.push_str(&format!("  {:<10} {}\n", format!("{}:", name), description));
    }
    text
}
