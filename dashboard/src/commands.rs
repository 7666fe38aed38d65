use std::time::Duration;

use crate::errors::{Error, Result};

pub const USAGE: &str =
    "commands: auto on|off, interval <secs>, refresh, prompts, prompt <id>, logout, quit";

#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    AutoUpdate(bool),
    Interval(Duration),
    Refresh,
    Prompts,
    SelectPrompt(String),
    Logout,
    Quit,
    Help,
}

pub fn parse_command(line: &str) -> Result<UserCommand> {
    let line = line.trim();
    let (verb, argument) = match line.split_once(char::is_whitespace) {
        Some((verb, argument)) => (verb, argument.trim()),
        None => (line, ""),
    };

    let command = match (verb.to_ascii_lowercase().as_str(), argument) {
        ("auto", "on") => UserCommand::AutoUpdate(true),
        ("auto", "off") => UserCommand::AutoUpdate(false),
        ("interval", secs) if !secs.is_empty() => UserCommand::Interval(parse_seconds(secs)?),
        ("refresh", "") => UserCommand::Refresh,
        ("prompts", "") => UserCommand::Prompts,
        ("prompt", id) if !id.is_empty() => UserCommand::SelectPrompt(id.to_string()),
        ("logout", "") => UserCommand::Logout,
        ("quit", "") | ("exit", "") => UserCommand::Quit,
        ("help", "") => UserCommand::Help,
        _ => return Err(Error::InvalidCommand(line.to_string())),
    };

    Ok(command)
}

fn parse_seconds(raw: &str) -> Result<Duration> {
    let seconds: f64 = raw
        .parse()
        .map_err(|_| Error::InvalidCommand(format!("interval {}", raw)))?;
    if !(seconds > 0.0) {
        return Err(Error::InvalidCommand(format!("interval must be positive: {}", raw)));
    }

    Duration::try_from_secs_f64(seconds)
        .map_err(|_| Error::InvalidCommand(format!("interval {}", raw)))
}
