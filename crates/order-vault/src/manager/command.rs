//! Commands accepted by the data manager and their wire names.

use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Operations the data manager can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    CreateOrder,
    GetOrder,
}

impl Command {
    pub const ALL: [Command; 2] = [Command::CreateOrder, Command::GetOrder];

    /// Name used on the wire and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateOrder => "createOrder",
            Command::GetOrder => "getOrder",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("there's no query {0} in data manager")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
