// Domain-level fault categories. None of these abort a tick.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// An entity under consideration has a non-finite position.
    MalformedState,
    /// Unknown command string, or a command with no ship to act on.
    InvalidCommand,
    /// A timer or collision refers to an entity that is already gone.
    StaleReference,
}

impl fmt::Display for SimFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SimFault::MalformedState => "malformed entity state",
            SimFault::InvalidCommand => "invalid command",
            SimFault::StaleReference => "stale entity reference",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SimFault {}
