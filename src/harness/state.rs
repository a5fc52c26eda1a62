//! Harness lifecycle states

use std::fmt;

/// Where a harness run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    /// Looking for the built server artifact
    CheckBuilt,
    /// Running the build command
    Building,
    /// Server started, `initialize` sent
    Spawned,
    /// `initialize` answered, `tools/list` sent
    Initialized,
    /// Tools listed, `tools/call` sent
    ToolsListed,
    /// Tool call answered, shutting the server down
    Invoked,
    /// Server process has exited
    Terminated,
}

impl HarnessState {
    /// Whether the conversation with the server is over
    pub fn is_finished(self) -> bool {
        matches!(self, HarnessState::Invoked | HarnessState::Terminated)
    }
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessState::CheckBuilt => "check-built",
            HarnessState::Building => "building",
            HarnessState::Spawned => "spawned",
            HarnessState::Initialized => "initialized",
            HarnessState::ToolsListed => "tools-listed",
            HarnessState::Invoked => "invoked",
            HarnessState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finished_states() {
        assert!(!HarnessState::Spawned.is_finished());
        assert!(!HarnessState::ToolsListed.is_finished());
        assert!(HarnessState::Invoked.is_finished());
        assert!(HarnessState::Terminated.is_finished());
    }

    #[test]
    fn test_display() {
        assert_eq!(HarnessState::ToolsListed.to_string(), "tools-listed");
    }
}
