//! ASCII control sub-protocol.
//!
//! Besides the binary release frames, the link carries plain text lines for
//! diagnostics. They are not checksummed and boards that do not implement
//! them simply ignore the line.

use lockerbank_core::{
    LogicalLockerId,
    constants::{STATUS_COMMAND_PREFIX, TEST_COMMAND},
};
use std::fmt;

/// Text command sent on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// `STATUS:%03d\n` query for one locker.
    Status(LogicalLockerId),

    /// `TEST\n` connectivity probe.
    Test,
}

impl ControlCommand {
    /// Render the full command line, terminator included.
    ///
    /// ```
    /// use lockerbank_core::LogicalLockerId;
    /// use lockerbank_protocol::ControlCommand;
    ///
    /// let id = LogicalLockerId::new(7).unwrap();
    /// assert_eq!(ControlCommand::Status(id).to_line(), "STATUS:007\n");
    /// assert_eq!(ControlCommand::Test.to_line(), "TEST\n");
    /// ```
    pub fn to_line(&self) -> String {
        match self {
            Self::Status(id) => format!("{}{:03}\n", STATUS_COMMAND_PREFIX, id.get()),
            Self::Test => TEST_COMMAND.to_string(),
        }
    }
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_line().trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_zero_padded() {
        let id = LogicalLockerId::new(1).unwrap();
        assert_eq!(ControlCommand::Status(id).to_line(), "STATUS:001\n");
    }

    #[test]
    fn test_status_wider_than_padding() {
        let id = LogicalLockerId::new(1234).unwrap();
        assert_eq!(ControlCommand::Status(id).to_line(), "STATUS:1234\n");
    }

    #[test]
    fn test_display_has_no_terminator() {
        assert_eq!(ControlCommand::Test.to_string(), "TEST");
    }
}
