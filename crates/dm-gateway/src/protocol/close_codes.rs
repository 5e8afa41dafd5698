//! Close codes the hub sends when it ends a session

/// Application close codes, all in the private 4000-4999 range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    UnknownError = 4000,
    /// Unknown or server-only op code
    UnknownOpcode = 4001,
    /// Frame was not valid JSON or the payload did not match its op code
    DecodeError = 4002,
    AuthenticationFailed = 4004,
}

impl CloseCode {
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reason text carried in the close frame
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error",
            Self::UnknownOpcode => "Invalid opcode",
            Self::DecodeError => "Invalid payload",
            Self::AuthenticationFailed => "Authentication failed",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}
