//! Destination channel addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Transport-level address of a destination channel, `user@server`.
///
/// Examples: `120363423562861659@newsletter`, `923001234567@s.whatsapp.net`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelAddress {
    pub user: String,
    pub server: String,
}

impl ChannelAddress {
    /// Resolve a configured destination identifier.
    pub fn parse(id: &str) -> Result<Self, AppError> {
        let trimmed = id.trim();
        let (user, server) = trimmed
            .split_once('@')
            .ok_or_else(|| AppError::Address(id.to_string()))?;

        if user.is_empty() || server.is_empty() || server.contains('@') {
            return Err(AppError::Address(id.to_string()));
        }

        Ok(Self {
            user: user.to_string(),
            server: server.to_string(),
        })
    }
}

impl FromStr for ChannelAddress {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.server)
    }
}
