//! OTP record data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One OTP notification as reported by an upstream feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpRecord {
    /// Source-native timestamp, kept verbatim
    pub timestamp: String,

    /// Raw country descriptor (e.g. "Pakistan-PTCL")
    pub country: String,

    /// Phone number or account identifier
    pub account: String,

    /// Service that sent the OTP
    pub service: String,

    /// Full message body, kept verbatim
    pub message: String,
}

impl OtpRecord {
    /// Identity of this record, unscoped.
    pub fn identity(&self) -> RecordIdentity {
        RecordIdentity::new(&self.account, &self.timestamp)
    }

    /// Identity of this record, prefixed with the reporting source.
    pub fn scoped_identity(&self, source_label: &str) -> RecordIdentity {
        RecordIdentity(format!(
            "{}:{}",
            source_label,
            self.identity().as_str()
        ))
    }
}

/// Deduplication key derived from an [`OtpRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordIdentity(String);

impl RecordIdentity {
    pub fn new(account: &str, timestamp: &str) -> Self {
        Self(format!("{}_{}", account, timestamp))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordIdentity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Reason a feed row was not turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowRejection {
    /// Row is not a JSON array
    NotArray,
    /// Row has fewer than five columns
    TooShort(usize),
    /// Account column is empty or a placeholder such as `0`
    NoAccount,
    /// A required column is empty
    EmptyField(&'static str),
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotArray => write!(f, "row is not an array"),
            Self::TooShort(len) => write!(f, "row has {} columns, need 5", len),
            Self::NoAccount => write!(f, "row has no account"),
            Self::EmptyField(name) => write!(f, "row has empty {}", name),
        }
    }
}
