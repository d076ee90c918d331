// src/models/mod.rs

//! Domain models for the relay.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod channel;
mod config;
mod record;

// Re-export all public types
pub use channel::ChannelAddress;
pub use config::{
    Config, DispatchConfig, FormatConfig, PollConfig, SourceConfig, StorageConfig, StorageKind,
    TransportConfig, TransportKind,
};
pub use record::{OtpRecord, RecordIdentity, RowRejection};
