//! Service layer for the relay.
//!
//! This module contains the business logic for:
//! - Feed parsing (`extractor`)
//! - Feed polling over HTTP (`HttpSource`)
//! - Message rendering (`MessageFormatter`)
//! - Delivery (`FanoutDispatcher`, `Transport`)

pub mod countries;
pub mod dispatcher;
pub mod extractor;
pub mod formatter;
pub mod source;
pub mod transport;

pub use dispatcher::{DispatchReport, FanoutDispatcher};
pub use formatter::MessageFormatter;
pub use source::{HttpSource, Source};
pub use transport::{DeliveryAck, LogTransport, Transport, WebhookTransport, create_transport};
