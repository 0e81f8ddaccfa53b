//! tabmux-protocol: Shared wire definitions for tab-broker communication
//!
//! This crate defines the command envelope, the reply shapes, and the
//! framing codec used on the channel between a tab and the broker.

pub mod codec;
pub mod messages;

// Re-export main types at crate root
pub use codec::{BrokerCodec, CodecError, TabCodec};
pub use messages::{Command, Reply};
