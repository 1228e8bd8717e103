//! Cord client library.
//!
//! Message model and message-list layout for a desktop chat client:
//! decoding API payloads, deciding which messages share an author header,
//! per-channel buffers and on-disk chat logs.

pub mod buffer;
pub mod config;
pub mod error;
pub mod logging;
pub mod mention;
pub mod message;
pub mod transcript;


pub use error::{Error, Result};
