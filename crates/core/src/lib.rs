//! Custody Core - Domain types
//!
//! This crate contains the fundamental types shared by every custody crate:
//! - `Address`: Opaque 20-byte identity with a distinguished null value
//! - `Amount`: Non-negative decimal wrapper for transferred value
//! - `Payload`: Opaque call data attached to a transaction

pub mod address;
pub mod amount;
pub mod payload;

pub use address::{Address, AddressError};
pub use amount::{Amount, AmountError};
pub use payload::{Payload, PayloadError};
