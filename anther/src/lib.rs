#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! [`Signal`] and [`Connection`] are single-threaded by design (neither is
//! [`Send`] nor [`Sync`]). Re-entrancy, not parallelism, is the supported
//! form of nesting: a slot may call back into the signal that is invoking
//! it, and each nested pass tracks its own position.

mod connection;
mod signal;

pub use connection::Connection;
pub use signal::Signal;

#[doc = include_str!("../README.md")]
mod readme {}
