#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]
#![doc = include_str!("../README.md")]
//!
//! # Threading Notes
//!
//! [`Chain`] is a plain owned value with no interior mutability; share it the
//! way you would share a [`Vec`].

mod chain;

pub use chain::{Chain, Iter, Key};
