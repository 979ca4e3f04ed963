//! [`Connection`] is the RAII side of a [`Signal`](`crate::Signal`)
//! registration.

use core::fmt::{self, Debug, Formatter};
use std::rc::Weak;

use rachis::Key;

/// What a [`Connection`] needs from the signal core that registered it,
/// type-erased so handles stay non-generic.
pub(crate) trait Registry {
	/// Unregisters `key`, keeping every in-flight pass consistent.
	///
	/// **Must** tolerate stale keys (the entry may already be gone).
	fn unlink(&self, key: Key);

	fn is_linked(&self, key: Key) -> bool;
}

/// Owns one registered slot of a [`Signal`](`crate::Signal`).
///
/// Created by [`Signal::connect`](`crate::Signal::connect`). Dropping the
/// handle disconnects the slot, so it has to be kept alive for as long as
/// the slot should keep receiving emissions.
///
/// Handles are not cloneable (a registration has exactly one owner), but
/// moving one is an ordinary Rust move: the registration, and its position
/// in the delivery order, travel with the handle. Assigning over a handle
/// drops its previous value first, disconnecting the prior registration.
///
/// A handle that outlives its signal is inert: [`disconnect`](`Connection::disconnect`)
/// and drop become no-ops.
#[must_use = "dropping a `Connection` disconnects its slot immediately"]
pub struct Connection {
	target: Option<Target>,
}

struct Target {
	registry: Weak<dyn Registry>,
	key: Key,
}

impl Connection {
	pub(crate) fn new(registry: Weak<dyn Registry>, key: Key) -> Self {
		Self {
			target: Some(Target { registry, key }),
		}
	}

	/// Unregisters the slot, so that it is not called by any later (or
	/// later-resuming) emission.
	///
	/// Idempotent, and a no-op if the signal no longer exists. Safe to call
	/// from inside the slot's own invocation, or for a slot an in-progress
	/// pass has not reached yet; the pass adjusts rather than touching the
	/// unregistered entry. Never aborts an invocation that is already on
	/// the stack.
	pub fn disconnect(&mut self) {
		if let Some(target) = self.target.take() {
			if let Some(registry) = target.registry.upgrade() {
				registry.unlink(target.key);
			}
		}
	}

	/// Whether the slot is still registered with a live signal.
	#[must_use]
	pub fn is_connected(&self) -> bool {
		self.target.as_ref().is_some_and(|target| {
			target
				.registry
				.upgrade()
				.is_some_and(|registry| registry.is_linked(target.key))
		})
	}
}

impl Drop for Connection {
	fn drop(&mut self) {
		self.disconnect();
	}
}

impl Debug for Connection {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Connection")
			.field("connected", &self.is_connected())
			.finish()
	}
}
