//! [`Signal`] and its shared core: the connection chain, the cursor chain,
//! and the dispatch loop that keeps the two consistent.

use core::fmt::{self, Debug, Formatter};
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};

use rachis::{Chain, Key};
use scopeguard::guard;
use tap::Pipe;

use crate::connection::{Connection, Registry};

type Slot<T> = Rc<dyn Fn(&T)>;

/// One emission's traversal position over the connection chain.
///
/// Every pass currently on the stack owns one entry in the core's cursor
/// chain; unregistering a connection retreats every cursor that points at
/// it, at any re-entrancy depth, before the entry is unlinked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
	/// Before the first entry; the next advance lands on the live head.
	///
	/// Reached by retreating off a connection that had no predecessor, so
	/// that an advance still resumes at the unlinked entry's successor (or
	/// whatever has been linked in front of it since).
	Rewound,
	/// At this connection: it is being invoked, or was the last one
	/// invoked by this pass.
	At(Key),
	/// Past the end; the pass stops without touching the chain again.
	Done,
}

struct Core<T: ?Sized + 'static> {
	connections: Chain<Slot<T>>,
	cursors: Chain<Cursor>,
}

impl<T: ?Sized + 'static> Core<T> {
	/// Unregisters `key`: retreats every cursor positioned on it, then
	/// unlinks it. Returns the slot so the caller can drop it *outside*
	/// the core borrow (slots may own [`Connection`]s whose drop re-enters
	/// the core).
	fn unlink(&mut self, key: Key) -> Option<Slot<T>> {
		if !self.connections.contains(key) {
			return None;
		}
		let fallback = self
			.connections
			.prev(key)
			.map_or(Cursor::Rewound, Cursor::At);
		let mut at = self.cursors.head();
		while let Some(cursor) = at {
			at = self.cursors.next(cursor);
			if let Some(position) = self.cursors.get_mut(cursor) {
				if *position == Cursor::At(key) {
					*position = fallback;
				}
			}
		}
		self.connections.remove(key)
	}
}

impl<T: ?Sized + 'static> Registry for RefCell<Core<T>> {
	fn unlink(&self, key: Key) {
		let removed = self.borrow_mut().unlink(key);
		drop(removed);
	}

	fn is_linked(&self, key: Key) -> bool {
		self.borrow().connections.contains(key)
	}
}

/// A typed broadcast point: slots connected to it are invoked synchronously,
/// in registration order, each time it is [emitted](`Signal::emit`).
///
/// Signals have identity — connections refer back to the signal that created
/// them — so they are neither copyable nor cloneable.
///
/// The argument type may be unsized (e.g. `Signal<str>`); use a tuple to
/// broadcast several values at once.
pub struct Signal<T: ?Sized + 'static = ()> {
	core: Rc<RefCell<Core<T>>>,
}

impl<T: ?Sized + 'static> Signal<T> {
	/// Creates a signal with no connections.
	#[must_use]
	pub fn new() -> Self {
		Self {
			core: Rc::new(RefCell::new(Core {
				connections: Chain::new(),
				cursors: Chain::new(),
			})),
		}
	}

	/// Registers `slot` behind every existing connection and returns the
	/// [`Connection`] that owns the registration.
	///
	/// Ownership of the callable passes to the signal; it is dropped when
	/// the connection is disconnected or the signal goes away. The `Fn`
	/// bound is what keeps re-entrant dispatch sound — a nested pass may
	/// invoke a slot that is already executing — so slots keep interior
	/// state in [`Cell`](`core::cell::Cell`)/[`RefCell`].
	///
	/// Connecting from inside a slot is fine: the new slot is visited by
	/// the current pass iff the pass has not yet advanced past the tail.
	pub fn connect(&self, slot: impl Fn(&T) + 'static) -> Connection {
		let key = self.core.borrow_mut().connections.push_back(Rc::new(slot));
		let registry: Weak<dyn Registry> = Rc::<RefCell<Core<T>>>::downgrade(&self.core);
		Connection::new(registry, key)
	}

	/// Invokes every currently registered slot with `value`, in
	/// registration order, in a single forward pass.
	///
	/// # Logic
	///
	/// The pass reflects mutation as it happens: a connection unregistered
	/// before the pass reaches it is skipped; unregistering the connection
	/// being invoked, or one already passed, does not affect this pass; a
	/// connection registered during the pass is visited iff the pass has
	/// not yet moved past the tail. Re-entrant `emit` calls run nested
	/// passes to completion before the outer pass resumes; every pass
	/// tracks its own position.
	///
	/// # Panics
	///
	/// A panicking slot propagates to the caller; the remaining slots of
	/// this pass are not invoked. The signal itself stays consistent and
	/// usable.
	pub fn emit(&self, value: &T) {
		let core = Rc::clone(&self.core);
		let cursor = {
			let mut core = core.borrow_mut();
			core.connections
				.head()
				.map_or(Cursor::Done, Cursor::At)
				.pipe(|start| core.cursors.push_back(start))
		};
		// The pass keeps the core alive on its own and unregisters its
		// cursor even when a slot panics.
		let core = guard(core, |core| {
			core.borrow_mut().cursors.remove(cursor);
		});

		loop {
			let slot = {
				let core = core.borrow();
				match core.cursors.get(cursor).copied() {
					None | Some(Cursor::Done) => break,
					Some(Cursor::Rewound) => None,
					Some(Cursor::At(key)) => core.connections.get(key).map(Rc::clone),
				}
			};
			// No borrow is held here: the slot may connect, disconnect,
			// re-enter `emit`, or drop this signal's last handle.
			if let Some(slot) = slot {
				(*slot)(value);
			}
			{
				let mut core = core.borrow_mut();
				let next = match core.cursors.get(cursor).copied() {
					None | Some(Cursor::Done) => break,
					Some(Cursor::Rewound) => core.connections.head(),
					Some(Cursor::At(key)) => core.connections.next(key),
				};
				if let Some(position) = core.cursors.get_mut(cursor) {
					*position = next.map_or(Cursor::Done, Cursor::At);
				}
			}
		}
	}

	/// Number of currently registered connections.
	#[must_use]
	pub fn connection_count(&self) -> usize {
		self.core.borrow().connections.len()
	}

	/// Whether no connections are registered.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.core.borrow().connections.is_empty()
	}
}

impl<T: ?Sized + 'static> Default for Signal<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: ?Sized + 'static> Drop for Signal<T> {
	fn drop(&mut self) {
		{
			let mut core = self.core.borrow_mut();
			let mut at = core.cursors.head();
			while let Some(cursor) = at {
				at = core.cursors.next(cursor);
				if let Some(position) = core.cursors.get_mut(cursor) {
					*position = Cursor::Done;
				}
			}
		}
		// Detach the slots one at a time, dropping each outside the
		// borrow: a slot may own `Connection`s (to this signal or
		// another), and their drop re-enters a core.
		loop {
			let slot = {
				let mut core = self.core.borrow_mut();
				let head = core.connections.head();
				head.and_then(|key| core.connections.remove(key))
			};
			if slot.is_none() {
				break;
			}
		}
	}
}

impl<T: ?Sized + 'static> Debug for Signal<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let core = self.core.borrow();
		f.debug_struct("Signal")
			.field("connections", &core.connections.len())
			.field("passes_in_flight", &core.cursors.len())
			.finish()
	}
}
