//! [`Chain`] threads a doubly-linked list through a slot vector.
//!
//! The link state lives inside each entry's slot rather than in separate
//! heap nodes, so structural operations are O(1) relinking and freed slots
//! are reused without allocating.

use core::{
	fmt::{self, Debug, Formatter},
	iter::FusedIterator,
	mem,
	num::NonZeroU32,
};

/// Stable handle to a linked entry in a [`Chain`].
///
/// Keys are generational: removing the entry bumps its slot's generation, so
/// a key held past removal is *stale* and is rejected by every accessor even
/// after the slot has been reused for a new entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Key {
	index: u32,
	generation: NonZeroU32,
}

struct Slot<T> {
	generation: NonZeroU32,
	state: State<T>,
}

enum State<T> {
	Vacant {
		next_free: Option<u32>,
	},
	Linked {
		prev: Option<u32>,
		next: Option<u32>,
		value: T,
	},
}

/// A doubly-linked list over reusable slots.
///
/// Supports O(1) [`push_back`](`Chain::push_back`),
/// [`insert_before`](`Chain::insert_before`) and unlink-by-identity
/// ([`remove`](`Chain::remove`)), plus forward iteration in link order.
/// Neighbour queries ([`next`](`Chain::next`), [`prev`](`Chain::prev`)) turn
/// a stored [`Key`] back into a traversal position, which is what lets
/// entries be unlinked safely mid-traversal.
///
/// No operation allocates except growing the slot vector once every free
/// slot is occupied.
pub struct Chain<T> {
	slots: Vec<Slot<T>>,
	free_head: Option<u32>,
	head: Option<u32>,
	tail: Option<u32>,
	len: usize,
}

impl<T> Chain<T> {
	/// Creates an empty [`Chain`] without allocating.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			slots: Vec::new(),
			free_head: None,
			head: None,
			tail: None,
			len: 0,
		}
	}

	/// Creates an empty [`Chain`] with room for `capacity` entries.
	#[must_use]
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			slots: Vec::with_capacity(capacity),
			..Self::new()
		}
	}

	/// Number of linked entries.
	#[must_use]
	pub fn len(&self) -> usize {
		self.len
	}

	/// Whether no entries are linked.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Total slot capacity, including vacant slots.
	#[must_use]
	pub fn capacity(&self) -> usize {
		self.slots.capacity()
	}

	/// Key of the first linked entry.
	#[must_use]
	pub fn head(&self) -> Option<Key> {
		self.head.map(|index| self.key_at(index))
	}

	/// Key of the last linked entry.
	#[must_use]
	pub fn tail(&self) -> Option<Key> {
		self.tail.map(|index| self.key_at(index))
	}

	/// Key of the entry linked after `key`.
	///
	/// [`None`] if `key` is the tail or stale.
	#[must_use]
	pub fn next(&self, key: Key) -> Option<Key> {
		let index = self.index_of(key)?;
		self.links(index).1.map(|index| self.key_at(index))
	}

	/// Key of the entry linked before `key`.
	///
	/// [`None`] if `key` is the head or stale.
	#[must_use]
	pub fn prev(&self, key: Key) -> Option<Key> {
		let index = self.index_of(key)?;
		self.links(index).0.map(|index| self.key_at(index))
	}

	/// Whether `key` refers to a currently linked entry.
	#[must_use]
	pub fn contains(&self, key: Key) -> bool {
		self.index_of(key).is_some()
	}

	/// Shared access to the entry at `key`, unless stale.
	#[must_use]
	pub fn get(&self, key: Key) -> Option<&T> {
		let index = self.index_of(key)?;
		match &self.slots[index as usize].state {
			State::Linked { value, .. } => Some(value),
			State::Vacant { .. } => None,
		}
	}

	/// Exclusive access to the entry at `key`, unless stale.
	#[must_use]
	pub fn get_mut(&mut self, key: Key) -> Option<&mut T> {
		let index = self.index_of(key)?;
		match &mut self.slots[index as usize].state {
			State::Linked { value, .. } => Some(value),
			State::Vacant { .. } => None,
		}
	}

	/// Links `value` after the current tail.
	///
	/// # Panics
	///
	/// Panics iff the chain would exceed [`u32::MAX`] slots.
	pub fn push_back(&mut self, value: T) -> Key {
		let prev = self.tail;
		let key = self.alloc(prev, None, value);
		match prev {
			Some(prev) => self.set_next(prev, Some(key.index)),
			None => self.head = Some(key.index),
		}
		self.tail = Some(key.index);
		self.len += 1;
		key
	}

	/// Links `value` immediately before the entry at `at`.
	///
	/// # Panics
	///
	/// Panics iff `at` is stale or the chain would exceed [`u32::MAX`] slots.
	pub fn insert_before(&mut self, at: Key, value: T) -> Key {
		let at_index = self
			.index_of(at)
			.expect("`insert_before` called with a stale key");
		let (prev, _) = self.links(at_index);
		let key = self.alloc(prev, Some(at_index), value);
		self.set_prev(at_index, Some(key.index));
		match prev {
			Some(prev) => self.set_next(prev, Some(key.index)),
			None => self.head = Some(key.index),
		}
		self.len += 1;
		key
	}

	/// Unlinks the entry at `key` and returns its value.
	///
	/// O(1). The slot becomes reusable and `key` goes stale, so repeating
	/// this (or any other accessor) with the same key is a [`None`] no-op.
	pub fn remove(&mut self, key: Key) -> Option<T> {
		let index = self.index_of(key)?;
		let slot = &mut self.slots[index as usize];
		slot.generation = bumped(slot.generation);
		let state = mem::replace(
			&mut slot.state,
			State::Vacant {
				next_free: self.free_head,
			},
		);
		let State::Linked { prev, next, value } = state else {
			unreachable!("`index_of` vouched for a linked slot")
		};
		self.free_head = Some(index);
		match prev {
			Some(prev) => self.set_next(prev, next),
			None => self.head = next,
		}
		match next {
			Some(next) => self.set_prev(next, prev),
			None => self.tail = prev,
		}
		self.len -= 1;
		Some(value)
	}

	/// Unlinks every entry, dropping the values.
	///
	/// All outstanding keys go stale; slot capacity is kept for reuse.
	pub fn clear(&mut self) {
		self.head = None;
		self.tail = None;
		self.len = 0;
		self.free_head = None;
		for (index, slot) in (0_u32..).zip(self.slots.iter_mut()) {
			if matches!(slot.state, State::Linked { .. }) {
				slot.generation = bumped(slot.generation);
			}
			slot.state = State::Vacant {
				next_free: self.free_head,
			};
			self.free_head = Some(index);
		}
	}

	/// Iterates the linked entries in link order, with their keys.
	pub fn iter(&self) -> Iter<'_, T> {
		Iter {
			chain: self,
			at: self.head,
		}
	}

	fn index_of(&self, key: Key) -> Option<u32> {
		let slot = self.slots.get(key.index as usize)?;
		(slot.generation == key.generation && matches!(slot.state, State::Linked { .. }))
			.then_some(key.index)
	}

	fn key_at(&self, index: u32) -> Key {
		Key {
			index,
			generation: self.slots[index as usize].generation,
		}
	}

	fn links(&self, index: u32) -> (Option<u32>, Option<u32>) {
		match &self.slots[index as usize].state {
			State::Linked { prev, next, .. } => (*prev, *next),
			State::Vacant { .. } => unreachable!("vacant slot reached through a link"),
		}
	}

	fn set_prev(&mut self, index: u32, new_prev: Option<u32>) {
		match &mut self.slots[index as usize].state {
			State::Linked { prev, .. } => *prev = new_prev,
			State::Vacant { .. } => unreachable!("vacant slot reached through a link"),
		}
	}

	fn set_next(&mut self, index: u32, new_next: Option<u32>) {
		match &mut self.slots[index as usize].state {
			State::Linked { next, .. } => *next = new_next,
			State::Vacant { .. } => unreachable!("vacant slot reached through a link"),
		}
	}

	fn alloc(&mut self, prev: Option<u32>, next: Option<u32>, value: T) -> Key {
		if let Some(index) = self.free_head {
			let slot = &mut self.slots[index as usize];
			let State::Vacant { next_free } = slot.state else {
				unreachable!("occupied slot on the free list")
			};
			self.free_head = next_free;
			slot.state = State::Linked { prev, next, value };
			Key {
				index,
				generation: slot.generation,
			}
		} else {
			let index =
				u32::try_from(self.slots.len()).expect("chain exceeds `u32::MAX` slots");
			self.slots.push(Slot {
				generation: NonZeroU32::MIN,
				state: State::Linked { prev, next, value },
			});
			Key {
				index,
				generation: NonZeroU32::MIN,
			}
		}
	}
}

fn bumped(generation: NonZeroU32) -> NonZeroU32 {
	NonZeroU32::new(generation.get().wrapping_add(1)).unwrap_or(NonZeroU32::MIN)
}

impl<T> Default for Chain<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Debug> Debug for Chain<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter().map(|(_, value)| value)).finish()
	}
}

/// Forward iterator over a [`Chain`], created by [`Chain::iter`].
pub struct Iter<'a, T> {
	chain: &'a Chain<T>,
	at: Option<u32>,
}

impl<'a, T> Iterator for Iter<'a, T> {
	type Item = (Key, &'a T);

	fn next(&mut self) -> Option<Self::Item> {
		let index = self.at?;
		let slot = &self.chain.slots[index as usize];
		let State::Linked {
			next, ref value, ..
		} = slot.state
		else {
			unreachable!("vacant slot reached through a link")
		};
		self.at = next;
		Some((
			Key {
				index,
				generation: slot.generation,
			},
			value,
		))
	}
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a Chain<T> {
	type Item = (Key, &'a T);
	type IntoIter = Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
