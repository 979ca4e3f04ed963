use std::{
	cell::{Cell, RefCell},
	panic::{catch_unwind, AssertUnwindSafe},
	rc::Rc,
};

use anther::{Connection, Signal};

use _validator::Validator;

type Held = Rc<RefCell<Option<Connection>>>;

#[test]
fn a_slot_may_disconnect_itself() {
	let v = Validator::new();
	let signal = Signal::new();
	let slot_a: Held = Rc::default();

	*slot_a.borrow_mut() = Some(signal.connect({
		let v = v.clone();
		let slot_a = Rc::clone(&slot_a);
		move |_: &()| {
			v.push("a");
			if let Some(mut connection) = slot_a.borrow_mut().take() {
				connection.disconnect();
			}
		}
	}));

	signal.emit(&());
	v.expect(["a"]);

	signal.emit(&());
	v.expect([]);
	assert!(signal.is_empty());
}

#[test]
fn disconnecting_an_unvisited_peer_skips_it() {
	let v = Validator::new();
	let signal = Signal::new();
	let slot_c: Held = Rc::default();

	let _a = signal.connect({
		let v = v.clone();
		let slot_c = Rc::clone(&slot_c);
		move |_: &()| {
			v.push("a");
			slot_c.borrow_mut().take();
		}
	});
	let _b = signal.connect({
		let v = v.clone();
		move |_: &()| v.push("b")
	});
	*slot_c.borrow_mut() = Some(signal.connect({
		let v = v.clone();
		move |_: &()| v.push("c")
	}));

	signal.emit(&());
	v.expect(["a", "b"]);

	signal.emit(&());
	v.expect(["a", "b"]);
}

#[test]
fn disconnecting_a_visited_peer_leaves_the_pass_alone() {
	let v = Validator::new();
	let signal = Signal::new();
	let slot_a: Held = Rc::default();

	*slot_a.borrow_mut() = Some(signal.connect({
		let v = v.clone();
		move |_: &()| v.push("a")
	}));
	let _b = signal.connect({
		let v = v.clone();
		let slot_a = Rc::clone(&slot_a);
		move |_: &()| {
			v.push("b");
			slot_a.borrow_mut().take();
		}
	});

	signal.emit(&());
	v.expect(["a", "b"]);

	signal.emit(&());
	v.expect(["b"]);
}

#[test]
fn slots_connected_during_a_pass_are_visited() {
	let v = Validator::new();
	let signal = Rc::new(Signal::new());
	let connections = Rc::new(RefCell::new(Vec::new()));
	let armed = Rc::new(Cell::new(true));

	let _a = signal.connect({
		let v = v.clone();
		let signal = Rc::clone(&signal);
		let connections = Rc::clone(&connections);
		let armed = Rc::clone(&armed);
		move |_: &()| {
			v.push("a");
			if armed.replace(false) {
				connections.borrow_mut().push(signal.connect({
					let v = v.clone();
					move |_: &()| v.push("d")
				}));
			}
		}
	});

	signal.emit(&());
	v.expect(["a", "d"]);

	signal.emit(&());
	v.expect(["a", "d"]);
}

#[test]
fn a_panicking_slot_abandons_the_pass() {
	let v = Validator::new();
	let signal = Signal::new();
	let armed = Rc::new(Cell::new(true));

	let _a = signal.connect({
		let v = v.clone();
		let armed = Rc::clone(&armed);
		move |_: &()| {
			v.push("a");
			assert!(!armed.replace(false), "rigged slot failure");
		}
	});
	let _b = signal.connect({
		let v = v.clone();
		move |_: &()| v.push("b")
	});

	let caught = catch_unwind(AssertUnwindSafe(|| signal.emit(&())));
	assert!(caught.is_err());
	v.expect(["a"]);

	// The abandoned pass unregistered itself; the signal stays usable.
	signal.emit(&());
	v.expect(["a", "b"]);
}
