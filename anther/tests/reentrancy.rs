use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};

use anther::{Connection, Signal};

use _validator::Validator;

#[test]
fn nested_emission_resumes_the_outer_pass() {
	let v = Validator::new();
	let signal = Rc::new(Signal::new());
	let depth = Rc::new(Cell::new(0));

	let _a = signal.connect({
		let v = v.clone();
		let signal = Rc::clone(&signal);
		let depth = Rc::clone(&depth);
		move |_: &()| {
			v.push("a");
			if depth.get() == 0 {
				depth.set(1);
				signal.emit(&());
				depth.set(0);
			}
		}
	});
	let _b = signal.connect({
		let v = v.clone();
		move |_: &()| v.push("b")
	});

	// Outer pass invokes `a`; `a` runs a full nested pass (`a` again —
	// guarded from recursing further — then `b`); the outer pass then
	// resumes behind `a` and invokes `b`.
	signal.emit(&());
	v.expect(["a", "a", "b", "b"]);
}

#[test]
fn disconnects_inside_a_nested_pass_adjust_outer_cursors() {
	let v = Validator::new();
	let signal = Rc::new(Signal::new());
	let slot_a = Rc::new(RefCell::new(None::<Connection>));
	let armed = Rc::new(Cell::new(true));

	*slot_a.borrow_mut() = Some(signal.connect({
		let v = v.clone();
		let signal = Rc::clone(&signal);
		let armed = Rc::clone(&armed);
		move |_: &()| {
			v.push("a");
			if armed.replace(false) {
				signal.emit(&());
			}
		}
	}));
	let _b = signal.connect({
		let v = v.clone();
		let slot_a = Rc::clone(&slot_a);
		move |_: &()| {
			v.push("b");
			slot_a.borrow_mut().take();
		}
	});

	// The nested pass's `b` unregisters `a` while the *outer* cursor still
	// points at it; the outer pass must retreat and resume at `b` instead
	// of dereferencing the unlinked entry.
	signal.emit(&());
	v.expect(["a", "a", "b", "b"]);

	signal.emit(&());
	v.expect(["b"]);
}

#[test]
fn nested_emission_of_another_signal_is_independent() {
	let v = Validator::new();
	let outer = Signal::new();
	let inner = Rc::new(Signal::new());

	let _x = inner.connect({
		let v = v.clone();
		move |n: &i32| v.push(("inner", *n))
	});
	let _a = outer.connect({
		let v = v.clone();
		let inner = Rc::clone(&inner);
		move |n: &i32| {
			v.push(("outer a", *n));
			inner.emit(&(n + 1));
		}
	});
	let _b = outer.connect({
		let v = v.clone();
		move |n: &i32| v.push(("outer b", *n))
	});

	outer.emit(&1);
	v.expect([("outer a", 1), ("inner", 2), ("outer b", 1)]);
}
