//! `requestAnimationFrame` loop with an explicit stop handle.
//!
//! A loop runs until [`Stoppable::stop`] is called or its handle is dropped. The
//! component keeps at most one loop alive through a [`LoopSlot`]: starting a new
//! one stops the previous one first, so two loops never draw into the same canvas.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use super::error::{StarMapError, describe};

/// Something that runs until told to stop.
pub trait Stoppable {
	/// Stops it. Returns `true` only the first time, when there was something
	/// running to stop.
	fn stop(&mut self) -> bool;

	/// Whether it is still running.
	fn is_running(&self) -> bool;
}

/// Holds the one live loop.
pub struct LoopSlot<L: Stoppable> {
	current: Option<L>,
}

impl<L: Stoppable> Default for LoopSlot<L> {
	fn default() -> Self {
		Self { current: None }
	}
}

impl<L: Stoppable> LoopSlot<L> {
	/// Installs `next`, stopping whatever was there before.
	pub fn replace(&mut self, next: L) {
		self.stop();
		self.current = Some(next);
	}

	/// Stops and drops the current loop, if any.
	pub fn stop(&mut self) -> bool {
		self.current.take().is_some_and(|mut l| l.stop())
	}

	/// Whether a live loop is installed.
	pub fn is_running(&self) -> bool {
		self.current.as_ref().is_some_and(Stoppable::is_running)
	}
}

/// Turns RAF timestamps (milliseconds) into frame deltas (seconds).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
	last: Option<f64>,
}

impl FrameClock {
	/// Delta since the previous timestamp. The first frame, and any timestamp
	/// going backwards, yields zero.
	pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
		let dt = self
			.last
			.map_or(0.0, |last| ((timestamp_ms - last) / 1000.0).max(0.0));
		self.last = Some(timestamp_ms);
		dt
	}
}

struct LoopInner {
	window: Window,
	running: Cell<bool>,
	request_id: Cell<Option<i32>>,
	callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl LoopInner {
	fn schedule(&self) -> Result<(), StarMapError> {
		let callback = self.callback.borrow();
		let Some(cb) = callback.as_ref() else {
			return Ok(());
		};
		let id = self
			.window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.map_err(|e| StarMapError::RequestFailed(describe(&e)))?;
		self.request_id.set(Some(id));
		Ok(())
	}
}

/// A running `requestAnimationFrame` loop. Stops when dropped.
pub struct AnimationLoop {
	inner: Rc<LoopInner>,
}

impl AnimationLoop {
	/// Starts calling `frame` once per display frame with the seconds elapsed
	/// since the previous call.
	pub fn start<F>(mut frame: F) -> Result<Self, StarMapError>
	where
		F: FnMut(f64) + 'static,
	{
		let window = web_sys::window().ok_or(StarMapError::WindowNotAvailable)?;
		let inner = Rc::new(LoopInner {
			window,
			running: Cell::new(true),
			request_id: Cell::new(None),
			callback: RefCell::new(None),
		});

		// The callback holds only a weak handle, so dropping the loop frees it.
		let weak: Weak<LoopInner> = Rc::downgrade(&inner);
		let mut clock = FrameClock::default();
		let callback = Closure::wrap(Box::new(move |timestamp: f64| {
			let Some(inner) = weak.upgrade() else {
				return;
			};
			inner.request_id.set(None);
			if !inner.running.get() {
				return;
			}
			frame(clock.advance(timestamp));
			if inner.running.get() {
				if let Err(err) = inner.schedule() {
					warn!("starmap: animation loop halted: {err}");
					inner.running.set(false);
				}
			}
		}) as Box<dyn FnMut(f64)>);
		*inner.callback.borrow_mut() = Some(callback);

		inner.schedule()?;
		Ok(Self { inner })
	}
}

impl Stoppable for AnimationLoop {
	fn stop(&mut self) -> bool {
		if !self.inner.running.replace(false) {
			return false;
		}
		if let Some(id) = self.inner.request_id.take() {
			if let Err(err) = self.inner.window.cancel_animation_frame(id) {
				warn!("starmap: cancel_animation_frame failed: {}", describe(&err));
			}
		}
		true
	}

	fn is_running(&self) -> bool {
		self.inner.running.get()
	}
}

impl Drop for AnimationLoop {
	fn drop(&mut self) {
		self.stop();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Counts how many times it was really stopped.
	struct Probe {
		running: bool,
		stops: Rc<Cell<usize>>,
	}

	impl Probe {
		fn new(stops: &Rc<Cell<usize>>) -> Self {
			Self {
				running: true,
				stops: stops.clone(),
			}
		}
	}

	impl Stoppable for Probe {
		fn stop(&mut self) -> bool {
			if !self.running {
				return false;
			}
			self.running = false;
			self.stops.set(self.stops.get() + 1);
			true
		}

		fn is_running(&self) -> bool {
			self.running
		}
	}

	#[test]
	fn replacing_stops_previous_loop_once() {
		let (first, second) = (Rc::new(Cell::new(0)), Rc::new(Cell::new(0)));
		let mut slot = LoopSlot::default();
		slot.replace(Probe::new(&first));
		assert!(slot.is_running());
		slot.replace(Probe::new(&second));
		assert_eq!(first.get(), 1);
		assert_eq!(second.get(), 0);
		assert!(slot.is_running());
	}

	#[test]
	fn stop_is_idempotent() {
		let stops = Rc::new(Cell::new(0));
		let mut slot = LoopSlot::default();
		slot.replace(Probe::new(&stops));
		assert!(slot.stop());
		assert!(!slot.stop());
		assert!(!slot.is_running());
		assert_eq!(stops.get(), 1);
	}

	#[test]
	fn empty_slot_is_idle() {
		let mut slot = LoopSlot::<Probe>::default();
		assert!(!slot.is_running());
		assert!(!slot.stop());
	}

	#[test]
	fn clock_reports_seconds_between_frames() {
		let mut clock = FrameClock::default();
		assert_eq!(clock.advance(1000.0), 0.0);
		assert!((clock.advance(1016.0) - 0.016).abs() < 1e-12);
		assert!((clock.advance(1516.0) - 0.5).abs() < 1e-12);
		assert_eq!(clock.advance(1200.0), 0.0);
	}
}
