//! Staggered "stars igniting" entrance.
//!
//! Star `i` (in layout order) appears at `delay + i·stagger` seconds after the
//! payload arrived, then ramps opacity and scale up to full over `duration`.

/// Entrance timing.
#[derive(Clone, Debug)]
pub struct EntranceConfig {
	/// Time before the first star appears, in seconds.
	pub delay: f64,
	/// Gap between consecutive stars, in seconds.
	pub stagger: f64,
	/// Ramp length once a star has appeared, in seconds.
	pub duration: f64,
	/// Opacity at the instant a star appears.
	pub start_opacity: f64,
	/// Scale at the instant a star appears.
	pub start_scale: f64,
}

impl Default for EntranceConfig {
	fn default() -> Self {
		Self {
			delay: 0.15,
			stagger: 0.08,
			duration: 0.6,
			start_opacity: 0.15,
			start_scale: 0.4,
		}
	}
}

/// Opacity and scale of a star at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntranceFrame {
	/// Multiplier on every alpha the star draws with.
	pub opacity: f64,
	/// Multiplier on the star's size.
	pub scale: f64,
}

impl EntranceFrame {
	/// Not yet ignited.
	pub const HIDDEN: Self = Self {
		opacity: 0.0,
		scale: 0.0,
	};
	/// Fully ignited.
	pub const FULL: Self = Self {
		opacity: 1.0,
		scale: 1.0,
	};

	#[cfg(test)]
	fn is_visible(&self) -> bool {
		self.opacity > 0.0
	}
}

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

impl EntranceConfig {
	/// Seconds after payload arrival at which the star in layout slot `slot`
	/// appears.
	pub fn appear_at(&self, slot: usize) -> f64 {
		self.delay + slot as f64 * self.stagger
	}

	/// Entrance state of a star scheduled at `appear_at`, `elapsed` seconds after
	/// payload arrival.
	pub fn frame(&self, appear_at: f64, elapsed: f64) -> EntranceFrame {
		if elapsed < appear_at {
			return EntranceFrame::HIDDEN;
		}
		if self.duration <= 0.0 {
			return EntranceFrame::FULL;
		}
		let t = ((elapsed - appear_at) / self.duration).clamp(0.0, 1.0);
		if t >= 1.0 {
			return EntranceFrame::FULL;
		}
		let eased = ease_out_cubic(t);
		EntranceFrame {
			opacity: self.start_opacity + (1.0 - self.start_opacity) * eased,
			scale: self.start_scale + (1.0 - self.start_scale) * eased,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hidden_before_scheduled_time() {
		let config = EntranceConfig::default();
		for slot in 0..20 {
			let at = config.appear_at(slot);
			assert!(!config.frame(at, at - 1e-6).is_visible());
			assert!(!config.frame(at, 0.0).is_visible());
		}
	}

	#[test]
	fn full_after_ramp() {
		let config = EntranceConfig::default();
		for slot in 0..20 {
			let at = config.appear_at(slot);
			assert_eq!(config.frame(at, at + config.duration), EntranceFrame::FULL);
			assert_eq!(config.frame(at, at + 100.0), EntranceFrame::FULL);
		}
	}

	#[test]
	fn ramp_starts_partial_and_rises() {
		let config = EntranceConfig::default();
		let at = config.appear_at(3);
		let first = config.frame(at, at);
		assert!((first.opacity - config.start_opacity).abs() < 1e-12);
		assert!((first.scale - config.start_scale).abs() < 1e-12);

		let mut last = first.opacity;
		for step in 1..10 {
			let f = config.frame(at, at + config.duration * step as f64 / 10.0);
			assert!(f.opacity > last);
			last = f.opacity;
		}
	}

	#[test]
	fn later_slots_appear_later() {
		let config = EntranceConfig::default();
		assert!(config.appear_at(5) > config.appear_at(4));
		let t = config.appear_at(4) + 0.01;
		assert!(config.frame(config.appear_at(4), t).is_visible());
		assert!(!config.frame(config.appear_at(5), t).is_visible());
	}

	#[test]
	fn zero_duration_pops_in() {
		let config = EntranceConfig {
			duration: 0.0,
			..EntranceConfig::default()
		};
		assert_eq!(config.frame(1.0, 1.0), EntranceFrame::FULL);
	}
}
