//! Zoom-dependent sizing for star map visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: where stars live. Values scale with zoom.
//! - **Screen-space**: canvas pixels. Values stay fixed regardless of zoom.
//!
//! Everything in [`ScaledValues`] is expressed in world units so it can be used
//! directly after the camera transform has been applied to the canvas.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug, PartialEq)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped {
		/// Smallest on-screen size.
		min_screen: f64,
		/// Largest on-screen size.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value for a base value at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Sizing configuration for all zoom-dependent elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Title font size in screen pixels at zoom 1.
	pub label_size: f64,
	/// How the title font scales with zoom.
	pub label_behavior: ScaleBehavior,
	/// Link width in screen pixels for a link of strength 1.
	pub link_width: f64,
	/// How link width scales with zoom.
	pub link_behavior: ScaleBehavior,
	/// Selection ring stroke width in screen pixels.
	pub ring_width: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			label_size: 11.0,
			label_behavior: ScaleBehavior::Clamped {
				min_screen: 9.0,
				max_screen: 16.0,
			},
			link_width: 1.0,
			link_behavior: ScaleBehavior::Screen,
			ring_width: 1.5,
		}
	}
}

/// Pre-computed sizes for one zoom level. Build once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Zoom these sizes were computed for.
	pub k: f64,
	/// Title font size in world units.
	pub label_size: f64,
	/// Link width in world units for strength 1.
	pub link_width: f64,
	/// Selection ring width in world units.
	pub ring_width: f64,
}

impl ScaledValues {
	/// Sizes for zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		Self {
			k,
			label_size: config.label_behavior.apply(config.label_size, k),
			link_width: config.link_behavior.apply(config.link_width, k),
			ring_width: ScaleBehavior::Screen.apply(config.ring_width, k),
		}
	}

	/// Canvas font string for a title.
	pub fn label_font(&self, is_top: bool) -> String {
		let weight = if is_top { 500 } else { 400 };
		format!("{weight} {:.2}px \"Raleway\", sans-serif", self.label_size)
	}

	/// Canvas font string for the year/vibe detail line.
	pub fn detail_font(&self) -> String {
		format!("400 {:.2}px \"Raleway\", sans-serif", self.label_size * 0.8)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_behavior_counteracts_zoom() {
		let b = ScaleBehavior::Screen;
		assert!((b.apply(2.0, 2.0) * 2.0 - 2.0).abs() < 1e-12);
		assert!((b.apply(2.0, 0.5) * 0.5 - 2.0).abs() < 1e-12);
	}

	#[test]
	fn clamped_behavior_bounds_screen_size() {
		let b = ScaleBehavior::Clamped {
			min_screen: 9.0,
			max_screen: 16.0,
		};
		// at zoom 0.5 an 11-unit label would be 5.5px, raised to 9px
		assert!((b.apply(11.0, 0.5) * 0.5 - 9.0).abs() < 1e-12);
		// at zoom 4 it would be 44px, capped at 16px
		assert!((b.apply(11.0, 4.0) * 4.0 - 16.0).abs() < 1e-12);
		assert_eq!(b.apply(11.0, 1.0), 11.0);
	}
}
