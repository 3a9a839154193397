//! Faint drifting dust behind the stars.
//!
//! Lives in screen space so panning and zooming never move it; only its own slow
//! drift does.

use std::f64::consts::TAU;

use super::theme::DustStyle;

/// Margin past the viewport edge before a mote wraps to the other side.
const WRAP_MARGIN: f64 = 10.0;

/// One mote of dust.
#[derive(Clone, Debug)]
pub struct Mote {
	/// Screen position.
	pub x: f64,
	/// Screen position.
	pub y: f64,
	/// Drift per frame at 60fps.
	pub vx: f64,
	/// Drift per frame at 60fps.
	pub vy: f64,
	/// Radius in pixels.
	pub size: f64,
	/// Peak opacity before twinkle.
	pub alpha: f64,
	/// Twinkle phase in radians.
	pub phase: f64,
}

/// The dust field for one viewport.
#[derive(Clone, Debug)]
pub struct DustField {
	motes: Vec<Mote>,
	width: f64,
	height: f64,
}

/// Repeatable hash of `seed` into `[0, 1)`, so the field looks the same on every
/// payload and every reload.
fn scatter(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

impl DustField {
	/// Scatters motes over a `width` × `height` viewport. Empty when the style is disabled.
	pub fn new(style: &DustStyle, width: f64, height: f64) -> Self {
		let count = if style.enabled { style.count } else { 0 };
		let motes = (0..count)
			.map(|i| {
				let seed = i as f64 + 1.0;
				let angle = scatter(seed * 3.7) * TAU;
				let speed = style.speed * (0.5 + scatter(seed * 4.1) * 0.5);
				Mote {
					x: scatter(seed * 1.1) * width,
					y: scatter(seed * 2.3) * height,
					vx: angle.cos() * speed,
					vy: angle.sin() * speed,
					size: style.size_min + scatter(seed * 5.3) * (style.size_max - style.size_min),
					alpha: style.opacity * (0.3 + scatter(seed * 6.7) * 0.7),
					phase: scatter(seed * 7.9) * TAU,
				}
			})
			.collect();
		Self {
			motes,
			width,
			height,
		}
	}

	/// Motes to draw this frame.
	pub fn motes(&self) -> &[Mote] {
		&self.motes
	}

	/// Drifts every mote by `dt` seconds, wrapping at the viewport edges.
	pub fn update(&mut self, dt: f64) {
		let (w, h) = (self.width, self.height);
		for m in &mut self.motes {
			m.x += m.vx * dt * 60.0;
			m.y += m.vy * dt * 60.0;
			m.phase = (m.phase + dt * 2.0) % TAU;

			if m.x < -WRAP_MARGIN {
				m.x = w + WRAP_MARGIN;
			} else if m.x > w + WRAP_MARGIN {
				m.x = -WRAP_MARGIN;
			}
			if m.y < -WRAP_MARGIN {
				m.y = h + WRAP_MARGIN;
			} else if m.y > h + WRAP_MARGIN {
				m.y = -WRAP_MARGIN;
			}
		}
	}

	/// Rescales positions into a new viewport.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.width > 0.0 && self.height > 0.0 {
			let (sx, sy) = (width / self.width, height / self.height);
			for m in &mut self.motes {
				m.x *= sx;
				m.y *= sy;
			}
		} else {
			// Field was seeded into nothing; scatter it again.
			for (i, m) in self.motes.iter_mut().enumerate() {
				let seed = i as f64 + 1.0;
				m.x = scatter(seed * 1.1) * width;
				m.y = scatter(seed * 2.3) * height;
			}
		}
		self.width = width;
		self.height = height;
	}

	/// Alpha of `mote` at time `t`, oscillating between 60% and 100% of its base.
	pub fn twinkle_alpha(mote: &Mote, t: f64) -> f64 {
		let twinkle = ((t * 1.5 + mote.phase).sin() * 0.5 + 0.5) * 0.4 + 0.6;
		mote.alpha * twinkle
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::star_map::theme::Theme;

	fn field() -> DustField {
		DustField::new(&Theme::night_sky().dust, 400.0, 300.0)
	}

	#[test]
	fn seeded_inside_viewport() {
		let f = field();
		assert_eq!(f.motes().len(), Theme::night_sky().dust.count);
		for m in f.motes() {
			assert!((0.0..=400.0).contains(&m.x));
			assert!((0.0..=300.0).contains(&m.y));
		}
	}

	#[test]
	fn layout_is_repeatable() {
		let (a, b) = (field(), field());
		for (m, n) in a.motes().iter().zip(b.motes()) {
			assert_eq!((m.x, m.y, m.size), (n.x, n.y, n.size));
		}
	}

	#[test]
	fn disabled_style_is_empty() {
		let f = DustField::new(&Theme::still().dust, 400.0, 300.0);
		assert!(f.motes().is_empty());
	}

	#[test]
	fn motes_wrap_and_stay_near_viewport() {
		let mut f = field();
		for _ in 0..20_000 {
			f.update(1.0 / 60.0);
		}
		for m in f.motes() {
			assert!(m.x >= -WRAP_MARGIN - 1.0 && m.x <= 400.0 + WRAP_MARGIN + 1.0);
			assert!(m.y >= -WRAP_MARGIN - 1.0 && m.y <= 300.0 + WRAP_MARGIN + 1.0);
		}
	}

	#[test]
	fn resize_scales_positions() {
		let mut f = field();
		let before: Vec<(f64, f64)> = f.motes().iter().map(|m| (m.x, m.y)).collect();
		f.resize(800.0, 150.0);
		for (m, (x, y)) in f.motes().iter().zip(before) {
			assert!((m.x - x * 2.0).abs() < 1e-9);
			assert!((m.y - y * 0.5).abs() < 1e-9);
		}
	}

	#[test]
	fn resize_from_empty_viewport_rescatters() {
		let mut f = DustField::new(&Theme::night_sky().dust, 0.0, 0.0);
		f.resize(400.0, 300.0);
		assert!(f.motes().iter().any(|m| m.x > 1.0 && m.y > 1.0));
	}

	#[test]
	fn twinkle_stays_within_band() {
		let f = field();
		let m = &f.motes()[0];
		for step in 0..100 {
			let a = DustField::twinkle_alpha(m, step as f64 * 0.1);
			assert!(a >= m.alpha * 0.6 - 1e-12 && a <= m.alpha + 1e-12);
		}
	}
}
