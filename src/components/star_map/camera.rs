//! Pan/zoom view transform.
//!
//! `screen = world × zoom + offset`. The camera never touches node coordinates;
//! it only changes how they project onto the canvas.

/// Camera limits and gesture steps.
#[derive(Clone, Debug)]
pub struct CameraConfig {
	/// Lower zoom limit.
	pub min_zoom: f64,
	/// Upper zoom limit.
	pub max_zoom: f64,
	/// Zoom multiplier per wheel notch.
	pub wheel_factor: f64,
	/// Zoom used when focusing a selected star.
	pub focus_zoom: f64,
	/// Length of the focus transition, in seconds.
	pub focus_duration: f64,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			min_zoom: 0.3,
			max_zoom: 4.0,
			wheel_factor: 1.1,
			focus_zoom: 1.5,
			focus_duration: 0.8,
		}
	}
}

/// Pan and zoom applied to the whole scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	/// Horizontal translation in screen pixels.
	pub offset_x: f64,
	/// Vertical translation in screen pixels.
	pub offset_y: f64,
	/// Zoom factor (1.0 = 100%), kept within the configured range.
	pub zoom: f64,
}

impl Default for Camera {
	fn default() -> Self {
		Self {
			offset_x: 0.0,
			offset_y: 0.0,
			zoom: 1.0,
		}
	}
}

impl Camera {
	/// Projects a world point onto the canvas.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(
			wx * self.zoom + self.offset_x,
			wy * self.zoom + self.offset_y,
		)
	}

	/// Inverse of [`Camera::world_to_screen`].
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.offset_x) / self.zoom,
			(sy - self.offset_y) / self.zoom,
		)
	}

	/// Shifts the view by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.offset_x += dx;
		self.offset_y += dy;
	}

	/// Multiplies the zoom by `factor`, clamped to the configured range, keeping
	/// the world point under `(sx, sy)` fixed on screen. Returns the new zoom.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, config: &CameraConfig) -> f64 {
		if !(factor.is_finite() && factor > 0.0) {
			return self.zoom;
		}
		let new_zoom = (self.zoom * factor).clamp(config.min_zoom, config.max_zoom);
		let ratio = new_zoom / self.zoom;
		self.offset_x = sx - (sx - self.offset_x) * ratio;
		self.offset_y = sy - (sy - self.offset_y) * ratio;
		self.zoom = new_zoom;
		new_zoom
	}

	/// Camera showing world point `(wx, wy)` at the center of a `width`×`height`
	/// viewport with the given zoom.
	pub fn centered_on(wx: f64, wy: f64, zoom: f64, width: f64, height: f64) -> Self {
		Self {
			offset_x: width / 2.0 - wx * zoom,
			offset_y: height / 2.0 - wy * zoom,
			zoom,
		}
	}
}

fn ease_in_out(t: f64) -> f64 {
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

/// Eased camera move that keeps the viewport center gliding in a straight line
/// while zoom interpolates geometrically.
#[derive(Clone, Debug)]
pub struct CameraTransition {
	from_center: (f64, f64),
	to_center: (f64, f64),
	from_zoom: f64,
	to_zoom: f64,
	width: f64,
	height: f64,
	elapsed: f64,
	duration: f64,
}

impl CameraTransition {
	/// Transition from `from` to centering `(wx, wy)` at `zoom`.
	pub fn focus(
		from: &Camera,
		wx: f64,
		wy: f64,
		zoom: f64,
		width: f64,
		height: f64,
		duration: f64,
	) -> Self {
		Self {
			from_center: from.screen_to_world(width / 2.0, height / 2.0),
			to_center: (wx, wy),
			from_zoom: from.zoom,
			to_zoom: zoom,
			width,
			height,
			elapsed: 0.0,
			duration,
		}
	}

	/// Advances by `dt` seconds. Returns the camera for this instant and whether
	/// the transition has finished.
	pub fn advance(&mut self, dt: f64) -> (Camera, bool) {
		self.elapsed += dt;
		let t = if self.duration > 0.0 {
			(self.elapsed / self.duration).clamp(0.0, 1.0)
		} else {
			1.0
		};
		let e = ease_in_out(t);
		let cx = self.from_center.0 + (self.to_center.0 - self.from_center.0) * e;
		let cy = self.from_center.1 + (self.to_center.1 - self.from_center.1) * e;
		let zoom = self.from_zoom * (self.to_zoom / self.from_zoom).powf(e);
		(
			Camera::centered_on(cx, cy, zoom, self.width, self.height),
			t >= 1.0,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const EPS: f64 = 1e-9;

	#[test]
	fn projection_round_trips() {
		let cam = Camera {
			offset_x: 37.0,
			offset_y: -12.5,
			zoom: 1.75,
		};
		let (sx, sy) = cam.world_to_screen(50.0, 80.0);
		let (wx, wy) = cam.screen_to_world(sx, sy);
		assert!((wx - 50.0).abs() < EPS && (wy - 80.0).abs() < EPS);
	}

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let config = CameraConfig::default();
		let mut cam = Camera::default();
		let cursor = cam.world_to_screen(50.0, 50.0);

		cam.zoom_at(cursor.0, cursor.1, 1.5, &config);
		assert!((cam.zoom - 1.5).abs() < EPS);
		let after = cam.world_to_screen(50.0, 50.0);
		assert!((after.0 - cursor.0).abs() < EPS && (after.1 - cursor.1).abs() < EPS);

		cam.zoom_at(cursor.0, cursor.1, 0.5, &config);
		let after = cam.world_to_screen(50.0, 50.0);
		assert!((after.0 - cursor.0).abs() < EPS && (after.1 - cursor.1).abs() < EPS);
	}

	#[test]
	fn zoom_anchor_holds_off_origin() {
		let config = CameraConfig::default();
		let mut cam = Camera {
			offset_x: 120.0,
			offset_y: -40.0,
			zoom: 0.8,
		};
		let (sx, sy) = (333.0, 217.0);
		let world = cam.screen_to_world(sx, sy);
		cam.zoom_at(sx, sy, 1.1, &config);
		let back = cam.world_to_screen(world.0, world.1);
		assert!((back.0 - sx).abs() < EPS && (back.1 - sy).abs() < EPS);
	}

	#[test]
	fn zoom_is_clamped() {
		let config = CameraConfig::default();
		let mut cam = Camera::default();
		for _ in 0..100 {
			cam.zoom_at(10.0, 10.0, 1.1, &config);
		}
		assert!((cam.zoom - config.max_zoom).abs() < EPS);
		for _ in 0..100 {
			cam.zoom_at(10.0, 10.0, 0.5, &config);
		}
		assert!((cam.zoom - config.min_zoom).abs() < EPS);
	}

	#[test]
	fn degenerate_zoom_factor_is_ignored() {
		let config = CameraConfig::default();
		let mut cam = Camera::default();
		cam.zoom_at(0.0, 0.0, 0.0, &config);
		cam.zoom_at(0.0, 0.0, f64::NAN, &config);
		assert_eq!(cam, Camera::default());
	}

	#[test]
	fn pan_moves_offset_by_screen_delta() {
		let mut cam = Camera {
			zoom: 2.0,
			..Camera::default()
		};
		cam.pan_by(15.0, -5.0);
		assert_eq!((cam.offset_x, cam.offset_y), (15.0, -5.0));
	}

	#[test]
	fn focus_transition_lands_on_target() {
		let from = Camera::default();
		let mut tr = CameraTransition::focus(&from, 100.0, 200.0, 1.5, 800.0, 600.0, 0.8);
		let (mid, done) = tr.advance(0.4);
		assert!(!done);
		assert!(mid.zoom > 1.0 && mid.zoom < 1.5);
		let (end, done) = tr.advance(0.5);
		assert!(done);
		let (sx, sy) = end.world_to_screen(100.0, 200.0);
		assert!((sx - 400.0).abs() < EPS && (sy - 300.0).abs() < EPS);
		assert!((end.zoom - 1.5).abs() < EPS);
	}
}
