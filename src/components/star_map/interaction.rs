//! Pointer and touch handling.
//!
//! One [`Gesture`] per pointer session: `Idle → PotentialDrag | Panning → Idle`,
//! plus `Pinching` for two-finger touch. Handlers mutate the camera and the dragged
//! star directly and report hover/selection changes as [`InteractionEvent`]s for
//! the host.

use super::camera::{Camera, CameraConfig};
use super::state::StarArena;

/// Interaction tunables. Distances are screen pixels.
#[derive(Clone, Debug)]
pub struct InteractionConfig {
	/// Pointer travel below this is a click, at or above it a drag.
	pub click_threshold: f64,
	/// Hit radius as a multiple of a star's projected glow radius.
	pub hit_multiplier: f64,
	/// Smallest hit radius, so tiny stars stay clickable when zoomed out.
	pub min_hit_radius: f64,
}

impl Default for InteractionConfig {
	fn default() -> Self {
		Self {
			click_threshold: 8.0,
			hit_multiplier: 0.6,
			min_hit_radius: 10.0,
		}
	}
}

/// Current pointer session.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Gesture {
	/// No button or finger down.
	#[default]
	Idle,
	/// A star was hit on pointer-down and follows the pointer.
	PotentialDrag {
		/// Movie id of the star being dragged.
		node_id: String,
		/// Screen point of the press.
		down: (f64, f64),
		/// Farthest distance from `down` so far.
		travel: f64,
	},
	/// The background was hit on pointer-down; moves pan the camera.
	Panning {
		/// Screen point of the press.
		down: (f64, f64),
		/// Previous pointer position.
		last: (f64, f64),
		/// Farthest distance from `down` so far.
		travel: f64,
	},
	/// Two fingers down; spreading or pinching zooms about their midpoint.
	Pinching {
		/// Finger spread at the previous frame.
		distance: f64,
		/// Point between the fingers at the previous frame.
		midpoint: (f64, f64),
	},
}

/// Change the host should hear about.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	/// A star (or, with `None`, the background) was clicked.
	NodeClick(Option<String>),
	/// The star under the pointer changed.
	NodeHover(Option<String>),
}

/// Hover, selection, and drag, by movie id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	/// Star under the pointer.
	pub hovered: Option<String>,
	/// Star the host or a click selected.
	pub selected: Option<String>,
	/// Star held by the current drag.
	pub dragged: Option<String>,
}

/// First appeared star whose hit circle contains screen point `(sx, sy)`.
pub fn hit_test(
	arena: &StarArena,
	camera: &Camera,
	config: &InteractionConfig,
	sx: f64,
	sy: f64,
) -> Option<usize> {
	arena.nodes().iter().position(|node| {
		if !node.appeared {
			return false;
		}
		let (px, py) = camera.world_to_screen(node.x, node.y);
		let reach =
			(node.glow_radius() * camera.zoom * config.hit_multiplier).max(config.min_hit_radius);
		let (dx, dy) = (sx - px, sy - py);
		dx * dx + dy * dy <= reach * reach
	})
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
	((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

fn midpoint(a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
	((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

/// Turns raw input into camera moves, drags, and host events.
#[derive(Clone, Debug)]
pub struct InteractionController {
	config: InteractionConfig,
	gesture: Gesture,
	state: InteractionState,
	/// Last known pointer position in screen space, while over the canvas.
	pointer: Option<(f64, f64)>,
}

impl InteractionController {
	/// Idle controller with nothing hovered or selected.
	pub fn new(config: InteractionConfig) -> Self {
		Self {
			config,
			gesture: Gesture::Idle,
			state: InteractionState::default(),
			pointer: None,
		}
	}

	/// Hover, selection, and drag.
	pub fn state(&self) -> &InteractionState {
		&self.state
	}

	/// The pointer session in progress.
	pub fn gesture(&self) -> &Gesture {
		&self.gesture
	}

	/// Last pointer position, if the pointer is over the canvas.
	pub fn pointer(&self) -> Option<(f64, f64)> {
		self.pointer
	}

	/// Arena index of the star being dragged, if it still exists.
	pub fn dragged_index(&self, arena: &StarArena) -> Option<usize> {
		self.state
			.dragged
			.as_deref()
			.and_then(|id| arena.index_of(id))
	}

	/// Replaces the selection without emitting an event.
	pub fn set_selected(&mut self, id: Option<String>) {
		self.state.selected = id;
	}

	/// Replaces the hover without emitting an event.
	pub fn set_hovered(&mut self, id: Option<String>) {
		self.state.hovered = id;
	}

	fn update_hover(&mut self, hovered: Option<String>) -> Option<InteractionEvent> {
		if self.state.hovered == hovered {
			return None;
		}
		self.state.hovered = hovered.clone();
		Some(InteractionEvent::NodeHover(hovered))
	}

	fn end_session(&mut self) {
		self.gesture = Gesture::Idle;
		self.state.dragged = None;
	}

	/// Starts a drag on a star, or a pan on the background.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, arena: &StarArena, camera: &Camera) {
		self.pointer = Some((sx, sy));
		let hit = hit_test(arena, camera, &self.config, sx, sy)
			.and_then(|i| arena.nodes().get(i))
			.map(|node| node.movie.id.clone());
		self.gesture = match hit {
			Some(node_id) => {
				self.state.dragged = Some(node_id.clone());
				Gesture::PotentialDrag {
					node_id,
					down: (sx, sy),
					travel: 0.0,
				}
			}
			None => {
				self.state.dragged = None;
				Gesture::Panning {
					down: (sx, sy),
					last: (sx, sy),
					travel: 0.0,
				}
			}
		};
	}

	/// Drags, pans, or updates hover depending on the session.
	pub fn pointer_move(
		&mut self,
		sx: f64,
		sy: f64,
		arena: &mut StarArena,
		camera: &mut Camera,
	) -> Option<InteractionEvent> {
		self.pointer = Some((sx, sy));
		match &mut self.gesture {
			Gesture::Idle => {
				let hovered = hit_test(arena, camera, &self.config, sx, sy)
					.and_then(|i| arena.nodes().get(i))
					.map(|node| node.movie.id.clone());
				self.update_hover(hovered)
			}
			Gesture::Panning { down, last, travel } => {
				camera.pan_by(sx - last.0, sy - last.1);
				*last = (sx, sy);
				*travel = travel.max(distance(*down, (sx, sy)));
				None
			}
			Gesture::PotentialDrag {
				node_id,
				down,
				travel,
			} => {
				*travel = travel.max(distance(*down, (sx, sy)));
				let (wx, wy) = camera.screen_to_world(sx, sy);
				match arena.get_mut(node_id) {
					Some(node) => {
						node.x = wx;
						node.y = wy;
						node.vx = 0.0;
						node.vy = 0.0;
					}
					// The payload changed under the drag.
					None => self.end_session(),
				}
				None
			}
			Gesture::Pinching { .. } => None,
		}
	}

	/// Ends the session. A short press on a star selects it; a short press on the
	/// background clears the selection; anything longer is a finished drag or pan.
	pub fn pointer_up(
		&mut self,
		sx: f64,
		sy: f64,
		arena: &StarArena,
		camera: &Camera,
	) -> Vec<InteractionEvent> {
		let mut events = Vec::new();
		let gesture = std::mem::take(&mut self.gesture);
		self.state.dragged = None;

		match gesture {
			Gesture::PotentialDrag {
				node_id,
				down,
				travel,
			} => {
				let travel = travel.max(distance(down, (sx, sy)));
				if travel < self.config.click_threshold && arena.index_of(&node_id).is_some() {
					self.state.selected = Some(node_id.clone());
					events.push(InteractionEvent::NodeClick(Some(node_id)));
				}
			}
			Gesture::Panning { down, travel, .. } => {
				let travel = travel.max(distance(down, (sx, sy)));
				if travel < self.config.click_threshold {
					self.state.selected = None;
					events.push(InteractionEvent::NodeClick(None));
				}
			}
			Gesture::Pinching { .. } | Gesture::Idle => {}
		}

		let hovered = hit_test(arena, camera, &self.config, sx, sy)
			.and_then(|i| arena.nodes().get(i))
			.map(|node| node.movie.id.clone());
		events.extend(self.update_hover(hovered));
		events
	}

	/// Pointer left the canvas: everything transient is dropped.
	pub fn pointer_leave(&mut self) -> Option<InteractionEvent> {
		self.end_session();
		self.pointer = None;
		self.update_hover(None)
	}

	/// Wheel notch: negative `delta_y` zooms in, positive zooms out.
	pub fn wheel(
		&mut self,
		sx: f64,
		sy: f64,
		delta_y: f64,
		camera: &mut Camera,
		config: &CameraConfig,
	) {
		if delta_y == 0.0 || !delta_y.is_finite() {
			return;
		}
		let factor = if delta_y < 0.0 {
			config.wheel_factor
		} else {
			1.0 / config.wheel_factor
		};
		camera.zoom_at(sx, sy, factor, config);
	}

	/// One finger acts like a mouse button; two start a pinch.
	pub fn touch_start(&mut self, touches: &[(f64, f64)], arena: &StarArena, camera: &Camera) {
		match touches {
			[] => {}
			[single] => self.pointer_down(single.0, single.1, arena, camera),
			[a, b, ..] => {
				// A second finger turns whatever was happening into a pinch.
				self.end_session();
				self.pointer = None;
				self.gesture = Gesture::Pinching {
					distance: distance(*a, *b),
					midpoint: midpoint(*a, *b),
				};
			}
		}
	}

	/// One finger moves like a mouse; two fingers pinch-zoom and pan.
	pub fn touch_move(
		&mut self,
		touches: &[(f64, f64)],
		arena: &mut StarArena,
		camera: &mut Camera,
		config: &CameraConfig,
	) -> Option<InteractionEvent> {
		match touches {
			[] => None,
			[single] => {
				if matches!(self.gesture, Gesture::Pinching { .. }) {
					return None;
				}
				self.pointer_move(single.0, single.1, arena, camera)
			}
			[a, b, ..] => {
				let (new_distance, new_mid) = (distance(*a, *b), midpoint(*a, *b));
				if let Gesture::Pinching { distance, midpoint } = &mut self.gesture {
					if *distance > 0.0 && new_distance > 0.0 {
						camera.zoom_at(new_mid.0, new_mid.1, new_distance / *distance, config);
					}
					camera.pan_by(new_mid.0 - midpoint.0, new_mid.1 - midpoint.1);
					*distance = new_distance;
					*midpoint = new_mid;
				} else {
					self.end_session();
					self.gesture = Gesture::Pinching {
						distance: new_distance,
						midpoint: new_mid,
					};
				}
				None
			}
		}
	}

	/// Fingers lifted. `remaining` lists the touches still down.
	pub fn touch_end(
		&mut self,
		remaining: &[(f64, f64)],
		arena: &StarArena,
		camera: &Camera,
	) -> Vec<InteractionEvent> {
		match remaining {
			[] => {
				let pinching = matches!(self.gesture, Gesture::Pinching { .. });
				let mut events = match self.pointer {
					Some((x, y)) if !pinching => self.pointer_up(x, y, arena, camera),
					_ => {
						self.end_session();
						Vec::new()
					}
				};
				// Touch has no hover; a lifted finger leaves nothing under it.
				self.pointer = None;
				events.extend(self.update_hover(None));
				events
			}
			[single] => {
				if matches!(self.gesture, Gesture::Pinching { .. }) {
					// Continue as a pan that can no longer become a click.
					self.pointer = Some(*single);
					self.gesture = Gesture::Panning {
						down: *single,
						last: *single,
						travel: f64::INFINITY,
					};
				}
				Vec::new()
			}
			_ => Vec::new(),
		}
	}

	/// Forgets all per-session state for a new payload. The selection survives if
	/// `contains` still knows the selected id; otherwise it is cleared and reported
	/// as a click on the background.
	pub fn reset_for_graph(&mut self, contains: impl Fn(&str) -> bool) -> Vec<InteractionEvent> {
		let mut events = Vec::new();
		self.end_session();
		if self.state.selected.as_deref().is_some_and(|id| !contains(id)) {
			self.state.selected = None;
			events.push(InteractionEvent::NodeClick(None));
		}
		events.extend(self.update_hover(None));
		events
	}

	/// CSS cursor for the current session.
	pub fn cursor(&self) -> &'static str {
		match self.gesture {
			Gesture::PotentialDrag { .. } | Gesture::Panning { .. } => "grabbing",
			_ if self.state.hovered.is_some() => "pointer",
			_ => "grab",
		}
	}
}
