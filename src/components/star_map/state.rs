//! Star map state: the node arena plus camera, interaction, and clock.
//!
//! [`StarMapState`] is the single owner of all mutable per-frame state. It is
//! created for each graph payload by the component and mutated by two writers that
//! never run at the same time: pointer handlers (camera, gesture, and the dragged
//! star's position) and [`StarMapState::tick`] (every other star's position).

use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;

use log::{debug, info};

use super::camera::{Camera, CameraConfig, CameraTransition};
use super::entrance::EntranceConfig;
use super::interaction::{InteractionConfig, InteractionController, InteractionEvent};
use super::layout::{self, LayoutConfig};
use super::physics::{self, DragPin, PhysicsConfig, StepInput};
use super::scale::ScaleConfig;
use super::theme::{Color, Theme};
use super::types::{GraphData, MovieNode};
use super::vibe::vibe_color;

/// Outer glow reaches this many core radii.
pub const GLOW_SPREAD: f64 = 6.0;
/// Physics runs at a fixed 60 steps per second regardless of display rate.
const PHYSICS_STEP: f64 = 1.0 / 60.0;
/// Catch-up cap after a stall (tab switch, breakpoint).
const MAX_STEPS_PER_FRAME: usize = 4;

/// One star: the movie it stands for plus layout-owned motion and looks.
#[derive(Clone, Debug)]
pub struct StarNode {
	/// Payload node this star draws.
	pub movie: MovieNode,
	/// Current position in world units.
	pub x: f64,
	/// Current position in world units.
	pub y: f64,
	/// Rest position from layout. Fixed for the lifetime of the payload.
	pub home_x: f64,
	/// Rest position from layout.
	pub home_y: f64,
	/// Velocity in world units per physics step.
	pub vx: f64,
	/// Velocity in world units per physics step.
	pub vy: f64,
	/// Core radius in world units.
	pub radius: f64,
	/// Glow strength, higher for top recommendations.
	pub glow_intensity: f64,
	/// Random phase so stars do not pulse in unison.
	pub pulse_phase: f64,
	/// Seconds after payload arrival at which this star ignites.
	pub appear_at: f64,
	/// Set once the entrance time has passed. Only appeared stars move or take hits.
	pub appeared: bool,
	/// Tint from the movie's vibe.
	pub tint: Color,
}

impl StarNode {
	/// Outer glow radius in world units.
	pub fn glow_radius(&self) -> f64 {
		self.radius * GLOW_SPREAD
	}

	/// Size multiplier for the breathing pulse at time `t`.
	pub fn pulse(&self, t: f64) -> f64 {
		(t * 1.5 + self.pulse_phase).sin() * 0.15 + 0.85
	}
}

/// A link whose endpoints both resolved, by arena index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarLink {
	/// Arena index of one end.
	pub source: usize,
	/// Arena index of the other end.
	pub target: usize,
	/// Relatedness in (0, 1].
	pub strength: f64,
}

/// Stars in layout order, addressable by movie id.
#[derive(Clone, Debug, Default)]
pub struct StarArena {
	nodes: Vec<StarNode>,
	index: HashMap<String, usize>,
	links: Vec<StarLink>,
}

impl StarArena {
	/// Lays out `data` in a `width`×`height` viewport and resolves its links.
	///
	/// Links with an unknown endpoint, and repeated node ids after the first, are
	/// dropped without error.
	pub fn build(
		data: &GraphData,
		width: f64,
		height: f64,
		layout_config: &LayoutConfig,
		entrance: &EntranceConfig,
		random: &mut dyn FnMut() -> f64,
	) -> Self {
		let mut seen = HashSet::new();
		let movies: Vec<MovieNode> = data
			.nodes
			.iter()
			.filter(|n| {
				let fresh = seen.insert(n.id.as_str());
				if !fresh {
					debug!("starmap: dropping duplicate node id {:?}", n.id);
				}
				fresh
			})
			.cloned()
			.collect();

		let mut rng = || random();
		let placements = layout::layout(&movies, width, height, layout_config, &mut rng);

		let mut nodes = Vec::with_capacity(placements.len());
		let mut index = HashMap::with_capacity(placements.len());
		for (slot, placed) in placements.into_iter().enumerate() {
			let movie = movies[placed.index].clone();
			let (radius, glow_intensity) = if movie.is_top {
				(4.0 + rng() * 2.0, 0.8)
			} else {
				(2.0 + rng() * 2.5, 0.4 + rng() * 0.3)
			};
			index.insert(movie.id.clone(), slot);
			nodes.push(StarNode {
				tint: vibe_color(movie.vibe.as_deref()),
				movie,
				x: placed.x,
				y: placed.y,
				home_x: placed.x,
				home_y: placed.y,
				vx: 0.0,
				vy: 0.0,
				radius,
				glow_intensity,
				pulse_phase: rng() * TAU,
				appear_at: entrance.appear_at(slot),
				appeared: false,
			});
		}

		let links: Vec<StarLink> = data
			.links
			.iter()
			.filter_map(|link| {
				match (index.get(&link.source), index.get(&link.target)) {
					(Some(&source), Some(&target)) if source != target => Some(StarLink {
						source,
						target,
						strength: link.clamped_strength(),
					}),
					_ => {
						debug!(
							"starmap: dropping link {:?} -> {:?}",
							link.source, link.target
						);
						None
					}
				}
			})
			.collect();

		Self {
			nodes,
			index,
			links,
		}
	}

	/// Stars in layout order.
	pub fn nodes(&self) -> &[StarNode] {
		&self.nodes
	}

	/// Mutable stars, for physics and drags.
	pub fn nodes_mut(&mut self) -> &mut [StarNode] {
		&mut self.nodes
	}

	/// Links between stars that both exist.
	pub fn links(&self) -> &[StarLink] {
		&self.links
	}

	/// Number of stars.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether there are no stars.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Arena index of a movie id.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Star for a movie id.
	pub fn get(&self, id: &str) -> Option<&StarNode> {
		self.index_of(id).and_then(|i| self.nodes.get(i))
	}

	/// Mutable star for a movie id.
	pub fn get_mut(&mut self, id: &str) -> Option<&mut StarNode> {
		self.index_of(id).and_then(|i| self.nodes.get_mut(i))
	}

	/// Flags stars whose scheduled time has passed.
	pub fn update_appearance(&mut self, elapsed: f64) {
		for node in &mut self.nodes {
			if !node.appeared && elapsed >= node.appear_at {
				node.appeared = true;
			}
		}
	}
}

/// All tunables, grouped.
#[derive(Clone, Debug, Default)]
pub struct StarMapConfig {
	/// Home position placement.
	pub layout: LayoutConfig,
	/// Per-frame forces.
	pub physics: PhysicsConfig,
	/// Zoom limits and focus transitions.
	pub camera: CameraConfig,
	/// Click threshold and hit sizes.
	pub interaction: InteractionConfig,
	/// Ignition timing.
	pub entrance: EntranceConfig,
	/// Zoom-dependent label, link, and ring sizes.
	pub scale: ScaleConfig,
	/// Colors.
	pub theme: Theme,
}

/// Random source in `[0, 1)`.
pub type RandomSource = Box<dyn FnMut() -> f64>;

/// Everything one star map needs between frames.
pub struct StarMapState {
	/// Tunables this map was created with.
	pub config: StarMapConfig,
	/// Current payload, as received.
	pub data: GraphData,
	/// Laid-out stars. Empty until the viewport has an area.
	pub arena: StarArena,
	/// Current pan and zoom.
	pub camera: Camera,
	/// Pointer sessions, hover, and selection.
	pub controller: InteractionController,
	/// Viewport size in CSS pixels.
	pub width: f64,
	/// Viewport height in CSS pixels.
	pub height: f64,
	/// Seconds since the current payload arrived.
	pub elapsed: f64,
	transition: Option<CameraTransition>,
	physics_backlog: f64,
	laid_out: bool,
	random: RandomSource,
}

impl StarMapState {
	/// State for `data` in a `width` × `height` viewport. `random` feeds layout jitter and star looks.
	pub fn new(
		data: GraphData,
		width: f64,
		height: f64,
		config: StarMapConfig,
		random: RandomSource,
	) -> Self {
		let controller = InteractionController::new(config.interaction.clone());
		let mut state = Self {
			config,
			data: GraphData::default(),
			arena: StarArena::default(),
			camera: Camera::default(),
			controller,
			width,
			height,
			elapsed: 0.0,
			transition: None,
			physics_backlog: 0.0,
			laid_out: false,
			random,
		};
		state.replace_graph(data);
		state
	}

	/// Swaps in a new payload: full re-layout, clock and camera reset, any drag in
	/// progress abandoned. Returns hover/selection changes for the host.
	pub fn replace_graph(&mut self, data: GraphData) -> Vec<InteractionEvent> {
		self.data = data;
		self.elapsed = 0.0;
		self.physics_backlog = 0.0;
		self.camera = Camera::default();
		self.transition = None;
		self.arena = StarArena::default();
		self.laid_out = false;
		self.layout_if_ready();
		let nodes = &self.data.nodes;
		self.controller
			.reset_for_graph(|id| nodes.iter().any(|n| n.id == id))
	}

	fn layout_if_ready(&mut self) {
		if self.laid_out || !self.has_area() {
			return;
		}
		self.arena = StarArena::build(
			&self.data,
			self.width,
			self.height,
			&self.config.layout,
			&self.config.entrance,
			&mut *self.random,
		);
		self.laid_out = true;
		info!(
			"starmap: laid out {} stars, {} links",
			self.arena.len(),
			self.arena.links().len()
		);
	}

	/// Updates the viewport. A payload that arrived while the viewport had no area
	/// is laid out on the first resize that gives it one.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.layout_if_ready();
	}

	/// Whether the viewport can be laid out and drawn.
	pub fn has_area(&self) -> bool {
		self.width > 0.0 && self.height > 0.0
	}

	/// Whether layout has run for the current payload.
	pub fn is_laid_out(&self) -> bool {
		self.laid_out
	}

	/// Advances the clock by `dt` seconds: entrance flags, camera transition, and
	/// as many fixed physics steps as the elapsed time calls for.
	pub fn tick(&mut self, dt: f64) {
		if !self.has_area() {
			return;
		}
		let dt = dt.clamp(0.0, 0.25);
		self.elapsed += dt;
		self.arena.update_appearance(self.elapsed);

		if let Some(transition) = self.transition.as_mut() {
			let (camera, done) = transition.advance(dt);
			self.camera = camera;
			if done {
				self.transition = None;
			}
		}

		self.physics_backlog += dt;
		let mut steps = 0;
		while self.physics_backlog >= PHYSICS_STEP {
			if steps == MAX_STEPS_PER_FRAME {
				self.physics_backlog = 0.0;
				break;
			}
			self.physics_step();
			self.physics_backlog -= PHYSICS_STEP;
			steps += 1;
		}
	}

	/// One physics step using the controller's current pointer and drag.
	pub fn physics_step(&mut self) {
		let pointer = self
			.controller
			.pointer()
			.map(|(sx, sy)| self.camera.screen_to_world(sx, sy));
		let drag = self
			.controller
			.dragged_index(&self.arena)
			.zip(pointer)
			.map(|(index, (x, y))| DragPin { index, x, y });
		let input = StepInput {
			pointer,
			drag,
			zoom: self.camera.zoom,
		};
		physics::step(self.arena.nodes_mut(), &input, &self.config.physics);
	}

	/// Eases the camera to center the star `id`. Unknown ids are ignored.
	pub fn focus_on(&mut self, id: &str) {
		let Some(node) = self.arena.get(id) else {
			return;
		};
		let cfg = &self.config.camera;
		let zoom = cfg.focus_zoom.clamp(cfg.min_zoom, cfg.max_zoom);
		self.transition = Some(CameraTransition::focus(
			&self.camera,
			node.home_x,
			node.home_y,
			zoom,
			self.width,
			self.height,
			cfg.focus_duration,
		));
	}

	/// Drops any running camera transition; direct camera input takes over.
	pub fn cancel_transition(&mut self) {
		self.transition = None;
	}

	/// Whether a focus transition is still easing.
	pub fn is_transitioning(&self) -> bool {
		self.transition.is_some()
	}

	/// Host-driven selection. Focuses the camera on a newly selected star.
	pub fn set_selected(&mut self, id: Option<String>) {
		if self.controller.state().selected == id {
			return;
		}
		if let Some(id) = id.as_deref() {
			self.focus_on(id);
		}
		self.controller.set_selected(id);
	}

	/// Host-driven hover.
	pub fn set_hovered(&mut self, id: Option<String>) {
		self.controller.set_hovered(id);
	}

	/// Pointer input in canvas CSS pixels. Direct input cancels a focus transition.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		self.cancel_transition();
		self.controller
			.pointer_down(sx, sy, &self.arena, &self.camera);
	}

	/// Pointer moved; returns a hover change, if any.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) -> Option<InteractionEvent> {
		self.controller
			.pointer_move(sx, sy, &mut self.arena, &mut self.camera)
	}

	/// Pointer released; returns a click when the press did not travel.
	pub fn pointer_up(&mut self, sx: f64, sy: f64) -> Vec<InteractionEvent> {
		self.controller.pointer_up(sx, sy, &self.arena, &self.camera)
	}

	/// Pointer left the canvas; ends the session and clears hover.
	pub fn pointer_leave(&mut self) -> Option<InteractionEvent> {
		self.controller.pointer_leave()
	}

	/// Wheel zoom anchored at the cursor.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64) {
		self.cancel_transition();
		self.controller
			.wheel(sx, sy, delta_y, &mut self.camera, &self.config.camera);
	}

	/// Touch input, one point per active finger.
	pub fn touch_start(&mut self, touches: &[(f64, f64)]) {
		self.cancel_transition();
		self.controller
			.touch_start(touches, &self.arena, &self.camera);
	}

	/// Fingers moved.
	pub fn touch_move(&mut self, touches: &[(f64, f64)]) -> Option<InteractionEvent> {
		self.controller.touch_move(
			touches,
			&mut self.arena,
			&mut self.camera,
			&self.config.camera,
		)
	}

	/// Fingers lifted; `remaining` are still down.
	pub fn touch_end(&mut self, remaining: &[(f64, f64)]) -> Vec<InteractionEvent> {
		self.controller
			.touch_end(remaining, &self.arena, &self.camera)
	}

	/// CSS cursor for the current interaction.
	pub fn cursor(&self) -> &'static str {
		self.controller.cursor()
	}
}

#[cfg(test)]
pub(crate) mod test_support {
	use super::*;
	use crate::components::star_map::types::MovieLink;

	/// An appeared star resting at `(x, y)`.
	pub fn star_at(x: f64, y: f64) -> StarNode {
		StarNode {
			movie: MovieNode {
				id: format!("{x},{y}"),
				title: "Star".into(),
				title_localized: None,
				year: None,
				is_top: false,
				vibe: None,
				poster: None,
			},
			x,
			y,
			home_x: x,
			home_y: y,
			vx: 0.0,
			vy: 0.0,
			radius: 3.0,
			glow_intensity: 0.5,
			pulse_phase: 0.0,
			appear_at: 0.0,
			appeared: true,
			tint: Color::rgb(255, 255, 255),
		}
	}

	pub fn movie(id: &str, is_top: bool) -> MovieNode {
		MovieNode {
			id: id.into(),
			title: id.to_uppercase(),
			title_localized: None,
			year: Some(2000),
			is_top,
			vibe: None,
			poster: None,
		}
	}

	pub fn link(source: &str, target: &str) -> MovieLink {
		MovieLink {
			source: source.into(),
			target: target.into(),
			strength: 0.5,
		}
	}

	/// Cycles through [0, 1) deterministically.
	pub fn sequence() -> RandomSource {
		let mut state = 0.0_f64;
		Box::new(move || {
			state = (state + 0.618_033_988_75) % 1.0;
			state
		})
	}

	pub fn graph(ids: &[(&str, bool)], links: &[(&str, &str)]) -> GraphData {
		GraphData {
			nodes: ids.iter().map(|&(id, top)| movie(id, top)).collect(),
			links: links.iter().map(|&(s, t)| link(s, t)).collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::test_support::*;
	use super::*;

	fn state_for(data: GraphData) -> StarMapState {
		StarMapState::new(data, 800.0, 600.0, StarMapConfig::default(), sequence())
	}

	#[test]
	fn links_to_unknown_nodes_are_dropped() {
		let data = graph(
			&[("a", true), ("b", false), ("c", false)],
			&[("a", "b"), ("b", "ghost"), ("ghost", "c"), ("c", "a")],
		);
		let state = state_for(data);
		assert_eq!(state.arena.len(), 3);
		assert_eq!(state.arena.links().len(), 2);
		for id in ["a", "b", "c"] {
			assert!(state.arena.get(id).is_some());
		}
	}

	#[test]
	fn duplicate_ids_keep_first() {
		let mut data = graph(&[("a", true), ("b", false)], &[]);
		let mut dup = movie("a", false);
		dup.title = "Impostor".into();
		data.nodes.push(dup);
		let state = state_for(data);
		assert_eq!(state.arena.len(), 2);
		assert_eq!(state.arena.get("a").unwrap().movie.title, "A");
	}

	#[test]
	fn empty_graph_is_fine() {
		let mut state = state_for(GraphData::default());
		assert!(state.arena.is_empty());
		state.tick(0.016);
		assert!(state.pointer_move(10.0, 10.0).is_none());
	}

	#[test]
	fn arena_is_in_layout_order_with_stagger() {
		let state = state_for(graph(&[("s1", false), ("t1", true), ("s2", false)], &[]));
		let ids: Vec<&str> = state.arena.nodes().iter().map(|n| n.movie.id.as_str()).collect();
		assert_eq!(ids, ["t1", "s1", "s2"]);
		let times: Vec<f64> = state.arena.nodes().iter().map(|n| n.appear_at).collect();
		assert!(times.windows(2).all(|w| w[0] < w[1]));
	}

	#[test]
	fn stars_appear_on_schedule() {
		let mut state = state_for(graph(&[("a", true), ("b", false)], &[]));
		assert!(state.arena.nodes().iter().all(|n| !n.appeared));
		let first = state.arena.nodes()[0].appear_at;
		let second = state.arena.nodes()[1].appear_at;
		state.tick(first + (second - first) / 2.0);
		assert!(state.arena.nodes()[0].appeared);
		assert!(!state.arena.nodes()[1].appeared);
	}

	#[test]
	fn zero_area_defers_layout_until_resize() {
		let mut state = StarMapState::new(
			graph(&[("a", true)], &[]),
			0.0,
			0.0,
			StarMapConfig::default(),
			sequence(),
		);
		assert!(!state.is_laid_out());
		state.tick(1.0);
		assert_eq!(state.elapsed, 0.0);

		state.resize(800.0, 600.0);
		assert!(state.is_laid_out());
		let home = (state.arena.nodes()[0].home_x, state.arena.nodes()[0].home_y);
		state.resize(1000.0, 900.0);
		let after = (state.arena.nodes()[0].home_x, state.arena.nodes()[0].home_y);
		assert_eq!(home, after);
	}

	#[test]
	fn replacing_graph_resets_clock_and_camera() {
		let mut state = state_for(graph(&[("a", true)], &[]));
		state.tick(2.0);
		state.wheel(100.0, 100.0, -1.0);
		assert!(state.camera.zoom > 1.0);

		state.replace_graph(graph(&[("x", true), ("y", false)], &[]));
		assert_eq!(state.elapsed, 0.0);
		assert_eq!(state.camera, Camera::default());
		assert!(state.arena.nodes().iter().all(|n| !n.appeared && n.vx == 0.0));
		assert!(state.arena.get("a").is_none());
	}

	#[test]
	fn swapping_out_the_selected_star_clears_selection() {
		let mut state = state_for(graph(&[("a", true), ("b", false)], &[]));
		state.set_selected(Some("a".into()));

		let events = state.replace_graph(graph(&[("a", true), ("c", false)], &[]));
		assert!(events.is_empty());
		assert_eq!(state.controller.state().selected.as_deref(), Some("a"));

		let events = state.replace_graph(graph(&[("x", true)], &[]));
		assert_eq!(events, vec![InteractionEvent::NodeClick(None)]);
		assert_eq!(state.controller.state().selected, None);
	}

	#[test]
	fn selection_survives_payload_that_arrives_before_layout() {
		let mut state = StarMapState::new(
			graph(&[("a", true)], &[]),
			0.0,
			0.0,
			StarMapConfig::default(),
			sequence(),
		);
		state.set_selected(Some("a".into()));
		let events = state.replace_graph(graph(&[("a", true), ("b", false)], &[]));
		assert!(events.is_empty());
		assert_eq!(state.controller.state().selected.as_deref(), Some("a"));
	}

	#[test]
	fn focus_transition_centers_selected_star() {
		let mut state = state_for(graph(&[("a", true), ("b", false), ("c", false)], &[]));
		state.set_selected(Some("b".into()));
		assert!(state.is_transitioning());
		for _ in 0..120 {
			state.tick(1.0 / 60.0);
		}
		assert!(!state.is_transitioning());
		let b = state.arena.get("b").unwrap();
		let (sx, sy) = state.camera.world_to_screen(b.home_x, b.home_y);
		assert!((sx - 400.0).abs() < 1e-6 && (sy - 300.0).abs() < 1e-6);
	}

	#[test]
	fn wheel_cancels_focus_transition() {
		let mut state = state_for(graph(&[("a", true), ("b", false)], &[]));
		state.set_selected(Some("b".into()));
		state.wheel(10.0, 10.0, 1.0);
		assert!(!state.is_transitioning());
	}
}
