//! Per-frame force step.
//!
//! Forces are additive heuristics tuned for smooth motion, not a conserving
//! simulation. What must hold: free stars drift back home, do not stay overlapped,
//! and never diverge.

use super::state::StarNode;

/// Force tunables. Distances are world units, strengths are velocity change per
/// frame.
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
	/// Fraction of the home offset added to velocity each frame.
	pub spring: f64,
	/// Pointer pull reaches this far.
	pub magnet_radius: f64,
	/// Pull at zero distance; falls off quadratically to zero at the radius.
	pub magnet_strength: f64,
	/// Radius of the personal-space bubble around a dragged star.
	pub drag_clearance: f64,
	/// Push at zero distance from the dragged star.
	pub drag_strength: f64,
	/// On-screen separation stars try to keep; divided by zoom.
	pub min_distance: f64,
	/// Fraction of the overlap converted into velocity per frame.
	pub repulsion: f64,
	/// Velocity multiplier per frame, below 1.
	pub damping: f64,
	/// Speed cap per frame.
	pub max_speed: f64,
}

impl Default for PhysicsConfig {
	fn default() -> Self {
		Self {
			spring: 0.02,
			magnet_radius: 140.0,
			magnet_strength: 0.25,
			drag_clearance: 120.0,
			drag_strength: 2.0,
			min_distance: 60.0,
			repulsion: 0.03,
			damping: 0.88,
			max_speed: 10.0,
		}
	}
}

/// The star pinned under the pointer for this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragPin {
	/// Arena index of the dragged star.
	pub index: usize,
	/// Pointer position in world space.
	pub x: f64,
	/// Pointer position in world space.
	pub y: f64,
}

/// Everything outside the node list that shapes one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepInput {
	/// Pointer in world space, when it is over the canvas.
	pub pointer: Option<(f64, f64)>,
	/// Star under an active drag.
	pub drag: Option<DragPin>,
	/// Camera zoom; the on-screen separation is divided by it.
	pub zoom: f64,
}

/// Advances every appeared star by one frame.
///
/// The dragged star is written straight from the pointer and skips all forces;
/// every other appeared star is moved only by this function.
pub fn step(nodes: &mut [StarNode], input: &StepInput, config: &PhysicsConfig) {
	let dragged = input.drag.map(|pin| pin.index);
	let free = |i: usize, n: &StarNode| n.appeared && Some(i) != dragged;

	// Mutual repulsion reads positions from before this frame's moves.
	let min_distance = config.min_distance / input.zoom.max(f64::EPSILON);
	let mut push = vec![(0.0, 0.0); nodes.len()];
	for i in 0..nodes.len() {
		if !free(i, &nodes[i]) {
			continue;
		}
		for j in (i + 1)..nodes.len() {
			if !free(j, &nodes[j]) {
				continue;
			}
			let (dx, dy) = (nodes[j].x - nodes[i].x, nodes[j].y - nodes[i].y);
			let dist = (dx * dx + dy * dy).sqrt();
			if dist >= min_distance || dist < 1e-6 {
				continue;
			}
			let f = (min_distance - dist) * config.repulsion / dist;
			push[i].0 -= dx * f;
			push[i].1 -= dy * f;
			push[j].0 += dx * f;
			push[j].1 += dy * f;
		}
	}

	let drag_origin = input.drag.map(|pin| (pin.x, pin.y));

	for (i, node) in nodes.iter_mut().enumerate() {
		if Some(i) == dragged {
			if let Some(pin) = input.drag {
				node.x = pin.x;
				node.y = pin.y;
			}
			node.vx = 0.0;
			node.vy = 0.0;
			continue;
		}
		if !node.appeared {
			continue;
		}

		node.vx += (node.home_x - node.x) * config.spring;
		node.vy += (node.home_y - node.y) * config.spring;

		match (drag_origin, input.pointer) {
			(Some((px, py)), _) => {
				let (dx, dy) = (node.x - px, node.y - py);
				let dist = (dx * dx + dy * dy).sqrt();
				if dist < config.drag_clearance && dist > 1e-6 {
					let t = 1.0 - dist / config.drag_clearance;
					let f = config.drag_strength * t * t;
					node.vx += dx / dist * f;
					node.vy += dy / dist * f;
				}
			}
			(None, Some((px, py))) => {
				let (dx, dy) = (px - node.x, py - node.y);
				let dist = (dx * dx + dy * dy).sqrt();
				// Inside a couple of units the direction is noise; let it rest.
				if dist < config.magnet_radius && dist > 2.0 {
					let t = 1.0 - dist / config.magnet_radius;
					let f = config.magnet_strength * t * t;
					node.vx += dx / dist * f;
					node.vy += dy / dist * f;
				}
			}
			(None, None) => {}
		}

		node.vx += push[i].0;
		node.vy += push[i].1;

		node.vx *= config.damping;
		node.vy *= config.damping;

		let speed = (node.vx * node.vx + node.vy * node.vy).sqrt();
		if speed > config.max_speed {
			let s = config.max_speed / speed;
			node.vx *= s;
			node.vy *= s;
		}

		node.x += node.vx;
		node.y += node.vy;
	}
}
