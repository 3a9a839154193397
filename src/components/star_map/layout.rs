//! Initial placement of stars.
//!
//! Top recommendations spiral outward from the center along the golden angle;
//! related titles follow the same spiral in an outer band. A bounded number of
//! pairwise repulsion passes then pulls apart stars that landed too close. The
//! result becomes each star's permanent home position for the current payload.

use super::types::MovieNode;

/// ≈137.5°, `π·(3 − √5)`.
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Layout tunables.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
	/// Margin kept free along every viewport edge.
	pub padding: f64,
	/// Outer edge of the top band, as a fraction of the available reach.
	pub top_band: f64,
	/// Inner and outer edge of the secondary band, as fractions of the reach.
	pub secondary_band: (f64, f64),
	/// Maximum random offset per axis, in pixels.
	pub jitter: f64,
	/// Fixed number of repulsion passes.
	pub iterations: usize,
	/// Pairs closer than this are pushed apart.
	pub min_separation: f64,
	/// Fraction of the overlap resolved per pass (1.0 = fully).
	pub stiffness: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			padding: 60.0,
			top_band: 0.4,
			secondary_band: (0.5, 1.0),
			jitter: 50.0,
			iterations: 40,
			min_separation: 70.0,
			stiffness: 0.8,
		}
	}
}

/// A laid-out star: which payload node it is and where it rests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
	/// Index into the payload's node list.
	pub index: usize,
	/// Home position in world units.
	pub x: f64,
	/// Home position in world units.
	pub y: f64,
}

/// Axis-aligned region stars must stay inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl Bounds {
	/// Viewport shrunk by `padding` on each side. Collapses to the center line on
	/// an axis shorter than twice the padding.
	pub fn padded(width: f64, height: f64, padding: f64) -> Self {
		let px = padding.min(width / 2.0).max(0.0);
		let py = padding.min(height / 2.0).max(0.0);
		Self {
			min_x: px,
			min_y: py,
			max_x: width - px,
			max_y: height - py,
		}
	}

	/// Nearest point inside the bounds.
	pub fn clamp(&self, x: f64, y: f64) -> (f64, f64) {
		(x.clamp(self.min_x, self.max_x), y.clamp(self.min_y, self.max_y))
	}

	#[cfg(test)]
	fn contains(&self, x: f64, y: f64) -> bool {
		(self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
	}
}

/// Payload indices in layout order: every top node first, then the rest, each set
/// keeping its payload order.
pub fn layout_order(nodes: &[MovieNode]) -> Vec<usize> {
	let (top, secondary): (Vec<usize>, Vec<usize>) =
		(0..nodes.len()).partition(|&i| nodes[i].is_top);
	top.into_iter().chain(secondary).collect()
}

/// Point `rank` of `count` on a golden-angle spiral between radii `inner` and
/// `outer`, relative to the origin. Rank 0 sits at `inner`.
pub fn spiral_offset(rank: usize, count: usize, inner: f64, outer: f64, phase: f64) -> (f64, f64) {
	if count == 0 {
		return (0.0, 0.0);
	}
	let angle = rank as f64 * GOLDEN_ANGLE + phase;
	let radius = inner + (outer - inner) * (rank as f64 / count as f64).sqrt();
	(angle.cos() * radius, angle.sin() * radius)
}

/// Lays out `nodes` inside a `width`×`height` viewport.
///
/// `random` must yield values in `[0, 1)`; it only feeds the jitter term, so the
/// spiral angles and radii are the same on every call. Returns placements in
/// layout order, or nothing for an empty payload or a zero-area viewport.
pub fn layout(
	nodes: &[MovieNode],
	width: f64,
	height: f64,
	config: &LayoutConfig,
	random: &mut impl FnMut() -> f64,
) -> Vec<Placement> {
	if nodes.is_empty() || !(width > 0.0 && height > 0.0) {
		return Vec::new();
	}

	let order = layout_order(nodes);
	let bounds = Bounds::padded(width, height, config.padding);
	let (cx, cy) = (width / 2.0, height / 2.0);
	let reach = (width.min(height) / 2.0 - config.padding).max(0.0);

	let top_count = order.iter().filter(|&&i| nodes[i].is_top).count();
	let secondary_count = order.len() - top_count;
	// Without top nodes the inner band is free for related titles.
	let secondary_inner = if top_count > 0 {
		reach * config.secondary_band.0
	} else {
		0.0
	};
	let secondary_outer = reach * config.secondary_band.1;

	let mut points: Vec<(f64, f64)> = (0..order.len())
		.map(|slot| {
			let (dx, dy) = if slot < top_count {
				spiral_offset(slot, top_count, 0.0, reach * config.top_band, 0.0)
			} else {
				spiral_offset(
					slot - top_count,
					secondary_count,
					secondary_inner,
					secondary_outer,
					GOLDEN_ANGLE / 2.0,
				)
			};
			let (jx, jy) = if order.len() > 1 {
				(
					(random() * 2.0 - 1.0) * config.jitter,
					(random() * 2.0 - 1.0) * config.jitter,
				)
			} else {
				(0.0, 0.0)
			};
			bounds.clamp(cx + dx + jx, cy + dy + jy)
		})
		.collect();

	separate(&mut points, &bounds, config);

	order
		.into_iter()
		.zip(points)
		.map(|(index, (x, y))| Placement { index, x, y })
		.collect()
}

/// Runs the fixed repulsion passes over `points`, re-clamping after each pass.
///
/// Bounded effort: crowded viewports may still hold pairs closer than
/// `min_separation` afterwards.
pub fn separate(points: &mut [(f64, f64)], bounds: &Bounds, config: &LayoutConfig) {
	let n = points.len();
	for _ in 0..config.iterations {
		let mut moved = false;
		for i in 0..n {
			for j in (i + 1)..n {
				let ((xi, yi), (xj, yj)) = (points[i], points[j]);
				let (dx, dy) = (xj - xi, yj - yi);
				let dist = (dx * dx + dy * dy).sqrt();
				if dist >= config.min_separation {
					continue;
				}
				let (ux, uy) = if dist > 1e-6 {
					(dx / dist, dy / dist)
				} else {
					// Coincident: pick a direction from the pair so it is stable.
					let a = (i + j) as f64 * GOLDEN_ANGLE;
					(a.cos(), a.sin())
				};
				let push = (config.min_separation - dist) * config.stiffness * 0.5;
				points[i] = (xi - ux * push, yi - uy * push);
				points[j] = (xj + ux * push, yj + uy * push);
				moved = true;
			}
		}
		for p in points.iter_mut() {
			*p = bounds.clamp(p.0, p.1);
		}
		if !moved {
			break;
		}
	}
}

/// Smallest pairwise distance, or `None` with fewer than two points.
#[cfg(test)]
fn min_pairwise_distance(points: &[(f64, f64)]) -> Option<f64> {
	let mut best: Option<f64> = None;
	for (i, a) in points.iter().enumerate() {
		for b in &points[i + 1..] {
			let d = ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
			best = Some(best.map_or(d, |m| m.min(d)));
		}
	}
	best
}

#[cfg(test)]
mod tests {
	use super::*;

	fn movie(id: &str, is_top: bool) -> MovieNode {
		MovieNode {
			id: id.into(),
			title: id.into(),
			title_localized: None,
			year: None,
			is_top,
			vibe: None,
			poster: None,
		}
	}

	fn movies(top: usize, secondary: usize) -> Vec<MovieNode> {
		let mut v: Vec<_> = (0..secondary).map(|i| movie(&format!("s{i}"), false)).collect();
		// interleave so partitioning has work to do
		for i in 0..top {
			v.insert((i * 2).min(v.len()), movie(&format!("t{i}"), true));
		}
		v
	}

	/// Deterministic source cycling through [0, 1).
	fn sequence() -> impl FnMut() -> f64 {
		let mut state = 0.0_f64;
		move || {
			state = (state + 0.618_033_988_75) % 1.0;
			state
		}
	}

	#[test]
	fn empty_payload_is_noop() {
		let placed = layout(&[], 800.0, 600.0, &LayoutConfig::default(), &mut sequence());
		assert!(placed.is_empty());
	}

	#[test]
	fn zero_area_viewport_skips_layout() {
		let nodes = movies(2, 3);
		let config = LayoutConfig::default();
		assert!(layout(&nodes, 0.0, 600.0, &config, &mut sequence()).is_empty());
		assert!(layout(&nodes, 800.0, 0.0, &config, &mut sequence()).is_empty());
	}

	#[test]
	fn single_node_sits_at_center() {
		let nodes = vec![movie("solo", false)];
		let placed = layout(&nodes, 800.0, 600.0, &LayoutConfig::default(), &mut sequence());
		assert_eq!(placed.len(), 1);
		assert!((placed[0].x - 400.0).abs() < 1e-9);
		assert!((placed[0].y - 300.0).abs() < 1e-9);
	}

	#[test]
	fn top_nodes_come_first_in_payload_order() {
		let nodes = movies(3, 4);
		let order = layout_order(&nodes);
		let ids: Vec<&str> = order.iter().map(|&i| nodes[i].id.as_str()).collect();
		assert_eq!(ids, ["t0", "t1", "t2", "s0", "s1", "s2", "s3"]);
	}

	#[test]
	fn homes_stay_inside_padded_viewport() {
		let config = LayoutConfig::default();
		for &(w, h) in &[(800.0, 600.0), (320.0, 640.0), (1920.0, 400.0), (100.0, 100.0)] {
			for n in 1..30 {
				let nodes = movies(n / 3, n - n / 3);
				let placed = layout(&nodes, w, h, &config, &mut sequence());
				let bounds = Bounds::padded(w, h, config.padding);
				assert_eq!(placed.len(), n);
				for p in &placed {
					assert!(bounds.contains(p.x, p.y), "{p:?} outside {w}x{h}");
				}
			}
		}
	}

	#[test]
	fn every_payload_node_is_placed_once() {
		let nodes = movies(4, 11);
		let placed = layout(&nodes, 1200.0, 800.0, &LayoutConfig::default(), &mut sequence());
		let mut seen: Vec<usize> = placed.iter().map(|p| p.index).collect();
		seen.sort_unstable();
		assert_eq!(seen, (0..nodes.len()).collect::<Vec<_>>());
	}

	#[test]
	fn roomy_layout_respects_min_separation() {
		let config = LayoutConfig::default();
		let nodes = movies(4, 10);
		let placed = layout(&nodes, 1600.0, 1200.0, &config, &mut sequence());
		let points: Vec<_> = placed.iter().map(|p| (p.x, p.y)).collect();
		let min = min_pairwise_distance(&points).unwrap();
		assert!(min >= config.min_separation * 0.95, "min distance {min}");
	}

	#[test]
	fn separation_never_worsens_crowding() {
		let config = LayoutConfig::default();
		let bounds = Bounds::padded(800.0, 600.0, config.padding);
		let mut points = vec![(400.0, 300.0), (401.0, 300.0), (400.0, 302.0), (398.0, 299.0)];
		let before = min_pairwise_distance(&points).unwrap();
		separate(&mut points, &bounds, &config);
		let after = min_pairwise_distance(&points).unwrap();
		assert!(after >= before);
		assert!(after >= config.min_separation * 0.95, "after {after}");
	}

	#[test]
	fn coincident_points_are_split() {
		let config = LayoutConfig::default();
		let bounds = Bounds::padded(800.0, 600.0, config.padding);
		let mut points = vec![(400.0, 300.0), (400.0, 300.0)];
		separate(&mut points, &bounds, &config);
		assert!(min_pairwise_distance(&points).unwrap() > 1.0);
	}

	#[test]
	fn rerunning_keeps_partition_and_angles() {
		// Zero jitter (random() == 0.5) exposes the deterministic part of the layout.
		let config = LayoutConfig {
			iterations: 0,
			..LayoutConfig::default()
		};
		let nodes = movies(3, 8);
		let a = layout(&nodes, 1000.0, 1000.0, &config, &mut || 0.5);
		let b = layout(&nodes, 1000.0, 1000.0, &config, &mut || 0.5);
		assert_eq!(a, b);

		let jittered = layout(&nodes, 1000.0, 1000.0, &config, &mut sequence());
		let order_a: Vec<usize> = a.iter().map(|p| p.index).collect();
		let order_j: Vec<usize> = jittered.iter().map(|p| p.index).collect();
		assert_eq!(order_a, order_j);
		for (p, q) in a.iter().zip(&jittered) {
			assert!((p.x - q.x).abs() <= config.jitter + 1e-9);
			assert!((p.y - q.y).abs() <= config.jitter + 1e-9);
		}
	}

	#[test]
	fn spiral_uses_golden_angle_steps() {
		let (x0, y0) = spiral_offset(0, 5, 0.0, 100.0, 0.0);
		assert_eq!((x0, y0), (0.0, 0.0));
		let (x1, y1) = spiral_offset(1, 4, 0.0, 100.0, 0.0);
		assert!((y1.atan2(x1) - GOLDEN_ANGLE).abs() < 1e-9);
		assert!(((x1 * x1 + y1 * y1).sqrt() - 50.0).abs() < 1e-9);
	}

	#[test]
	fn top_band_is_inside_secondary_band() {
		let config = LayoutConfig {
			iterations: 0,
			jitter: 0.0,
			..LayoutConfig::default()
		};
		let nodes = movies(4, 10);
		let placed = layout(&nodes, 2000.0, 2000.0, &config, &mut sequence());
		let dist = |p: &Placement| ((p.x - 1000.0).powi(2) + (p.y - 1000.0).powi(2)).sqrt();
		let top_max = placed[..4].iter().map(dist).fold(0.0, f64::max);
		let secondary_min = placed[4..].iter().map(dist).fold(f64::INFINITY, f64::min);
		assert!(top_max < secondary_min);
	}
}
