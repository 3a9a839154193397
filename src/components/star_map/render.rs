//! Canvas rendering for the star map.
//!
//! One call to [`render`] draws a complete frame from a read-only snapshot of the
//! state. Passes, back to front:
//! 1. Background gradient and dust (screen space)
//! 2. Constellation links between appeared stars (world space)
//! 3. Stars: glow, spinning points, core, rays, poster, label
//! 4. Vignette (screen space)

use std::f64::consts::{FRAC_PI_4, PI, TAU};

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::dust::DustField;
use super::entrance::EntranceFrame;
use super::interaction::InteractionState;
use super::posters::PosterCache;
use super::scale::ScaledValues;
use super::state::{GLOW_SPREAD, StarMapState, StarNode};
use super::theme::{Color, LinkStyle, StarStyle, Theme};
use super::types::MovieNode;

/// Size boost for selected, hovered, and dragged stars.
const FOCUS_BOOST: f64 = 1.3;
/// Poster thumbnail size in screen pixels.
const POSTER_SIZE: (f64, f64) = (40.0, 60.0);

/// How a star relates to the current interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
	None,
	Hovered,
	Dragged,
	Selected,
}

impl Focus {
	pub fn of(id: &str, interaction: &InteractionState) -> Self {
		let is = |slot: &Option<String>| slot.as_deref() == Some(id);
		if is(&interaction.selected) {
			Focus::Selected
		} else if is(&interaction.dragged) {
			Focus::Dragged
		} else if is(&interaction.hovered) {
			Focus::Hovered
		} else {
			Focus::None
		}
	}

	pub fn is_focused(self) -> bool {
		self != Focus::None
	}
}

/// Everything needed to draw one star, resolved from state and theme.
#[derive(Clone, Debug, PartialEq)]
pub struct StarLook {
	pub focus: Focus,
	pub opacity: f64,
	/// Core radius in world units after pulse, entrance, and focus.
	pub size: f64,
	pub glow: Color,
	pub core: Color,
	/// Number of star points: 6 for top recommendations, 4 otherwise.
	pub points: usize,
	/// Spin angle of the points in radians.
	pub rotation: f64,
	pub rays: bool,
}

impl StarLook {
	pub fn resolve(
		node: &StarNode,
		entrance: EntranceFrame,
		interaction: &InteractionState,
		style: &StarStyle,
		t: f64,
	) -> Self {
		let focus = Focus::of(&node.movie.id, interaction);
		let boost = if focus.is_focused() { FOCUS_BOOST } else { 1.0 };
		let top = node.movie.is_top;
		let glow = match focus {
			Focus::Selected => style.selected,
			Focus::Hovered | Focus::Dragged => style.hovered,
			Focus::None if top => style.top_glow,
			Focus::None => node.tint,
		};
		// Related titles spin the other way, so the two tiers read apart.
		let direction = if top { 1.0 } else { -1.0 };
		Self {
			focus,
			opacity: entrance.opacity,
			size: node.radius * node.pulse(t) * entrance.scale * boost,
			glow,
			core: if top {
				style.top_core
			} else {
				style.secondary_core
			},
			points: if top { 6 } else { 4 },
			rotation: node.pulse_phase + t * style.spin_speed * direction,
			rays: top || focus == Focus::Selected,
		}
	}
}

/// Vertices of a star with `points` tips, alternating outer and inner radius,
/// starting at a tip at angle `rotation`.
pub fn star_outline(points: usize, outer: f64, inner: f64, rotation: f64) -> Vec<(f64, f64)> {
	let n = points.max(2) * 2;
	(0..n)
		.map(|i| {
			let angle = rotation + i as f64 * TAU / n as f64;
			let r = if i % 2 == 0 { outer } else { inner };
			(angle.cos() * r, angle.sin() * r)
		})
		.collect()
}

/// Alpha at the ends and at the middle of a link of `strength`.
pub fn link_alphas(strength: f64, style: &LinkStyle, accented: bool) -> (f64, f64) {
	let ends = style.base_alpha + strength * 0.1;
	let mid = style.base_alpha + 0.05 + strength * 0.15;
	if accented {
		((ends * 2.5).min(1.0), (mid * 2.5).min(1.0))
	} else {
		(ends, mid)
	}
}

/// Secondary text under a hovered title: year and mood, whichever exist.
pub fn detail_line(movie: &MovieNode) -> Option<String> {
	let vibe = movie.vibe.as_deref().map(str::trim).filter(|v| !v.is_empty());
	match (movie.year, vibe) {
		(Some(year), Some(vibe)) => Some(format!("{year} · {vibe}")),
		(Some(year), None) => Some(year.to_string()),
		(None, Some(vibe)) => Some(vibe.to_owned()),
		(None, None) => None,
	}
}

/// Renders a complete frame. `dpr` is the device pixel ratio the canvas backing
/// store was sized for.
pub fn render(
	ctx: &CanvasRenderingContext2d,
	state: &StarMapState,
	dust: Option<&DustField>,
	posters: &mut PosterCache<HtmlImageElement>,
	dpr: f64,
) -> Result<(), JsValue> {
	let theme = &state.config.theme;
	ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;

	draw_background(ctx, state, theme)?;
	if let Some(field) = dust {
		draw_dust(ctx, field, theme, state.elapsed)?;
	}

	let scale = ScaledValues::new(&state.config.scale, state.camera.zoom);
	ctx.save();
	ctx.translate(state.camera.offset_x, state.camera.offset_y)?;
	ctx.scale(state.camera.zoom, state.camera.zoom)?;
	let drawn = draw_links(ctx, state, &scale, theme)
		.and_then(|()| draw_stars(ctx, state, &scale, theme, posters));
	ctx.restore();
	drawn?;

	if theme.background.vignette > 0.0 {
		draw_vignette(ctx, state, theme)?;
	}
	Ok(())
}

fn draw_background(
	ctx: &CanvasRenderingContext2d,
	state: &StarMapState,
	theme: &Theme,
) -> Result<(), JsValue> {
	let (w, h) = (state.width, state.height);
	let gradient =
		ctx.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8)?;
	gradient.add_color_stop(0.0, &theme.background.center.to_css())?;
	gradient.add_color_stop(1.0, &theme.background.edge.to_css())?;
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, w, h);
	Ok(())
}

fn draw_vignette(
	ctx: &CanvasRenderingContext2d,
	state: &StarMapState,
	theme: &Theme,
) -> Result<(), JsValue> {
	let (w, h) = (state.width, state.height);
	let gradient = ctx.create_radial_gradient(
		w / 2.0,
		h / 2.0,
		w.min(h) * 0.3,
		w / 2.0,
		h / 2.0,
		w.max(h) * 0.7,
	)?;
	gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)")?;
	gradient.add_color_stop(
		1.0,
		&Color::rgba(0, 0, 0, theme.background.vignette).to_css(),
	)?;
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, w, h);
	Ok(())
}

fn draw_dust(
	ctx: &CanvasRenderingContext2d,
	field: &DustField,
	theme: &Theme,
	t: f64,
) -> Result<(), JsValue> {
	let color = theme.dust.color;
	for mote in field.motes() {
		ctx.set_fill_style_str(&color.with_alpha(DustField::twinkle_alpha(mote, t)).to_css());
		ctx.begin_path();
		ctx.arc(mote.x, mote.y, mote.size, 0.0, TAU)?;
		ctx.fill();
	}
	Ok(())
}

fn draw_links(
	ctx: &CanvasRenderingContext2d,
	state: &StarMapState,
	scale: &ScaledValues,
	theme: &Theme,
) -> Result<(), JsValue> {
	let nodes = state.arena.nodes();
	let interaction = state.controller.state();
	let entrance = &state.config.entrance;
	ctx.set_line_cap("round");

	for link in state.arena.links() {
		let (Some(a), Some(b)) = (nodes.get(link.source), nodes.get(link.target)) else {
			continue;
		};
		if !(a.appeared && b.appeared) {
			continue;
		}
		let fade = entrance
			.frame(a.appear_at, state.elapsed)
			.opacity
			.min(entrance.frame(b.appear_at, state.elapsed).opacity);
		let accented = Focus::of(&a.movie.id, interaction).is_focused()
			|| Focus::of(&b.movie.id, interaction).is_focused();
		let (ends, mid) = link_alphas(link.strength, &theme.link, accented);
		let color = if accented {
			theme.link.accent
		} else {
			theme.link.color
		};

		let gradient = ctx.create_linear_gradient(a.x, a.y, b.x, b.y);
		gradient.add_color_stop(0.0, &color.with_alpha(ends * fade).to_css())?;
		gradient.add_color_stop(0.5, &color.with_alpha(mid * fade).to_css())?;
		gradient.add_color_stop(1.0, &color.with_alpha(ends * fade).to_css())?;
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);

		let widen = if accented { 1.5 } else { 1.0 };
		ctx.set_line_width(scale.link_width * (0.5 + link.strength * 0.5) * widen);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
	Ok(())
}

fn draw_stars(
	ctx: &CanvasRenderingContext2d,
	state: &StarMapState,
	scale: &ScaledValues,
	theme: &Theme,
	posters: &mut PosterCache<HtmlImageElement>,
) -> Result<(), JsValue> {
	let interaction = state.controller.state();
	let t = state.elapsed;
	let looks: Vec<(&StarNode, StarLook)> = state
		.arena
		.nodes()
		.iter()
		.filter(|n| n.appeared)
		.map(|n| {
			let frame = state.config.entrance.frame(n.appear_at, t);
			(n, StarLook::resolve(n, frame, interaction, &theme.star, t))
		})
		.filter(|(_, look)| look.opacity > 0.0)
		.collect();

	// Focused stars last so their glow and label sit on top.
	for pass_focused in [false, true] {
		let pass = looks
			.iter()
			.filter(|(_, l)| l.focus.is_focused() == pass_focused);
		for (node, look) in pass {
			ctx.set_global_alpha(look.opacity);
			let drawn = draw_star(ctx, node, look, scale, &theme.star).and_then(|()| {
				if look.focus.is_focused() {
					draw_poster(ctx, node, look, scale, posters)?;
				}
				draw_label(ctx, node, look, scale, &theme.star)
			});
			ctx.set_global_alpha(1.0);
			drawn?;
		}
	}
	Ok(())
}

fn draw_star(
	ctx: &CanvasRenderingContext2d,
	node: &StarNode,
	look: &StarLook,
	scale: &ScaledValues,
	style: &StarStyle,
) -> Result<(), JsValue> {
	let (x, y, size) = (node.x, node.y, look.size);
	let boost = if look.focus.is_focused() { FOCUS_BOOST } else { 1.0 };
	let intensity = node.glow_intensity * boost;

	// Outer glow
	let outer = size * GLOW_SPREAD;
	let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, outer)?;
	gradient.add_color_stop(0.0, &look.glow.with_alpha(0.18 * intensity).to_css())?;
	gradient.add_color_stop(0.5, &look.glow.with_alpha(0.04 * intensity).to_css())?;
	gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.begin_path();
	ctx.arc(x, y, outer, 0.0, TAU)?;
	ctx.fill();

	// Inner glow
	let inner = size * 2.5;
	let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, inner)?;
	let warm = Color::rgb(255, 255, 255).lerp(look.glow, 0.5);
	gradient.add_color_stop(0.0, &warm.with_alpha(0.35 * intensity).to_css())?;
	gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.begin_path();
	ctx.arc(x, y, inner, 0.0, TAU)?;
	ctx.fill();

	// Points
	let outline = star_outline(look.points, size * 2.2, size * 0.45, look.rotation);
	ctx.begin_path();
	for (i, (px, py)) in outline.iter().enumerate() {
		if i == 0 {
			ctx.move_to(x + px, y + py);
		} else {
			ctx.line_to(x + px, y + py);
		}
	}
	ctx.close_path();
	ctx.set_fill_style_str(&look.core.lighten(0.3).with_alpha(0.55).to_css());
	ctx.fill();

	if look.rays {
		draw_rays(ctx, x, y, look, scale)?;
	}

	// Core
	let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, size)?;
	gradient.add_color_stop(0.0, "#ffffff")?;
	gradient.add_color_stop(0.5, &look.core.to_css())?;
	gradient.add_color_stop(1.0, "rgba(200, 210, 230, 0.5)")?;
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.begin_path();
	ctx.arc(x, y, size, 0.0, TAU)?;
	ctx.fill();

	if look.focus == Focus::Selected {
		ctx.begin_path();
		ctx.arc(x, y, size * 2.8, 0.0, TAU)?;
		ctx.set_stroke_style_str(&style.selected.with_alpha(0.8).to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}
	Ok(())
}

/// Thin diffraction spikes, rotating at half the point speed.
fn draw_rays(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	look: &StarLook,
	scale: &ScaledValues,
) -> Result<(), JsValue> {
	let reach = look.size * if look.focus == Focus::Selected { 7.0 } else { 5.0 };
	let base = look.rotation * 0.5 + FRAC_PI_4;
	ctx.set_line_width(scale.ring_width * 0.6);
	for i in 0..4 {
		let angle = base + i as f64 * PI / 2.0;
		let (ex, ey) = (x + angle.cos() * reach, y + angle.sin() * reach);
		let gradient = ctx.create_linear_gradient(x, y, ex, ey);
		gradient.add_color_stop(0.0, &look.glow.lighten(0.5).with_alpha(0.45).to_css())?;
		gradient.add_color_stop(1.0, "rgba(0, 0, 0, 0)")?;
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.begin_path();
		ctx.move_to(x, y);
		ctx.line_to(ex, ey);
		ctx.stroke();
	}
	Ok(())
}

/// Poster thumbnail above a focused star, once the image has decoded.
fn draw_poster(
	ctx: &CanvasRenderingContext2d,
	node: &StarNode,
	look: &StarLook,
	scale: &ScaledValues,
	posters: &mut PosterCache<HtmlImageElement>,
) -> Result<(), JsValue> {
	let Some(url) = node.movie.poster.as_deref() else {
		return Ok(());
	};
	let Some(img) = posters.get(url) else {
		return Ok(());
	};
	let (w, h) = (POSTER_SIZE.0 / scale.k, POSTER_SIZE.1 / scale.k);
	let (left, top) = (node.x - w / 2.0, node.y - look.size * 3.0 - h);

	ctx.save();
	ctx.begin_path();
	ctx.rect(left, top, w, h);
	ctx.clip();
	let drawn = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, left, top, w, h);
	ctx.restore();
	drawn?;

	ctx.set_stroke_style_str(&look.glow.with_alpha(0.6).to_css());
	ctx.set_line_width(scale.ring_width * 0.5);
	ctx.stroke_rect(left, top, w, h);
	Ok(())
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	node: &StarNode,
	look: &StarLook,
	scale: &ScaledValues,
	style: &StarStyle,
) -> Result<(), JsValue> {
	let title = node.movie.display_title();
	if title.is_empty() {
		return Ok(());
	}
	let top = node.movie.is_top;
	let (x, y) = (node.x, node.y + look.size + scale.label_size * 1.3);
	ctx.set_font(&scale.label_font(top));
	ctx.set_text_align("center");
	ctx.set_text_baseline("alphabetic");

	if look.focus.is_focused() {
		let width = ctx.measure_text(title)?.width();
		let pad = scale.label_size * 0.4;
		let lines = if look.focus == Focus::Hovered && detail_line(&node.movie).is_some() {
			2.2
		} else {
			1.0
		};
		ctx.set_fill_style_str(&style.label_plate.to_css());
		ctx.fill_rect(
			x - width / 2.0 - pad,
			y - scale.label_size - pad * 0.5,
			width + pad * 2.0,
			scale.label_size * lines + pad * 1.5,
		);
	}

	let color = if top { style.top_label } else { style.label };
	let alpha = match (look.focus.is_focused(), top) {
		(true, _) => 0.95,
		(false, true) => 0.75,
		(false, false) => 0.5,
	};
	ctx.set_fill_style_str(&color.with_alpha(alpha).to_css());
	ctx.fill_text(title, x, y)?;

	if look.focus == Focus::Hovered {
		if let Some(detail) = detail_line(&node.movie) {
			ctx.set_font(&scale.detail_font());
			ctx.set_fill_style_str(&style.detail.with_alpha(0.9).to_css());
			ctx.fill_text(&detail, x, y + scale.label_size * 1.2)?;
		}
	}
	Ok(())
}
