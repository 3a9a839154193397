//! Leptos component wrapping the star map canvas.
//!
//! The component owns one [`Scene`] (state, dust, poster cache, 2D context) behind
//! an `Rc<RefCell<..>>` shared by the DOM handlers and the animation loop. Handlers
//! and frames never overlap on the single JS thread, so the borrow is always free
//! when either runs. Host callbacks are invoked only after the borrow is released.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, TouchEvent, TouchList, WheelEvent,
	Window,
};

use super::dust::DustField;
use super::error::{StarMapError, describe};
use super::frame_loop::{AnimationLoop, LoopSlot};
use super::interaction::InteractionEvent;
use super::posters::PosterCache;
use super::render;
use super::state::{StarArena, StarMapConfig, StarMapState};
use super::types::{GraphData, MovieNode};

/// Everything the loop and the handlers share.
struct Scene {
	state: StarMapState,
	dust: Option<DustField>,
	posters: PosterCache,
	ctx: CanvasRenderingContext2d,
	dpr: f64,
	/// A failed frame has already been reported at warn level.
	frame_warned: bool,
}

type SharedScene = Rc<RefCell<Option<Scene>>>;
type ResizeClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// How the canvas picks its CSS size.
#[derive(Clone, Copy, Debug)]
struct Sizing {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl Sizing {
	fn measure(&self, window: &Window, canvas: &HtmlCanvasElement) -> (f64, f64) {
		let inner = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
		if self.fullscreen {
			return (inner(window.inner_width()), inner(window.inner_height()));
		}
		let parent = canvas.parent_element();
		(
			self.width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		)
	}
}

fn device_pixel_ratio(window: &Window) -> f64 {
	let dpr = window.device_pixel_ratio();
	if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

/// Sizes the backing store in device pixels and the element in CSS pixels.
fn fit_canvas(canvas: &HtmlCanvasElement, width: f64, height: f64, dpr: f64) {
	canvas.set_width((width * dpr).round().max(0.0) as u32);
	canvas.set_height((height * dpr).round().max(0.0) as u32);
	let style = web_sys::HtmlElement::style(canvas);
	let _ = style.set_property("width", &format!("{width}px"));
	let _ = style.set_property("height", &format!("{height}px"));
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, StarMapError> {
	canvas
		.get_context("2d")
		.map_err(|e| StarMapError::ContextUnavailable(describe(&e)))?
		.ok_or_else(|| StarMapError::ContextUnavailable("no context returned".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| StarMapError::ContextUnavailable("not a 2d context".into()))
}

fn mount_scene(
	canvas: &HtmlCanvasElement,
	sizing: Sizing,
	data: GraphData,
	config: StarMapConfig,
) -> Result<Scene, StarMapError> {
	let window = web_sys::window().ok_or(StarMapError::WindowNotAvailable)?;
	let (w, h) = sizing.measure(&window, canvas);
	let dpr = device_pixel_ratio(&window);
	fit_canvas(canvas, w, h, dpr);
	let ctx = context_2d(canvas)?;

	let dust = config
		.theme
		.dust
		.enabled
		.then(|| DustField::new(&config.theme.dust, w, h));
	let state = StarMapState::new(data, w, h, config, Box::new(js_sys::Math::random));
	Ok(Scene {
		state,
		dust,
		posters: PosterCache::default(),
		ctx,
		dpr,
		frame_warned: false,
	})
}

fn start_loop(scene: SharedScene) -> Result<AnimationLoop, StarMapError> {
	AnimationLoop::start(move |dt| {
		let Ok(mut guard) = scene.try_borrow_mut() else {
			return;
		};
		let Some(Scene {
			state,
			dust,
			posters,
			ctx,
			dpr,
			frame_warned,
		}) = guard.as_mut()
		else {
			return;
		};
		if !state.has_area() {
			return;
		}
		state.tick(dt);
		if let Some(field) = dust.as_mut() {
			field.update(dt);
		}
		if let Err(err) = render::render(ctx, state, dust.as_ref(), posters, *dpr) {
			if *frame_warned {
				debug!("starmap: frame skipped: {}", describe(&err));
			} else {
				warn!("starmap: frame skipped: {}", describe(&err));
				*frame_warned = true;
			}
		}
	})
}

fn with_scene<R>(scene: &SharedScene, f: impl FnOnce(&mut Scene) -> R) -> Option<R> {
	let mut guard = scene.try_borrow_mut().ok()?;
	guard.as_mut().map(f)
}

/// A host notification with the movie already looked up.
#[derive(Clone, Debug, PartialEq)]
enum Notice {
	Click(Option<MovieNode>),
	Hover(Option<MovieNode>),
}

/// Resolves ids to movies. Ids no longer in the arena resolve to `None`.
fn resolve(arena: &StarArena, events: impl IntoIterator<Item = InteractionEvent>) -> Vec<Notice> {
	let movie = |id: Option<String>| {
		id.and_then(|id| arena.get(&id).map(|n| n.movie.clone()))
	};
	events
		.into_iter()
		.map(|event| match event {
			InteractionEvent::NodeClick(id) => Notice::Click(movie(id)),
			InteractionEvent::NodeHover(id) => Notice::Hover(movie(id)),
		})
		.collect()
}

#[derive(Clone, Copy)]
struct Listeners {
	on_click: Option<Callback<Option<MovieNode>>>,
	on_hover: Option<Callback<Option<MovieNode>>>,
}

impl Listeners {
	fn dispatch(&self, notices: Vec<Notice>) {
		for notice in notices {
			match notice {
				Notice::Click(movie) => {
					if let Some(cb) = self.on_click {
						cb.run(movie);
					}
				}
				Notice::Hover(movie) => {
					if let Some(cb) = self.on_hover {
						cb.run(movie);
					}
				}
			}
		}
	}
}

fn canvas_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn touch_points(canvas: &HtmlCanvasElement, touches: &TouchList) -> Vec<(f64, f64)> {
	(0..touches.length())
		.filter_map(|i| touches.item(i))
		.map(|t| canvas_point(canvas, t.client_x(), t.client_y()))
		.collect()
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
	let _ = web_sys::HtmlElement::style(canvas).set_property("cursor", cursor);
}

/// Everything torn down when the component unmounts.
struct Teardown {
	scene: SharedScene,
	frames: Rc<RefCell<LoopSlot<AnimationLoop>>>,
	resize: ResizeClosure,
}

impl Teardown {
	fn run(&self) {
		if self.frames.borrow_mut().stop() {
			info!("starmap: animation loop stopped");
		}
		if let Some(cb) = self.resize.borrow_mut().take() {
			if let Some(window) = web_sys::window() {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}
		if let Ok(mut scene) = self.scene.try_borrow_mut() {
			scene.take();
		}
	}
}

/// Renders movie recommendations as an interactive star map.
///
/// Pass the payload via the reactive `data` signal; every new value replaces the
/// map wholesale. `selected` and `hovered` let the host drive the highlight (a
/// newly selected star is flown to). Clicks and hover changes on the canvas are
/// reported through `on_node_click` and `on_node_hover`, with `None` for the
/// background. Sizing follows the parent element unless `fullscreen` or explicit
/// `width`/`height` are given.
#[component]
pub fn StarMapCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional, into)] selected: Option<Signal<Option<String>>>,
	#[prop(optional, into)] hovered: Option<Signal<Option<String>>>,
	#[prop(optional, into)] on_node_click: Option<Callback<Option<MovieNode>>>,
	#[prop(optional, into)] on_node_hover: Option<Callback<Option<MovieNode>>>,
	#[prop(optional)] config: Option<StarMapConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let scene: SharedScene = Rc::new(RefCell::new(None));
	let frames: Rc<RefCell<LoopSlot<AnimationLoop>>> = Rc::new(RefCell::new(LoopSlot::default()));
	let resize_cb: ResizeClosure = Rc::new(RefCell::new(None));
	let sizing = Sizing {
		fullscreen,
		width,
		height,
	};
	let config = config.unwrap_or_default();
	let listeners = Listeners {
		on_click: on_node_click,
		on_hover: on_node_hover,
	};

	let (scene_fx, frames_fx, resize_fx) = (scene.clone(), frames.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let payload = data.get();

		let mounted = scene_fx.borrow().is_some();
		if mounted {
			let notices = with_scene(&scene_fx, |s| {
				let events = s.state.replace_graph(payload);
				s.posters
					.retain(s.state.data.nodes.iter().filter_map(|n| n.poster.as_deref()));
				resolve(&s.state.arena, events)
			});
			listeners.dispatch(notices.unwrap_or_default());
		} else {
			match mount_scene(&canvas, sizing, payload, config.clone()) {
				Ok(mut fresh) => {
					if let Some(sig) = selected {
						fresh.state.set_selected(sig.get_untracked());
					}
					if let Some(sig) = hovered {
						fresh.state.set_hovered(sig.get_untracked());
					}
					*scene_fx.borrow_mut() = Some(fresh);
				}
				Err(err) => {
					warn!("starmap: mount failed: {err}");
					return;
				}
			}
			attach_resize(&canvas, sizing, &scene_fx, &resize_fx);
		}

		// A new payload gets a fresh loop; the old one is stopped before the new
		// one can draw.
		let mut slot = frames_fx.borrow_mut();
		slot.stop();
		match start_loop(scene_fx.clone()) {
			Ok(handle) => {
				slot.replace(handle);
				info!("starmap: animation loop started");
			}
			Err(err) => warn!("starmap: {err}"),
		}
	});

	if let Some(sig) = selected {
		let scene_sel = scene.clone();
		Effect::new(move |_| {
			let id = sig.get();
			with_scene(&scene_sel, |s| s.state.set_selected(id));
		});
	}

	if let Some(sig) = hovered {
		let scene_hov = scene.clone();
		Effect::new(move |_| {
			let id = sig.get();
			with_scene(&scene_hov, |s| s.state.set_hovered(id));
		});
	}

	let teardown = StoredValue::new_local(Teardown {
		scene: scene.clone(),
		frames,
		resize: resize_cb,
	});
	on_cleanup(move || {
		teardown.try_with_value(Teardown::run);
	});

	let scene_md = scene.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		if let Some(cursor) = with_scene(&scene_md, |s| {
			s.state.pointer_down(x, y);
			s.state.cursor()
		}) {
			set_cursor(&canvas, cursor);
		}
	};

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		let Some((notices, cursor)) = with_scene(&scene_mm, |s| {
			let event = s.state.pointer_move(x, y);
			(resolve(&s.state.arena, event), s.state.cursor())
		}) else {
			return;
		};
		set_cursor(&canvas, cursor);
		listeners.dispatch(notices);
	};

	let scene_mu = scene.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		let Some((notices, cursor)) = with_scene(&scene_mu, |s| {
			let events = s.state.pointer_up(x, y);
			(resolve(&s.state.arena, events), s.state.cursor())
		}) else {
			return;
		};
		set_cursor(&canvas, cursor);
		listeners.dispatch(notices);
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let Some(notices) = with_scene(&scene_ml, |s| {
			let event = s.state.pointer_leave();
			resolve(&s.state.arena, event)
		}) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get() {
			set_cursor(&canvas.into(), "grab");
		}
		listeners.dispatch(notices);
	};

	let scene_wh = scene.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = canvas_point(&canvas, ev.client_x(), ev.client_y());
		with_scene(&scene_wh, |s| s.state.wheel(x, y, ev.delta_y()));
	};

	let scene_ts = scene.clone();
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let points = touch_points(&canvas, &ev.touches());
		with_scene(&scene_ts, |s| s.state.touch_start(&points));
	};

	let scene_tm = scene.clone();
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let points = touch_points(&canvas, &ev.touches());
		let notices = with_scene(&scene_tm, |s| {
			let event = s.state.touch_move(&points);
			resolve(&s.state.arena, event)
		});
		listeners.dispatch(notices.unwrap_or_default());
	};

	let scene_te = scene;
	let on_touchend = move |ev: TouchEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let remaining = touch_points(&canvas, &ev.touches());
		let notices = with_scene(&scene_te, |s| {
			let events = s.state.touch_end(&remaining);
			resolve(&s.state.arena, events)
		});
		listeners.dispatch(notices.unwrap_or_default());
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="star-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend.clone()
			on:touchcancel=on_touchend
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

/// Keeps canvas, state, and dust in step with the window size.
fn attach_resize(
	canvas: &HtmlCanvasElement,
	sizing: Sizing,
	scene: &SharedScene,
	slot: &ResizeClosure,
) {
	let Some(window) = web_sys::window() else {
		return;
	};
	let (canvas, scene) = (canvas.clone(), scene.clone());
	let cb = Closure::<dyn FnMut()>::new(move || {
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = sizing.measure(&window, &canvas);
		let dpr = device_pixel_ratio(&window);
		fit_canvas(&canvas, w, h, dpr);
		with_scene(&scene, |s| {
			s.dpr = dpr;
			s.state.resize(w, h);
			if let Some(field) = s.dust.as_mut() {
				field.resize(w, h);
			}
		});
	});
	if let Err(err) = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
	{
		warn!(
			"starmap: {}",
			StarMapError::ListenerFailed {
				event: "resize",
				reason: describe(&err),
			}
		);
		return;
	}
	*slot.borrow_mut() = Some(cb);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::star_map::entrance::EntranceConfig;
	use crate::components::star_map::layout::LayoutConfig;
	use crate::components::star_map::state::test_support::{graph, sequence};

	fn arena() -> StarArena {
		let data = graph(&[("a", true), ("b", false)], &[("a", "b")]);
		let mut random = sequence();
		StarArena::build(
			&data,
			800.0,
			600.0,
			&LayoutConfig::default(),
			&EntranceConfig::default(),
			&mut *random,
		)
	}

	#[test]
	fn events_resolve_to_movies() {
		let arena = arena();
		let notices = resolve(
			&arena,
			[
				InteractionEvent::NodeClick(Some("a".into())),
				InteractionEvent::NodeHover(None),
			],
		);
		assert_eq!(notices.len(), 2);
		match &notices[0] {
			Notice::Click(Some(movie)) => assert_eq!(movie.id, "a"),
			other => panic!("unexpected {other:?}"),
		}
		assert_eq!(notices[1], Notice::Hover(None));
	}

	#[test]
	fn unknown_ids_resolve_to_background() {
		let notices = resolve(&arena(), Some(InteractionEvent::NodeClick(Some("gone".into()))));
		assert_eq!(notices, vec![Notice::Click(None)]);
	}
}
