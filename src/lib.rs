//! starmap: Interactive star map visualization for movie recommendation graphs.
//!
//! This crate provides a WASM-based canvas component that renders recommendations
//! as a night sky: top picks and related titles as stars, relatedness as
//! constellation lines, with pan/zoom, dragging, and hover/selection highlights.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::star_map::{
	GraphData, MovieLink, MovieNode, StarMapCanvas, StarMapConfig, StarMapError, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("starmap: logging initialized");
}

/// Parses a graph payload: JSON with `{ nodes: [...], links: [...] }`.
pub fn parse_graph_data(json: &str) -> Result<GraphData, StarMapError> {
	serde_json::from_str(json).map_err(|e| StarMapError::InvalidPayload(e.to_string()))
}

/// Load graph data from a script element with id="graph-data".
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match parse_graph_data(&json_text) {
		Ok(data) => {
			info!(
				"starmap: loaded {} movies, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("starmap: {e}");
			None
		}
	}
}

/// Main application component.
/// Loads the recommendation graph from the DOM and renders the star map with a
/// small caption for the selected and hovered movie.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());

	let selected = RwSignal::new(None::<MovieNode>);
	let hovered = RwSignal::new(None::<MovieNode>);
	let selected_id = Signal::derive(move || selected.get().map(|m| m.id));

	let caption = move || {
		hovered
			.get()
			.or_else(|| selected.get())
			.map(|m| match m.year {
				Some(year) => format!("{} ({year})", m.display_title()),
				None => m.display_title().to_owned(),
			})
			.unwrap_or_default()
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Star Map" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<StarMapCanvas
				data=graph_signal
				selected=selected_id
				on_node_click=Callback::new(move |movie| selected.set(movie))
				on_node_hover=Callback::new(move |movie| hovered.set(movie))
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Star Map"</h1>
				<p class="subtitle">"Click a star to select it. Drag stars or the sky. Scroll to zoom."</p>
				<p class="caption">{caption}</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embedded_payload() {
		let json = r#"{
			"nodes": [
				{ "id": "1", "title": "Solaris", "title_ru": "Солярис", "year": 1972, "is_top": true, "vibe": "космос" },
				{ "id": "2", "title": "Stalker" }
			],
			"links": [{ "source": "1", "target": "2", "strength": 0.7 }]
		}"#;
		let data = parse_graph_data(json).unwrap();
		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.nodes[0].display_title(), "Солярис");
		assert!(data.nodes[0].is_top && !data.nodes[1].is_top);
		assert_eq!(data.links[0].strength, 0.7);
	}

	#[test]
	fn malformed_payload_is_reported() {
		let err = parse_graph_data(r#"{ "nodes": 5 }"#).unwrap_err();
		assert!(matches!(err, StarMapError::InvalidPayload(_)));
	}
}
