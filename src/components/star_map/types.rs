//! Graph payload handed to the star map by the host application.
//!
//! The payload is replaced wholesale on every new query; the engine never patches
//! it incrementally.

use serde::Deserialize;

/// Default link strength when the payload omits it.
const DEFAULT_STRENGTH: f64 = 0.5;

fn default_strength() -> f64 {
	DEFAULT_STRENGTH
}

/// A recommended movie.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MovieNode {
	/// Unique identifier within one payload. Links refer to nodes by this id.
	pub id: String,
	/// Original title.
	pub title: String,
	/// Localized title, preferred for display when present.
	#[serde(default, alias = "title_ru", alias = "titleLocalized")]
	pub title_localized: Option<String>,
	/// Release year.
	#[serde(default)]
	pub year: Option<u16>,
	/// Primary recommendation (true) or related title (false).
	#[serde(default, alias = "isTop")]
	pub is_top: bool,
	/// Free-text mood tag.
	#[serde(default)]
	pub vibe: Option<String>,
	/// Poster image URL.
	#[serde(default)]
	pub poster: Option<String>,
}

impl MovieNode {
	/// Title shown on the map: localized when available.
	pub fn display_title(&self) -> &str {
		self.title_localized
			.as_deref()
			.filter(|t| !t.is_empty())
			.unwrap_or(&self.title)
	}
}

/// A relatedness edge between two movies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct MovieLink {
	/// Source node id.
	#[serde(alias = "sourceId")]
	pub source: String,
	/// Target node id.
	#[serde(alias = "targetId")]
	pub target: String,
	/// Visual weight in (0, 1]. Only affects line width and opacity.
	#[serde(default = "default_strength")]
	pub strength: f64,
}

impl MovieLink {
	/// Strength clamped into (0, 1]. Non-finite or non-positive values fall back
	/// to the default.
	pub fn clamped_strength(&self) -> f64 {
		if self.strength.is_finite() && self.strength > 0.0 {
			self.strength.min(1.0)
		} else {
			DEFAULT_STRENGTH
		}
	}
}

/// Complete graph payload: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphData {
	/// Movies to draw.
	pub nodes: Vec<MovieNode>,
	/// Relations between them, by movie id.
	pub links: Vec<MovieLink>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_backend_payload() {
		let json = r#"{
			"nodes": [
				{"id": "arrival", "title": "Arrival", "title_ru": "Прибытие", "year": 2016,
				 "vibe": "философия", "is_top": true},
				{"id": "her", "title": "Her", "year": 2013, "vibe": "меланхолия"}
			],
			"links": [{"source": "arrival", "target": "her", "strength": 0.7}],
			"query_summary": "ignored"
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();

		assert_eq!(data.nodes.len(), 2);
		assert!(data.nodes[0].is_top);
		assert!(!data.nodes[1].is_top);
		assert_eq!(data.nodes[0].display_title(), "Прибытие");
		assert_eq!(data.nodes[1].display_title(), "Her");
		assert_eq!(data.links[0].strength, 0.7);
	}

	#[test]
	fn parses_camel_case_payload() {
		let json = r#"{
			"nodes": [{"id": "a", "title": "A", "titleLocalized": "Ä", "isTop": true}],
			"links": [{"sourceId": "a", "targetId": "a"}]
		}"#;
		let data: GraphData = serde_json::from_str(json).unwrap();

		assert_eq!(data.nodes[0].title_localized.as_deref(), Some("Ä"));
		assert!(data.nodes[0].is_top);
		assert_eq!(data.links[0].source, "a");
		assert_eq!(data.links[0].strength, DEFAULT_STRENGTH);
	}

	#[test]
	fn empty_localized_title_falls_back() {
		let node = MovieNode {
			id: "x".into(),
			title: "Original".into(),
			title_localized: Some(String::new()),
			year: None,
			is_top: false,
			vibe: None,
			poster: None,
		};
		assert_eq!(node.display_title(), "Original");
	}

	#[test]
	fn strength_is_clamped() {
		let link = |strength| MovieLink {
			source: "a".into(),
			target: "b".into(),
			strength,
		};
		assert_eq!(link(3.0).clamped_strength(), 1.0);
		assert_eq!(link(0.25).clamped_strength(), 0.25);
		assert_eq!(link(0.0).clamped_strength(), DEFAULT_STRENGTH);
		assert_eq!(link(f64::NAN).clamped_strength(), DEFAULT_STRENGTH);
	}
}
