//! Poster thumbnails for focused stars.
//!
//! Images load lazily the first time a star is selected or hovered. Until an image
//! has decoded, or if it never does, the star is drawn without it.

use std::collections::{HashMap, HashSet};

use log::debug;
use wasm_bindgen::JsValue;
use web_sys::HtmlImageElement;

/// A loadable image handle.
pub trait PosterImage: Sized {
	/// Starts loading `url`.
	fn load(url: &str) -> Result<Self, JsValue>;
	/// Decoded and drawable.
	fn is_ready(&self) -> bool;
	/// Finished loading but unusable (network error, bad data).
	fn is_broken(&self) -> bool;
}

impl PosterImage for HtmlImageElement {
	fn load(url: &str) -> Result<Self, JsValue> {
		let img = HtmlImageElement::new()?;
		img.set_src(url);
		Ok(img)
	}

	fn is_ready(&self) -> bool {
		self.complete() && self.natural_width() > 0
	}

	fn is_broken(&self) -> bool {
		self.complete() && self.natural_width() == 0
	}
}

enum Entry<I> {
	Pending(I),
	Failed,
}

/// Per-URL image cache. Failed URLs are remembered and never retried.
pub struct PosterCache<I = HtmlImageElement> {
	entries: HashMap<String, Entry<I>>,
}

impl<I> Default for PosterCache<I> {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
		}
	}
}

impl<I: PosterImage> PosterCache<I> {
	/// Drawable image for `url`, starting a load on first request.
	pub fn get(&mut self, url: &str) -> Option<&I> {
		if url.is_empty() {
			return None;
		}
		if !self.entries.contains_key(url) {
			let entry = match I::load(url) {
				Ok(img) => Entry::Pending(img),
				Err(err) => {
					debug!("starmap: poster {url:?} failed to start: {err:?}");
					Entry::Failed
				}
			};
			self.entries.insert(url.to_owned(), entry);
		}

		let entry = self.entries.get_mut(url)?;
		if matches!(entry, Entry::Pending(img) if img.is_broken()) {
			debug!("starmap: poster {url:?} failed to load");
			*entry = Entry::Failed;
		}
		match self.entries.get(url)? {
			Entry::Pending(img) if img.is_ready() => Some(img),
			_ => None,
		}
	}

	/// Drops entries for posters no longer referenced by `urls`.
	pub fn retain<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) {
		let keep: HashSet<&str> = urls.into_iter().collect();
		self.entries.retain(|url, _| keep.contains(url.as_str()));
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.entries.len()
	}

	#[cfg(test)]
	fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
