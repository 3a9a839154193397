//! Mood tags mapped to star tints.
//!
//! Vibes arrive as free text (often Russian, from the recommendation backend). They
//! are classified into a fixed set of moods by keyword, checked in [`Vibe::ALL`]
//! order so a tag matching several moods always resolves the same way. Keywords
//! match the start of a word, never its middle.

use super::theme::Color;

/// Star tint for nodes whose vibe is missing or unrecognized.
pub const DEFAULT_VIBE_COLOR: Color = Color::rgb(208, 212, 224);

/// Known moods, in match priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Vibe {
	/// Space, epic scale.
	Cosmic,
	/// Dreams and the surreal.
	Dream,
	/// Philosophical, meditative.
	Philosophical,
	/// Noir and dark.
	Noir,
	/// Cyberpunk and neon.
	Cyberpunk,
	/// Tension and mystery.
	Thriller,
	/// Melancholy and quiet.
	Melancholy,
	/// Drama.
	Drama,
	/// Classics and cult films.
	Classic,
}

impl Vibe {
	/// Every vibe in the order keywords are tested.
	pub const ALL: [Vibe; 9] = [
		Vibe::Cosmic,
		Vibe::Dream,
		Vibe::Philosophical,
		Vibe::Noir,
		Vibe::Cyberpunk,
		Vibe::Thriller,
		Vibe::Melancholy,
		Vibe::Drama,
		Vibe::Classic,
	];

	/// Lowercase word prefixes that identify this vibe.
	pub const fn keywords(self) -> &'static [&'static str] {
		match self {
			Vibe::Cosmic => &["космос", "косми", "эпос", "space", "cosmic", "epic"],
			Vibe::Dream => &["сны", "сновид", "dream", "сюрреал", "surreal"],
			Vibe::Philosophical => &["философ", "philosoph", "медитат", "meditat"],
			// "неонуар" must resolve before the cyberpunk "неон" keyword
			Vibe::Noir => &["нуар", "неонуар", "noir", "neo-noir", "мрач", "dark"],
			Vibe::Cyberpunk => &["кибер", "cyber", "неон", "neon"],
			Vibe::Thriller => &["триллер", "психотрил", "thrill", "загадк", "mystery", "напряж", "tense"],
			Vibe::Melancholy => &["меланхол", "melanchol", "груст", "sad", "тишин", "quiet"],
			Vibe::Drama => &["драм", "мелодрам", "drama", "melodrama"],
			Vibe::Classic => &["классик", "classic", "культ", "cult"],
		}
	}

	/// Tint used for this vibe's stars.
	pub const fn color(self) -> Color {
		match self {
			Vibe::Cosmic => Color::rgb(232, 230, 255),
			Vibe::Dream => Color::rgb(214, 196, 255),
			Vibe::Philosophical => Color::rgb(196, 222, 255),
			Vibe::Noir => Color::rgb(190, 196, 214),
			Vibe::Cyberpunk => Color::rgb(150, 235, 255),
			Vibe::Thriller => Color::rgb(255, 205, 190),
			Vibe::Melancholy => Color::rgb(186, 206, 236),
			Vibe::Drama => Color::rgb(255, 226, 196),
			Vibe::Classic => Color::rgb(255, 238, 200),
		}
	}

	/// Classifies free text. Returns the first vibe, in priority order, with a
	/// keyword that starts one of the lowercased words.
	pub fn classify(text: &str) -> Option<Vibe> {
		let lowered = text.to_lowercase();
		let words: Vec<&str> = lowered
			.split(|c: char| !c.is_alphanumeric() && c != '-')
			.filter(|w| !w.is_empty())
			.collect();
		Self::ALL.into_iter().find(|vibe| {
			vibe.keywords()
				.iter()
				.any(|k| words.iter().any(|w| w.starts_with(k)))
		})
	}
}

/// Star tint for an optional vibe tag.
pub fn vibe_color(vibe: Option<&str>) -> Color {
	vibe.and_then(Vibe::classify)
		.map(Vibe::color)
		.unwrap_or(DEFAULT_VIBE_COLOR)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_backend_vibes() {
		assert_eq!(Vibe::classify("эпос"), Some(Vibe::Cosmic));
		assert_eq!(Vibe::classify("сны"), Some(Vibe::Dream));
		assert_eq!(Vibe::classify("философская тишина"), Some(Vibe::Philosophical));
		assert_eq!(Vibe::classify("киберпанк"), Some(Vibe::Cyberpunk));
		assert_eq!(Vibe::classify("триллер"), Some(Vibe::Thriller));
		assert_eq!(Vibe::classify("культ"), Some(Vibe::Classic));
	}

	#[test]
	fn priority_order_breaks_ties() {
		// matches both noir ("нуар") and cyberpunk ("неон")
		assert_eq!(Vibe::classify("неонуар"), Some(Vibe::Noir));
		// matches philosophical and melancholy ("тишин")
		assert_eq!(Vibe::classify("философская тишина"), Some(Vibe::Philosophical));
	}

	#[test]
	fn keywords_only_match_word_starts() {
		assert_eq!(Vibe::classify("персональная драма"), Some(Vibe::Drama));
		assert_eq!(Vibe::classify("сонет"), None);
		assert_eq!(Vibe::classify("мелодрама"), Some(Vibe::Drama));
		assert_eq!(Vibe::classify("тёмный, мрачный"), Some(Vibe::Noir));
	}

	#[test]
	fn classification_ignores_case() {
		assert_eq!(Vibe::classify("Dark Thriller"), Some(Vibe::Noir));
		assert_eq!(Vibe::classify("CYBER"), Some(Vibe::Cyberpunk));
	}

	#[test]
	fn unknown_or_missing_vibe_uses_default() {
		assert_eq!(vibe_color(None), DEFAULT_VIBE_COLOR);
		assert_eq!(vibe_color(Some("romcom")), DEFAULT_VIBE_COLOR);
		assert_eq!(vibe_color(Some("драма")), Vibe::Drama.color());
	}
}
