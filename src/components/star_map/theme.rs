//! Visual theming for the star map.
//!
//! Colors for the night-sky background, ambient dust, constellation links, and the
//! stars themselves.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
	/// Alpha in [0, 1].
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with alpha replaced, clamped to [0, 1].
	pub fn with_alpha(self, a: f64) -> Self {
		Self {
			a: a.clamp(0.0, 1.0),
			..self
		}
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// Hex when opaque, `rgba()` otherwise.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Night-sky background.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Color at the center of the radial gradient
	pub center: Color,
	/// Color at the edges
	pub edge: Color,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Ambient dust drifting behind the map. Drawn in screen space.
#[derive(Clone, Debug)]
pub struct DustStyle {
	/// Draw dust at all.
	pub enabled: bool,
	/// Number of motes.
	pub count: usize,
	/// Mote color.
	pub color: Color,
	/// Mote radius range in pixels.
	pub size_min: f64,
	/// Largest mote radius.
	pub size_max: f64,
	/// Drift speed in pixels per frame at 60fps
	pub speed: f64,
	/// Peak mote opacity.
	pub opacity: f64,
}

/// Constellation lines between related movies.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Base line color.
	pub color: Color,
	/// Color for links touching the selected or hovered star
	pub accent: Color,
	/// Alpha at the ends of the line before strength is added
	pub base_alpha: f64,
}

/// Star appearance.
#[derive(Clone, Debug)]
pub struct StarStyle {
	/// Core tint for top recommendations
	pub top_core: Color,
	/// Core tint for related titles
	pub secondary_core: Color,
	/// Glow for top recommendations
	pub top_glow: Color,
	/// Glow and ring color of the selected star
	pub selected: Color,
	/// Glow boost color while hovered or dragged
	pub hovered: Color,
	/// Label text for top recommendations
	pub top_label: Color,
	/// Label text for related titles
	pub label: Color,
	/// Plate drawn behind labels
	pub label_plate: Color,
	/// Secondary text (year, vibe)
	pub detail: Color,
	/// Rotation speed of the star points in radians per second
	pub spin_speed: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Display name.
	pub name: &'static str,
	/// Sky gradient and vignette.
	pub background: BackgroundStyle,
	/// Background dust.
	pub dust: DustStyle,
	/// Constellation lines.
	pub link: LinkStyle,
	/// Stars and labels.
	pub star: StarStyle,
}

impl Theme {
	/// Deep-space theme with gold constellations (default)
	pub fn night_sky() -> Self {
		Self {
			name: "night_sky",
			background: BackgroundStyle {
				center: Color::rgb(16, 22, 36),
				edge: Color::rgb(10, 14, 23),
				vignette: 0.25,
			},
			dust: DustStyle {
				enabled: true,
				count: 140,
				color: Color::rgb(200, 210, 235),
				size_min: 0.3,
				size_max: 1.3,
				speed: 0.06,
				opacity: 0.55,
			},
			link: LinkStyle {
				color: Color::rgb(139, 115, 85),
				accent: Color::rgb(255, 215, 0),
				base_alpha: 0.15,
			},
			star: StarStyle {
				top_core: Color::rgb(232, 230, 255),
				secondary_core: Color::rgb(208, 212, 224),
				top_glow: Color::rgb(255, 215, 0),
				selected: Color::rgb(76, 201, 240),
				hovered: Color::rgb(255, 255, 255),
				top_label: Color::rgb(255, 215, 0),
				label: Color::rgb(226, 226, 226),
				label_plate: Color::rgba(5, 5, 8, 0.7),
				detail: Color::rgb(160, 160, 160),
				spin_speed: 0.25,
			},
		}
	}

	/// Same palette with the dust field switched off, for low-power devices
	pub fn still() -> Self {
		let mut theme = Self::night_sky();
		theme.name = "still";
		theme.dust.enabled = false;
		theme.dust.count = 0;
		theme
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::night_sky()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn opaque_colors_render_as_hex() {
		assert_eq!(Color::rgb(255, 215, 0).to_css(), "#ffd700");
		assert_eq!(
			Color::rgba(10, 20, 30, 0.5).to_css(),
			"rgba(10, 20, 30, 0.500)"
		);
	}

	#[test]
	fn lerp_hits_endpoints() {
		let a = Color::rgb(0, 0, 0);
		let b = Color::rgb(200, 100, 50);
		assert_eq!(a.lerp(b, 0.0), a);
		assert_eq!(a.lerp(b, 1.0), b);
		assert_eq!(a.lerp(b, 0.5), Color::rgb(100, 50, 25));
	}

	#[test]
	fn lighten_moves_towards_white() {
		let c = Color::rgb(100, 100, 100).lighten(1.0);
		assert_eq!((c.r, c.g, c.b), (255, 255, 255));
	}

	#[test]
	fn still_theme_disables_dust() {
		let theme = Theme::still();
		assert!(!theme.dust.enabled);
		assert_eq!(theme.link.accent, Theme::night_sky().link.accent);
	}
}
