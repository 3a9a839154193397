//! Errors surfaced while wiring the star map into the page.

use wasm_bindgen::JsValue;

/// Setup and teardown failures. Per-frame drawing errors are logged and skipped
/// rather than surfaced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StarMapError {
	/// No `window` (not running in a browser).
	#[error("window is not available")]
	WindowNotAvailable,

	/// The canvas has no 2D context.
	#[error("2d context unavailable: {0}")]
	ContextUnavailable(String),

	/// `requestAnimationFrame` refused the callback.
	#[error("failed to request animation frame: {0}")]
	RequestFailed(String),

	/// An event listener could not be attached.
	#[error("failed to attach {event} listener: {reason}")]
	ListenerFailed {
		/// DOM event name.
		event: &'static str,
		/// What the browser reported.
		reason: String,
	},

	/// The embedded graph payload did not parse.
	#[error("graph payload is not valid: {0}")]
	InvalidPayload(String),
}

/// Readable form of a JS exception for error messages.
pub(crate) fn describe(err: &JsValue) -> String {
	err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
