//! Star map visualization for movie recommendations.
//!
//! Renders a recommendation graph on an HTML canvas as a night sky:
//! - Top picks near the center, related titles in an outer ring, laid out on a
//!   golden-angle spiral
//! - Stars that ignite one by one, spring back home, and lean toward the pointer
//! - Pan, anchored zoom, pinch, and star dragging with click-vs-drag detection
//! - Constellation links, mood-tinted glows, and posters for focused stars
//!
//! # Example
//!
//! ```ignore
//! use starmap::{GraphData, MovieLink, MovieNode, StarMapCanvas};
//!
//! let data = GraphData {
//!     nodes: vec![
//!         MovieNode { id: "1".into(), title: "Solaris".into(), is_top: true, .. },
//!         MovieNode { id: "2".into(), title: "Stalker".into(), .. },
//!     ],
//!     links: vec![MovieLink { source: "1".into(), target: "2".into(), strength: 0.8 }],
//! };
//!
//! view! {
//!     <StarMapCanvas
//!         data=Signal::derive(move || data.clone())
//!         on_node_click=Callback::new(|movie| log::info!("{movie:?}"))
//!         fullscreen=true
//!     />
//! }
//! ```

pub mod camera;
mod component;
pub mod dust;
pub mod entrance;
mod error;
pub mod frame_loop;
pub mod interaction;
pub mod layout;
pub mod physics;
pub mod posters;
mod render;
pub mod scale;
pub mod state;
pub mod theme;
mod types;
pub mod vibe;

pub use component::StarMapCanvas;
pub use error::StarMapError;
pub use interaction::InteractionEvent;
pub use state::{StarMapConfig, StarMapState};
pub use theme::Theme;
pub use types::{GraphData, MovieLink, MovieNode};
pub use vibe::Vibe;
