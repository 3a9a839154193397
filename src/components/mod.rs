//! UI components.

pub mod star_map;
