//! Canonical, diff-friendly formatting for UFO font sources.
//!
//! Glyph files are rewritten with a fixed element and attribute order and
//! canonical numbers, property lists are re-serialized, and layer
//! directories and glyph files are renamed to the names derived from their
//! user-facing names.

#[cfg(feature = "cli")]
pub mod args;
pub mod color;
pub mod config;
mod error;
pub mod files;
pub mod glif;
pub mod guideline;
pub mod layers;
pub mod names;
pub mod number;
pub mod plist;
pub mod transform;
pub mod tree;
pub mod ufo;
pub mod xml;

pub use config::Config;
pub use error::Error;
pub use glif::{normalize_glif, normalize_glif_text};
pub use names::user_name_to_file_name;
pub use plist::Plist;
pub use ufo::{normalize_ufo, Summary};
