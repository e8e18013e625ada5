//! URL handling module for LinkScout
//!
//! This module provides seed validation, origin comparison and the
//! normalization used to deduplicate page candidates.

mod normalize;
mod origin;

pub use normalize::{dedup_key, normalize_url};
pub use origin::{homepage_of, parse_seed_url, same_origin};
