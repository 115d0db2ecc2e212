//! Pure helpers shared by the schema engine
//!
//! Everything in this module is a standalone function over plain data:
//! - Dotted-path flattening and lookup for JSON objects
//! - Restriction checks for structural validation
//! - Message template rendering for configurable error text

mod dot;
mod render;
mod restrict;

pub use dot::{find_by_path, obj_to_dot};
pub(crate) use dot::join_path;
pub use render::render;
pub use restrict::properties_restricted;
