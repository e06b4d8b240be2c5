//! URL and path-segment handling
//!
//! Links found in fetched resources are upgraded to https before use, and any
//! remote string that becomes part of a mirror path goes through
//! [`sanitize_segment`] first.

mod normalize;
mod segment;

pub use normalize::upgrade_to_https;
pub use segment::sanitize_segment;
