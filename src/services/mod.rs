//! High-level operations built on top of the backend primitives.

pub mod flavor;
pub mod multipart;
pub mod session;
