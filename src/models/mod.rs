//! Data models for the object-storage client.
//!
//! These are read-only projections of remote state plus the bookkeeping
//! types the multipart orchestrator threads through one upload.

pub mod multipart;
pub mod object;
