//! Session storage.
//!
//! The server-side half of the session transport. One in-memory
//! implementation; the `SessionRepository` trait is the seam for anything
//! persistent.

mod inmemory;

pub use inmemory::SessionStore;
