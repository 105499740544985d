//! Resume uploads and the user profile.
//!
//! Only one resume is kept: an upload replaces the existing one and becomes active.

pub mod extract;
pub mod handlers;
