//! API endpoint handlers.
//!
//! Each module corresponds to one resource of the chat surface.

pub mod chat;
pub mod feedback;
pub mod health;
