//! HTTP chat surface.
//!
//! One route per user action of the chat page: send a question, read or
//! end a session, submit feedback, read feedback stats. Routes are nested
//! under `/api/` and wrapped by an access-log middleware.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
