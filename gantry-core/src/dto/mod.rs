//! Data transfer objects
//!
//! Request payloads sent to the backend. Responses reuse the domain types
//! directly.

pub mod connector;
pub mod pipeline;
