//! Gantry Core
//!
//! Core types for the Gantry pipeline designer.
//!
//! This crate contains:
//! - Domain types: pipeline graphs, plugin catalog entries, config schemas,
//!   execution results
//! - DTOs: request/response payloads exchanged with the backend

pub mod domain;
pub mod dto;
