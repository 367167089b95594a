//! Repository intake for Sourcegraph embeddings.
//!
//! Turns a free-form repository reference into the canonical `host/path`
//! identifier the embeddings scheduler accepts, records every change it makes
//! along the way, and submits the result.

pub mod config;
pub mod error;
pub mod intake;
pub mod telemetry;
