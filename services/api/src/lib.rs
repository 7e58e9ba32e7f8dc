//! services/api/src/lib.rs
//!
//! HTTP surface for AI-generated study content: the OpenAI completion adapter,
//! environment configuration and the REST handlers the UI calls.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
