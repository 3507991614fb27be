//! Client for the REST Countries API.
//!
//! - `index` performs the request and hands back the raw body
//! - `models` holds the serde types for the v3.1 payload

pub mod index;
pub mod models;
