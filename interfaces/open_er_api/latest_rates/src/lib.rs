//! Client for the open exchange-rate API (`open.er-api.com`).

pub mod index;
pub mod models;
