pub mod fetcher;
pub mod query;
pub mod refresh;
