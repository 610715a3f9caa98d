pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod standardize;
pub mod types;
pub mod util;
