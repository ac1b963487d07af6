pub mod error;
pub mod filter;
pub mod geo;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod storage;
