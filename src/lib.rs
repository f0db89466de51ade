pub mod candidates;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod overlap;
pub mod similarity;
pub mod util;
