pub mod analyzer;
pub mod assembler;
pub mod config;
pub mod data_models;
pub mod error;
pub mod lexicon;
pub mod pipeline;
pub mod pool;
pub mod reducer;
pub mod report;
pub mod statistics;
pub mod vocabulary;

pub use error::{PrepError, PrepResult};
pub use pipeline::Pipeline;
