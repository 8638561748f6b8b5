//! Core ETL abstractions
//!
//! A worker fetches batches from a source and dumps them to a destination;
//! [`drain`] runs the fetch/dump cycle until the worker is exhausted.

mod extract;
mod load;
mod pipeline;
mod transform;

pub use extract::Extractor;
pub use load::Loader;
pub use pipeline::{PipelineStats, drain};
pub use transform::Transformer;
