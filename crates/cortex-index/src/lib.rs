//! Retrieval engine: file scanning, overlapping line-window chunking,
//! flat-file embedding storage, and cosine-similarity search.
//!
//! The pipeline indexes a project incrementally by content hash, embeds
//! chunks through an [`cortex_llm::LlmProvider`], persists everything as
//! pretty-printed JSON, and answers questions by feeding the most similar
//! chunks to the generation model.

pub mod chunker;
pub mod error;
pub mod pipeline;
pub mod scanner;
pub mod store;
mod summary;

pub use chunker::{Chunk, chunk_lines};
pub use error::{IndexError, Result};
pub use pipeline::{
    DEFAULT_SEARCH_RESULTS, IndexReport, RagPipeline, SearchHit, cosine_similarity,
    format_search_results,
};
pub use store::{IndexStore, Summary};
