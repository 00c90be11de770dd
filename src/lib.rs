//! itinera is a travel-itinerary planning library built around a
//! retrieval-augmented generation pipeline.
//!
//! # Overview
//! A request flows through three sequential stages, each talking to external
//! services behind narrow, stubbable traits:
//!
//! - A tool-using search agent gathers current information (web search,
//!   encyclopedia lookup) under a bounded reasoning loop
//! - A document retriever fetches a reference page, splits and transforms it,
//!   embeds the chunks and answers a nearest-neighbor query
//! - A plan synthesizer fills a fixed prompt template and makes the final
//!   model call
//!
//! An entry-point adapter wraps the whole pipeline for HTTP-shaped
//! invocation.
//!
//! # Example
//! ```no_run
//! use itinera::{config::PlannerConfig, pipeline::TravelPlanner};
//!
//! # async fn run() -> Result<(), itinera::error::PlannerError> {
//! let config = PlannerConfig::from_env()?;
//! let planner = TravelPlanner::from_config(config)?;
//! let itinerary = planner.plan("Plan a trip to London in August 2026").await?;
//! println!("{itinerary}");
//! # Ok(())
//! # }
//! ```

// Re-export for convenience
pub use async_trait::async_trait;

/// Search agent with a bounded tool-dispatch loop
pub mod agent;

/// Entry-point adapter and HTTP server
pub mod api;

/// Backend implementations for external model providers
pub mod backends;

/// Chat-based interactions with language models
pub mod chat;

/// Immutable pipeline configuration
pub mod config;

/// Vector embeddings generation for text
pub mod embedding;

/// Error types and handling
pub mod error;

/// Reference-document fetching
pub mod fetcher;

/// Pipeline composition
pub mod pipeline;

/// Index building and nearest-neighbor retrieval
pub mod retriever;

/// Boundary-aware document splitting
pub mod splitter;

/// Final itinerary synthesis
pub mod synthesizer;

/// Tools exposed to the search agent
pub mod tools;

/// Markup-to-prose transformation
pub mod transform;

/// Vector index over embedded chunks
pub mod vector_store;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
