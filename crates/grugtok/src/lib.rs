//! GrugTok paper server
//!
//! Serves arXiv abstracts to a swipeable flashcard UI, each paper dressed up with a
//! short LLM-written summary: a topic tag, a grug-speak question, the core idea and
//! the bet the authors are making.
//!
//! # Pipeline
//!
//! - **Fetch**: several topic queries against the arXiv Atom API, merged and deduplicated
//! - **Enrich**: one completion call per paper, bounded concurrency, defaults on failure
//! - **Content**: lazy full-text recovery (source, HTML, LaTeX, then a placeholder)
//!
//! # Example
//!
//! ```no_run
//! use grugtok::{config::Config, pipeline::PaperPipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let pipeline = PaperPipeline::new(&config)?;
//!
//!     let page = pipeline.page(10, 0).await?;
//!     println!("{} papers", page.papers.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod content;
pub mod enrich;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod server;
pub mod text;

pub use config::Config;
pub use error::{ApiError, ClientError};
pub use pipeline::PaperPipeline;
pub use server::GrugServer;
