//! Data models for papers and API envelopes.
//!
//! All models serialize with `#[serde(rename_all = "camelCase")]` to match what the
//! flashcard UI reads.

mod inputs;
mod paper;

pub use inputs::PapersQuery;
pub use paper::{Enrichment, Paper, PaperContent, PapersPage};
