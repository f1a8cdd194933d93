//! Ranking: reciprocal-rank fusion of the sub-query lists, result-set
//! assembly with facet post-processing, and mode-aware highlighting.

pub mod assemble;
pub mod fusion;
pub mod highlight;

pub use assemble::assemble;
pub use fusion::{rrf_fuse, RRF_K};
pub use highlight::{annotate, render_summary};
