//! # doc-search
//!
//! A search-relevance service composing lexical and learned-sparse
//! retrieval over a document corpus, fusing the two rankings with
//! reciprocal rank fusion and enriching results with facet counts and
//! mode-aware highlighting.
//!
//! ## Architecture
//!
//! One request runs a single synchronous pipeline:
//!
//! ```text
//!              ┌──────────────────────┐
//!              │ query=... file_type=* │
//!              └──────────┬───────────┘
//!                         │
//!                         ▼
//!              ┌──────────────────────┐
//!              │     Query Parser      │  category:<x> → structured filter
//!              └──────────┬───────────┘
//!                         │ (filters, residual text)
//!                         ▼
//!              ┌──────────────────────┐
//!              │   Retrieval Planner   │  mode → lexical field set
//!              └──────────┬───────────┘  sparse model ready → semantic leg
//!                         │ PlanSpec
//!            ┌────────────┴────────────┐
//!            ▼                         ▼
//!    ┌──────────────┐         ┌──────────────┐
//!    │ Lexical query │         │ Semantic query│   (one combined round
//!    │ + facet aggs  │         │ (text expand) │    to the document index)
//!    └───────┬──────┘         └───────┬──────┘
//!            └────────────┬────────────┘
//!                         │ two ranked lists + buckets
//!                         ▼
//!              ┌──────────────────────┐
//!              │      RRF Fusion       │  1/(k+rank), dedup, tie-break
//!              └──────────┬───────────┘
//!                         │ fused list
//!                         ▼
//!              ┌──────────────────────┐
//!              │  Assemble + Facets    │  page fused list, drop empty years
//!              └──────────┬───────────┘
//!                         │
//!                         ▼
//!              ┌──────────────────────┐
//!              │ Highlight + Render    │  mode-aware marks, Markdown→HTML
//!              └──────────┬───────────┘
//!                         ▼
//!              {results, query, from_, total, aggs}
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the server, index
//!   connection, and model deployment bounds
//! - [`error`] - Error taxonomy: model unavailability degrades, backend
//!   unavailability is fatal to the request
//! - [`models`] - Shared data types: `Document`, `Hit`, facet and
//!   request/response types
//! - [`query`] - Filter extraction and retrieval planning
//! - [`search`] - Reciprocal rank fusion, result assembly, highlighting
//! - [`index`] - The external document index: trait + Elasticsearch adapter
//! - [`model`] - The embedding service: trait + deployment state machine
//! - [`corpus`] - JSON/directory corpus loading for reindex
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state with injected collaborators

pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod model;
pub mod models;
pub mod query;
pub mod search;
pub mod state;
