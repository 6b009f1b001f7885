//! # QuotaMatch Engine
//!
//! Matching and correction-cache engine for construction-estimate line items.
//! Resolves free-text requests against a priced quota catalog, preferring
//! explicit codes, then previously confirmed corrections (the bind cache),
//! then a text-similarity fallback.
//!
//! The engine is a library consumed by a presentation layer; it has no
//! network or file-format surface of its own. Hosts supply the stores
//! (see [`db`]), feed requests to the [`services::MatchOrchestrator`], and
//! write confirmed fixes back through the [`services::CorrectionIngestor`].

pub mod db;
pub mod models;
pub mod services;

pub use quotamatch_common::{Error, Result};
