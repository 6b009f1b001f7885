//! Match request and result models

use serde::{Deserialize, Serialize};

/// The five matchable text attributes of a request, in fingerprint order.
///
/// Shared by the request model, the fingerprint function, the similarity
/// matcher, and the correction ingestor so every component derives keys and
/// comparison text from the same shape. Text must be supplied exactly as
/// displayed to the user — no normalization — so manual corrections key
/// identically to later batch lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFields {
    pub name: String,
    pub spec: String,
    pub model: String,
    pub work_content: String,
    pub feature: String,
}

impl MatchFields {
    /// Comparison text for similarity scoring: fields joined with single
    /// spaces, mirroring [`crate::models::QuotaRecord::comparison_text`].
    pub fn comparison_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name, self.spec, self.model, self.work_content, self.feature
        )
    }
}

/// One input line of a match batch.
///
/// Constructed by the host from its import surface, consumed once per batch
/// run, never mutated by the engine except to produce a [`MatchResult`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRequest {
    /// The five matchable fields
    pub fields: MatchFields,
    /// Pre-filled correction code, if the user already chose one
    pub correction_code: Option<String>,
    /// Any other input columns, passed through untouched, in input order
    pub extras: Vec<(String, String)>,
}

impl MatchRequest {
    /// The explicit code driving resolution step 1, if present.
    /// An empty string is treated as absent.
    pub fn explicit_code(&self) -> Option<&str> {
        self.correction_code.as_deref().filter(|c| !c.is_empty())
    }
}

/// How a request was resolved to a quota code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchSource {
    /// The request carried an explicit code found in the catalog
    Explicit,
    /// A bind-cache entry for the request's fingerprint
    Binding,
    /// Text-similarity fallback over the full catalog
    Similarity,
}

/// The quota side of a resolved request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaMatch {
    /// Resolved quota code
    pub code: String,
    /// Quota fields merged into the result: fresh catalog fields for
    /// explicit/similarity resolutions, the frozen bind snapshot for
    /// cache hits
    pub fields: Vec<(String, String)>,
    /// Which resolution branch produced the match
    pub source: MatchSource,
}

/// A request annotated with its resolution, if any.
///
/// Unresolved requests carry no quota fields and pass through unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub request: MatchRequest,
    pub quota: Option<QuotaMatch>,
}

impl MatchResult {
    /// The resolved code: the match's code when resolved, otherwise the
    /// request's explicit code if it carried one (even when not found).
    pub fn resolved_code(&self) -> Option<&str> {
        match &self.quota {
            Some(m) => Some(m.code.as_str()),
            None => self.request.explicit_code(),
        }
    }

    /// True when the request resolved to a quota code
    pub fn is_resolved(&self) -> bool {
        self.quota.is_some()
    }

    /// Flatten into one ordered `(column, value)` row for tabular hosts:
    /// passthrough extras, the five matchable fields under their canonical
    /// names, `correction_code`, then each quota field under the `quota_`
    /// prefix. Hosts address columns by name.
    pub fn into_columns(self) -> Vec<(String, String)> {
        let code = self.resolved_code().unwrap_or_default().to_string();
        let mut columns = self.request.extras;
        columns.push(("name".to_string(), self.request.fields.name));
        columns.push(("spec".to_string(), self.request.fields.spec));
        columns.push(("model".to_string(), self.request.fields.model));
        columns.push(("work_content".to_string(), self.request.fields.work_content));
        columns.push(("feature".to_string(), self.request.fields.feature));
        columns.push(("correction_code".to_string(), code));
        if let Some(quota) = self.quota {
            for (name, value) in quota.fields {
                columns.push((format!("quota_{}", name), value));
            }
        }
        columns
    }
}
