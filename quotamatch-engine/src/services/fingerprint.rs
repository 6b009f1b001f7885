//! Condition fingerprinting
//!
//! Derives the bind-cache key from a request's five matchable fields. The
//! batch lookup path and the correction ingestor call the same function, so
//! cache writes and reads always agree on key derivation.

use crate::models::MatchFields;
use md5::{Digest, Md5};

/// Deterministic 128-bit digest of the five matchable fields, concatenated
/// in fixed order with no separators, hex-encoded (32 lowercase chars).
///
/// No normalization is applied: callers supply text exactly as displayed to
/// the user. Collisions between distinct tuples are accepted, not detected.
pub fn fingerprint(fields: &MatchFields) -> String {
    let mut hasher = Md5::new();
    hasher.update(fields.name.as_bytes());
    hasher.update(fields.spec.as_bytes());
    hasher.update(fields.model.as_bytes());
    hasher.update(fields.work_content.as_bytes());
    hasher.update(fields.feature.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(name: &str, spec: &str, model: &str, work: &str, feature: &str) -> MatchFields {
        MatchFields {
            name: name.to_string(),
            spec: spec.to_string(),
            model: model.to_string(),
            work_content: work.to_string(),
            feature: feature.to_string(),
        }
    }

    #[test]
    fn test_deterministic() {
        let tuple = fields("砖墙", "240mm", "", "砌筑", "");
        assert_eq!(fingerprint(&tuple), fingerprint(&tuple.clone()));
    }

    #[test]
    fn test_known_digests() {
        // MD5 of the empty concatenation
        assert_eq!(
            fingerprint(&MatchFields::default()),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        // MD5 of "abcde"
        assert_eq!(
            fingerprint(&fields("a", "b", "c", "d", "e")),
            "ab56b4d92b40713acc5af89985d4b786"
        );
        // MD5 of the UTF-8 bytes of "砖墙砌筑"
        assert_eq!(
            fingerprint(&fields("砖墙", "", "", "砌筑", "")),
            "4b39f5a599e725275e747567f901af97"
        );
    }

    #[test]
    fn test_differing_tuples_differ() {
        let base = fields("砖墙", "240mm", "", "砌筑", "");
        let other = fields("砖墙", "370mm", "", "砌筑", "");
        assert_ne!(fingerprint(&base), fingerprint(&other));
    }

    #[test]
    fn test_concatenation_has_no_separators() {
        // Field boundaries are not marked: shifting text across adjacent
        // fields yields the same concatenation and therefore the same key.
        assert_eq!(
            fingerprint(&fields("ab", "", "", "", "")),
            fingerprint(&fields("a", "b", "", "", ""))
        );
    }
}
