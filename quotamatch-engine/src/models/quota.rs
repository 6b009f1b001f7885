//! Quota catalog record model

use serde::{Deserialize, Serialize};

/// One priced catalog entry.
///
/// The five matchable attributes (`name`, `spec`, `model`, `work_content`,
/// `feature`) drive fingerprinting and similarity comparison. Every other
/// catalog column (units, prices, labor rates, whatever the host's schema
/// carries) passes through opaquely in store column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaRecord {
    /// Unique business key (quota number)
    pub code: String,
    pub name: String,
    pub spec: String,
    pub model: String,
    pub work_content: String,
    pub feature: String,
    /// Non-matchable columns, (column name, value), in store column order
    pub extras: Vec<(String, String)>,
}

impl QuotaRecord {
    /// Comparison text for similarity scoring: the five matchable fields
    /// joined with single spaces. Empty fields contribute empty strings, so
    /// interior and trailing spaces occur; the tokenizer discards them.
    pub fn comparison_text(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.name, self.spec, self.model, self.work_content, self.feature
        )
    }

    /// Full ordered field list for freezing into a bind entry or merging
    /// into a match result: canonical fields first, then extras in store
    /// column order.
    pub fn snapshot(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("code".to_string(), self.code.clone()),
            ("name".to_string(), self.name.clone()),
            ("spec".to_string(), self.spec.clone()),
            ("model".to_string(), self.model.clone()),
            ("work_content".to_string(), self.work_content.clone()),
            ("feature".to_string(), self.feature.clone()),
        ];
        fields.extend(self.extras.iter().cloned());
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuotaRecord {
        QuotaRecord {
            code: "A1-001".to_string(),
            name: "砖墙".to_string(),
            spec: "240mm".to_string(),
            model: String::new(),
            work_content: "砌筑".to_string(),
            feature: String::new(),
            extras: vec![
                ("unit".to_string(), "m3".to_string()),
                ("price".to_string(), "420.5".to_string()),
            ],
        }
    }

    #[test]
    fn test_comparison_text_preserves_empty_fields() {
        assert_eq!(sample().comparison_text(), "砖墙 240mm  砌筑 ");
    }

    #[test]
    fn test_snapshot_is_canonical_then_extras() {
        let snapshot = sample().snapshot();
        let names: Vec<&str> = snapshot.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            vec!["code", "name", "spec", "model", "work_content", "feature", "unit", "price"]
        );
        assert_eq!(snapshot[0].1, "A1-001");
        assert_eq!(snapshot[7].1, "420.5");
    }
}
