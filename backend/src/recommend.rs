use std::collections::HashMap;

use serde::Deserialize;
use shared::PestLabel;

/// What to spray, how much, and how often.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRecord {
    pub pesticide: String,
    pub dosage: String,
    pub interval: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("recommendations table is malformed: {0}")]
    Parse(#[from] serde_yaml::Error),
}

const RECOMMENDATIONS_YAML: &str = include_str!("../config/recommendations.yaml");

pub const HEALTHY_MESSAGE: &str = "✅ The crop is healthy! No pesticide required.";

/// The static pesticide lookup table, parsed once at startup from the
/// embedded YAML document and injected read-only into the request path.
///
/// Keys are lowercase label names. The key set is open: a label with no
/// entry falls back to a "no info available" advisory rather than failing.
pub struct RecommendationTable {
    records: HashMap<String, RecommendationRecord>,
}

impl RecommendationTable {
    pub fn load() -> Result<Self, RecommendError> {
        let records = serde_yaml::from_str(RECOMMENDATIONS_YAML)?;
        Ok(Self { records })
    }

    pub fn get(&self, label: PestLabel) -> Option<&RecommendationRecord> {
        self.records.get(&label.to_string())
    }

    /// Warns about pests the table has no entry for. Run once at startup;
    /// a miss is not fatal because the fallback advisory covers it.
    pub fn verify_coverage(&self) {
        for label in PestLabel::ALL.iter().filter(|l| !l.is_healthy()) {
            if self.get(*label).is_none() {
                log::warn!(
                    "No pesticide recommendation configured for pest '{}'",
                    label
                );
            }
        }
    }

    /// The user-facing advisory for a predicted label, as trusted HTML.
    pub fn advisory(&self, label: PestLabel) -> String {
        if label.is_healthy() {
            HEALTHY_MESSAGE.to_string()
        } else {
            pest_advisory(&label.to_string(), self.get(label))
        }
    }
}

fn pest_advisory(name: &str, record: Option<&RecommendationRecord>) -> String {
    match record {
        Some(info) => format!(
            "⚠️ The crop is affected by <b>{}</b>.<br>\
             💊 <b>Recommended pesticide:</b> {}<br>\
             🧪 <b>Dosage:</b> {}<br>\
             ⏱️ <b>Spray interval:</b> {}",
            name, info.pesticide, info.dosage, info.interval
        ),
        None => format!(
            "⚠️ Pest detected: <b>{}</b>. No pesticide info available.",
            name
        ),
    }
}
