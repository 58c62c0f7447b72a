pub mod net;
pub mod preprocess;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Classification outcome for a crop-leaf photo: healthy, or one of six
/// pests.
///
/// Declaration order is significant. It is the classifier's output index
/// order: the trainer assigns class indices by walking `PestLabel::ALL`
/// when it reads the dataset folders, and the server maps arg-max indices
/// back through the same array. The lowercase string form doubles as the
/// dataset folder name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PestLabel {
    Healthy,
    Aphid,
    Mite,
    Thrips,
    Whitefly,
    Bollworm,
    Leafminer,
}

impl PestLabel {
    /// Every label, in classifier output index order.
    pub const ALL: [PestLabel; 7] = [
        PestLabel::Healthy,
        PestLabel::Aphid,
        PestLabel::Mite,
        PestLabel::Thrips,
        PestLabel::Whitefly,
        PestLabel::Bollworm,
        PestLabel::Leafminer,
    ];

    /// Number of classes the classifier distinguishes.
    pub const COUNT: usize = Self::ALL.len();

    /// Maps a classifier output index back to its label.
    pub fn from_index(index: usize) -> Option<PestLabel> {
        Self::ALL.get(index).copied()
    }

    pub fn is_healthy(self) -> bool {
        matches!(self, PestLabel::Healthy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_order_matches_classifier_indices() {
        let names: Vec<String> = PestLabel::ALL.iter().map(|l| l.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "healthy",
                "aphid",
                "mite",
                "thrips",
                "whitefly",
                "bollworm",
                "leafminer"
            ]
        );
    }

    #[test]
    fn from_index_covers_every_class() {
        assert_eq!(PestLabel::COUNT, 7);
        for (i, label) in PestLabel::ALL.iter().enumerate() {
            assert_eq!(PestLabel::from_index(i), Some(*label));
        }
        assert_eq!(PestLabel::from_index(PestLabel::COUNT), None);
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!("aphid".parse::<PestLabel>().unwrap(), PestLabel::Aphid);
        assert_eq!("healthy".parse::<PestLabel>().unwrap(), PestLabel::Healthy);
        assert!("locust".parse::<PestLabel>().is_err());
    }

    #[test]
    fn only_healthy_is_healthy() {
        assert!(PestLabel::Healthy.is_healthy());
        for label in PestLabel::ALL.iter().skip(1) {
            assert!(!label.is_healthy());
        }
    }
}
