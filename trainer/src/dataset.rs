use std::fs;
use std::path::Path;

use rand::seq::SliceRandom;
use shared::preprocess;
use shared::PestLabel;
use tch::Tensor;

/// Share of the dataset held out for validation.
pub const VALIDATION_FRACTION: f64 = 0.2;

/// One preprocessed sample: an NHWC `[1,128,128,3]` image tensor and its
/// class index.
pub struct Sample {
    pub image: Tensor,
    pub label: i64,
}

/// Reads `root/<label>/*` for every label, in declaration order.
///
/// Class indices follow `PestLabel::ALL`, the same order the server uses to
/// map predictions back to labels. Files that fail to decode are skipped
/// with a warning; a missing label folder contributes no samples.
pub fn load_labeled_tree(root: &Path) -> anyhow::Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (index, label) in PestLabel::ALL.iter().enumerate() {
        let dir = root.join(label.to_string());
        if !dir.is_dir() {
            log::warn!("No folder for class '{}' at {}", label, dir.display());
            continue;
        }
        let mut count = 0usize;
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let bytes = fs::read(&path)?;
            match preprocess::image_to_tensor(&bytes) {
                Ok(image) => {
                    samples.push(Sample {
                        image,
                        label: index as i64,
                    });
                    count += 1;
                }
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        log::info!("Class '{}': {} images", label, count);
    }
    Ok(samples)
}

/// Shuffles the samples and splits off the trailing `fraction` as the
/// validation set.
pub fn split(mut samples: Vec<Sample>, fraction: f64) -> (Vec<Sample>, Vec<Sample>) {
    samples.shuffle(&mut rand::rng());
    let val_len = (samples.len() as f64 * fraction) as usize;
    let train_len = samples.len() - val_len;
    let val = samples.split_off(train_len);
    (samples, val)
}
