mod dataset;
mod train;

use anyhow::Context;
use shared::PestLabel;

/// Fixed relative paths: one subfolder per `PestLabel` under `dataset/`,
/// artifact written next to the working directory for the server to pick up.
const DATASET_DIR: &str = "dataset";
const ARTIFACT_PATH: &str = "crop_pest_model.safetensors";

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("Loading dataset from {}/", DATASET_DIR);
    let samples = dataset::load_labeled_tree(std::path::Path::new(DATASET_DIR))?;
    anyhow::ensure!(
        !samples.is_empty(),
        "no usable images found under {}/",
        DATASET_DIR
    );
    log::info!(
        "Loaded {} images across {} classes",
        samples.len(),
        PestLabel::COUNT
    );

    let (train_set, val_set) = dataset::split(samples, dataset::VALIDATION_FRACTION);
    log::info!(
        "Training on {} images, validating on {}",
        train_set.len(),
        val_set.len()
    );

    let device = tch::Device::cuda_if_available();
    let vs = train::run(&train_set, &val_set, device)?;

    vs.save(ARTIFACT_PATH)
        .with_context(|| format!("failed to write {}", ARTIFACT_PATH))?;
    log::info!("Model saved as {}", ARTIFACT_PATH);
    Ok(())
}
