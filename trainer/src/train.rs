use rand::seq::SliceRandom;
use shared::net::pest_net;
use tch::nn::{self, ModuleT, OptimizerConfig};
use tch::{Device, Kind, Tensor};

use crate::dataset::Sample;

pub const EPOCHS: usize = 10;
pub const BATCH_SIZE: usize = 32;
const LEARNING_RATE: f64 = 1e-3;

/// Trains the pest classifier and returns the `VarStore` holding its
/// weights, ready to be saved as the serving artifact.
///
/// A single fixed-shape run: mini-batch Adam over shuffled samples,
/// cross-entropy on logits, one validation-accuracy measurement per epoch.
pub fn run(
    train_set: &[Sample],
    val_set: &[Sample],
    device: Device,
) -> anyhow::Result<nn::VarStore> {
    let vs = nn::VarStore::new(device);
    let net = pest_net(&vs.root());
    let mut opt = nn::Adam::default().build(&vs, LEARNING_RATE)?;

    let mut order: Vec<usize> = (0..train_set.len()).collect();
    for epoch in 1..=EPOCHS {
        order.shuffle(&mut rand::rng());
        let mut total_loss = 0f64;
        let mut batches = 0usize;
        for chunk in order.chunks(BATCH_SIZE) {
            let (images, labels) = stack_batch(train_set, chunk, device);
            let logits = net.forward_t(&images, true);
            let loss = logits.cross_entropy_for_logits(&labels);
            opt.backward_step(&loss);
            total_loss += loss.double_value(&[]);
            batches += 1;
        }
        let val_accuracy = evaluate(&net, val_set, device);
        log::info!(
            "epoch {:2}/{}  train loss {:.4}  val accuracy {:.1}%",
            epoch,
            EPOCHS,
            total_loss / batches.max(1) as f64,
            100.0 * val_accuracy
        );
    }

    Ok(vs)
}

/// Fraction of samples whose arg-max prediction matches the label.
/// Returns 0 for an empty set.
pub fn evaluate(net: &impl ModuleT, samples: &[Sample], device: Device) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let indices: Vec<usize> = (0..samples.len()).collect();
    let mut correct = 0i64;
    tch::no_grad(|| {
        for chunk in indices.chunks(BATCH_SIZE) {
            let (images, labels) = stack_batch(samples, chunk, device);
            let predicted = net.forward_t(&images, false).argmax(-1, false);
            correct += predicted
                .eq_tensor(&labels)
                .sum(Kind::Int64)
                .int64_value(&[]);
        }
    });
    correct as f64 / samples.len() as f64
}

/// Stacks the selected samples into `[N,128,128,3]` images and `[N]`
/// labels on the training device.
fn stack_batch(samples: &[Sample], indices: &[usize], device: Device) -> (Tensor, Tensor) {
    let images: Vec<&Tensor> = indices.iter().map(|&i| &samples[i].image).collect();
    let labels: Vec<i64> = indices.iter().map(|&i| samples[i].label).collect();
    (
        Tensor::cat(&images, 0).to_device(device),
        Tensor::from_slice(&labels).to_device(device),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noise_samples(count: usize) -> Vec<Sample> {
        (0..count)
            .map(|i| Sample {
                image: Tensor::rand(&[1i64, 128, 128, 3][..], tch::kind::FLOAT_CPU),
                label: (i % 2) as i64,
            })
            .collect()
    }

    #[test]
    fn stack_batch_concatenates_along_the_batch_dimension() {
        let samples = noise_samples(5);
        let (images, labels) = stack_batch(&samples, &[0, 2, 4], Device::Cpu);
        assert_eq!(images.size(), vec![3, 128, 128, 3]);
        assert_eq!(labels.size(), vec![3]);
        assert_eq!(Vec::<i64>::try_from(&labels).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn evaluate_is_a_fraction_between_zero_and_one() {
        let vs = nn::VarStore::new(Device::Cpu);
        let net = pest_net(&vs.root());
        let samples = noise_samples(4);
        let accuracy = evaluate(&net, &samples, Device::Cpu);
        assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn evaluate_handles_an_empty_validation_set() {
        let vs = nn::VarStore::new(Device::Cpu);
        let net = pest_net(&vs.root());
        assert_eq!(evaluate(&net, &[], Device::Cpu), 0.0);
    }
}
