use std::sync::{Arc, Mutex};

use tch::nn::{self, ModuleT, SequentialT};
use tch::Device;

use shared::net::pest_net;
use shared::preprocess::{self, PreprocessError};

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("model error: {0}")]
    Model(#[from] tch::TchError),
}

/// The pest classifier service: the trained network, loaded once at
/// startup and shared read-only across all requests.
#[derive(Clone)]
pub struct Classifier {
    net: Arc<Mutex<SequentialT>>,
    device: Device,
}

impl Classifier {
    /// Builds the network graph and fills it from the trained artifact.
    ///
    /// A missing or corrupt artifact surfaces here; the caller treats that
    /// as fatal before the listener is bound.
    pub fn load(artifact_path: &str) -> Result<Self, ClassifierError> {
        let device = Device::cuda_if_available();
        let mut vs = nn::VarStore::new(device);
        let net = pest_net(&vs.root());
        vs.load(artifact_path)?;
        Ok(Self {
            net: Arc::new(Mutex::new(net)),
            device,
        })
    }

    /// Classifies one uploaded image, returning the softmax probability of
    /// each `PestLabel` in declaration order.
    pub fn predict(&self, image: &[u8]) -> Result<Vec<f32>, ClassifierError> {
        let input = preprocess::image_to_tensor(image)?.to_device(self.device);
        let net = self.net.lock().unwrap();
        let output = tch::no_grad(|| net.forward_t(&input, false));
        let probabilities = output.softmax(-1, tch::Kind::Float).view([-1]);
        let num_elements = probabilities.size()[0] as usize;
        let mut scores = vec![0.0f32; num_elements];
        probabilities.copy_data(&mut scores, num_elements);
        Ok(scores)
    }

    /// A classifier with freshly initialized weights, for exercising the
    /// request path without an artifact on disk.
    #[cfg(test)]
    pub fn with_random_weights() -> Self {
        let device = Device::Cpu;
        let vs = nn::VarStore::new(device);
        let net = pest_net(&vs.root());
        Self {
            net: Arc::new(Mutex::new(net)),
            device,
        }
    }
}
