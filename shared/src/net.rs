use tch::nn;
use tch::nn::SequentialT;

use crate::PestLabel;

/// Flattened feature size after two valid-padded conv+pool stages on a
/// 128×128 input: 128 → 126 → 63 → 61 → 30, times 64 channels.
const FLAT_FEATURES: i64 = 64 * 30 * 30;

/// Builds the pest classifier graph.
///
/// The trainer and the server both construct the network through this
/// function, so the variable names and shapes in the saved artifact always
/// line up with what the server expects to load.
///
/// Input is the preprocessor's NHWC `[N, 128, 128, 3]` tensor; the first op
/// rearranges it into the NCHW layout convolutions expect. Output is a
/// `[N, 7]` logit tensor; callers apply softmax where probabilities are
/// needed.
pub fn pest_net(vs: &nn::Path) -> SequentialT {
    nn::seq_t()
        // NHWC → NCHW
        .add_fn(|xs| xs.transpose(1, 3).transpose(2, 3))
        .add(nn::conv2d(vs / "conv1", 3, 32, 3, Default::default()))
        .add_fn(|xs| xs.relu().max_pool2d_default(2))
        .add(nn::conv2d(vs / "conv2", 32, 64, 3, Default::default()))
        .add_fn(|xs| xs.relu().max_pool2d_default(2))
        .add_fn(|xs| xs.flatten(1, -1))
        .add(nn::linear(vs / "fc1", FLAT_FEATURES, 128, Default::default()))
        .add_fn(|xs| xs.relu())
        .add(nn::linear(vs / "fc2", 128, PestLabel::COUNT as i64, Default::default()))
}
