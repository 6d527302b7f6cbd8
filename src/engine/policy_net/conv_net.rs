use std::error::Error;
use tch::{nn, Device, Kind, Tensor};

use crate::engine::policy_net::constants::{
    INPUT_CONV_KERNEL, MID_CONV_KERNEL, NUM_FEATURE_PLANES,
};
use crate::utils::NUM_INTERSECTIONS;

/// Anything that maps a feature-plane stack (N, 13, 19, 19) to a move
/// distribution (N, 361).
pub trait MovePredictor {
    fn forward(&self, planes: &Tensor) -> Tensor;
}

// Define the main model structure
#[derive(Debug)]
pub struct PolicyNet {
    pub vs: nn::VarStore,
    pub num_filters: i64,
    pub conv_input: nn::Conv2D,
    pub conv_mid: Vec<nn::Conv2D>,
    pub conv_head: nn::Conv2D,
}

impl PolicyNet {
    pub fn new(device: Device, num_conv_layers: usize, num_filters: i64) -> PolicyNet {
        assert!(num_conv_layers >= 3, "need at least input, one mid and head layer");
        let vs = nn::VarStore::new(device);
        let root = &vs.root();

        // Layer 1: 13 x 19 x 19 -> num_filters x 19 x 19, wide kernel
        let conv_input = nn::conv2d(
            root,
            NUM_FEATURE_PLANES as i64,
            num_filters,
            INPUT_CONV_KERNEL,
            nn::ConvConfig { padding: 2, ..Default::default() },
        );

        // Layers 2..: num_filters x 19 x 19 -> num_filters x 19 x 19
        let mut conv_mid = Vec::new();
        for _ in 0..num_conv_layers - 2 {
            conv_mid.push(nn::conv2d(
                root,
                num_filters,
                num_filters,
                MID_CONV_KERNEL,
                nn::ConvConfig { padding: 1, ..Default::default() },
            ));
        }

        // Final layer: 1x1 kernel down to a single plane over the grid
        let conv_head = nn::conv2d(root, num_filters, 1, 1, Default::default());

        PolicyNet {
            vs,
            num_filters,
            conv_input,
            conv_mid,
            conv_head,
        }
    }

    /// Save model weights
    pub fn save(&self, path: &str) -> Result<(), Box<dyn Error>> {
        self.vs.save(path)?;
        Ok(())
    }

    /// Load model weights
    pub fn load(&mut self, path: &str) -> Result<(), Box<dyn Error>> {
        self.vs.load(path)?;
        Ok(())
    }
}

impl MovePredictor for PolicyNet {
    /// Forward pass through the model. The output is a post-softmax
    /// distribution over the 361 intersections, one row per board.
    fn forward(&self, planes: &Tensor) -> Tensor {
        assert_eq!(planes.size().len(), 4);
        assert_eq!(planes.size()[1..4], [NUM_FEATURE_PLANES as i64, 19, 19]);
        assert!(planes.size()[0] > 0);

        let mut x = planes.apply(&self.conv_input).relu();
        for conv in &self.conv_mid {
            x = x.apply(conv).relu();
        }
        let x = x.apply(&self.conv_head);

        x.view([-1, NUM_INTERSECTIONS as i64]).softmax(1, Kind::Float)
    }
}

#[cfg(test)]
mod tests {
    use tch::nn::OptimizerConfig;

    use super::*;
    use crate::engine::policy_net::features::{initial_planes, DEVICE};

    #[test]
    fn test_forward_emits_a_distribution() {
        let model = PolicyNet::new(*DEVICE, 4, 32);

        let planes = initial_planes();
        let probs = model.forward(&planes);

        assert_eq!(probs.size(), [1, NUM_INTERSECTIONS as i64]);
        let row_sum = probs.sum(Kind::Float).double_value(&[]);
        assert!((row_sum - 1.0).abs() < 1e-4);
        let min = probs.min().double_value(&[]);
        assert!(min >= 0.);
    }

    #[test]
    fn test_training_step() {
        let model = PolicyNet::new(*DEVICE, 4, 32);
        let mut optimizer = nn::Sgd::default()
            .build(&model.vs, 1e-3)
            .expect("Failed to create optimizer");

        let planes = initial_planes();
        let probs = model.forward(&planes);

        let labels = Tensor::from_slice(&[180i64]).to_device(*DEVICE);
        let picked = probs.gather(1, &labels.unsqueeze(1), false);
        let loss = picked.log().mean(Kind::Float).neg();

        optimizer.backward_step(&loss);
    }
}
