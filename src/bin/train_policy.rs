use std::fs::exists;

use tch::nn;
use tch::nn::OptimizerConfig;

use tengen::dataset::read_all;
use tengen::engine::policy_net::constants::{NUM_CONV_LAYERS, NUM_FILTERS};
use tengen::engine::policy_net::conv_net::PolicyNet;
use tengen::engine::policy_net::features::DEVICE;
use tengen::engine::policy_net::train::{train_epoch, LEARNING_RATE};

pub const DATASET_FILE: &str = "data/selfplay.traindata";
pub const MODEL_FILE: &str = "model.safetensors";
pub const NUM_EPOCHS: usize = 10;
pub const AUGMENT_SYMMETRIES: bool = true;

fn main() {
    let mut model = PolicyNet::new(*DEVICE, NUM_CONV_LAYERS, NUM_FILTERS);
    if exists(MODEL_FILE).expect("Failed to check if model file exists") {
        println!("Loading model from file...");
        model.load(MODEL_FILE).expect("Failed to load model");
    }

    let records = read_all(DATASET_FILE).expect("Failed to read dataset");
    println!("Training on {} positions", records.len());

    let mut optimizer = nn::Sgd::default()
        .build(&model.vs, LEARNING_RATE)
        .expect("Failed to create optimizer");

    for epoch in 0..NUM_EPOCHS {
        let metrics = train_epoch(&model, &mut optimizer, &records, AUGMENT_SYMMETRIES)
            .expect("Training epoch failed");
        println!(
            "Epoch {}/{} - Loss: {:.4}, Accuracy: {:.3}",
            epoch + 1,
            NUM_EPOCHS,
            metrics.loss,
            metrics.accuracy
        );
    }

    println!("Training completed. Saving model...");
    model.save(MODEL_FILE).expect("Failed to save model");
}
