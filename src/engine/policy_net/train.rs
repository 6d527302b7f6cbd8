use rand::seq::SliceRandom;
use tch::{nn, Kind, Tensor};

use crate::dataset::{records_to_tensors, DatasetError, TrainRecord};
use crate::engine::policy_net::constants::NUM_SYMMETRIES;
use crate::engine::policy_net::conv_net::{MovePredictor, PolicyNet};
use crate::engine::policy_net::features::DEVICE;
use crate::engine::policy_net::symmetry::{permuted_label, Symmetry};

pub const LEARNING_RATE: f64 = 0.003;
pub const BATCH_SIZE: usize = 16;

pub struct LossMetrics {
    pub loss: f64,
    pub accuracy: f64,
}

/// Pushes a whole batch through a random board symmetry, remapping the move
/// labels with it so planes and targets stay aligned.
pub fn augment_with_symmetry(planes: &Tensor, labels: &Tensor) -> (Tensor, Tensor) {
    let symmetry = Symmetry::from_index(fastrand::usize(..NUM_SYMMETRIES));
    if symmetry == Symmetry::Identity {
        return (planes.shallow_clone(), labels.shallow_clone());
    }

    let moved_planes = symmetry.apply(planes);

    let count = labels.size()[0] as usize;
    let mut raw = vec![0i64; count];
    labels
        .to_device(tch::Device::Cpu)
        .copy_data(&mut raw, count);
    let remapped: Vec<i64> = raw
        .iter()
        .map(|&label| permuted_label(symmetry, label as usize) as i64)
        .collect();

    (
        moved_planes,
        Tensor::from_slice(&remapped).to_device(*DEVICE),
    )
}

/// One pass over the records: shuffle, batch, forward, cross-entropy against
/// the played move, plain SGD step. The network emits probabilities, so the
/// loss takes the log of the picked entry directly.
pub fn train_epoch(
    model: &PolicyNet,
    optimizer: &mut nn::Optimizer,
    records: &[TrainRecord],
    augment_symmetries: bool,
) -> Result<LossMetrics, DatasetError> {
    let mut indices: Vec<usize> = (0..records.len()).collect();
    indices.shuffle(&mut rand::thread_rng());

    let mut seen = 0usize;
    let mut correct = 0.0;
    let mut summed_loss = 0.0;

    for chunk in indices.chunks(BATCH_SIZE) {
        let batch: Vec<TrainRecord> = chunk.iter().map(|&i| records[i].clone()).collect();
        let (mut planes, mut labels) = records_to_tensors(&batch)?;
        if augment_symmetries {
            (planes, labels) = augment_with_symmetry(&planes, &labels);
        }

        let probs = model.forward(&planes);
        let picked = probs.gather(1, &labels.unsqueeze(1), false);
        let loss = picked.log().mean(Kind::Float).neg();
        optimizer.backward_step(&loss);

        let predicted = probs.argmax(1, false);
        let batch_correct = predicted
            .eq_tensor(&labels)
            .to_kind(Kind::Float)
            .sum(Kind::Float)
            .double_value(&[]);
        let batch_loss = loss.double_value(&[]);

        seen += chunk.len();
        correct += batch_correct;
        summed_loss += batch_loss * chunk.len() as f64;

        println!(
            "Loss: {:.4}, Accuracy: {:.3}",
            batch_loss,
            batch_correct / chunk.len() as f64
        );
    }

    Ok(LossMetrics {
        loss: summed_loss / seen as f64,
        accuracy: correct / seen as f64,
    })
}
