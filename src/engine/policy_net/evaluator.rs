use tch::Tensor;

use crate::engine::policy_net::conv_net::{MovePredictor, PolicyNet};
use crate::engine::policy_net::error::ShapeError;
use crate::engine::policy_net::symmetry::{symmetric, symmetry_batch};
use crate::utils::{Vertex, BOARD_SIZE, NUM_INTERSECTIONS};

/// Runs a policy network over plane stacks, optionally reconciling the
/// predictions of all 8 board orientations before a move is picked.
#[derive(Debug)]
pub struct PolicyEvaluator {
    pub model: PolicyNet,
    pub average_symmetries: bool,
}

impl PolicyEvaluator {
    pub fn new(model: PolicyNet, average_symmetries: bool) -> PolicyEvaluator {
        PolicyEvaluator {
            model,
            average_symmetries,
        }
    }

    /// Returns the move distribution for `planes`, shape (N, 361).
    ///
    /// With symmetry averaging enabled the network sees all 8 orientations of
    /// every board; the 8 predictions are reconciled into one consensus and
    /// the canonical-orientation copy is returned.
    pub fn predict(&self, planes: &Tensor) -> Result<Tensor, ShapeError> {
        if !self.average_symmetries {
            return Ok(self.model.forward(planes));
        }

        let batch = planes.size()[0];
        let views = symmetry_batch(planes)?;
        let probs = self.model.forward(&views);

        // reconciliation acts on spatial grids, not flat policy rows
        let grids = probs.view([-1, 1, BOARD_SIZE as i64, BOARD_SIZE as i64]);
        let reconciled = symmetric(&grids)?;
        let canonical = reconciled.narrow(0, 0, batch);
        Ok(canonical.view([-1, NUM_INTERSECTIONS as i64]))
    }

    /// The distribution of one board row as (vertex, probability) pairs.
    pub fn vertex_probabilities(probs: &Tensor, batch_index: i64) -> Vec<(Vertex, f32)> {
        let mut row = vec![0.0f32; NUM_INTERSECTIONS];
        probs
            .get(batch_index)
            .to_device(tch::Device::Cpu)
            .copy_data(&mut row, NUM_INTERSECTIONS);
        Vertex::iter_all().map(|v| (v, row[v.index()])).collect()
    }

    /// The strongest move of one board row.
    pub fn best_vertex(probs: &Tensor, batch_index: i64) -> Vertex {
        let index = probs.get(batch_index).argmax(0, false).int64_value(&[]);
        Vertex::from_index(index as usize)
    }
}
