use tch::Tensor;

use crate::dataset::TrainRecord;
use crate::engine::policy_net::error::ShapeError;
use crate::engine::policy_net::features::{advance, initial_planes};
use crate::engine::policy_net::PolicyEvaluator;
use crate::utils::Vertex;

/// One ply of a self-play game: the planes the mover saw and the move the
/// policy picked from them.
pub struct PlyRecord {
    pub planes: Tensor,
    pub vertex: Vertex,
}

impl PlyRecord {
    pub fn to_train_record(&self) -> TrainRecord {
        TrainRecord::from_planes(&self.planes, self.vertex.index())
    }
}

/// Plays one game against itself from the empty board, for exactly
/// `max_plies` moves.
///
/// Prediction and plane advancement alternate strictly; each ply snapshots
/// the stack the move was chosen from. The planes carry no capture or
/// termination rules, so the game length is a caller decision rather than
/// something detected on the board.
pub fn play_game(
    evaluator: &PolicyEvaluator,
    max_plies: usize,
) -> Result<Vec<PlyRecord>, ShapeError> {
    tch::no_grad(|| {
        let mut records = Vec::with_capacity(max_plies);
        let mut planes = initial_planes();

        for _ in 0..max_plies {
            let probs = evaluator.predict(&planes)?;
            let vertex = PolicyEvaluator::best_vertex(&probs, 0);
            records.push(PlyRecord {
                planes: planes.shallow_clone(),
                vertex,
            });
            planes = advance(&planes, &probs)?;
        }

        Ok(records)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::policy_net::constants::PLANE_TO_MOVE_COLOR;
    use crate::engine::policy_net::conv_net::PolicyNet;
    use crate::engine::policy_net::features::DEVICE;
    use tch::Kind;

    fn tiny_evaluator() -> PolicyEvaluator {
        PolicyEvaluator::new(PolicyNet::new(*DEVICE, 3, 8), false)
    }

    #[test]
    fn test_play_game_alternates_colours() {
        let evaluator = tiny_evaluator();
        let records = play_game(&evaluator, 6).unwrap();
        assert_eq!(records.len(), 6);

        for (ply, record) in records.iter().enumerate() {
            let colour_mass = record
                .planes
                .narrow(1, PLANE_TO_MOVE_COLOR as i64, 1)
                .sum(Kind::Float)
                .double_value(&[]);
            let expected = if ply % 2 == 0 { 361. } else { 0. };
            assert_eq!(colour_mass, expected, "wrong colour at ply {}", ply);
        }
    }

    #[test]
    fn test_play_game_is_deterministic() {
        let evaluator = tiny_evaluator();
        let first: Vec<Vertex> = play_game(&evaluator, 4)
            .unwrap()
            .iter()
            .map(|r| r.vertex)
            .collect();
        let second: Vec<Vertex> = play_game(&evaluator, 4)
            .unwrap()
            .iter()
            .map(|r| r.vertex)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ply_records_convert_to_train_records() {
        let evaluator = tiny_evaluator();
        let records = play_game(&evaluator, 2).unwrap();
        for record in &records {
            let train = record.to_train_record();
            assert_eq!(train.label as usize, record.vertex.index());
        }
    }
}
