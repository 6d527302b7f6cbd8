use lazy_static::lazy_static;
use tch::{Device, Kind, Tensor};

use crate::engine::policy_net::constants::{
    NUM_FEATURE_PLANES, NUM_TURNS_SINCE_PLANES, PLANE_SPLIT_SIZES,
};
use crate::engine::policy_net::error::ShapeError;
use crate::utils::{BOARD_SIZE, NUM_INTERSECTIONS};

lazy_static! {
    pub static ref DEVICE: Device = Device::cuda_if_available();
}

/// Builds the plane stack for a brand-new game: an empty board with Black to
/// move, batch size 1.
///
/// Stone planes start at zero, the empty-points plane and the constant ones
/// plane at one, all recency buckets at zero, and the to-move-colour plane at
/// one (Black moves first).
pub fn initial_planes() -> Tensor {
    let size = BOARD_SIZE as i64;
    let zero = Tensor::zeros(&[1, 1, size, size], (Kind::Float, *DEVICE));
    let one = Tensor::ones(&[1, 1, size, size], (Kind::Float, *DEVICE));

    let mut planes: Vec<Tensor> = Vec::with_capacity(NUM_FEATURE_PLANES);
    planes.push(zero.copy()); // own stones
    planes.push(zero.copy()); // opponent stones
    planes.push(one.copy()); // empty points
    planes.push(one.copy()); // constant ones
    for _ in 0..NUM_TURNS_SINCE_PLANES {
        planes.push(zero.copy());
    }
    planes.push(one); // Black to move

    Tensor::cat(&planes, 1)
}

/// Advances a feature-plane stack by exactly one ply.
///
/// `data` is the current stack, shape (N, 13, 19, 19); `predict` is the move
/// distribution over intersections, shape (N, 361), row-major over the grid.
/// The strongest move per board is placed (ties resolve to the first index in
/// scan order), and the returned stack is seen from the next mover's
/// perspective: the stone planes swap roles, the placed stone joins what is
/// now the opponent's plane, the recency buckets shift by one with the two
/// oldest merging, and the colour indicator toggles between all ones (Black
/// to move) and all zeros (White to move).
///
/// Each call builds a fresh stack; the input is never mutated.
pub fn advance(data: &Tensor, predict: &Tensor) -> Result<Tensor, ShapeError> {
    let data_size = data.size();
    if data_size.len() != 4 {
        return Err(ShapeError::TensorRank { expected: 4, actual: data_size.len() });
    }
    let (batch, channels, height, width) = (data_size[0], data_size[1], data_size[2], data_size[3]);
    if channels != NUM_FEATURE_PLANES as i64 {
        return Err(ShapeError::ChannelCount { expected: NUM_FEATURE_PLANES as i64, actual: channels });
    }
    if height != BOARD_SIZE as i64 || width != BOARD_SIZE as i64 {
        return Err(ShapeError::SpatialDims { height, width });
    }
    let predict_size = predict.size();
    if predict_size.len() != 2 {
        return Err(ShapeError::TensorRank { expected: 2, actual: predict_size.len() });
    }
    if predict_size[1] != NUM_INTERSECTIONS as i64 {
        return Err(ShapeError::PolicyWidth {
            expected: NUM_INTERSECTIONS as i64,
            actual: predict_size[1],
        });
    }
    if predict_size[0] != batch {
        return Err(ShapeError::BatchMismatch { data: batch, predict: predict_size[0] });
    }

    let label = predict.argmax(1, false);
    let onehot = label
        .one_hot(NUM_INTERSECTIONS as i64)
        .to_kind(Kind::Float)
        .view([batch, 1, BOARD_SIZE as i64, BOARD_SIZE as i64]);

    let groups = data.split_with_sizes(&PLANE_SPLIT_SIZES, 1);
    let own = &groups[0];
    let opponent = &groups[1];
    let empty = &groups[2];
    let ones = &groups[3];
    let young_buckets = &groups[4]; // placed 1..=6 turns ago
    let bucket6 = &groups[5]; // placed 7 turns ago
    let bucket7 = &groups[6]; // placed 8 or more turns ago
    let to_move_color = &groups[7];

    let next = Tensor::cat(
        &[
            opponent.shallow_clone(),        // the side about to move owned these
            own + &onehot,                   // the mover's stones, plus the new one
            empty - &onehot,                 // captured stones are not returned to the empty plane
            ones.shallow_clone(),
            onehot.shallow_clone(),          // the new stone is one turn old next ply
            young_buckets.shallow_clone(),   // buckets 0..=5 become 1..=6
            bucket6 + bucket7,               // the tail bucket accumulates
            ones - to_move_color,            // 1 while Black is to move, else 0
        ],
        1,
    );

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::policy_net::constants::{
        PLANE_EMPTY, PLANE_ONES, PLANE_OPPONENT_STONES, PLANE_OWN_STONES, PLANE_TO_MOVE_COLOR,
        PLANE_TURNS_SINCE,
    };

    fn one_hot_policy(index: usize) -> Tensor {
        let mut probs = vec![0.0f32; NUM_INTERSECTIONS];
        probs[index] = 1.0;
        Tensor::from_slice(&probs)
            .view([1, NUM_INTERSECTIONS as i64])
            .to_device(*DEVICE)
    }

    fn plane_sum(planes: &Tensor, channel: usize) -> f64 {
        planes
            .narrow(1, channel as i64, 1)
            .sum(Kind::Float)
            .double_value(&[])
    }

    #[test]
    fn test_initial_planes_layout() {
        let planes = initial_planes();
        assert_eq!(planes.size(), [1, NUM_FEATURE_PLANES as i64, 19, 19]);

        assert_eq!(plane_sum(&planes, PLANE_OWN_STONES), 0.);
        assert_eq!(plane_sum(&planes, PLANE_OPPONENT_STONES), 0.);
        assert_eq!(plane_sum(&planes, PLANE_EMPTY), 361.);
        assert_eq!(plane_sum(&planes, PLANE_ONES), 361.);
        for bucket in 0..NUM_TURNS_SINCE_PLANES {
            assert_eq!(plane_sum(&planes, PLANE_TURNS_SINCE + bucket), 0.);
        }
        assert_eq!(plane_sum(&planes, PLANE_TO_MOVE_COLOR), 361.);
    }

    #[test]
    fn test_first_move_at_the_center_point() {
        let planes = initial_planes();
        // row 9, col 9: the center of the board
        let next = advance(&planes, &one_hot_policy(180)).unwrap();

        assert_eq!(next.size(), [1, NUM_FEATURE_PLANES as i64, 19, 19]);

        // White is to move and has no stones yet
        assert_eq!(plane_sum(&next, PLANE_OWN_STONES), 0.);

        // Black's single stone sits at the center, seen as the opponent's now
        assert_eq!(plane_sum(&next, PLANE_OPPONENT_STONES), 1.);
        assert_eq!(
            next.double_value(&[0, PLANE_OPPONENT_STONES as i64, 9, 9]),
            1.
        );

        // exactly the placed point left the empty plane
        assert_eq!(plane_sum(&next, PLANE_EMPTY), 360.);
        assert_eq!(next.double_value(&[0, PLANE_EMPTY as i64, 9, 9]), 0.);

        // the move is one turn old for the next state
        assert_eq!(plane_sum(&next, PLANE_TURNS_SINCE), 1.);
        assert_eq!(next.double_value(&[0, PLANE_TURNS_SINCE as i64, 9, 9]), 1.);

        // the colour indicator flipped from all ones to all zeros
        assert_eq!(plane_sum(&next, PLANE_TO_MOVE_COLOR), 0.);
    }

    #[test]
    fn test_stone_planes_stay_a_partition() {
        let planes = initial_planes();
        let mut current = advance(&planes, &one_hot_policy(180)).unwrap();
        current = advance(&current, &one_hot_policy(0)).unwrap();
        current = advance(&current, &one_hot_policy(360)).unwrap();

        // every point is exactly one of: own stone, opponent stone, empty
        let own = current.narrow(1, PLANE_OWN_STONES as i64, 1);
        let opponent = current.narrow(1, PLANE_OPPONENT_STONES as i64, 1);
        let empty = current.narrow(1, PLANE_EMPTY as i64, 1);
        let occupancy = own + opponent + empty;
        assert_eq!(occupancy.size(), [1, 1, 19, 19]);
        let min = occupancy.min().double_value(&[]);
        let max = occupancy.max().double_value(&[]);
        assert_eq!(min, 1.);
        assert_eq!(max, 1.);
    }

    #[test]
    fn test_recency_bucket_mass_is_conserved() {
        let mut current = initial_planes();
        for ply in 0..12 {
            let before: f64 = (0..NUM_TURNS_SINCE_PLANES)
                .map(|b| plane_sum(&current, PLANE_TURNS_SINCE + b))
                .sum();
            current = advance(&current, &one_hot_policy(ply * 2)).unwrap();
            let after: f64 = (0..NUM_TURNS_SINCE_PLANES)
                .map(|b| plane_sum(&current, PLANE_TURNS_SINCE + b))
                .sum();
            assert_eq!(after, before + 1.);
        }
    }

    #[test]
    fn test_colour_plane_alternates_with_period_two() {
        let planes = initial_planes();
        let after_one = advance(&planes, &one_hot_policy(42)).unwrap();
        let after_two = advance(&after_one, &one_hot_policy(43)).unwrap();

        assert_eq!(plane_sum(&planes, PLANE_TO_MOVE_COLOR), 361.);
        assert_eq!(plane_sum(&after_one, PLANE_TO_MOVE_COLOR), 0.);
        assert_eq!(plane_sum(&after_two, PLANE_TO_MOVE_COLOR), 361.);
    }

    #[test]
    fn test_advance_rejects_wrong_channel_count() {
        let bad = Tensor::zeros(&[1, 12, 19, 19], (Kind::Float, *DEVICE));
        let result = advance(&bad, &one_hot_policy(0));
        assert_eq!(
            result.unwrap_err(),
            ShapeError::ChannelCount { expected: 13, actual: 12 }
        );
    }

    #[test]
    fn test_advance_rejects_wrong_policy_width() {
        let planes = initial_planes();
        let bad = Tensor::zeros(&[1, 360], (Kind::Float, *DEVICE));
        let result = advance(&planes, &bad);
        assert_eq!(
            result.unwrap_err(),
            ShapeError::PolicyWidth { expected: 361, actual: 360 }
        );
    }

    #[test]
    fn test_advance_rejects_batch_mismatch() {
        let planes = Tensor::cat(&[initial_planes(), initial_planes()], 0);
        let result = advance(&planes, &one_hot_policy(0));
        assert_eq!(
            result.unwrap_err(),
            ShapeError::BatchMismatch { data: 2, predict: 1 }
        );
    }

    #[test]
    fn test_advance_rejects_wrong_rank_and_grid() {
        let flat = Tensor::zeros(&[13, 19, 19], (Kind::Float, *DEVICE));
        assert_eq!(
            advance(&flat, &one_hot_policy(0)).unwrap_err(),
            ShapeError::TensorRank { expected: 4, actual: 3 }
        );

        let small = Tensor::zeros(&[1, 13, 9, 9], (Kind::Float, *DEVICE));
        assert_eq!(
            advance(&small, &one_hot_policy(0)).unwrap_err(),
            ShapeError::SpatialDims { height: 9, width: 9 }
        );
    }
}
