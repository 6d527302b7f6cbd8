// Constants for the input tensor
pub const NUM_STONE_PLANES: usize = 3; // own stones / opponent stones / empty points
pub const NUM_ONES_PLANES: usize = 1; // a constant plane filled with 1
pub const NUM_TURNS_SINCE_PLANES: usize = 8; // how many turns since a move was played
pub const NUM_COLOR_PLANES: usize = 1; // whether the player to move is Black

pub const NUM_FEATURE_PLANES: usize =
    NUM_STONE_PLANES + NUM_ONES_PLANES + NUM_TURNS_SINCE_PLANES + NUM_COLOR_PLANES; // 13 19x19 planes

// Fixed channel layout of the plane stack
pub const PLANE_OWN_STONES: usize = 0;
pub const PLANE_OPPONENT_STONES: usize = 1;
pub const PLANE_EMPTY: usize = 2;
pub const PLANE_ONES: usize = 3;
pub const PLANE_TURNS_SINCE: usize = 4; // first of the 8 recency buckets
pub const PLANE_TO_MOVE_COLOR: usize = 12;

// Channel group sizes used when advancing the stack by one ply:
// own, opponent, empty, ones, buckets 0..=5, bucket 6, bucket 7, colour
pub const PLANE_SPLIT_SIZES: [i64; 8] = [1, 1, 1, 1, 6, 1, 1, 1];

// Shape of the conv stack
pub const NUM_CONV_LAYERS: usize = 13;
pub const NUM_FILTERS: i64 = 192;
pub const INPUT_CONV_KERNEL: i64 = 5; // first layer, padding 2
pub const MID_CONV_KERNEL: i64 = 3; // layers 2..=12, padding 1

pub const NUM_SYMMETRIES: usize = 8; // the dihedral group of the square
