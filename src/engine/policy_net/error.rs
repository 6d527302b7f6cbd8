use std::error::Error;
use std::fmt::{Display, Formatter};

/// A tensor handed to the core transforms broke the fixed shape contract.
/// Always a caller bug (the wrong output wired to the wrong input), so it is
/// propagated immediately and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeError {
    TensorRank { expected: usize, actual: usize },
    ChannelCount { expected: i64, actual: i64 },
    PolicyWidth { expected: i64, actual: i64 },
    BatchMismatch { data: i64, predict: i64 },
    BatchNotMultipleOfSymmetries(i64),
    SpatialDims { height: i64, width: i64 },
}

impl Display for ShapeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::TensorRank { expected, actual } => {
                write!(f, "Expected a {}-dimensional tensor, got {} dimensions", expected, actual)
            }
            ShapeError::ChannelCount { expected, actual } => {
                write!(f, "Expected {} feature planes, got {}", expected, actual)
            }
            ShapeError::PolicyWidth { expected, actual } => {
                write!(f, "Expected {} policy entries per board, got {}", expected, actual)
            }
            ShapeError::BatchMismatch { data, predict } => {
                write!(f, "Plane stack batch size {} does not match policy batch size {}", data, predict)
            }
            ShapeError::BatchNotMultipleOfSymmetries(batch) => {
                write!(f, "Batch size {} is not a multiple of the 8 board symmetries", batch)
            }
            ShapeError::SpatialDims { height, width } => {
                write!(f, "Unsupported board grid {}x{}", height, width)
            }
        }
    }
}

impl Error for ShapeError {}
