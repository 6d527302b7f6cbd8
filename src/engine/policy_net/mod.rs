mod evaluator;
pub mod constants;
pub mod conv_net;
pub mod error;
pub mod features;
pub mod symmetry;
pub mod train;

pub use evaluator::*;
