//! The eight symmetries of the square board, and the averaging step that
//! reconciles eight symmetric views of a prediction into one consensus.

use static_init::dynamic;
use tch::Tensor;

use crate::engine::policy_net::constants::NUM_SYMMETRIES;
use crate::engine::policy_net::error::ShapeError;
use crate::utils::{Vertex, BOARD_SIZE, NUM_INTERSECTIONS};

/// An element of the dihedral group of the square, acting on the two trailing
/// (spatial) axes of a tensor. The discriminant is the slot the element
/// occupies in a symmetry batch; producers and consumers of such batches must
/// agree on this order.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Symmetry {
    Identity = 0,
    MirrorWidth = 1,
    MirrorHeight = 2,
    Rotate180 = 3,
    Transpose = 4,
    RotateClockwise = 5,
    RotateCounterclockwise = 6,
    AntiTranspose = 7,
}

impl Symmetry {
    pub const fn from_index(index: usize) -> Symmetry {
        assert!(index < NUM_SYMMETRIES, "Symmetry index out of bounds");
        unsafe { std::mem::transmute::<u8, Symmetry>(index as u8) }
    }

    pub fn iter_all() -> impl Iterator<Item = Symmetry> {
        (0..NUM_SYMMETRIES).map(Symmetry::from_index)
    }

    /// The group inverse. The two quarter-turns undo each other; every other
    /// element is a reflection or the identity and undoes itself. Note that
    /// the quarter-turn inverses are not plain mirrors, even though each
    /// quarter-turn is built from a transpose and a mirror.
    pub const fn inverse(&self) -> Symmetry {
        match *self {
            Symmetry::RotateClockwise => Symmetry::RotateCounterclockwise,
            Symmetry::RotateCounterclockwise => Symmetry::RotateClockwise,
            other => other,
        }
    }

    /// Applies the transform to the two trailing axes of `t`. The remaining
    /// leading axes (batch, channels) pass through untouched.
    pub fn apply(&self, t: &Tensor) -> Tensor {
        let height_axis = t.dim() as i64 - 2;
        let width_axis = t.dim() as i64 - 1;
        match self {
            Symmetry::Identity => t.shallow_clone(),
            Symmetry::MirrorWidth => t.flip(&[width_axis]),
            Symmetry::MirrorHeight => t.flip(&[height_axis]),
            Symmetry::Rotate180 => t.flip(&[height_axis, width_axis]),
            Symmetry::Transpose => t.transpose(height_axis, width_axis),
            Symmetry::RotateClockwise => t.transpose(height_axis, width_axis).flip(&[width_axis]),
            Symmetry::RotateCounterclockwise => {
                t.transpose(height_axis, width_axis).flip(&[height_axis])
            }
            Symmetry::AntiTranspose => {
                t.transpose(height_axis, width_axis).flip(&[height_axis, width_axis])
            }
        }
    }

    /// Where the transform sends a board coordinate, consistent with `apply`.
    pub const fn apply_to_coords(&self, row: usize, col: usize) -> (usize, usize) {
        let last = BOARD_SIZE - 1;
        match *self {
            Symmetry::Identity => (row, col),
            Symmetry::MirrorWidth => (row, last - col),
            Symmetry::MirrorHeight => (last - row, col),
            Symmetry::Rotate180 => (last - row, last - col),
            Symmetry::Transpose => (col, row),
            Symmetry::RotateClockwise => (col, last - row),
            Symmetry::RotateCounterclockwise => (last - col, row),
            Symmetry::AntiTranspose => (last - col, last - row),
        }
    }
}

/// Precomputed row-major index permutations, one per symmetry slot.
#[dynamic]
static VERTEX_PERMUTATIONS: [[u16; NUM_INTERSECTIONS]; NUM_SYMMETRIES] = {
    let mut tables = [[0u16; NUM_INTERSECTIONS]; NUM_SYMMETRIES];
    for (slot, table) in tables.iter_mut().enumerate() {
        let symmetry = Symmetry::from_index(slot);
        for vertex in Vertex::iter_all() {
            let (row, col) = symmetry.apply_to_coords(vertex.row(), vertex.col());
            table[vertex.index()] = Vertex::from_coords(row, col).index() as u16;
        }
    }
    tables
};

/// Returns where `vertex` lands under `symmetry`, from the precomputed table.
pub fn permuted_vertex(symmetry: Symmetry, vertex: Vertex) -> Vertex {
    Vertex::from_index(VERTEX_PERMUTATIONS[symmetry as usize][vertex.index()] as usize)
}

/// Remaps a row-major move label through `symmetry`.
pub fn permuted_label(symmetry: Symmetry, label: usize) -> usize {
    VERTEX_PERMUTATIONS[symmetry as usize][label] as usize
}

/// Expands a canonical batch (N, C, H, W) into its 8 symmetric views,
/// stacked block-contiguously along the batch axis: view g occupies rows
/// [g*N, (g+1)*N) of the (N*8, C, H, W) result.
pub fn symmetry_batch(planes: &Tensor) -> Result<Tensor, ShapeError> {
    let size = planes.size();
    if size.len() != 4 {
        return Err(ShapeError::TensorRank { expected: 4, actual: size.len() });
    }
    let (height, width) = (size[2], size[3]);
    if height != width {
        return Err(ShapeError::SpatialDims { height, width });
    }

    let views: Vec<Tensor> = Symmetry::iter_all().map(|s| s.apply(planes)).collect();
    Ok(Tensor::cat(&views, 0))
}

/// Reconciles the 8 symmetric views of a prediction batch into one consensus
/// and re-expands it.
///
/// The input follows the `symmetry_batch` grouping: (N*8, C, H, W), view g in
/// rows [g*N, (g+1)*N). Each view is brought back to the canonical
/// orientation with its slot's group inverse, the canonical tensors are
/// averaged elementwise, and the average is pushed back out through all 8
/// forward transforms. The output is shape-identical to the input, and any
/// one of its groups re-unifies to the same consensus.
pub fn symmetric(predict: &Tensor) -> Result<Tensor, ShapeError> {
    let size = predict.size();
    if size.len() != 4 {
        return Err(ShapeError::TensorRank { expected: 4, actual: size.len() });
    }
    let (batch, height, width) = (size[0], size[2], size[3]);
    if batch % NUM_SYMMETRIES as i64 != 0 {
        return Err(ShapeError::BatchNotMultipleOfSymmetries(batch));
    }
    if height != width {
        return Err(ShapeError::SpatialDims { height, width });
    }
    let group_size = batch / NUM_SYMMETRIES as i64;

    let canonical: Vec<Tensor> = Symmetry::iter_all()
        .enumerate()
        .map(|(slot, symmetry)| {
            let view = predict.narrow(0, slot as i64 * group_size, group_size);
            symmetry.inverse().apply(&view)
        })
        .collect();

    let mut sum = canonical[0].shallow_clone();
    for view in &canonical[1..] {
        sum = sum + view;
    }
    let consensus = sum / NUM_SYMMETRIES as f64;

    let diversified: Vec<Tensor> =
        Symmetry::iter_all().map(|s| s.apply(&consensus)).collect();
    Ok(Tensor::cat(&diversified, 0))
}
