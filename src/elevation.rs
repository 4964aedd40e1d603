use serde::{Deserialize, Serialize};

/// Discretized position inside a column.
///
/// `block` is the row counted from the reference end of the column and
/// `fraction` is how far into that row the position lies, in `[0, 1)`.
/// The one exception is the "completely filled" elevation produced by
/// [`crate::upscaler::ColumnUpscaler::full`], which sits at the far face
/// of the last row with `fraction == 1`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct Elevation {
    pub block: usize,
    pub fraction: f64,
}

impl Elevation {
    pub fn new(block: usize, fraction: f64) -> Self {
        Self { block, fraction }
    }

    /// Position as a continuous row coordinate, e.g. `(1, 0.25)` is `1.25`
    pub fn as_rows(&self) -> f64 {
        self.block as f64 + self.fraction
    }
}
