use crate::error::{VeError, VeResult};

/// Which fine cells make up each column of the upscaled grid, and how thick they are.
///
/// The layout is run-length: the cells of column `c` are
/// `col_cells[col_cellpos[c]..col_cellpos[c + 1]]`, listed from the top of the
/// stack downwards, and `dz` holds the matching thicknesses in the same
/// flattened order.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnTopology {
    /// Number of columns, i.e. cells of the upscaled grid
    pub number_of_cells: usize,
    pub col_cellpos: Vec<usize>,
    pub col_cells: Vec<usize>,
    pub dz: Vec<f64>,
    /// Total thickness of each column
    pub h_tot: Vec<f64>,
    /// Largest number of fine cells in any column
    pub max_vert_res: usize,
}

impl ColumnTopology {
    /// Build a topology from its run-length arrays, deriving `h_tot` and `max_vert_res`.
    ///
    /// Rejects offsets that do not start at zero or decrease, arrays whose lengths
    /// disagree, negative thicknesses and columns without positive total thickness.
    pub fn new(col_cellpos: Vec<usize>, col_cells: Vec<usize>, dz: Vec<f64>) -> VeResult<Self> {
        if col_cellpos.first() != Some(&0) {
            return Err(VeError::topology("column offsets must start at zero"));
        }
        if let Some(col) = col_cellpos.windows(2).position(|w| w[1] < w[0]) {
            return Err(VeError::topology(format!(
                "column offsets decrease at column {col}"
            )));
        }

        let number_of_cells = col_cellpos.len() - 1;
        let total = col_cellpos[number_of_cells];
        if col_cells.len() != total {
            return Err(VeError::size("col_cells", total, col_cells.len()));
        }
        if dz.len() != total {
            return Err(VeError::size("dz", total, dz.len()));
        }
        if let Some(ndx) = dz.iter().position(|h| h.is_nan() || *h < 0.0) {
            return Err(VeError::topology(format!(
                "cell thickness {} at position {ndx} is not a non-negative number",
                dz[ndx]
            )));
        }

        let h_tot: Vec<f64> = col_cellpos
            .windows(2)
            .map(|w| dz[w[0]..w[1]].iter().sum())
            .collect();
        if let Some(col) = h_tot.iter().position(|h| *h <= 0.0) {
            return Err(VeError::topology(format!(
                "column {col} has no positive thickness"
            )));
        }

        let max_vert_res = col_cellpos
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0);

        Ok(Self {
            number_of_cells,
            col_cellpos,
            col_cells,
            dz,
            h_tot,
            max_vert_res,
        })
    }

    /// Collapse a regular `nx * ny * layer_dz.len()` Cartesian grid into `nx * ny` columns.
    ///
    /// Fine cells are numbered `i + nx * (j + ny * k)` with layer `k = 0` on top,
    /// and column `i + nx * j` stacks the cells of every layer at `(i, j)`.
    pub fn cartesian(nx: usize, ny: usize, layer_dz: &[f64]) -> VeResult<Self> {
        let nz = layer_dz.len();
        let num_cols = nx * ny;

        let col_cellpos: Vec<usize> = (0..=num_cols).map(|col| col * nz).collect();
        let mut col_cells = Vec::with_capacity(num_cols * nz);
        let mut dz = Vec::with_capacity(num_cols * nz);
        for col in 0..num_cols {
            for (k, h) in layer_dz.iter().enumerate() {
                col_cells.push(col + num_cols * k);
                dz.push(*h);
            }
        }

        Self::new(col_cellpos, col_cells, dz)
    }

    /// Number of fine cells in column `col`
    pub fn col_size(&self, col: usize) -> usize {
        self.col_cellpos[col + 1] - self.col_cellpos[col]
    }

    /// Fine cell indices of column `col`, top first
    pub fn col_cells(&self, col: usize) -> &[usize] {
        &self.col_cells[self.col_cellpos[col]..self.col_cellpos[col + 1]]
    }

    /// Thicknesses of column `col`, top first
    pub fn col_dz(&self, col: usize) -> &[f64] {
        &self.dz[self.col_cellpos[col]..self.col_cellpos[col + 1]]
    }

    /// Total number of fine cells referenced by all columns
    pub fn num_fine_cells(&self) -> usize {
        self.col_cells.len()
    }
}
