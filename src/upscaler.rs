use crate::config::ReferenceEnd;
use crate::elevation::Elevation;
use crate::topology::ColumnTopology;

/// Column-local numeric primitives: gathering, depth averaging, cumulative depth
/// integrals and their inversion.
///
/// Rows are counted from the configured [`ReferenceEnd`]; every operation here
/// uses the same row order, so a profile built by [`Self::depth_integral`] can
/// be fed straight back into [`Self::find`] and [`Self::interpolate`].
///
/// Nothing is bounds-checked beyond slice indexing: the topology is trusted,
/// and output buffers must hold at least [`Self::num_rows`] entries.
#[derive(Clone, Copy, Debug)]
pub struct ColumnUpscaler<'a> {
    ts: &'a ColumnTopology,
    reference_end: ReferenceEnd,
}

impl<'a> ColumnUpscaler<'a> {
    pub fn new(ts: &'a ColumnTopology, reference_end: ReferenceEnd) -> Self {
        Self { ts, reference_end }
    }

    pub fn topology(&self) -> &'a ColumnTopology {
        self.ts
    }

    pub fn reference_end(&self) -> ReferenceEnd {
        self.reference_end
    }

    /// Number of fine blocks in column `col`
    pub fn num_rows(&self, col: usize) -> usize {
        self.ts.col_size(col)
    }

    /// Elevation of an empty column: nothing filled from the reference end
    pub fn bottom(&self, _col: usize) -> Elevation {
        Elevation::new(0, 0.)
    }

    /// Elevation of a completely filled column: the far face of the last row
    pub fn full(&self, col: usize) -> Elevation {
        Elevation::new(self.num_rows(col).saturating_sub(1), 1.)
    }

    /// Position in the topology's flattened arrays of `row` in column `col`
    fn flat_pos(&self, col: usize, row: usize) -> usize {
        let start = self.ts.col_cellpos[col];
        match self.reference_end {
            ReferenceEnd::Top => start + row,
            ReferenceEnd::Bottom => self.ts.col_cellpos[col + 1] - 1 - row,
        }
    }

    /// Copy `data[cell * stride + offset]` for every fine cell of the column into `buf`
    pub fn gather(&self, col: usize, buf: &mut [f64], data: &[f64], stride: usize, offset: usize) {
        for row in 0..self.num_rows(col) {
            // index in the fine grid for this block
            let block_ndx = self.ts.col_cells[self.flat_pos(col, row)];
            buf[row] = data[block_ndx * stride + offset];
        }
    }

    /// Fine cell index of every block of the column, in row order
    pub fn gather_cells(&self, col: usize, buf: &mut [usize]) {
        for row in 0..self.num_rows(col) {
            buf[row] = self.ts.col_cells[self.flat_pos(col, row)];
        }
    }

    /// Thickness-weighted average of `val` over the whole column
    pub fn depth_average(&self, col: usize, val: &[f64]) -> f64 {
        let mut accum = 0.;
        for row in 0..self.num_rows(col) {
            accum += val[row] * self.ts.dz[self.flat_pos(col, row)];
        }
        accum / self.ts.h_tot[col]
    }

    /// Running depth integral of `val` from the reference end, normalized by the
    /// column height: `res[row] = Σ_{i ≤ row} val[i] * dz[i] / H`.
    pub fn depth_integral(&self, col: usize, val: &[f64], res: &mut [f64]) {
        // this is non-zero since the column otherwise wouldn't be active
        let h = self.ts.h_tot[col];

        let mut accum = 0.;
        for row in 0..self.num_rows(col) {
            accum += val[row] * self.ts.dz[self.flat_pos(col, row)];
            res[row] = accum / h;
        }
    }

    /// Elevation at which the piecewise-linear `profile` reaches `target`.
    ///
    /// `profile` must be non-decreasing, as produced by [`Self::depth_integral`].
    /// Targets at or below zero give [`Self::bottom`]; targets at or above the last
    /// entry give [`Self::full`]. Inside a flat stretch the earliest row whose
    /// start already equals the target wins, so a target equal to `profile[r - 1]`
    /// resolves to `(r, 0)`.
    pub fn find(&self, col: usize, profile: &[f64], target: f64) -> Elevation {
        let n = self.num_rows(col);
        if n == 0 || target <= 0. {
            return self.bottom(col);
        }
        if target >= profile[n - 1] {
            return self.full(col);
        }

        // value of the profile at the start face of the current row
        let mut prev = 0.;
        for (row, &cur) in profile[..n].iter().enumerate() {
            if target < cur || target == prev {
                let span = cur - prev;
                let fraction = if span > 0. { (target - prev) / span } else { 0. };
                return Elevation::new(row, fraction);
            }
            prev = cur;
        }

        // only reachable if the profile decreases somewhere
        self.full(col)
    }

    /// Value of the piecewise-linear `profile` at `elev`; the inverse of [`Self::find`]
    pub fn interpolate(&self, _col: usize, profile: &[f64], elev: Elevation) -> f64 {
        let prev = if elev.block == 0 { 0. } else { profile[elev.block - 1] };
        prev + (profile[elev.block] - prev) * elev.fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// One column of three blocks, thicknesses 1, 2, 1 from the top
    fn three_blocks() -> ColumnTopology {
        ColumnTopology::new(vec![0, 3], vec![4, 2, 0], vec![1.0, 2.0, 1.0]).unwrap()
    }

    #[test]
    fn test_gather_follows_topology() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);

        // two values per fine cell; pick the second one
        let data: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let mut buf = [0.0; 3];
        up.gather(0, &mut buf, &data, 2, 1);
        assert_eq!(buf, [9.0, 5.0, 1.0]);

        let mut cells = [0; 3];
        up.gather_cells(0, &mut cells);
        assert_eq!(cells, [4, 2, 0]);
    }

    #[test]
    fn test_bottom_reference_reverses_rows() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Bottom);

        let data: Vec<f64> = (0..5).map(|v| v as f64 * 10.0).collect();
        let mut buf = [0.0; 3];
        up.gather(0, &mut buf, &data, 1, 0);
        assert_eq!(buf, [0.0, 20.0, 40.0]);

        let mut profile = [0.0; 3];
        up.depth_integral(0, &[1.0, 1.0, 1.0], &mut profile);
        // thickness order is now 1, 2, 1 read from the bottom: still symmetric
        assert_abs_diff_eq!(profile[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(profile[1], 0.75, epsilon = 1e-12);
        assert_abs_diff_eq!(profile[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_depth_average() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);

        assert_abs_diff_eq!(up.depth_average(0, &[0.3, 0.3, 0.3]), 0.3, epsilon = 1e-12);
        // (1*1 + 2*2 + 3*1) / 4
        assert_abs_diff_eq!(up.depth_average(0, &[1.0, 2.0, 3.0]), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_depth_integral() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);

        let val = [1.0, 2.0, 3.0];
        let mut profile = [0.0; 3];
        up.depth_integral(0, &val, &mut profile);

        assert_abs_diff_eq!(profile[0], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(profile[1], 1.25, epsilon = 1e-12);
        assert_abs_diff_eq!(profile[2], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(profile[2], up.depth_average(0, &val), epsilon = 1e-12);
    }

    #[test]
    fn test_find_degenerate_targets() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);
        let profile = [0.25, 1.25, 2.0];

        assert_eq!(up.find(0, &profile, 0.0), up.bottom(0));
        assert_eq!(up.find(0, &profile, -1.0), Elevation::new(0, 0.0));
        assert_eq!(up.find(0, &profile, 2.0), up.full(0));
        assert_eq!(up.find(0, &profile, 5.0), Elevation::new(2, 1.0));
    }

    #[test]
    fn test_find_interpolates() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);
        let profile = [0.25, 1.25, 2.0];

        let elev = up.find(0, &profile, 0.125);
        assert_eq!(elev.block, 0);
        assert_abs_diff_eq!(elev.fraction, 0.5, epsilon = 1e-12);

        let elev = up.find(0, &profile, 1.0);
        assert_eq!(elev.block, 1);
        assert_abs_diff_eq!(elev.fraction, 0.75, epsilon = 1e-12);

        // row boundaries resolve to the start of the next row
        assert_eq!(up.find(0, &profile, 0.25), Elevation::new(1, 0.0));
        assert_eq!(up.find(0, &profile, 1.25), Elevation::new(2, 0.0));
    }

    #[test]
    fn test_find_flat_segments() {
        let ts = ColumnTopology::new(vec![0, 4], vec![0, 1, 2, 3], vec![1.0; 4]).unwrap();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);

        // rows 1 and 2 contribute nothing
        let profile = [0.1, 0.1, 0.1, 0.3];
        assert_eq!(up.find(0, &profile, 0.1), Elevation::new(1, 0.0));

        let elev = up.find(0, &profile, 0.2);
        assert_eq!(elev.block, 3);
        assert_abs_diff_eq!(elev.fraction, 0.5, epsilon = 1e-12);

        // leading flat stretch at zero
        let profile = [0.0, 0.0, 0.2, 0.4];
        let elev = up.find(0, &profile, 0.1);
        assert_eq!(elev.block, 2);
        assert_abs_diff_eq!(elev.fraction, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolate_inverts_find() {
        let ts = three_blocks();
        let up = ColumnUpscaler::new(&ts, ReferenceEnd::Top);
        let profile = [0.25, 1.25, 2.0];

        for target in [0.05, 0.25, 0.6, 1.25, 1.9] {
            let elev = up.find(0, &profile, target);
            assert_abs_diff_eq!(up.interpolate(0, &profile, elev), target, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(up.interpolate(0, &profile, up.full(0)), 2.0, epsilon = 1e-12);
        assert_eq!(up.interpolate(0, &profile, up.bottom(0)), 0.0);
    }
}
