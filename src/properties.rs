use crate::error::VeResult;

/// Rock and fluid properties of an incompressible two-phase model.
///
/// Both the fine 3-D grid and the upscaled 2-D grid are described through this
/// trait, so a simulator can run on either without knowing which it got.
///
/// Per-cell arrays are laid out cell-major: tensors as `num_dimensions()²`
/// row-major entries per cell, saturations and saturation-dependent results as
/// `num_phases()` entries per cell, and derivatives as `num_phases()²` entries
/// per cell with `d[i * np + j] = ∂value_i / ∂s_j`.
pub trait IncompProperties {
    /* rock properties */
    fn num_dimensions(&self) -> usize;

    fn num_cells(&self) -> usize;

    /// One porosity per cell
    fn porosity(&self) -> &[f64];

    /// One absolute permeability tensor per cell (m²)
    fn permeability(&self) -> &[f64];

    /* fluid properties */
    fn num_phases(&self) -> usize;

    /// One viscosity per phase (Pa·s)
    fn viscosity(&self) -> &[f64];

    /// One reservoir density per phase (kg/m³)
    fn density(&self) -> &[f64];

    /// One surface density per phase (kg/m³)
    fn surface_density(&self) -> &[f64];

    /* saturation-dependent properties */

    /// Relative permeabilities for the saturations `s` of `cells`.
    ///
    /// Writes `cells.len() * np` values to `kr` and, when given,
    /// `cells.len() * np * np` derivatives to `dkrds`.
    fn relperm(
        &self,
        s: &[f64],
        cells: &[usize],
        kr: &mut [f64],
        dkrds: Option<&mut [f64]>,
    ) -> VeResult<()>;

    /// Capillary pressures for the saturations `s` of `cells`, laid out like `relperm`
    fn cap_press(
        &self,
        s: &[f64],
        cells: &[usize],
        pc: &mut [f64],
        dpcds: Option<&mut [f64]>,
    ) -> VeResult<()>;

    /// Admissible saturation range of every phase in `cells`
    fn sat_range(&self, cells: &[usize], smin: &mut [f64], smax: &mut [f64]);
}
