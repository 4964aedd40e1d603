use crate::config::VeConfig;
use crate::constants::{
    KXX_OFS_2D, KXX_OFS_3D, KXY_OFS_2D, KXY_OFS_3D, KYX_OFS_2D, KYY_OFS_2D, KYY_OFS_3D,
    PERM_MATRIX_2D, PERM_MATRIX_3D, THREE_DIMS, TWO_DIMS, UPSCALED_SAT_MAX, UPSCALED_SAT_MIN,
};
use crate::elevation::Elevation;
use crate::error::{VeError, VeResult};
use crate::properties::IncompProperties;
use crate::run_len::RunLenData;
use crate::topology::ColumnTopology;
use crate::upscaler::ColumnUpscaler;
use glam::DMat2;
use serde::{Deserialize, Serialize};

/// Where the CO2 plume has been in a column, and the residual it left behind.
///
/// `elevation` is `ζ_R`, the interface above which (counted from the reference
/// end) gas has swept the column and left residual saturation. It is only
/// recomputed when a saturation larger than `max_gas_sat` is observed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct TrappingState {
    /// Largest upscaled CO2 saturation seen so far, `S_{g,max}`
    pub max_gas_sat: f64,
    pub elevation: Elevation,
}

/// Vertical-equilibrium properties of the 2-D grid of columns.
///
/// Porosity and permeability are depth averages over each column. Three
/// cumulative volume-fraction profiles per column support locating the
/// residual-CO2 interface whenever the plume grows.
///
/// The store borrows the fine properties and the topology it was built from
/// and cannot outlive them.
pub struct VeProps<'a, P: IncompProperties + ?Sized> {
    /// Underlying fluid information
    fp: &'a P,
    up: ColumnUpscaler<'a>,
    config: VeConfig,

    /// Upscaled porosity, Φ
    upscaled_poro: Vec<f64>,
    /// Upscaled permeability, K, as interleaved 2x2 tensors
    upscaled_absperm: Vec<f64>,

    /// Volume fractions of each fine block
    res_gas_vol: RunLenData<f64>, // φ S_{g,r}
    mob_mix_vol: RunLenData<f64>, // φ (1 - S_{w,r} - S_{g,r})
    res_wat_vol: RunLenData<f64>, // φ (1 - S_{w,r})

    /// Depth integrals of the volume fractions from the reference end
    res_gas_dpt: RunLenData<f64>,
    mob_mix_dpt: RunLenData<f64>,
    res_wat_dpt: RunLenData<f64>,

    trapping: Vec<TrappingState>,
}

impl<'a, P: IncompProperties + ?Sized> VeProps<'a, P> {
    pub fn new(fine_props: &'a P, top_surf: &'a ColumnTopology) -> VeResult<Self> {
        Self::with_config(fine_props, top_surf, VeConfig::default())
    }

    pub fn with_config(
        fine_props: &'a P,
        top_surf: &'a ColumnTopology,
        config: VeConfig,
    ) -> VeResult<Self> {
        Self::check_fine_props(fine_props, top_surf, &config)?;

        let ts = top_surf;
        let num_cols = ts.number_of_cells;
        let num_phases = fine_props.num_phases();
        let gas = config.gas_phase;
        let up = ColumnUpscaler::new(ts, config.reference_end);

        let mut upscaled_poro = vec![0.; num_cols];
        let mut upscaled_absperm = vec![0.; num_cols * PERM_MATRIX_2D];
        let mut res_gas_vol = RunLenData::new(num_cols, &ts.col_cellpos);
        let mut mob_mix_vol = RunLenData::new(num_cols, &ts.col_cellpos);
        let mut res_wat_vol = RunLenData::new(num_cols, &ts.col_cellpos);
        let mut res_gas_dpt = RunLenData::new(num_cols, &ts.col_cellpos);
        let mut mob_mix_dpt = RunLenData::new(num_cols, &ts.col_cellpos);
        let mut res_wat_dpt = RunLenData::new(num_cols, &ts.col_cellpos);

        // per-column scratch, sized once for the tallest column
        let max_rows = ts.max_vert_res;
        let mut poro = vec![0.; max_rows];
        let mut kxx = vec![0.; max_rows];
        let mut kxy = vec![0.; max_rows];
        let mut kyy = vec![0.; max_rows];
        let mut cells = vec![0usize; max_rows];
        let mut sgr = vec![0.; max_rows * num_phases]; // residual CO2
        let mut l_swr = vec![0.; max_rows * num_phases]; // 1 - residual brine

        let fine_poro = fine_props.porosity();
        let fine_perm = fine_props.permeability();

        for col in 0..num_cols {
            let rows = up.num_rows(col);

            up.gather(col, &mut poro, fine_poro, 1, 0);
            upscaled_poro[col] = up.depth_average(col, &poro);

            up.gather(col, &mut kxx, fine_perm, PERM_MATRIX_3D, KXX_OFS_3D);
            up.gather(col, &mut kxy, fine_perm, PERM_MATRIX_3D, KXY_OFS_3D);
            up.gather(col, &mut kyy, fine_perm, PERM_MATRIX_3D, KYY_OFS_3D);
            let up_kxy = up.depth_average(col, &kxy);

            // the tensor is symmetric, so xy is mirrored into yx
            let tensor = &mut upscaled_absperm[col * PERM_MATRIX_2D..(col + 1) * PERM_MATRIX_2D];
            tensor[KXX_OFS_2D] = up.depth_average(col, &kxx);
            tensor[KXY_OFS_2D] = up_kxy;
            tensor[KYX_OFS_2D] = up_kxy;
            tensor[KYY_OFS_2D] = up.depth_average(col, &kyy);

            // the maximum CO2 saturation of a block is 1 - S_{w,r}, so both
            // residuals come out of the gas entry of each record
            up.gather_cells(col, &mut cells);
            fine_props.sat_range(
                &cells[..rows],
                &mut sgr[..rows * num_phases],
                &mut l_swr[..rows * num_phases],
            );

            let res_gas_col = res_gas_vol.col_mut(col);
            let mob_mix_col = mob_mix_vol.col_mut(col);
            let res_wat_col = res_wat_vol.col_mut(col);
            for row in 0..rows {
                let sgr_ = sgr[row * num_phases + gas];
                let l_swr_ = l_swr[row * num_phases + gas];

                res_gas_col[row] = poro[row] * sgr_;
                mob_mix_col[row] = poro[row] * (l_swr_ - sgr_);
                res_wat_col[row] = poro[row] * l_swr_;
            }

            up.depth_integral(col, res_gas_vol.col(col), res_gas_dpt.col_mut(col));
            up.depth_integral(col, mob_mix_vol.col(col), mob_mix_dpt.col_mut(col));
            up.depth_integral(col, res_wat_vol.col(col), res_wat_dpt.col_mut(col));
        }

        log::debug!(
            "upscaled {} fine cells into {} columns (tallest {} blocks, reference end {:?})",
            ts.num_fine_cells(),
            num_cols,
            max_rows,
            config.reference_end
        );

        // no plume yet; the first snapshot triggers every column that has CO2
        let trapping = (0..num_cols)
            .map(|col| TrappingState {
                max_gas_sat: 0.,
                elevation: up.bottom(col),
            })
            .collect();

        Ok(Self {
            fp: fine_props,
            up,
            config,
            upscaled_poro,
            upscaled_absperm,
            res_gas_vol,
            mob_mix_vol,
            res_wat_vol,
            res_gas_dpt,
            mob_mix_dpt,
            res_wat_dpt,
            trapping,
        })
    }

    fn check_fine_props(fp: &P, ts: &ColumnTopology, config: &VeConfig) -> VeResult<()> {
        if fp.num_dimensions() != THREE_DIMS {
            return Err(VeError::size(
                "fine grid dimensions",
                THREE_DIMS,
                fp.num_dimensions(),
            ));
        }
        let num_cells = fp.num_cells();
        if fp.porosity().len() != num_cells {
            return Err(VeError::size("porosity", num_cells, fp.porosity().len()));
        }
        if fp.permeability().len() != num_cells * PERM_MATRIX_3D {
            return Err(VeError::size(
                "permeability",
                num_cells * PERM_MATRIX_3D,
                fp.permeability().len(),
            ));
        }
        if config.gas_phase >= fp.num_phases() {
            return Err(VeError::InvalidConfig(format!(
                "gas phase {} is out of range for {} phases",
                config.gas_phase,
                fp.num_phases()
            )));
        }
        if let Some(cell) = ts.col_cells.iter().find(|&&cell| cell >= num_cells) {
            return Err(VeError::topology(format!(
                "fine cell {cell} is outside the {num_cells}-cell grid"
            )));
        }
        Ok(())
    }

    /// Record a new saturation snapshot of the 2-D grid.
    ///
    /// `snap` holds one record of `num_phases()` saturations per column. Columns
    /// whose CO2 saturation exceeds their historical maximum get a new trapping
    /// interface; all other columns are left untouched. Returns how many
    /// columns changed.
    pub fn update_trapping(&mut self, snap: &[f64]) -> VeResult<usize> {
        let num_phases = self.num_phases();
        let num_cols = self.upscaled_poro.len();
        if snap.len() < num_cols * num_phases {
            return Err(VeError::size("saturation snapshot", num_cols * num_phases, snap.len()));
        }

        let gas = self.config.gas_phase;
        let mut changed = 0;
        for col in 0..num_cols {
            let cur_sat = snap[col * num_phases + gas];
            if self.check_trapping(col, cur_sat) {
                changed += 1;
            }
        }

        log::debug!("saturation snapshot moved the trapping interface in {changed} of {num_cols} columns");
        Ok(changed)
    }

    /// Update the trapping state of one column with its current CO2 saturation.
    ///
    /// Returns whether a new maximum was seen (and the interface recomputed).
    pub fn check_trapping(&mut self, col: usize, cur_sat: f64) -> bool {
        if cur_sat > self.trapping[col].max_gas_sat {
            let elevation = self.residual_elevation(col, cur_sat);
            log::trace!(
                "column {col}: max CO2 saturation {:.4} -> {:.4}, interface at block {} + {:.3}",
                self.trapping[col].max_gas_sat,
                cur_sat,
                elevation.block,
                elevation.fraction
            );
            self.trapping[col] = TrappingState {
                max_gas_sat: cur_sat,
                elevation,
            };
            true
        } else {
            false
        }
    }

    /// Solve `H Φ S_{g,max} = ∫ φ (1 - S_{w,r}) dz` for the interface `ζ_R`.
    ///
    /// The stored profile is already divided by H.
    fn residual_elevation(&self, col: usize, max_sat: f64) -> Elevation {
        let max_vol = self.upscaled_poro[col] * max_sat;
        self.up.find(col, self.res_wat_dpt.col(col), max_vol)
    }

    /// Upscaled permeability of a column as a matrix
    pub fn permeability_tensor(&self, col: usize) -> DMat2 {
        let tensor = &self.upscaled_absperm[col * PERM_MATRIX_2D..(col + 1) * PERM_MATRIX_2D];
        // symmetric, so row- and column-major agree
        DMat2::from_cols_array(&[
            tensor[KXX_OFS_2D],
            tensor[KYX_OFS_2D],
            tensor[KXY_OFS_2D],
            tensor[KYY_OFS_2D],
        ])
    }

    /// Cumulative residual-CO2 volume fraction, `∫ φ S_{g,r} dz / H`
    pub fn residual_gas_profile(&self, col: usize) -> &[f64] {
        self.res_gas_dpt.col(col)
    }

    /// Cumulative mobile volume fraction, `∫ φ (1 - S_{w,r} - S_{g,r}) dz / H`
    pub fn mobile_profile(&self, col: usize) -> &[f64] {
        self.mob_mix_dpt.col(col)
    }

    /// Cumulative volume fraction available to CO2, `∫ φ (1 - S_{w,r}) dz / H`
    pub fn residual_water_profile(&self, col: usize) -> &[f64] {
        self.res_wat_dpt.col(col)
    }

    /// Per-block residual-CO2 volume fraction of a column
    pub fn residual_gas_fractions(&self, col: usize) -> &[f64] {
        self.res_gas_vol.col(col)
    }

    pub fn mobile_fractions(&self, col: usize) -> &[f64] {
        self.mob_mix_vol.col(col)
    }

    pub fn residual_water_fractions(&self, col: usize) -> &[f64] {
        self.res_wat_vol.col(col)
    }

    pub fn trapping(&self, col: usize) -> &TrappingState {
        &self.trapping[col]
    }

    pub fn trapping_states(&self) -> &[TrappingState] {
        &self.trapping
    }

    pub fn max_gas_saturation(&self, col: usize) -> f64 {
        self.trapping[col].max_gas_sat
    }

    pub fn trapping_elevation(&self, col: usize) -> Elevation {
        self.trapping[col].elevation
    }

    /// Residual CO2 left behind between the reference end and the trapping
    /// interface, as a fraction of the column's bulk volume
    pub fn residual_gas_volume(&self, col: usize) -> f64 {
        self.up
            .interpolate(col, self.res_gas_dpt.col(col), self.trapping[col].elevation)
    }

    pub fn upscaler(&self) -> &ColumnUpscaler<'a> {
        &self.up
    }

    pub fn config(&self) -> &VeConfig {
        &self.config
    }
}

impl<P: IncompProperties + ?Sized> IncompProperties for VeProps<'_, P> {
    fn num_dimensions(&self) -> usize {
        // the upscaled grid is always dimensionally reduced
        TWO_DIMS
    }

    fn num_cells(&self) -> usize {
        self.upscaled_poro.len()
    }

    fn porosity(&self) -> &[f64] {
        &self.upscaled_poro
    }

    fn permeability(&self) -> &[f64] {
        &self.upscaled_absperm
    }

    /* fluid properties don't change when upscaling */
    fn num_phases(&self) -> usize {
        self.fp.num_phases()
    }

    fn viscosity(&self) -> &[f64] {
        self.fp.viscosity()
    }

    fn density(&self) -> &[f64] {
        self.fp.density()
    }

    fn surface_density(&self) -> &[f64] {
        self.fp.surface_density()
    }

    fn relperm(
        &self,
        _s: &[f64],
        _cells: &[usize],
        _kr: &mut [f64],
        _dkrds: Option<&mut [f64]>,
    ) -> VeResult<()> {
        Err(VeError::NotImplemented("relperm"))
    }

    fn cap_press(
        &self,
        _s: &[f64],
        _cells: &[usize],
        _pc: &mut [f64],
        _dpcds: Option<&mut [f64]>,
    ) -> VeResult<()> {
        Err(VeError::NotImplemented("cap_press"))
    }

    /// Upscaled saturation is "how much of the column is filled", so anything from
    /// empty to full is admissible; the residual trapped in the fine blocks is
    /// tracked through [`TrappingState`] instead.
    fn sat_range(&self, cells: &[usize], smin: &mut [f64], smax: &mut [f64]) {
        let np = cells.len() * self.num_phases();
        smin[..np].fill(UPSCALED_SAT_MIN);
        smax[..np].fill(UPSCALED_SAT_MAX);
    }
}
