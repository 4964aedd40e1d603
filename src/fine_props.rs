use crate::constants::{
    BRINE_DENSITY_KGM3, BRINE_SURFACE_DENSITY_KGM3, BRINE_VISCOSITY_PA_S, CO2_DENSITY_KGM3,
    CO2_SURFACE_DENSITY_KGM3, CO2_VISCOSITY_PA_S, DEFAULT_COREY_EXPONENT, GAS, KXX_OFS_3D,
    KYY_OFS_3D, NUM_PHASES, PERM_MATRIX_3D, THREE_DIMS, WAT,
};
use crate::error::{VeError, VeResult};
use crate::properties::IncompProperties;

/// Input for [`FineGridProps::new`]; every per-cell vector must have one entry per cell
/// (nine for permeability), every per-phase array is ordered (gas, water).
#[derive(Clone, Debug)]
pub struct FineGridParams {
    pub porosity: Vec<f64>,
    pub permeability: Vec<f64>,
    /// Residual (connate) water saturation of each cell
    pub swr: Vec<f64>,
    /// Residual CO2 saturation of each cell
    pub sgr: Vec<f64>,
    pub viscosity: [f64; NUM_PHASES],
    pub density: [f64; NUM_PHASES],
    pub surface_density: [f64; NUM_PHASES],
    pub corey_exponent: f64,
}

impl FineGridParams {
    /// Homogeneous grid of `num_cells` cells with an isotropic permeability `perm` (m²)
    /// and CO2/brine fluid properties.
    pub fn uniform(num_cells: usize, porosity: f64, perm: f64, sgr: f64, swr: f64) -> Self {
        let mut permeability = vec![0.0; num_cells * PERM_MATRIX_3D];
        for tensor in permeability.chunks_exact_mut(PERM_MATRIX_3D) {
            for dim in 0..THREE_DIMS {
                tensor[dim * THREE_DIMS + dim] = perm;
            }
        }

        Self {
            porosity: vec![porosity; num_cells],
            permeability,
            swr: vec![swr; num_cells],
            sgr: vec![sgr; num_cells],
            viscosity: [CO2_VISCOSITY_PA_S, BRINE_VISCOSITY_PA_S],
            density: [CO2_DENSITY_KGM3, BRINE_DENSITY_KGM3],
            surface_density: [CO2_SURFACE_DENSITY_KGM3, BRINE_SURFACE_DENSITY_KGM3],
            corey_exponent: DEFAULT_COREY_EXPONENT,
        }
    }
}

/// In-memory fine-scale property table for a 3-D two-phase CO2/brine model.
///
/// Relative permeabilities follow a Corey power law of the normalized saturation
/// `(s - s_r) / (1 - swr - sgr)`; capillary pressure is neglected.
#[derive(Clone, Debug)]
pub struct FineGridProps {
    porosity: Vec<f64>,
    permeability: Vec<f64>,
    swr: Vec<f64>,
    sgr: Vec<f64>,
    viscosity: [f64; NUM_PHASES],
    density: [f64; NUM_PHASES],
    surface_density: [f64; NUM_PHASES],
    corey_exponent: f64,
}

impl FineGridProps {
    pub fn new(params: FineGridParams) -> VeResult<Self> {
        let num_cells = params.porosity.len();
        if params.permeability.len() != num_cells * PERM_MATRIX_3D {
            return Err(VeError::size(
                "permeability",
                num_cells * PERM_MATRIX_3D,
                params.permeability.len(),
            ));
        }
        if params.swr.len() != num_cells {
            return Err(VeError::size("swr", num_cells, params.swr.len()));
        }
        if params.sgr.len() != num_cells {
            return Err(VeError::size("sgr", num_cells, params.sgr.len()));
        }
        if let Some(cell) = (0..num_cells).find(|&c| {
            let (swr, sgr) = (params.swr[c], params.sgr[c]);
            !(swr >= 0.0 && sgr >= 0.0 && swr + sgr < 1.0)
        }) {
            return Err(VeError::InvalidConfig(format!(
                "residual saturations of cell {cell} leave no mobile range (swr = {}, sgr = {})",
                params.swr[cell], params.sgr[cell]
            )));
        }
        if !(params.corey_exponent > 0.0) {
            return Err(VeError::InvalidConfig(format!(
                "Corey exponent must be positive, got {}",
                params.corey_exponent
            )));
        }

        Ok(Self {
            porosity: params.porosity,
            permeability: params.permeability,
            swr: params.swr,
            sgr: params.sgr,
            viscosity: params.viscosity,
            density: params.density,
            surface_density: params.surface_density,
            corey_exponent: params.corey_exponent,
        })
    }

    /// Horizontal permeability (kxx, kyy) of a cell, for reporting
    pub fn horizontal_perm(&self, cell: usize) -> (f64, f64) {
        let tensor = &self.permeability[cell * PERM_MATRIX_3D..(cell + 1) * PERM_MATRIX_3D];
        (tensor[KXX_OFS_3D], tensor[KYY_OFS_3D])
    }

    /// Corey curve and its derivative with respect to the normalized saturation
    fn corey(&self, normalized: f64) -> (f64, f64) {
        let n = self.corey_exponent;
        if normalized <= 0.0 {
            (0.0, 0.0)
        } else if normalized >= 1.0 {
            (1.0, 0.0)
        } else {
            (normalized.powf(n), n * normalized.powf(n - 1.0))
        }
    }
}

impl IncompProperties for FineGridProps {
    fn num_dimensions(&self) -> usize {
        THREE_DIMS
    }

    fn num_cells(&self) -> usize {
        self.porosity.len()
    }

    fn porosity(&self) -> &[f64] {
        &self.porosity
    }

    fn permeability(&self) -> &[f64] {
        &self.permeability
    }

    fn num_phases(&self) -> usize {
        NUM_PHASES
    }

    fn viscosity(&self) -> &[f64] {
        &self.viscosity
    }

    fn density(&self) -> &[f64] {
        &self.density
    }

    fn surface_density(&self) -> &[f64] {
        &self.surface_density
    }

    fn relperm(
        &self,
        s: &[f64],
        cells: &[usize],
        kr: &mut [f64],
        mut dkrds: Option<&mut [f64]>,
    ) -> VeResult<()> {
        let np = NUM_PHASES;
        if s.len() < cells.len() * np {
            return Err(VeError::size("saturations", cells.len() * np, s.len()));
        }
        if kr.len() < cells.len() * np {
            return Err(VeError::size("kr", cells.len() * np, kr.len()));
        }
        if let Some(d) = dkrds.as_deref() {
            if d.len() < cells.len() * np * np {
                return Err(VeError::size("dkrds", cells.len() * np * np, d.len()));
            }
        }

        for (ndx, &cell) in cells.iter().enumerate() {
            let (swr, sgr) = (self.swr[cell], self.sgr[cell]);
            let mobile = 1.0 - swr - sgr;

            let (krg, dkrg) = self.corey((s[ndx * np + GAS] - sgr) / mobile);
            let (krw, dkrw) = self.corey((s[ndx * np + WAT] - swr) / mobile);
            kr[ndx * np + GAS] = krg;
            kr[ndx * np + WAT] = krw;

            if let Some(d) = dkrds.as_deref_mut() {
                let block = &mut d[ndx * np * np..(ndx + 1) * np * np];
                block.fill(0.0);
                block[GAS * np + GAS] = dkrg / mobile;
                block[WAT * np + WAT] = dkrw / mobile;
            }
        }
        Ok(())
    }

    fn cap_press(
        &self,
        s: &[f64],
        cells: &[usize],
        pc: &mut [f64],
        dpcds: Option<&mut [f64]>,
    ) -> VeResult<()> {
        let np = NUM_PHASES;
        if s.len() < cells.len() * np {
            return Err(VeError::size("saturations", cells.len() * np, s.len()));
        }
        pc[..cells.len() * np].fill(0.0);
        if let Some(d) = dpcds {
            d[..cells.len() * np * np].fill(0.0);
        }
        Ok(())
    }

    fn sat_range(&self, cells: &[usize], smin: &mut [f64], smax: &mut [f64]) {
        let np = NUM_PHASES;
        for (ndx, &cell) in cells.iter().enumerate() {
            let (swr, sgr) = (self.swr[cell], self.sgr[cell]);
            smin[ndx * np + GAS] = sgr;
            smin[ndx * np + WAT] = swr;
            smax[ndx * np + GAS] = 1.0 - swr;
            smax[ndx * np + WAT] = 1.0 - sgr;
        }
    }
}
