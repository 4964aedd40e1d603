// Grid dimensionality
pub const TWO_DIMS: usize = 2;
pub const THREE_DIMS: usize = 3;

// size of the permeability tensors (in numbers)
pub const PERM_MATRIX_2D: usize = TWO_DIMS * TWO_DIMS;
pub const PERM_MATRIX_3D: usize = THREE_DIMS * THREE_DIMS;

// offsets into a row-major 3x3 permeability tensor
pub const KXX_OFS_3D: usize = 0 * THREE_DIMS + 0;
pub const KXY_OFS_3D: usize = 0 * THREE_DIMS + 1;
pub const KYY_OFS_3D: usize = 1 * THREE_DIMS + 1;

// offsets into a row-major 2x2 permeability tensor
pub const KXX_OFS_2D: usize = 0 * TWO_DIMS + 0;
pub const KXY_OFS_2D: usize = 0 * TWO_DIMS + 1;
pub const KYX_OFS_2D: usize = 1 * TWO_DIMS + 0;
pub const KYY_OFS_2D: usize = 1 * TWO_DIMS + 1;

// phase ordering inside every per-cell saturation record
pub const GAS: usize = 0;
pub const WAT: usize = 1;
pub const NUM_PHASES: usize = 2;

// Saturation bounds of the upscaled model: "empty column" to "full column"
pub const UPSCALED_SAT_MIN: f64 = 0.0;
pub const UPSCALED_SAT_MAX: f64 = 1.0;

// Default Corey exponent for the fine-grid relative permeability curves
pub const DEFAULT_COREY_EXPONENT: f64 = 2.0;

// Typical CO2 storage fluids (brine aquifer at ~1 km depth)
pub const CO2_VISCOSITY_PA_S: f64 = 5.0e-5;
pub const BRINE_VISCOSITY_PA_S: f64 = 5.0e-4;
pub const CO2_DENSITY_KGM3: f64 = 700.0;
pub const BRINE_DENSITY_KGM3: f64 = 1030.0;
pub const CO2_SURFACE_DENSITY_KGM3: f64 = 1.87;
pub const BRINE_SURFACE_DENSITY_KGM3: f64 = 1030.0;

// One millidarcy in m²
pub const MILLIDARCY_M2: f64 = 9.869233e-16;
