//! Vertical-equilibrium upscaling of fine 3-D reservoir properties into a 2-D
//! grid of columns, with residual-CO2 trapping history per column.

pub mod config;
pub mod constants;
pub mod elevation;
pub mod error;
pub mod fine_props;
pub mod properties;
pub mod run_len;
pub mod topology;
pub mod upscaler;
pub mod ve_props;

pub use config::{ReferenceEnd, VeConfig};
pub use elevation::Elevation;
pub use error::{VeError, VeResult};
pub use fine_props::{FineGridParams, FineGridProps};
pub use properties::IncompProperties;
pub use topology::ColumnTopology;
pub use upscaler::ColumnUpscaler;
pub use ve_props::{TrappingState, VeProps};
