//! Plume ratchet demo: a CO2 plume grows and then retreats through a layered
//! aquifer, and the residual CO2 it leaves behind in each column is reported.
//!
//! Run with `RUST_LOG=debug cargo run --example plume_ratchet` to see the
//! upscaling and trapping log output.

use colored::Colorize;
use verteq_rust::constants::{GAS, MILLIDARCY_M2, PERM_MATRIX_3D, WAT};
use verteq_rust::{
    ColumnTopology, FineGridParams, FineGridProps, IncompProperties, VeError, VeProps,
};

const NX: usize = 4;
const NY: usize = 1;
const LAYER_DZ: [f64; 6] = [2.0, 2.0, 4.0, 4.0, 4.0, 4.0];

/// Sandstone with a shaly layer in the middle and porosity decreasing with depth
fn layered_aquifer(ts: &ColumnTopology) -> Result<FineGridProps, VeError> {
    let num_cols = ts.number_of_cells;
    let mut params = FineGridParams::uniform(
        ts.num_fine_cells(),
        0.25,
        500.0 * MILLIDARCY_M2,
        0.15,
        0.2,
    );

    for (k, _) in LAYER_DZ.iter().enumerate() {
        let shaly = k == 3;
        for col in 0..num_cols {
            let cell = col + num_cols * k;
            params.porosity[cell] = if shaly { 0.08 } else { 0.28 - 0.02 * k as f64 };
            params.swr[cell] = if shaly { 0.45 } else { 0.2 };

            let perm = if shaly { 5.0 } else { 800.0 - 100.0 * k as f64 } * MILLIDARCY_M2;
            let tensor = &mut params.permeability[cell * PERM_MATRIX_3D..(cell + 1) * PERM_MATRIX_3D];
            tensor[0] = perm;
            tensor[4] = 0.8 * perm;
            tensor[8] = 0.1 * perm;
        }
    }

    FineGridProps::new(params)
}

fn print_state(props: &VeProps<'_, FineGridProps>, label: &str, snap: &[f64]) {
    println!("\n{}", label.bold());
    println!(
        "   {:>6} {:>10} {:>10} {:>14} {:>14}",
        "column", "S_g", "S_g,max", "interface", "residual CO2"
    );

    let np = props.num_phases();
    for col in 0..props.num_cells() {
        let state = props.trapping(col);
        let current = snap[col * np + GAS];
        let interface = format!("{} + {:.3}", state.elevation.block, state.elevation.fraction);
        let line = format!(
            "   {:>6} {:>10.3} {:>10.3} {:>14} {:>14.5}",
            col,
            current,
            state.max_gas_sat,
            interface,
            props.residual_gas_volume(col)
        );

        if current < state.max_gas_sat {
            // plume retreated: the trapped residual stays behind
            println!("{}", line.yellow());
        } else if state.max_gas_sat > 0.0 {
            println!("{}", line.green());
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn snapshot(gas: &[f64]) -> Vec<f64> {
    let mut snap = vec![0.0; gas.len() * 2];
    for (col, sat) in gas.iter().enumerate() {
        snap[col * 2 + GAS] = *sat;
        snap[col * 2 + WAT] = 1.0 - sat;
    }
    snap
}

pub fn run_plume_ratchet() -> Result<(), VeError> {
    let ts = ColumnTopology::cartesian(NX, NY, &LAYER_DZ)?;
    let fine = layered_aquifer(&ts)?;
    let mut props = VeProps::new(&fine, &ts)?;

    println!("{}", "🪨 Upscaled columns".bold().cyan());
    for col in 0..props.num_cells() {
        let k = props.permeability_tensor(col);
        println!(
            "   column {}: Φ = {:.4}, kxx = {:.1} mD, kyy = {:.1} mD, CO2 capacity = {:.4}",
            col,
            props.porosity()[col],
            k.x_axis.x / MILLIDARCY_M2,
            k.y_axis.y / MILLIDARCY_M2,
            props.residual_water_profile(col)[ts.col_size(col) - 1]
        );
    }

    // injection near column 0, plume spreading outwards, then migrating away
    let schedule: [(&str, [f64; NX]); 4] = [
        ("💨 Injection starts", [0.20, 0.05, 0.00, 0.00]),
        ("💨 Plume spreads", [0.45, 0.30, 0.10, 0.00]),
        ("↪️ Plume migrates", [0.25, 0.35, 0.30, 0.15]),
        ("🧊 Post-injection", [0.05, 0.10, 0.20, 0.25]),
    ];

    for (label, gas) in schedule {
        let snap = snapshot(&gas);
        let changed = props.update_trapping(&snap)?;
        print_state(&props, &format!("{label} ({changed} columns advanced)"), &snap);
    }

    let total: f64 = (0..props.num_cells())
        .map(|col| props.residual_gas_volume(col) * ts.h_tot[col])
        .sum();
    println!(
        "\n✅ Residual CO2 trapped: {:.4} m³ per m² of footprint",
        total
    );

    match props.relperm(&[0.5, 0.5], &[0], &mut [0.0; 2], None) {
        Err(err) => println!("{}", format!("⚠️  {err}").red()),
        Ok(()) => println!("relperm unexpectedly succeeded"),
    }

    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run_plume_ratchet() {
        eprintln!("{}", format!("plume ratchet failed: {err}").red());
        std::process::exit(1);
    }
}
