// End-to-end trapping scenarios on small, hand-checkable columns

use approx::assert_abs_diff_eq;
use verteq_rust::constants::{GAS, MILLIDARCY_M2, WAT};
use verteq_rust::{
    ColumnTopology, Elevation, FineGridParams, FineGridProps, IncompProperties, ReferenceEnd,
    VeConfig, VeError, VeProps,
};

/// One column of two unit-thickness blocks, φ = 0.2, S_{g,r} = 0.1, 1 - S_{w,r} = 0.8
fn two_block_column() -> (FineGridProps, ColumnTopology) {
    let ts = ColumnTopology::new(vec![0, 2], vec![0, 1], vec![1.0, 1.0]).unwrap();
    let fine =
        FineGridProps::new(FineGridParams::uniform(2, 0.2, 200.0 * MILLIDARCY_M2, 0.1, 0.2))
            .unwrap();
    (fine, ts)
}

#[test]
fn test_two_block_column() {
    let (fine, ts) = two_block_column();
    let mut props = VeProps::new(&fine, &ts).unwrap();

    assert_abs_diff_eq!(props.porosity()[0], 0.2, epsilon = 1e-12);
    assert_abs_diff_eq!(props.residual_gas_profile(0)[1], 0.02, epsilon = 1e-12);
    assert_abs_diff_eq!(props.residual_water_profile(0)[0], 0.08, epsilon = 1e-12);
    assert_abs_diff_eq!(props.residual_water_profile(0)[1], 0.16, epsilon = 1e-12);

    // target volume 0.2 * 0.5 = 0.10, between 0.08 and 0.16
    let mut snap = [0.0; 2];
    snap[GAS] = 0.5;
    snap[WAT] = 0.5;
    assert_eq!(props.update_trapping(&snap).unwrap(), 1);

    let elev = props.trapping_elevation(0);
    assert_eq!(elev.block, 1);
    assert_abs_diff_eq!(elev.fraction, 0.25, epsilon = 1e-12);
    assert_eq!(props.max_gas_saturation(0), 0.5);

    // residual CO2: all of block 0 plus a quarter of block 1, over H = 2
    assert_abs_diff_eq!(
        props.residual_gas_volume(0),
        (0.02 + 0.25 * 0.02) / 2.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_ratchet_keeps_largest_plume() {
    let (fine, ts) = two_block_column();
    let mut props = VeProps::new(&fine, &ts).unwrap();

    props.update_trapping(&[0.2, 0.8]).unwrap();
    let first = *props.trapping(0);
    assert_eq!(first.max_gas_sat, 0.2);
    // 0.2 * 0.2 = 0.04 is half way through block 0
    assert_eq!(first.elevation.block, 0);
    assert_abs_diff_eq!(first.elevation.fraction, 0.5, epsilon = 1e-12);

    props.update_trapping(&[0.5, 0.5]).unwrap();
    let second = *props.trapping(0);
    assert_eq!(second.max_gas_sat, 0.5);
    assert_eq!(second.elevation.block, 1);

    // the plume shrinks, but the trapped residual stays where it was
    assert_eq!(props.update_trapping(&[0.3, 0.7]).unwrap(), 0);
    assert_eq!(*props.trapping(0), second);

    // equal saturation is not a new maximum either
    assert_eq!(props.update_trapping(&[0.5, 0.5]).unwrap(), 0);
}

#[test]
fn test_saturated_column_is_full() {
    let (fine, ts) = two_block_column();
    let mut props = VeProps::new(&fine, &ts).unwrap();

    // 0.2 * 0.9 = 0.18 exceeds the 0.16 the column can hold
    props.update_trapping(&[0.9, 0.1]).unwrap();
    assert_eq!(props.trapping_elevation(0), Elevation::new(1, 1.0));
    assert_abs_diff_eq!(props.residual_gas_volume(0), 0.02, epsilon = 1e-12);
}

#[test]
fn test_reference_end_changes_interface() {
    // top block is the high-porosity one
    let ts = ColumnTopology::new(vec![0, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0]).unwrap();
    let mut params = FineGridParams::uniform(3, 0.1, 100.0 * MILLIDARCY_M2, 0.0, 0.2);
    params.porosity[0] = 0.3;
    let fine = FineGridProps::new(params).unwrap();

    let mut from_top = VeProps::new(&fine, &ts).unwrap();
    let bottom_config = VeConfig {
        reference_end: ReferenceEnd::Bottom,
        ..VeConfig::default()
    };
    let mut from_bottom = VeProps::with_config(&fine, &ts, bottom_config).unwrap();

    // upscaling itself does not depend on the direction
    assert_abs_diff_eq!(from_top.porosity()[0], 0.5 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(from_bottom.porosity()[0], 0.5 / 3.0, epsilon = 1e-12);
    assert_eq!(from_top.permeability(), from_bottom.permeability());

    // target volume (0.5 / 3) * 0.3 = 0.05
    let snap = [0.3, 0.7];
    from_top.update_trapping(&snap).unwrap();
    from_bottom.update_trapping(&snap).unwrap();

    // from the top, block 0 alone holds 0.24 / 3 = 0.08
    let top_elev = from_top.trapping_elevation(0);
    assert_eq!(top_elev.block, 0);
    assert_abs_diff_eq!(top_elev.fraction, 0.625, epsilon = 1e-9);

    // from the bottom, two tight blocks hold 0.08 / 3 each
    let bottom_elev = from_bottom.trapping_elevation(0);
    assert_eq!(bottom_elev.block, 1);
    assert_abs_diff_eq!(bottom_elev.fraction, 0.875, epsilon = 1e-9);

    assert_eq!(from_bottom.config().reference_end, ReferenceEnd::Bottom);
    assert_eq!(from_bottom.upscaler().reference_end(), ReferenceEnd::Bottom);
}

#[test]
fn test_cartesian_grid_columns_are_independent() {
    let ts = ColumnTopology::cartesian(3, 2, &[2.0, 1.0, 1.0]).unwrap();
    let mut params = FineGridParams::uniform(18, 0.2, 100.0 * MILLIDARCY_M2, 0.1, 0.2);
    // make column 4 (i = 1, j = 1) twice as porous in every layer
    for k in 0..3 {
        params.porosity[4 + 6 * k] = 0.4;
    }
    let fine = FineGridProps::new(params).unwrap();
    let mut props = VeProps::new(&fine, &ts).unwrap();

    for col in 0..6 {
        let expected = if col == 4 { 0.4 } else { 0.2 };
        assert_abs_diff_eq!(props.porosity()[col], expected, epsilon = 1e-12);
    }

    let mut snap = vec![0.0; 12];
    snap[4 * 2 + GAS] = 0.4;
    assert_eq!(props.update_trapping(&snap).unwrap(), 1);
    for col in 0..6 {
        if col != 4 {
            assert_eq!(props.trapping_elevation(col), Elevation::default());
        }
    }
    // 0.4 * 0.4 = 0.16; block 0 (dz = 2 of H = 4) holds 0.4 * 0.8 * 2 / 4 = 0.16
    assert_abs_diff_eq!(props.trapping_elevation(4).as_rows(), 1.0, epsilon = 1e-9);
}

#[test]
fn test_rejects_two_dimensional_source() {
    let (fine, ts) = two_block_column();
    let upscaled = VeProps::new(&fine, &ts).unwrap();

    // an upscaled model cannot be upscaled again
    let again = VeProps::new(&upscaled, &ts);
    assert!(matches!(
        again,
        Err(VeError::SizeMismatch { what: "fine grid dimensions", expected: 3, actual: 2 })
    ));
}
