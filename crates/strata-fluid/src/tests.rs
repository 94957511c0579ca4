use std::sync::Arc;

use proptest::prelude::*;
use strata_blocks::Block;
use strata_world::{ChunkGrid, GridConfig};

use super::*;

fn vf(remaining: f32, dest: f32) -> f32 {
    vertical_flow(remaining, dest, 1.0, 0.25)
}

#[test]
fn vertical_flow_fills_one_cell_when_pair_fits() {
    assert_eq!(vf(0.6, 0.3), 1.0);
    assert_eq!(vf(0.0, 0.0), 1.0);
}

#[test]
fn vertical_flow_compresses_deep_stacks() {
    assert_eq!(vf(2.5, 0.0), 1.375);
    // middle branch: (1 + 1.5 * 0.25) / 1.25
    assert!((vf(1.0, 0.5) - 1.1).abs() < 1e-6);
}

proptest! {
    // The lower cell is never asked to hold more than the pair holds,
    // and always at least one full cell.
    #[test]
    fn vertical_flow_is_bounded(r in 0.0f32..10.0, d in 0.0f32..10.0) {
        let sum = r + d;
        let v = vf(r, d);
        prop_assert!(v >= 1.0 - 1e-6);
        if sum > 1.0 {
            prop_assert!(v <= sum + 1e-5);
        }
    }

    // More liquid in the pair never lowers the lower cell's share.
    #[test]
    fn vertical_flow_is_monotonic(a in 0.0f32..10.0, b in 0.0f32..10.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(vf(lo, 0.0) <= vf(hi, 0.0) + 1e-6);
    }
}

#[test]
fn config_defaults_validate() {
    assert!(FluidConfig::default().validate().is_ok());
}

#[test]
fn config_rejects_bad_values() {
    let bad = FluidConfig {
        max_value: 0.0,
        ..FluidConfig::default()
    };
    assert_eq!(
        bad.validate(),
        Err(ConfigError::NotPositive {
            field: "max_value",
            value: 0.0
        })
    );
    let bad = FluidConfig {
        min_value: 2.0,
        ..FluidConfig::default()
    };
    assert!(matches!(bad.validate(), Err(ConfigError::MinAboveMax { .. })));
    let bad = FluidConfig {
        max_compression: -0.1,
        ..FluidConfig::default()
    };
    assert!(matches!(bad.validate(), Err(ConfigError::NegativeCompression(_))));
    let bad = FluidConfig {
        block_id: 0,
        ..FluidConfig::default()
    };
    assert_eq!(bad.validate(), Err(ConfigError::AirFluid));
    let bad = FluidConfig {
        tick_hz: f32::MIN_POSITIVE / 4.0,
        ..FluidConfig::default()
    };
    assert!(matches!(bad.validate(), Err(ConfigError::TickRate(_))));
}

fn empty_grid() -> ChunkGrid {
    let generator = Arc::new(|_: usize, _: i32, _: i32| 0u16);
    ChunkGrid::new(&GridConfig::default(), generator).unwrap()
}

fn solver() -> FluidSolver {
    FluidSolver::new(Arc::new(empty_grid()), FluidConfig::default()).unwrap()
}

#[test]
fn solver_rejects_layer_past_grid() {
    let grid = empty_grid();
    let cfg = FluidConfig {
        layer: 5,
        ..FluidConfig::default()
    };
    assert!(matches!(
        FluidSolver::new(Arc::new(grid), cfg),
        Err(ConfigError::Grid(_))
    ));
}

#[test]
fn tint_only_for_fluid_cells() {
    let s = solver();
    assert_eq!(s.tint(&Block::new(1)), None);
    let half = s.tint(&Block::fluid(3, 0.5)).unwrap();
    assert_eq!(half, [0.0, 1.0, 1.0, 0.8]);
    let full = s.tint(&Block::fluid(3, 0.9)).unwrap();
    assert_eq!(full[3], 0.9);
}

#[test]
fn tint_shades_toward_pressure_color() {
    let s = solver();
    // halfway between max_value 1 and max_flow 4
    let c = s.tint(&Block::fluid(3, 2.5)).unwrap();
    assert!((c[1] - 0.5).abs() < 1e-6);
    assert!((c[2] - 1.0).abs() < 1e-6);
    assert!((c[3] - 2.5 - (1.0 - 2.5) * 0.5).abs() < 1e-6);
}

#[test]
fn tick_without_window_is_noop() {
    let s = solver();
    assert_eq!(s.tick(), FluidTickStats::default());
}
