use std::sync::Arc;

use strata_blocks::{Block, BlockRegistry};
use strata_lighting::{Lighting, LightingConfig};
use strata_world::{BlockRect, ChunkGrid, GridConfig, ViewRect};

const PALETTE: &str = r#"
[[blocks]]
name = "air"
id = 0
light_absorb = 0.5

[[blocks]]
name = "stone"
id = 1
solid = true
light_absorb = 0.0

[[blocks]]
name = "water"
id = 2
light_absorb = [0.6, 0.8, 0.9]

[[blocks]]
name = "torch"
id = 3
emit_color = [1.0, 0.5, 0.25]
emit_strength = 1.0
"#;

fn setup(layers: usize, cfg: LightingConfig) -> (Arc<ChunkGrid>, Lighting) {
    let grid_cfg = GridConfig {
        chunk_width: 16,
        chunk_height: 16,
        layers: (0..layers).map(|i| format!("l{i}")).collect(),
        block_size: [1.0, 1.0],
        padding: [0, 0],
    };
    let generator = Arc::new(|_: usize, _: i32, _: i32| 0u16);
    let grid = Arc::new(ChunkGrid::new(&grid_cfg, generator).unwrap());
    let registry = Arc::new(BlockRegistry::from_toml_str(PALETTE).unwrap());
    let lighting = Lighting::new(Arc::clone(&grid), registry, cfg).unwrap();
    (grid, lighting)
}

fn dark() -> LightingConfig {
    LightingConfig {
        ambient_strength: 0.0,
        ..LightingConfig::default()
    }
}

#[test]
fn torch_light_fades_per_channel() {
    let (grid, lighting) = setup(1, dark());
    grid.set_id(8, 8, 0, 3);
    let field = lighting.compute_window(BlockRect::new(0, 0, 32, 16));
    assert_eq!(field.get(8, 8), [1.0, 0.5, 0.25]);
    let one = field.get(9, 8);
    assert!((one[0] - 0.5).abs() < 1e-6);
    assert!((one[1] - 0.25).abs() < 1e-6);
    // blue starts at 0.25 and its first step drops to 0.125
    assert!((one[2] - 0.125).abs() < 1e-6);
    // red reaches distance 4, blue only distance 2 before crossing 0.05
    assert!(field.get(12, 8)[0] > 0.0);
    assert_eq!(field.get(13, 8)[0], 0.0);
    assert!(field.get(10, 8)[2] > 0.0);
    assert_eq!(field.get(11, 8)[2], 0.0);
}

#[test]
fn ambient_fills_open_sky_and_stops_at_solid_rows() {
    let cfg = LightingConfig {
        ambient_end: 100.0,
        ..LightingConfig::default()
    };
    let (grid, lighting) = setup(1, cfg);
    for x in -2..34 {
        grid.set_id(x, 5, 0, 1);
    }
    let field = lighting.compute_window(BlockRect::new(0, 0, 32, 16));
    for x in 0..32 {
        assert_eq!(field.get(x, 2), [1.0; 3]);
        assert_eq!(field.get(x, 5), [0.0; 3]);
        assert_eq!(field.get(x, 9), [0.0; 3]);
    }
}

#[test]
fn ambient_fades_with_depth() {
    let (_grid, lighting) = setup(1, LightingConfig::default());
    let field = lighting.compute_window(BlockRect::new(0, 0, 4, 64));
    assert_eq!(field.get(1, 10), [1.0; 3]);
    let mid = field.get(1, 30);
    assert!((mid[0] - 0.5).abs() < 1e-6, "{mid:?}");
}

#[test]
fn grayscale_uses_channel_mean() {
    let cfg = LightingConfig {
        colored: false,
        ambient_color: [1.0, 0.5, 0.0],
        ..LightingConfig::default()
    };
    let (_grid, lighting) = setup(1, cfg);
    let field = lighting.compute_window(BlockRect::new(0, 0, 4, 4));
    assert_eq!(field.channels(), 1);
    assert_eq!(field.get(0, 0), [0.5; 3]);
    assert_eq!(field.to_bytes().len(), 16);
}

#[test]
fn transitional_fluid_reveals_the_layer_behind() {
    let cfg = LightingConfig {
        layers: vec![0, 1],
        ..dark()
    };
    let (grid, lighting) = setup(2, cfg);
    grid.set(4, 4, 0, Block::fluid(2, 0.3));
    grid.set_id(4, 4, 1, 3);
    grid.set(10, 4, 0, Block::fluid(2, 0.9));
    grid.set_id(10, 4, 1, 3);
    let field = lighting.compute_window(BlockRect::new(0, 0, 16, 16));
    // The shallow cell exposes the torch behind it, the full one hides it.
    assert_eq!(field.get(4, 4), [1.0, 0.5, 0.25]);
    assert!(field.get(10, 4)[0] < 1.0);
}

#[test]
fn compute_follows_visible_window() {
    let (grid, lighting) = setup(1, LightingConfig::default());
    assert!(lighting.compute().is_none());
    grid.advance_frame(ViewRect::new(0.5, 0.5, 4.0, 4.0));
    let field = lighting.compute().unwrap();
    assert_eq!(field.window(), BlockRect::new(0, 0, 16, 16));
    assert_eq!(field.width(), 16);
    assert_eq!(field.height(), 16);
}

#[test]
fn rejects_layer_outside_grid() {
    let grid = Arc::new(
        ChunkGrid::new(&GridConfig::default(), Arc::new(|_: usize, _: i32, _: i32| 0u16)).unwrap(),
    );
    let cfg = LightingConfig {
        layers: vec![0, 7],
        ..LightingConfig::default()
    };
    assert!(Lighting::new(grid, Arc::new(BlockRegistry::new()), cfg).is_err());
}
