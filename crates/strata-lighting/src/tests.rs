use proptest::prelude::*;
use strata_chunk::BlockRect;

use super::*;

fn single_source(
    w: usize,
    h: usize,
    sx: usize,
    sy: usize,
    strength: f32,
    absorb: f32,
    threshold: f32,
) -> Vec<f32> {
    let mut plane = vec![0.0; w * h];
    plane[sy * w + sx] = strength;
    let abs = vec![absorb; w * h];
    flood_channel(&mut plane, &abs, w, h, threshold);
    plane
}

#[test]
fn flood_stops_at_threshold_distance() {
    // S = 1, f = 0.5, T = 0.05: floor(log(T/S)/log(f)) = 4
    let (w, h) = (21, 21);
    let plane = single_source(w, h, 10, 10, 1.0, 0.5, 0.05);
    for d in 1..=4usize {
        let v = plane[10 * w + 10 + d];
        assert!((v - 0.5f32.powi(d as i32)).abs() < 1e-6, "distance {d}: {v}");
    }
    assert_eq!(plane[10 * w + 15], 0.0);
    assert_eq!(plane[10 * w + 5], 0.0);
    assert_eq!(plane[15 * w + 10], 0.0);
}

#[test]
fn diagonal_steps_use_raised_absorb() {
    let (w, h) = (5, 5);
    let plane = single_source(w, h, 2, 2, 1.0, 0.5, 0.01);
    let diag = plane[3 * w + 3];
    assert!((diag - 0.5f32.powf(DIAGONAL_EXPONENT)).abs() < 1e-6);
}

#[test]
fn opaque_cells_stop_light() {
    let (w, h) = (7, 1);
    let mut plane = vec![0.0; w * h];
    plane[0] = 1.0;
    let mut abs = vec![0.9; w * h];
    abs[3] = 0.0;
    flood_channel(&mut plane, &abs, w, h, 0.05);
    assert!(plane[2] > 0.0);
    assert_eq!(plane[3], 0.0);
    assert_eq!(plane[4], 0.0);
}

#[test]
fn ambient_falloff_profile() {
    let cfg = LightingConfig::default();
    assert_eq!(cfg.ambient_falloff(-100), 1.0);
    assert_eq!(cfg.ambient_falloff(10), 1.0);
    assert_eq!(cfg.ambient_falloff(30), 0.5);
    assert_eq!(cfg.ambient_falloff(50), 0.0);
    assert_eq!(cfg.ambient_falloff(80), 0.0);
}

#[test]
fn config_validation() {
    assert!(LightingConfig::default().validate().is_ok());
    let bad = LightingConfig {
        ambient_falloff_range: 0.0,
        ..LightingConfig::default()
    };
    assert!(matches!(
        bad.validate(),
        Err(ConfigError::NotPositive {
            field: "ambient_falloff_range",
            ..
        })
    ));
    let bad = LightingConfig {
        layers: vec![],
        ..LightingConfig::default()
    };
    assert_eq!(bad.validate(), Err(ConfigError::NoLayers));
    let bad = LightingConfig {
        ambient_strength: -1.0,
        ..LightingConfig::default()
    };
    assert_eq!(bad.validate(), Err(ConfigError::NegativeAmbient(-1.0)));
    let bad = LightingConfig {
        max_hz: f32::MIN_POSITIVE / 4.0,
        ..LightingConfig::default()
    };
    assert!(matches!(bad.validate(), Err(ConfigError::MaxRate(_))));
}

#[test]
fn sample_nearest_and_bilinear() {
    let window = BlockRect::new(10, 0, 2, 1);
    let plane = vec![0.0, 1.0];
    let sharp = LightField::new(window, [16.0, 16.0], false, vec![plane.clone()]);
    // block 10 covers world x 160..176
    assert_eq!(sharp.sample(170.0, 8.0), [0.0; 3]);
    assert_eq!(sharp.sample(180.0, 8.0), [1.0; 3]);
    assert!(!sharp.is_smooth());

    let smooth = LightField::new(window, [16.0, 16.0], true, vec![plane]);
    // halfway between the two cell centers (168 and 184)
    assert!(smooth.is_smooth());
    let mid = smooth.sample(176.0, 8.0);
    assert!((mid[0] - 0.5).abs() < 1e-6);
    // clamped at the edges
    assert_eq!(smooth.sample(100.0, 8.0), [0.0; 3]);
    assert_eq!(smooth.sample(400.0, 8.0), [1.0; 3]);
    assert_eq!(smooth.origin(), [160.0, 0.0]);
    assert_eq!(smooth.world_size(), [32.0, 16.0]);
}

#[test]
fn bytes_pack_per_channel() {
    let window = BlockRect::new(0, 0, 2, 1);
    let planes = vec![vec![0.0, 2.0], vec![0.5, 0.0], vec![1.0, 1.0]];
    let field = LightField::new(window, [1.0, 1.0], false, planes);
    assert_eq!(field.to_bytes(), vec![0, 128, 255, 255, 0, 255]);
}

proptest! {
    // Light never exceeds the brightest source and never grows with distance
    // along a straight line from a lone source.
    #[test]
    fn flood_is_bounded_and_monotonic(
        strength in 0.1f32..8.0,
        absorb in 0.05f32..=1.0,
        sx in 0usize..16,
        sy in 0usize..16,
    ) {
        let (w, h) = (16, 16);
        let plane = single_source(w, h, sx, sy, strength, absorb, 0.05);
        for v in &plane {
            prop_assert!(*v <= strength + 1e-6);
        }
        for x in sx + 1..w {
            prop_assert!(plane[sy * w + x] <= plane[sy * w + x - 1] + 1e-6);
        }
        for x in (0..sx).rev() {
            prop_assert!(plane[sy * w + x] <= plane[sy * w + x + 1] + 1e-6);
        }
    }
}
