use geolayers_wasm::config::{continuous_palette, discrete_palette};
use geolayers_wasm::noise::{NoiseField, GRID_SIZE};
use geolayers_wasm::raster::{noise_coord, synthesize, Classifier, RasterCache, RasterSlot};
use geolayers_wasm::rng::Mulberry32;
use geolayers_wasm::structural::{generate, FeatureKind, StructuralConfig, Weight};
use geolayers_wasm::{Seed, Viewport};
use rstest::rstest;

#[rstest]
#[case(42)]
#[case(137)]
#[case(271)]
#[case(389)]
#[case(777)]
fn prng_replays_for_a_seed(#[case] seed: u32) {
    let mut a = Mulberry32::new(Seed(seed));
    let mut b = Mulberry32::new(Seed(seed));
    for _ in 0..1000 {
        assert_eq!(a.next_u32(), b.next_u32());
    }
}

#[rstest]
#[case(0.0, 0.0)]
#[case(3.25, 7.75)]
#[case(-5.5, 12.1)]
#[case(-0.001, -63.999)]
#[case(1000.3, -2000.7)]
#[case(1e19, 0.5)]
#[case(-1e300, 1e300)]
fn noise_stays_in_unit_range(#[case] x: f64, #[case] y: f64) {
    let field = NoiseField::new(Seed(42));
    let v = field.sample(x, y);
    assert!((0.0..1.0).contains(&v), "sample({x}, {y}) = {v}");
}

#[test]
fn noise_tiles_every_grid_size() {
    let field = NoiseField::new(Seed(137));
    let period = GRID_SIZE as f64;
    // quarter steps keep `x + period` exact
    for i in 0..50 {
        let (x, y) = (i as f64 * 0.25, i as f64 * 0.75);
        let base = field.sample(x, y);
        assert_eq!(base, field.sample(x + period, y), "({x}, {y})");
        assert_eq!(base, field.sample(x, y - period), "({x}, {y})");
    }
}

#[test]
fn noise_is_deterministic_and_seed_dependent() {
    let a = NoiseField::new(Seed(271));
    let b = NoiseField::new(Seed(271));
    let c = NoiseField::new(Seed(389));
    let points: Vec<(f64, f64)> = (0..20).map(|i| (i as f64 * 2.3, i as f64 * 1.1)).collect();
    assert!(points.iter().all(|&(x, y)| a.sample(x, y) == b.sample(x, y)));
    assert!(points.iter().any(|&(x, y)| a.sample(x, y) != c.sample(x, y)));
    assert_eq!(*NoiseField::shared(Seed(271)), a);
}

#[rstest]
#[case::satellite(RasterSlot::Satellite)]
#[case::host_rock(RasterSlot::HostRock)]
#[case::iron_oxide(RasterSlot::IronOxide)]
#[case::carbonate(RasterSlot::Carbonate)]
fn rasters_are_block_filled_from_the_block_origin(#[case] slot: RasterSlot) {
    let palette = discrete_palette();
    let recipe = palette.recipe(slot);
    let viewport = Viewport::new(50, 30);
    let image = synthesize(recipe, viewport, 4, 1);
    let field = NoiseField::shared(recipe.seed);

    assert_eq!(image.pixels.len(), 50 * 30 * 4);
    for by in (0..30).step_by(4) {
        for bx in (0..50).step_by(4) {
            let (nx, ny) = noise_coord(bx, by, viewport);
            let expected = recipe.classifier.classify(&field, nx, ny);
            for y in by..(by + 4).min(30) {
                for x in bx..(bx + 4).min(50) {
                    let px = image.pixel(x, y);
                    if expected[3] == 0 {
                        assert_eq!(px[3], 0, "{slot:?} ({x}, {y})");
                    } else {
                        assert_eq!(px, expected, "{slot:?} ({x}, {y})");
                    }
                }
            }
        }
    }
}

#[test]
fn base_layers_cover_every_pixel() {
    let palette = discrete_palette();
    let viewport = Viewport::new(64, 48);
    for slot in [RasterSlot::Satellite, RasterSlot::HostRock] {
        let image = synthesize(palette.recipe(slot), viewport, 4, 1);
        assert!(image.pixels.chunks(4).all(|px| px[3] > 0), "{slot:?} has holes");
    }
}

#[rstest]
#[case::iron_oxide(RasterSlot::IronOxide)]
#[case::carbonate(RasterSlot::Carbonate)]
fn discrete_alteration_is_clear_exactly_below_the_lowest_band(#[case] slot: RasterSlot) {
    let palette = discrete_palette();
    let recipe = palette.recipe(slot);
    let Classifier::Banded { value, .. } = &recipe.classifier else {
        panic!("{slot:?} is not banded");
    };
    let cutoff = recipe.classifier.cutoff().unwrap();
    let field = NoiseField::shared(recipe.seed);
    let viewport = Viewport::new(64, 48);
    let image = synthesize(recipe, viewport, 1, 1);

    for y in 0..48 {
        for x in 0..64 {
            let (nx, ny) = noise_coord(x, y, viewport);
            let v = value.sample(&field, nx, ny);
            assert_eq!(image.pixel(x, y)[3] == 0, v <= cutoff, "{slot:?} ({x}, {y}) v={v}");
        }
    }
}

#[test]
fn alteration_layers_are_sparse() {
    let viewport = Viewport::new(160, 120);
    for palette in [discrete_palette(), continuous_palette()] {
        for slot in [RasterSlot::IronOxide, RasterSlot::Carbonate] {
            let image = synthesize(palette.recipe(slot), viewport, 4, 1);
            let covered = image.pixels.chunks(4).filter(|px| px[3] > 0).count();
            let total = (viewport.width * viewport.height) as usize;
            assert!(covered < total, "{slot:?} covers everything");
        }
    }
}

#[test]
fn cache_serves_only_the_size_it_was_built_for() {
    let palette = discrete_palette();
    let mut cache = RasterCache::new();
    let big = Viewport::new(80, 60);
    let small = Viewport::new(40, 30);

    assert!(cache.is_pending());
    assert!(cache.get(RasterSlot::Satellite, big).is_none());
    assert!(cache.ensure(&palette, big, 4));
    assert!(!cache.is_pending());
    assert!(!cache.ensure(&palette, big, 4));
    assert_eq!(cache.get(RasterSlot::Carbonate, big).map(|i| i.viewport()), Some(big));
    assert!(cache.get(RasterSlot::Carbonate, small).is_none());

    cache.invalidate();
    assert!(cache.get(RasterSlot::Satellite, big).is_none());
    assert!(cache.ensure(&palette, small, 4));
    for slot in RasterSlot::ALL {
        let image = cache.get(slot, small).unwrap();
        assert_eq!((image.width, image.height, image.generation), (40, 30, 2));
    }
}

#[test]
fn structural_counts() {
    let features = generate(&StructuralConfig::default());
    let count = |kind: FeatureKind, weight: Weight| {
        features.iter().filter(|f| f.kind == kind && f.weight == weight).count()
    };

    assert_eq!(count(FeatureKind::Fault, Weight::Major), 4);
    assert_eq!(count(FeatureKind::Fault, Weight::Secondary), 2);
    assert!(count(FeatureKind::Fault, Weight::Minor) <= 4);
    assert_eq!(features.iter().filter(|f| f.kind == FeatureKind::Shear).count(), 10);
    assert_eq!(features.iter().filter(|f| f.kind == FeatureKind::Fold).count(), 3);
    assert!(features.iter().all(|f| f.points.len() >= 2));
}

#[test]
fn structural_generation_is_repeatable() {
    let config = StructuralConfig::default();
    assert_eq!(generate(&config), generate(&config));

    let other = StructuralConfig { seed: Seed(778), ..StructuralConfig::default() };
    assert_ne!(generate(&config), generate(&other));
}
