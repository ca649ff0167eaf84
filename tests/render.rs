use geolayers_wasm::raster::RasterImage;
use geolayers_wasm::{
    Color, DemoConfig, GisDemo, GisError, LayerKind, ManualScheduler, PixelSurface, Point, RasterSlot, Rect, Stroke,
    Surface, Viewport,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Resize(Viewport),
    Fill(Rect, Color),
    Raster { slot: RasterSlot, size: Viewport, generation: u64, dest: Rect },
    Path { points: usize, stroke: Stroke },
    Frame(Rect),
    Text(String),
}

/// Records draw calls instead of producing pixels.
#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Surface for Recorder {
    fn resize(&mut self, viewport: Viewport) {
        self.calls.push(Call::Resize(viewport));
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.calls.push(Call::Fill(rect, color));
    }

    fn draw_raster(&mut self, slot: RasterSlot, image: &RasterImage, dest: Rect) {
        self.calls.push(Call::Raster { slot, size: image.viewport(), generation: image.generation, dest });
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        self.calls.push(Call::Path { points: points.len(), stroke: *stroke });
    }

    fn stroke_rect(&mut self, rect: Rect, _stroke: &Stroke) {
        self.calls.push(Call::Frame(rect));
    }

    fn fill_text(&mut self, text: &str, _at: Point, _size: f64, _color: Color) {
        self.calls.push(Call::Text(text.to_owned()));
    }
}

fn recording_demo() -> GisDemo<Recorder, ManualScheduler> {
    let config = DemoConfig::default();
    let scheduler = ManualScheduler::new(config.timing.frame_interval);
    GisDemo::new(config, Recorder::default(), scheduler)
}

fn pixel_demo(viewport: Viewport) -> GisDemo<PixelSurface, ManualScheduler> {
    let config = DemoConfig::default();
    let scheduler = ManualScheduler::new(config.timing.frame_interval);
    let mut demo = GisDemo::new(config, PixelSurface::new(viewport), scheduler);
    demo.initialize(viewport).unwrap();
    demo
}

fn rasters(calls: &[Call]) -> Vec<&Call> {
    calls.iter().filter(|c| matches!(c, Call::Raster { .. })).collect()
}

#[test]
fn render_before_initialize_draws_nothing() {
    let mut demo = recording_demo();
    demo.render();
    demo.toggle_layer(LayerKind::Structural);
    assert!(demo.surface().calls.is_empty());
}

#[test]
fn empty_scene_is_background_and_grid() {
    let mut demo = recording_demo();
    demo.initialize(Viewport::new(160, 120)).unwrap();
    demo.set_layer(LayerKind::Satellite, false);
    demo.surface_mut().calls.clear();
    demo.render();

    let calls = &demo.surface().calls;
    assert_eq!(calls[0], Call::Fill(Rect::new(0.0, 0.0, 160.0, 120.0), demo.config().background));
    // verticals at 0, 40, 80, 120 and horizontals at 0, 40, 80
    assert_eq!(calls.len(), 1 + 4 + 3);
    assert!(calls[1..].iter().all(|c| matches!(c, Call::Path { points: 2, .. })));
}

#[test]
fn layers_draw_in_fixed_order_with_the_grid_on_top() {
    let mut demo = recording_demo();
    demo.initialize(Viewport::new(120, 80)).unwrap();
    for kind in LayerKind::ALL.into_iter().rev() {
        demo.set_layer(kind, true);
    }
    demo.surface_mut().calls.clear();
    demo.render();

    let calls = &demo.surface().calls;
    let slots: Vec<RasterSlot> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Raster { slot, .. } => Some(*slot),
            _ => None,
        })
        .collect();
    assert_eq!(slots, RasterSlot::ALL);

    let last_raster = calls.iter().rposition(|c| matches!(c, Call::Raster { .. })).unwrap();
    let first_frame = calls.iter().position(|c| matches!(c, Call::Frame(_))).unwrap();
    let last_text = calls.iter().rposition(|c| matches!(c, Call::Text(_))).unwrap();
    assert!(last_raster < first_frame);
    assert!(calls[last_raster + 1..first_frame].iter().any(|c| matches!(c, Call::Path { points, .. } if *points > 2)));
    // grid: 3 verticals and 2 horizontals after the last label
    assert_eq!(calls.len() - last_text - 1, 5);

    let labels: Vec<&str> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Text(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels.len(), 10);
    assert_eq!(&labels[..2], ["T-1", "HIGH"]);
}

#[test]
fn resize_rebuilds_every_raster_before_drawing() {
    let mut demo = recording_demo();
    demo.initialize(Viewport::new(800, 600)).unwrap();
    for kind in [LayerKind::HostRock, LayerKind::IronOxide, LayerKind::Carbonate] {
        demo.set_layer(kind, true);
    }
    assert_eq!(demo.rasters().generation(), 1);
    demo.surface_mut().calls.clear();

    let small = Viewport::new(400, 300);
    demo.on_resize(small);

    assert_eq!(demo.rasters().built_for(), Some(small));
    assert_eq!(demo.rasters().generation(), 2);
    let calls = &demo.surface().calls;
    assert_eq!(calls[0], Call::Resize(small));
    let drawn = rasters(calls);
    assert_eq!(drawn.len(), 4);
    for call in drawn {
        let Call::Raster { size, generation, dest, .. } = call else { unreachable!() };
        assert_eq!((*size, *generation), (small, 2));
        assert_eq!(*dest, Rect::new(0.0, 0.0, 400.0, 300.0));
    }
}

#[test]
fn resize_to_the_same_size_keeps_the_cache() {
    let mut demo = recording_demo();
    demo.initialize(Viewport::new(200, 100)).unwrap();
    demo.surface_mut().calls.clear();
    demo.on_resize(Viewport::new(200, 100));
    assert_eq!(demo.rasters().generation(), 1);
    assert!(demo.surface().calls.is_empty());
}

#[test]
fn degenerate_layout_defers_initialization() {
    let mut demo = recording_demo();
    assert_eq!(demo.initialize(Viewport::new(0, 0)), Err(GisError::DegenerateViewport { width: 0, height: 0 }));
    assert!(!demo.is_initialized());

    demo.on_resize(Viewport::new(5, 400));
    assert!(!demo.is_initialized());
    assert!(demo.surface().calls.is_empty());

    demo.on_resize(Viewport::new(200, 100));
    assert!(demo.is_initialized());
    assert!(demo.is_layer_enabled(LayerKind::Satellite));
    assert_eq!(rasters(&demo.surface().calls).len(), 1);
}

#[test]
fn resize_before_initialize_is_ignored() {
    let mut demo = recording_demo();
    demo.on_resize(Viewport::new(200, 100));
    assert!(!demo.is_initialized());
    assert!(demo.surface().calls.is_empty());

    demo.initialize(Viewport::new(200, 100)).unwrap();
    assert!(demo.is_initialized());
    assert!(demo.is_layer_enabled(LayerKind::Satellite));
    assert_eq!(rasters(&demo.surface().calls).len(), 1);
}

#[test]
fn rendering_twice_is_pixel_identical() {
    let viewport = Viewport::new(160, 120);
    let mut demo = pixel_demo(viewport);
    for kind in LayerKind::ALL {
        demo.set_layer(kind, true);
    }
    let first = demo.surface().as_rgba().to_vec();
    demo.render();
    assert_eq!(demo.surface().as_rgba(), &first[..]);
}

#[test]
fn background_shows_between_grid_lines_with_no_layers() {
    let viewport = Viewport::new(120, 80);
    let mut demo = pixel_demo(viewport);
    demo.set_layer(LayerKind::Satellite, false);
    assert_eq!(demo.surface().pixel(20, 20), [0x06, 0x0a, 0x10, 255]);
    assert_ne!(demo.surface().pixel(40, 20), [0x06, 0x0a, 0x10, 255]);
}

#[test]
fn satellite_pixels_come_from_the_cached_raster() {
    let viewport = Viewport::new(120, 80);
    let demo = pixel_demo(viewport);
    let image = demo.rasters().get(RasterSlot::Satellite, viewport).unwrap();
    let [r, g, b, a] = image.pixel(20, 20);
    assert_eq!(a, 255);
    assert_eq!(demo.surface().pixel(20, 20), [r, g, b, 255]);
}
