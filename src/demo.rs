//! The owned demo context: layer state, caches, vector data and the two
//! scheduled loops, bound to one surface and one scheduler.

use std::time::Duration;

use crate::animation::{AnimationClock, AnimationDriver};
use crate::compositor::{self, Scene};
use crate::config::DemoConfig;
use crate::error::GisError;
use crate::geom::Viewport;
use crate::layers::{self, LayerKind, LayerSet, LegendSection};
use crate::raster::RasterCache;
use crate::schedule::{ManualScheduler, Scheduler, TaskId};
use crate::sequencer::{Cue, Sequencer, SequencerState};
use crate::structural::{self, StructuralFeature};
use crate::surface::Surface;
use crate::targets::TargetPoint;

pub struct GisDemo<S, T> {
    config: DemoConfig,
    surface: S,
    scheduler: T,
    layers: LayerSet,
    rasters: RasterCache,
    features: Vec<StructuralFeature>,
    targets: Vec<TargetPoint>,
    viewport: Option<Viewport>,
    /// Set while `initialize` waits for a usable viewport.
    init_pending: bool,
    animation: AnimationDriver,
    sequencer: Sequencer,
}

impl<S: Surface, T: Scheduler> GisDemo<S, T> {
    /// Generate the vector data. Nothing is drawn until [`GisDemo::initialize`].
    pub fn new(config: DemoConfig, surface: S, scheduler: T) -> Self {
        let features = structural::generate(&config.structural);
        let targets = config.targets.clone();
        let sequencer = Sequencer::new(config.timing.step_interval, config.timing.dwell);
        Self {
            config,
            surface,
            scheduler,
            layers: LayerSet::default(),
            rasters: RasterCache::new(),
            features,
            targets,
            viewport: None,
            init_pending: false,
            animation: AnimationDriver::default(),
            sequencer,
        }
    }

    /// Build rasters for `viewport`, switch the satellite base on and draw.
    /// A viewport below the minimum is not rasterized: the error tells the
    /// host to retry, and the next usable [`GisDemo::on_resize`] finishes the
    /// job.
    pub fn initialize(&mut self, viewport: Viewport) -> Result<(), GisError> {
        if !viewport.is_usable(self.config.min_viewport) {
            log::debug!("initialize deferred: viewport {viewport} not laid out yet");
            self.init_pending = true;
            return Err(GisError::DegenerateViewport { width: viewport.width, height: viewport.height });
        }
        self.init_pending = false;
        self.apply_viewport(viewport);
        self.layers.set(LayerKind::Satellite, true);
        self.ensure_rasters();
        self.render();
        log::info!("gis demo initialized at {viewport}");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.viewport.is_some() && !self.init_pending
    }

    /// Resize, invalidate every raster, rebuild and redraw, in that order.
    /// Degenerate sizes are ignored until a usable one arrives, and so is any
    /// resize before [`GisDemo::initialize`] has been called.
    pub fn on_resize(&mut self, viewport: Viewport) {
        if !viewport.is_usable(self.config.min_viewport) {
            log::debug!("ignoring resize to {viewport}");
            return;
        }
        if self.init_pending {
            if let Err(err) = self.initialize(viewport) {
                log::warn!("deferred initialize failed: {err}");
            }
            return;
        }
        if self.viewport.is_none() {
            log::debug!("ignoring resize to {viewport} before initialize");
            return;
        }
        if self.viewport == Some(viewport) {
            return;
        }
        self.apply_viewport(viewport);
        self.ensure_rasters();
        self.render();
    }

    fn apply_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        self.surface.resize(viewport);
        self.rasters.invalidate();
    }

    fn ensure_rasters(&mut self) {
        if let Some(viewport) = self.viewport {
            self.rasters.ensure(&self.config.palette, viewport, self.config.raster_stride);
        }
    }

    pub fn is_layer_enabled(&self, kind: LayerKind) -> bool {
        self.layers.is_enabled(kind)
    }

    pub fn layers(&self) -> &LayerSet {
        &self.layers
    }

    pub fn toggle_layer(&mut self, kind: LayerKind) {
        let on = !self.layers.is_enabled(kind);
        self.set_layer(kind, on);
    }

    /// Toggle by markup name; unknown names change nothing.
    pub fn toggle_layer_named(&mut self, name: &str) {
        match name.parse::<LayerKind>() {
            Ok(kind) => self.toggle_layer(kind),
            Err(err) => log::debug!("toggle ignored: {err}"),
        }
    }

    /// Switch a layer and redraw. The targets layer also starts or stops the
    /// pulse animation; enabling it while already running keeps the one loop.
    pub fn set_layer(&mut self, kind: LayerKind, on: bool) {
        self.layers.set(kind, on);
        if kind == LayerKind::Targets {
            if on {
                self.animation.start(&mut self.scheduler);
            } else {
                self.animation.stop(&mut self.scheduler);
            }
        }
        self.ensure_rasters();
        self.render();
    }

    pub fn start_auto_demo(&mut self) {
        if !self.sequencer.start() {
            return;
        }
        self.animation.stop(&mut self.scheduler);
        self.layers.disable_all();
        self.render();
        if let Some(cue) = self.sequencer.step(&mut self.scheduler) {
            self.apply_cue(cue);
        }
    }

    pub fn stop_auto_demo(&mut self) {
        self.sequencer.stop(&mut self.scheduler);
        self.animation.stop(&mut self.scheduler);
    }

    pub fn toggle_auto_demo(&mut self) {
        if self.sequencer.is_running() {
            self.stop_auto_demo();
        } else {
            self.start_auto_demo();
        }
    }

    pub fn is_auto_demo_running(&self) -> bool {
        self.sequencer.is_running()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    fn apply_cue(&mut self, cue: Cue) {
        match cue {
            Cue::Enable(kind) => {
                self.layers.set(kind, true);
                self.ensure_rasters();
                if kind == LayerKind::Targets {
                    self.animation.start(&mut self.scheduler);
                }
                self.render();
            }
            Cue::Hold => {}
            Cue::Finished => {
                self.animation.stop(&mut self.scheduler);
                self.layers.disable_all();
                self.render();
            }
        }
    }

    /// Entry point for due scheduler tasks. Ids that belong to neither loop
    /// (cancelled, or already handled) are ignored.
    pub fn on_task(&mut self, task: TaskId) {
        if self.animation.on_frame(task, &mut self.scheduler) {
            self.render();
        } else if let Some(cue) = self.sequencer.on_timer(task, &mut self.scheduler) {
            self.apply_cue(cue);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    pub fn animation_clock(&self) -> AnimationClock {
        self.animation.clock()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn rasters(&self) -> &RasterCache {
        &self.rasters
    }

    pub fn features(&self) -> &[StructuralFeature] {
        &self.features
    }

    pub fn targets(&self) -> &[TargetPoint] {
        &self.targets
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    pub fn legend(&self) -> Vec<LegendSection> {
        layers::legend(&self.layers, &self.config.palette)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    /// Draw the current state. A no-op before a usable viewport is known.
    pub fn render(&mut self) {
        let Some(viewport) = self.viewport else {
            return;
        };
        let scene = Scene {
            viewport,
            layers: &self.layers,
            rasters: &self.rasters,
            features: &self.features,
            targets: &self.targets,
            clock: self.animation.clock(),
            config: &self.config,
        };
        compositor::render(&mut self.surface, &scene);
    }
}

impl<S: Surface> GisDemo<S, ManualScheduler> {
    /// Run every task that comes due within `by`, in deadline order,
    /// including tasks scheduled while doing so.
    pub fn advance(&mut self, by: Duration) {
        let until = self.scheduler.now() + by;
        while let Some(task) = self.scheduler.pop_due(until) {
            self.on_task(task);
        }
        self.scheduler.set_now(until);
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }
}
