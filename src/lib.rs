#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Procedurally generated geological map layers, composited onto a canvas.
//!
//! Everything outside [`wasm`] is host-agnostic: drawing goes through
//! [`Surface`] and timers through [`Scheduler`], so the whole engine runs
//! headless with [`PixelSurface`] and [`ManualScheduler`].

pub mod animation;
pub mod compositor;
pub mod config;
pub mod demo;
pub mod error;
pub mod geom;
pub mod layers;
pub mod noise;
pub mod pixel;
pub mod raster;
pub mod rng;
pub mod schedule;
pub mod sequencer;
pub mod structural;
pub mod surface;
pub mod targets;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use animation::AnimationClock;
pub use config::DemoConfig;
pub use demo::GisDemo;
pub use error::GisError;
pub use geom::{Color, Point, Rect, Viewport};
pub use layers::{LayerKind, LayerSet};
pub use pixel::PixelSurface;
pub use raster::{RasterCache, RasterSlot};
pub use rng::Seed;
pub use schedule::{ManualScheduler, Scheduler, TaskId};
pub use sequencer::SequencerState;
pub use surface::{Stroke, Surface};
