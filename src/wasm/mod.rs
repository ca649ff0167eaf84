//! Browser bindings: a canvas [`Surface`](crate::Surface), a timer
//! [`Scheduler`](crate::Scheduler), and the handle exported to JavaScript.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{Document, HtmlCanvasElement, Window};

use crate::config::DemoConfig;
use crate::demo::GisDemo;
use crate::error::GisError;
use crate::geom::Viewport;
use crate::layers::LayerKind;

mod logger;
mod render;
mod scheduler;

pub use render::WebCanvas;
pub use scheduler::BrowserScheduler;

pub type WebDemo = GisDemo<WebCanvas, BrowserScheduler>;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}

fn dom(msg: &str) -> GisError {
    GisError::Dom(msg.to_owned())
}

/// Size of the canvas' layout box, taken from its parent so the canvas
/// itself never feeds back into the measurement.
fn measure(canvas: &HtmlCanvasElement) -> Viewport {
    let rect = match canvas.parent_element() {
        Some(parent) => parent.get_bounding_client_rect(),
        None => canvas.get_bounding_client_rect(),
    };
    Viewport::new(rect.width().max(0.0).floor() as u32, rect.height().max(0.0).floor() as u32)
}

/// The demo bound to one page canvas.
#[wasm_bindgen]
pub struct GisLayerDemo {
    window: Window,
    canvas: HtmlCanvasElement,
    demo: Rc<RefCell<WebDemo>>,
}

#[wasm_bindgen]
impl GisLayerDemo {
    /// Attach to the canvas with id `canvas_id`. Initialization waits for the
    /// first frame with a usable layout size.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<GisLayerDemo, JsValue> {
        let window = web_sys::window().ok_or_else(|| dom("no window"))?;
        let document: Document = window.document().ok_or_else(|| dom("no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| GisError::Dom(format!("canvas `{canvas_id}` not found")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| GisError::Dom(format!("`{canvas_id}` is not a canvas")))?;

        let surface = WebCanvas::new(document, canvas.clone(), window.device_pixel_ratio())?;
        let demo = Rc::new_cyclic(|weak| {
            let scheduler = BrowserScheduler::new(window.clone(), weak.clone());
            RefCell::new(GisDemo::new(DemoConfig::default(), surface, scheduler))
        });

        let handle = GisLayerDemo { window, canvas, demo };
        handle.listen_for_resize()?;
        handle.initialize_when_laid_out()?;
        Ok(handle)
    }

    /// Flip a layer by its markup name. Unknown names are ignored.
    pub fn toggle_layer(&self, name: &str) {
        self.demo.borrow_mut().toggle_layer_named(name);
    }

    pub fn set_layer(&self, name: &str, on: bool) -> Result<(), JsValue> {
        let kind: LayerKind = name.parse()?;
        self.demo.borrow_mut().set_layer(kind, on);
        Ok(())
    }

    pub fn is_layer_enabled(&self, name: &str) -> Result<bool, JsValue> {
        let kind: LayerKind = name.parse()?;
        Ok(self.demo.borrow().is_layer_enabled(kind))
    }

    /// Display label and CSS swatch colour for a layer button.
    pub fn layer_label(&self, name: &str) -> Result<String, JsValue> {
        let kind: LayerKind = name.parse()?;
        Ok(kind.label().to_owned())
    }

    pub fn layer_swatch(&self, name: &str) -> Result<String, JsValue> {
        let kind: LayerKind = name.parse()?;
        Ok(kind.swatch().to_css())
    }

    pub fn start_auto_demo(&self) {
        self.demo.borrow_mut().start_auto_demo();
    }

    pub fn stop_auto_demo(&self) {
        self.demo.borrow_mut().stop_auto_demo();
    }

    pub fn toggle_auto_demo(&self) {
        self.demo.borrow_mut().toggle_auto_demo();
    }

    pub fn is_auto_demo_running(&self) -> bool {
        self.demo.borrow().is_auto_demo_running()
    }

    pub fn is_initialized(&self) -> bool {
        self.demo.borrow().is_initialized()
    }

    /// Re-measure the canvas and redraw if its size changed.
    pub fn resize(&self) {
        resize(&self.window, &self.canvas, &self.demo);
    }
}

fn resize(window: &Window, canvas: &HtmlCanvasElement, demo: &RefCell<WebDemo>) {
    let mut demo = demo.borrow_mut();
    demo.surface_mut().set_device_pixel_ratio(window.device_pixel_ratio());
    demo.on_resize(measure(canvas));
}

impl GisLayerDemo {
    fn listen_for_resize(&self) -> Result<(), JsValue> {
        let window = self.window.clone();
        let canvas = self.canvas.clone();
        let demo = Rc::downgrade(&self.demo);
        let on_resize = Closure::wrap(Box::new(move || {
            if let Some(demo) = demo.upgrade() {
                resize(&window, &canvas, &demo);
            }
        }) as Box<dyn FnMut()>);
        self.window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        on_resize.forget();
        Ok(())
    }

    /// Try to initialize now, and on every animation frame after that until
    /// layout reports a usable size.
    fn initialize_when_laid_out(&self) -> Result<(), JsValue> {
        let viewport = measure(&self.canvas);
        if self.demo.borrow_mut().initialize(viewport).is_ok() {
            return Ok(());
        }

        // `f` holds the frame closure so it can request itself again.
        let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let g = f.clone();
        let window = self.window.clone();
        let canvas = self.canvas.clone();
        let demo = Rc::downgrade(&self.demo);
        *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let Some(demo) = demo.upgrade() else {
                return;
            };
            resize(&window, &canvas, &demo);
            if demo.borrow().is_initialized() {
                return;
            }
            let again = f
                .borrow()
                .as_ref()
                .map(|cb| window.request_animation_frame(cb.as_ref().unchecked_ref()));
            if let Some(Err(e)) = again {
                log::error!("layout retry could not be scheduled: {e:?}");
            }
        }) as Box<dyn FnMut()>));

        let first = g.borrow();
        if let Some(cb) = first.as_ref() {
            self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        }
        Ok(())
    }
}
