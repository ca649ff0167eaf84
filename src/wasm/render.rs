use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, ImageData};

use crate::error::GisError;
use crate::geom::{Color, Point, Rect, Viewport};
use crate::raster::{RasterImage, RasterSlot};
use crate::surface::{Stroke, Surface};

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, GisError> {
    canvas
        .get_context("2d")
        .map_err(|e| GisError::Dom(format!("{e:?}")))?
        .ok_or_else(|| GisError::Dom("2d context not supported".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| GisError::Dom("not a 2d context".into()))
}

/// Offscreen copy of one raster, re-uploaded when its generation changes.
struct Upload {
    generation: u64,
    canvas: HtmlCanvasElement,
}

/// [`Surface`] over an on-page canvas. Logical pixels are scaled to the
/// backing store by the device pixel ratio.
pub struct WebCanvas {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    dpr: f64,
    uploads: [Option<Upload>; 4],
}

impl WebCanvas {
    pub fn new(document: Document, canvas: HtmlCanvasElement, dpr: f64) -> Result<Self, GisError> {
        let ctx = context_2d(&canvas)?;
        Ok(Self { document, canvas, ctx, dpr: dpr.max(1.0), uploads: Default::default() })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn set_device_pixel_ratio(&mut self, dpr: f64) {
        self.dpr = dpr.max(1.0);
    }

    fn upload(&mut self, slot: RasterSlot, image: &RasterImage) -> Result<HtmlCanvasElement, JsValue> {
        let fresh = match &self.uploads[slot.index()] {
            Some(up) => {
                up.generation != image.generation
                    || up.canvas.width() != image.width
                    || up.canvas.height() != image.height
            }
            None => true,
        };
        if fresh {
            let canvas = match self.uploads[slot.index()].take() {
                Some(up) => up.canvas,
                None => self.document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>()?,
            };
            canvas.set_width(image.width);
            canvas.set_height(image.height);
            let ctx = context_2d(&canvas)?;
            let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&image.pixels), image.width, image.height)?;
            ctx.put_image_data(&data, 0.0, 0.0)?;
            log::debug!("uploaded {slot:?} raster, generation {}", image.generation);
            self.uploads[slot.index()] = Some(Upload { generation: image.generation, canvas });
        }
        match &self.uploads[slot.index()] {
            Some(up) => Ok(up.canvas.clone()),
            None => Err(JsValue::from_str("raster upload missing")),
        }
    }

    fn apply_stroke(&self, stroke: &Stroke) {
        self.ctx.set_stroke_style_str(&stroke.color.to_css());
        self.ctx.set_line_width(stroke.width);
        let dash = stroke.dash.iter().map(|&d| JsValue::from_f64(d)).collect::<js_sys::Array>();
        if let Err(e) = self.ctx.set_line_dash(&dash) {
            log::warn!("setLineDash failed: {e:?}");
        }
    }
}

impl Surface for WebCanvas {
    fn resize(&mut self, viewport: Viewport) {
        // resizing the backing store resets the context state
        self.canvas.set_width((f64::from(viewport.width) * self.dpr).round() as u32);
        self.canvas.set_height((f64::from(viewport.height) * self.dpr).round() as u32);
        let style = self.canvas.style();
        let sized = style
            .set_property("width", &format!("{}px", viewport.width))
            .and_then(|()| style.set_property("height", &format!("{}px", viewport.height)))
            .and_then(|()| self.ctx.set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0));
        if let Err(e) = sized {
            log::warn!("canvas resize to {viewport} incomplete: {e:?}");
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn draw_raster(&mut self, slot: RasterSlot, image: &RasterImage, dest: Rect) {
        let drawn = self.upload(slot, image).and_then(|source| {
            self.ctx
                .draw_image_with_html_canvas_element_and_dw_and_dh(&source, dest.x, dest.y, dest.w, dest.h)
        });
        if let Err(e) = drawn {
            log::warn!("could not draw {slot:?} raster: {e:?}");
        }
    }

    fn stroke_path(&mut self, points: &[Point], stroke: &Stroke) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.apply_stroke(stroke);
        self.ctx.begin_path();
        self.ctx.move_to(first.x, first.y);
        for p in rest {
            self.ctx.line_to(p.x, p.y);
        }
        self.ctx.stroke();
    }

    fn stroke_rect(&mut self, rect: Rect, stroke: &Stroke) {
        self.apply_stroke(stroke);
        self.ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn fill_text(&mut self, text: &str, at: Point, size: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{size}px monospace"));
        self.ctx.set_text_align("center");
        if let Err(e) = self.ctx.fill_text(text, at.x, at.y) {
            log::warn!("fillText failed: {e:?}");
        }
    }
}
