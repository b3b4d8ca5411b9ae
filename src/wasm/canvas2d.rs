//! 2D-canvas presenter: decoded frames become bitmaps and are blitted at an
//! integer scale with nearest-neighbor filtering.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::{Clamped, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageBitmap, ImageData, Window};

use super::controller::Present;
use super::webgl::SCALE_FACTOR;
use crate::config::ConfigError;
use crate::frame::{self, Frame};

pub struct Canvas2dPresenter {
    window: Window,
    context: CanvasRenderingContext2d,
    /// Ticket of the most recently submitted frame. Bitmap creation is async;
    /// a stale bitmap resolving after a newer submission is discarded so a
    /// draw is always atomic and last-submitted wins.
    generation: Rc<Cell<u64>>,
}

impl Canvas2dPresenter {
    pub fn new(window: Window, canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        canvas.set_width(frame::WIDTH as u32 * SCALE_FACTOR);
        canvas.set_height(frame::HEIGHT as u32 * SCALE_FACTOR);

        let context: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|_| ConfigError::NoContext("2d").to_string())?
            .ok_or_else(|| ConfigError::NoContext("2d").to_string())?
            .dyn_into()?;
        // Nearest-neighbor scaling preserves hard pixel edges.
        context.set_image_smoothing_enabled(false);

        Ok(Self {
            window,
            context,
            generation: Rc::new(Cell::new(0)),
        })
    }
}

impl Present for Canvas2dPresenter {
    fn present(&mut self, frame: &Frame) -> Result<(), JsValue> {
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.pixels()),
            frame::WIDTH as u32,
            frame::HEIGHT as u32,
        )?;
        let bitmap_promise = self.window.create_image_bitmap_with_image_data(&image)?;

        let ticket = self.generation.get().wrapping_add(1);
        self.generation.set(ticket);

        let generation = Rc::clone(&self.generation);
        let context = self.context.clone();
        let width = f64::from(frame::WIDTH as u32 * SCALE_FACTOR);
        let height = f64::from(frame::HEIGHT as u32 * SCALE_FACTOR);
        spawn_local(async move {
            let bitmap: ImageBitmap = match JsFuture::from(bitmap_promise).await {
                Ok(value) => value.unchecked_into(),
                Err(err) => {
                    log::error!("bitmap creation failed: {err:?}");
                    return;
                }
            };
            // A newer frame arrived while this bitmap was being built.
            if generation.get() != ticket {
                bitmap.close();
                return;
            }
            if let Err(err) =
                context.draw_image_with_image_bitmap_and_dw_and_dh(&bitmap, 0.0, 0.0, width, height)
            {
                log::error!("frame blit failed: {err:?}");
            }
            bitmap.close();
        });
        Ok(())
    }
}
