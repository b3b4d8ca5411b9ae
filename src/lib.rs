// Host-side bridge for a browser-embedded Game Boy emulator: the computation
// module runs in a Web Worker; this crate forwards cartridge bytes and button
// events to it and presents the frames it sends back.
//
// Everything that touches the DOM or GPU lives under the wasm32-only module;
// the protocol, codec, input table, mailbox, and shader pipeline are
// target-independent and unit-tested on the host with plain `cargo test`.

pub mod bridge;
pub mod buttons;
pub mod config;
pub mod frame;
pub mod mailbox;
pub mod pipeline;
pub mod protocol;

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use wasm_bindgen::prelude::*;

    pub mod canvas2d;
    pub mod controller;
    pub mod webgl;
    pub mod worker;

    use crate::config::Config;

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init().ok();

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = controller::find_canvas(&document, "frame-display")
            .map_err(|err| fatal(&window, &err.to_string()))?;

        let config = Config::from_attrs(
            canvas.get_attribute("data-presenter").as_deref(),
            canvas.get_attribute("data-worker").as_deref(),
        )
        .map_err(|err| fatal(&window, &err.to_string()))?;

        controller::start(&window, &document, canvas, &config)
            .map_err(|err| fatal(&window, &format!("{err:?}")))?;
        Ok(())
    }

    /// Startup failures are user-facing: block with an alert, then abort.
    fn fatal(window: &web_sys::Window, reason: &str) -> JsValue {
        log::error!("startup failed: {reason}");
        window
            .alert_with_message(&format!("Emulator failed to start: {reason}"))
            .ok();
        JsValue::from_str(reason)
    }
}
