//! Wires DOM events, the worker bridge, and the active presenter together.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{ArrayBuffer, Uint8Array};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Event, FileReader, HtmlCanvasElement, HtmlInputElement, KeyboardEvent, MessageEvent,
    ProgressEvent, Window, Worker,
};

use super::{canvas2d::Canvas2dPresenter, webgl::WebGlPresenter, worker};
use crate::bridge::WorkerBridge;
use crate::buttons::{self, ButtonEvent};
use crate::config::{Config, ConfigError, PresenterKind};
use crate::frame::Frame;
use crate::mailbox::Mailbox;
use crate::protocol::ProtocolError;

/// The one active presentation path for this session.
pub trait Present {
    /// Draws one decoded frame. Implementations may finish asynchronously but
    /// every draw is atomic per call.
    fn present(&mut self, frame: &Frame) -> Result<(), JsValue>;
}

type Bridge = Rc<RefCell<WorkerBridge<worker::WorkerTransport>>>;

/// Looks up the frame canvas on the host page. A missing element, or an
/// element under that id that is not a canvas, is a startup configuration
/// error and gets the same fatal treatment as a bad `data-*` attribute.
pub fn find_canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement, ConfigError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| ConfigError::MissingCanvas(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ConfigError::MissingCanvas(id.to_string()))
}

/// Builds the presenter, spawns the computation worker, and registers every
/// DOM handler. Any error here is fatal to startup.
pub fn start(
    window: &Window,
    document: &Document,
    canvas: HtmlCanvasElement,
    config: &Config,
) -> Result<(), JsValue> {
    let mut presenter: Box<dyn Present> = match config.presenter {
        PresenterKind::WebGl => Box::new(WebGlPresenter::new(&canvas)?),
        PresenterKind::Canvas2d => Box::new(Canvas2dPresenter::new(window.clone(), &canvas)?),
    };

    let emulator_worker = Worker::new(&config.worker_url)?;
    let bridge: Bridge = Rc::new(RefCell::new(WorkerBridge::new(
        worker::WorkerTransport::new(emulator_worker.clone()),
    )));

    let mailbox = Mailbox::new();
    {
        let mailbox = mailbox.clone();
        bridge.borrow_mut().on_frame(move |frame| {
            if mailbox.put(frame).is_some() {
                log::debug!("frame superseded before it was displayed");
            }
        });
    }

    // Inbound worker messages: decode, validate, park in the mailbox.
    let onmessage = {
        let bridge = bridge.clone();
        Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(message) = worker::decode(&event.data()) else {
                log::debug!("ignoring unrecognized worker message");
                return;
            };
            if let Err(err) = bridge.borrow_mut().handle_message(message) {
                log::warn!("frame skipped: {err}");
            }
        }) as Box<dyn FnMut(MessageEvent)>)
    };
    emulator_worker.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    wire_rom_selector(document, &bridge)?;
    wire_keyboard(document, &bridge);

    // Presentation loop. `f` holds the animation-frame closure so that we can
    // keep calling `request_animation_frame` recursively; the `Option` lets
    // the closure obtain a reference to itself.
    let f: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let g = f.clone();
    let raf_window = window.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(frame) = mailbox.take() {
            if let Err(err) = presenter.present(&frame) {
                log::error!("present failed: {err:?}");
            }
        }
        raf_window
            .request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref())
            .unwrap();
    }) as Box<dyn FnMut()>));
    window.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref())?;

    Ok(())
}

/// File selection -> read as bytes -> cartridge message.
fn wire_rom_selector(document: &Document, bridge: &Bridge) -> Result<(), JsValue> {
    let selector = document
        .get_element_by_id("rom-selector")
        .ok_or("rom selector not found")?;

    let onchange = {
        let bridge = bridge.clone();
        Closure::wrap(Box::new(move |event: Event| {
            let Some(target) = event.target() else {
                return;
            };
            let Ok(input) = target.dyn_into::<HtmlInputElement>() else {
                return;
            };
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                log::warn!("no file received from the selector");
                return;
            };

            let Ok(reader) = FileReader::new() else {
                return;
            };
            let onload = {
                let bridge = bridge.clone();
                let reader = reader.clone();
                Closure::wrap(Box::new(move |_event: ProgressEvent| {
                    let Ok(buffer) = reader.result().and_then(JsValue::dyn_into::<ArrayBuffer>)
                    else {
                        log::error!("cartridge read produced no buffer");
                        return;
                    };
                    let bytes = Uint8Array::new(&buffer).to_vec();
                    let len = bytes.len();
                    match bridge.borrow().send_cartridge(bytes) {
                        Ok(()) => log::info!("sent {len} byte cartridge to the emulator"),
                        Err(err @ ProtocolError::EmptyCartridge) => {
                            log::error!("cartridge rejected: {err}")
                        }
                        Err(err) => log::error!("cartridge send failed: {err}"),
                    }
                }) as Box<dyn FnMut(ProgressEvent)>)
            };
            reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();

            if let Err(err) = reader.read_as_array_buffer(&file) {
                log::error!("could not start cartridge read: {err:?}");
            }
        }) as Box<dyn FnMut(Event)>)
    };
    selector.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
    onchange.forget();
    Ok(())
}

/// Key events -> button mapping -> bridge. Unmapped key codes never reach the
/// channel.
fn wire_keyboard(document: &Document, bridge: &Bridge) {
    let keydown = key_closure(bridge.clone(), ButtonEvent::Pressed);
    document.set_onkeydown(Some(keydown.as_ref().unchecked_ref()));
    keydown.forget();

    let keyup = key_closure(bridge.clone(), ButtonEvent::Released);
    document.set_onkeyup(Some(keyup.as_ref().unchecked_ref()));
    keyup.forget();
}

fn key_closure(bridge: Bridge, event: ButtonEvent) -> Closure<dyn FnMut(KeyboardEvent)> {
    Closure::wrap(Box::new(move |key_event: KeyboardEvent| {
        if let Some(button) = buttons::key_to_button(key_event.key_code()) {
            if let Err(err) = bridge.borrow().send_button(event, button) {
                log::warn!("button event lost: {err}");
            }
        }
    }) as Box<dyn FnMut(KeyboardEvent)>)
}
