//! `web_sys::Worker` transport and the JS array envelope.

use js_sys::{Array, Uint8Array, Uint8ClampedArray};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Worker;

use crate::bridge::Transport;
use crate::protocol::{self, Message, ProtocolError};

pub struct WorkerTransport {
    worker: Worker,
}

impl WorkerTransport {
    pub fn new(worker: Worker) -> Self {
        Self { worker }
    }
}

impl Transport for WorkerTransport {
    fn post(&self, message: &Message) -> Result<(), ProtocolError> {
        self.worker
            .post_message(&encode(message))
            .map_err(|err| ProtocolError::PostFailed {
                reason: format!("{err:?}"),
            })
    }
}

/// `[tag, payload]`, tag first, payload second.
fn encode(message: &Message) -> JsValue {
    let payload: JsValue = match message {
        Message::CartridgeData(bytes) => Uint8Array::from(bytes.as_slice()).into(),
        Message::ButtonPressed(button) | Message::ButtonReleased(button) => {
            JsValue::from_f64(f64::from(button.id()))
        }
        Message::NewFrame(pixels) => {
            let array = Uint8ClampedArray::new_with_length(pixels.len() as u32);
            array.copy_from(pixels);
            array.into()
        }
    };
    Array::of2(&JsValue::from_str(message.tag()), &payload).into()
}

/// Decodes one inbound envelope. Only `NewFrame` is meaningful on the
/// worker-to-host direction; anything else yields `None`.
pub fn decode(data: &JsValue) -> Option<Message> {
    let envelope = data.dyn_ref::<Array>()?;
    let tag = envelope.get(0).as_string()?;
    match tag.as_str() {
        protocol::TAG_NEW_FRAME => {
            let pixels: Uint8ClampedArray = envelope.get(1).dyn_into().ok()?;
            Some(Message::NewFrame(pixels.to_vec()))
        }
        _ => None,
    }
}
