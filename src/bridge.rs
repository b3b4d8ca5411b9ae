//! Target-independent core of the worker bridge.
//!
//! The bridge owns the message channel to the computation worker: it is the
//! only encoder of outbound events and the only decoder of inbound payloads.
//! The `Transport` seam keeps the protocol logic testable on the host; the
//! wasm build plugs in a `web_sys::Worker`-backed transport.

use crate::buttons::{Button, ButtonEvent};
use crate::frame::{Frame, FrameError};
use crate::protocol::{Message, ProtocolError};

/// One direction of the worker channel. Implementations must preserve send
/// order and must not batch or duplicate messages.
pub trait Transport {
    fn post(&self, message: &Message) -> Result<(), ProtocolError>;
}

pub struct WorkerBridge<T: Transport> {
    transport: T,
    on_frame: Option<Box<dyn FnMut(Frame)>>,
}

impl<T: Transport> WorkerBridge<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            on_frame: None,
        }
    }

    /// Transmits the cartridge image. Must precede any button event; the
    /// computation side treats it as reset-and-load. An empty selection is a
    /// caller error and nothing is posted.
    pub fn send_cartridge(&self, bytes: Vec<u8>) -> Result<(), ProtocolError> {
        if bytes.is_empty() {
            return Err(ProtocolError::EmptyCartridge);
        }
        self.transport.post(&Message::CartridgeData(bytes))
    }

    pub fn send_button(&self, event: ButtonEvent, button: Button) -> Result<(), ProtocolError> {
        let message = match event {
            ButtonEvent::Pressed => Message::ButtonPressed(button),
            ButtonEvent::Released => Message::ButtonReleased(button),
        };
        self.transport.post(&message)
    }

    /// Registers the single frame callback, invoked once per decoded
    /// `NewFrame` in receipt order. Replaces any earlier registration.
    pub fn on_frame(&mut self, callback: impl FnMut(Frame) + 'static) {
        self.on_frame = Some(Box::new(callback));
    }

    /// Feeds one inbound message through the frame codec. A malformed frame
    /// is reported to the caller and skipped; the session continues. Tags the
    /// host never consumes are ignored.
    pub fn handle_message(&mut self, message: Message) -> Result<(), FrameError> {
        match message {
            Message::NewFrame(pixels) => {
                let frame = Frame::from_bytes(pixels)?;
                if let Some(callback) = self.on_frame.as_mut() {
                    callback(frame);
                }
                Ok(())
            }
            other => {
                log::debug!("ignoring {} message from worker", other.tag());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::frame::FRAME_BYTES;

    #[derive(Clone, Default)]
    struct RecordingTransport {
        sent: Rc<RefCell<Vec<Message>>>,
    }

    impl Transport for RecordingTransport {
        fn post(&self, message: &Message) -> Result<(), ProtocolError> {
            self.sent.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn empty_cartridge_is_rejected_before_the_channel() {
        let transport = RecordingTransport::default();
        let bridge = WorkerBridge::new(transport.clone());

        assert_eq!(
            bridge.send_cartridge(Vec::new()),
            Err(ProtocolError::EmptyCartridge),
        );
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn cartridge_and_buttons_keep_send_order() {
        let transport = RecordingTransport::default();
        let bridge = WorkerBridge::new(transport.clone());

        bridge.send_cartridge(vec![0xC3, 0x50, 0x01]).unwrap();
        bridge
            .send_button(ButtonEvent::Pressed, Button::Start)
            .unwrap();
        bridge
            .send_button(ButtonEvent::Released, Button::Start)
            .unwrap();

        assert_eq!(
            *transport.sent.borrow(),
            vec![
                Message::CartridgeData(vec![0xC3, 0x50, 0x01]),
                Message::ButtonPressed(Button::Start),
                Message::ButtonReleased(Button::Start),
            ],
        );
    }

    #[test]
    fn frames_reach_the_callback_in_receipt_order() {
        let mut bridge = WorkerBridge::new(RecordingTransport::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            bridge.on_frame(move |frame| seen.borrow_mut().push(frame.pixels()[0]));
        }

        bridge
            .handle_message(Message::NewFrame(vec![0x11; FRAME_BYTES]))
            .unwrap();
        bridge
            .handle_message(Message::NewFrame(vec![0x22; FRAME_BYTES]))
            .unwrap();

        assert_eq!(*seen.borrow(), vec![0x11, 0x22]);
    }

    #[test]
    fn malformed_frame_is_skipped_and_the_session_continues() {
        let mut bridge = WorkerBridge::new(RecordingTransport::default());
        let delivered = Rc::new(RefCell::new(0));
        {
            let delivered = delivered.clone();
            bridge.on_frame(move |_| *delivered.borrow_mut() += 1);
        }

        assert_eq!(
            bridge.handle_message(Message::NewFrame(vec![0; 3])),
            Err(FrameError::MalformedFrame { len: 3 }),
        );
        assert_eq!(*delivered.borrow(), 0);

        bridge
            .handle_message(Message::NewFrame(vec![0xFF; FRAME_BYTES]))
            .unwrap();
        assert_eq!(*delivered.borrow(), 1);
    }

    #[test]
    fn non_frame_messages_are_ignored() {
        let mut bridge = WorkerBridge::new(RecordingTransport::default());
        let delivered = Rc::new(RefCell::new(0));
        {
            let delivered = delivered.clone();
            bridge.on_frame(move |_| *delivered.borrow_mut() += 1);
        }

        bridge
            .handle_message(Message::CartridgeData(vec![1]))
            .unwrap();
        assert_eq!(*delivered.borrow(), 0);
    }
}
