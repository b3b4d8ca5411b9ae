#![cfg(not(target_arch = "wasm32"))]

// End-to-end on the host: worker messages through the bridge, frame codec,
// and mailbox, with a recording consumer standing in for the presenter.

use std::cell::RefCell;
use std::rc::Rc;

use webboy::bridge::{Transport, WorkerBridge};
use webboy::buttons::{Button, ButtonEvent};
use webboy::frame::{Frame, FRAME_BYTES};
use webboy::mailbox::Mailbox;
use webboy::protocol::{Message, ProtocolError};

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

fn wired_bridge() -> (WorkerBridge<RecordingTransport>, Mailbox<Frame>) {
    let mut bridge = WorkerBridge::new(RecordingTransport::default());
    let mailbox = Mailbox::new();
    {
        let mailbox = mailbox.clone();
        bridge.on_frame(move |frame| {
            mailbox.put(frame);
        });
    }
    (bridge, mailbox)
}

#[test]
fn white_frame_flows_to_exactly_one_presentation() {
    let (mut bridge, mailbox) = wired_bridge();

    bridge
        .handle_message(Message::NewFrame(vec![0xFF; FRAME_BYTES]))
        .unwrap();

    let presented: Vec<Frame> = std::iter::from_fn(|| mailbox.take()).collect();
    assert_eq!(presented.len(), 1);
    assert!(presented[0].pixels().iter().all(|&byte| byte == 0xFF));
}

#[test]
fn slow_consumer_sees_the_newest_frame_only() {
    let (mut bridge, mailbox) = wired_bridge();

    bridge
        .handle_message(Message::NewFrame(vec![0x01; FRAME_BYTES]))
        .unwrap();
    bridge
        .handle_message(Message::NewFrame(vec![0x02; FRAME_BYTES]))
        .unwrap();
    bridge
        .handle_message(Message::NewFrame(vec![0x03; FRAME_BYTES]))
        .unwrap();

    // Dropped, never reordered or duplicated.
    assert_eq!(mailbox.take().unwrap().pixels()[0], 0x03);
    assert_eq!(mailbox.take(), None);
}

#[test]
fn malformed_frame_does_not_disturb_input_or_later_frames() {
    let (mut bridge, mailbox) = wired_bridge();
    let transport = RecordingTransport::default();
    let bridge_out = WorkerBridge::new(transport.clone());

    assert!(bridge
        .handle_message(Message::NewFrame(vec![0xAB; FRAME_BYTES / 2]))
        .is_err());

    bridge_out
        .send_button(ButtonEvent::Pressed, Button::A)
        .unwrap();
    bridge_out
        .send_button(ButtonEvent::Released, Button::A)
        .unwrap();
    bridge
        .handle_message(Message::NewFrame(vec![0xCD; FRAME_BYTES]))
        .unwrap();

    assert_eq!(
        *transport.sent.borrow(),
        vec![
            Message::ButtonPressed(Button::A),
            Message::ButtonReleased(Button::A),
        ],
    );
    assert_eq!(mailbox.take().unwrap().pixels()[0], 0xCD);
}
