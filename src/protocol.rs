//! Message schema shared with the emulator worker.
//!
//! Every message crosses the channel as a two-element array: the tag string
//! first, the payload second. The channel delivers messages in send order,
//! drops nothing, and performs no batching; exactly one in-flight `NewFrame`
//! is meaningful at a time.

use thiserror::Error;

use crate::buttons::Button;

pub const TAG_CARTRIDGE_DATA: &str = "CartridgeData";
pub const TAG_BUTTON_PRESSED: &str = "ButtonPressed";
pub const TAG_BUTTON_RELEASED: &str = "ButtonReleased";
pub const TAG_NEW_FRAME: &str = "NewFrame";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("cartridge selection is empty")]
    EmptyCartridge,
    #[error("worker channel rejected message: {reason}")]
    PostFailed { reason: String },
}

/// Tagged union exchanged over the worker channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// Cartridge bytes; the computation side treats this as reset-and-load.
    CartridgeData(Vec<u8>),
    ButtonPressed(Button),
    ButtonReleased(Button),
    /// Raw pixel payload. Length is validated by the frame codec, not here.
    NewFrame(Vec<u8>),
}

impl Message {
    pub fn tag(&self) -> &'static str {
        match self {
            Message::CartridgeData(_) => TAG_CARTRIDGE_DATA,
            Message::ButtonPressed(_) => TAG_BUTTON_PRESSED,
            Message::ButtonReleased(_) => TAG_BUTTON_RELEASED,
            Message::NewFrame(_) => TAG_NEW_FRAME,
        }
    }
}
