//! Fixed-size RGBA frames as produced by the emulator worker.

use thiserror::Error;

/// Width of one video frame in pixels.
pub const WIDTH: usize = 160;
/// Height of one video frame in pixels.
pub const HEIGHT: usize = 144;
/// Bytes per pixel (RGBA).
pub const BYTES_PER_PIXEL: usize = 4;
/// Exact byte length of a well-formed frame payload.
pub const FRAME_BYTES: usize = WIDTH * HEIGHT * BYTES_PER_PIXEL;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("malformed frame: expected {FRAME_BYTES} bytes, got {len}")]
    MalformedFrame { len: usize },
}

/// One fully rendered 160x144 RGBA image, row-major, top-to-bottom.
///
/// The emulator is the source of truth for pixel values; no color-space
/// conversion or palette lookup happens on this side of the channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pixels: Vec<u8>,
}

impl Frame {
    /// Interprets a raw pixel buffer as a frame. A length mismatch is a
    /// protocol error, never a silently truncated frame.
    pub fn from_bytes(pixels: Vec<u8>) -> Result<Self, FrameError> {
        if pixels.len() != FRAME_BYTES {
            return Err(FrameError::MalformedFrame { len: pixels.len() });
        }
        Ok(Self { pixels })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_length() {
        let frame = Frame::from_bytes(vec![0xFF; FRAME_BYTES]).unwrap();
        assert_eq!(frame.pixels().len(), 92160);
    }

    #[test]
    fn rejects_any_other_length() {
        for len in [0, 1, FRAME_BYTES - 1, FRAME_BYTES + 1, FRAME_BYTES * 2] {
            assert_eq!(
                Frame::from_bytes(vec![0; len]),
                Err(FrameError::MalformedFrame { len }),
            );
        }
    }
}
