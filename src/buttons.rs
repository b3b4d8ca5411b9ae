//! Joypad buttons and the key-code table that selects them.

/// One of the console's 8 physical controls. Wire ids are stable for the
/// lifetime of the process and match the computation module's joypad
/// enumeration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    Start,
    Select,
    B,
    A,
    Down,
    Up,
    Left,
    Right,
}

impl Button {
    /// Integer id used on the worker channel.
    pub fn id(self) -> u8 {
        match self {
            Button::Start => 1,
            Button::Select => 2,
            Button::B => 3,
            Button::A => 4,
            Button::Down => 5,
            Button::Up => 6,
            Button::Left => 7,
            Button::Right => 8,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonEvent {
    Pressed,
    Released,
}

/// W / Q / Z / X plus the arrow keys.
const KEY_MAP: [(u32, Button); 8] = [
    (87, Button::Start),
    (81, Button::Select),
    (90, Button::B),
    (88, Button::A),
    (40, Button::Down),
    (38, Button::Up),
    (37, Button::Left),
    (39, Button::Right),
];

/// Maps a raw DOM key code to a button. Unknown codes map to `None` and must
/// be filtered out before they reach the worker bridge.
pub fn key_to_button(key_code: u32) -> Option<Button> {
    KEY_MAP
        .iter()
        .find(|(code, _)| *code == key_code)
        .map(|&(_, button)| button)
}
