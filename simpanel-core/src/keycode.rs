//! Logical 8-bit key codes carried by virtual keys.
//!
//! Printable ASCII codes map to themselves. Modifier keys occupy
//! 0x80..0x87 and non-printable keys start at [`RAW_OFFSET`], offset
//! against their USB HID usage IDs so the firmware can translate them
//! with a single subtraction.

pub const KEY_LEFT_CTRL: u8 = 0x80;
pub const KEY_LEFT_SHIFT: u8 = 0x81;
pub const KEY_LEFT_ALT: u8 = 0x82;
pub const KEY_LEFT_GUI: u8 = 0x83;
pub const KEY_RIGHT_CTRL: u8 = 0x84;
pub const KEY_RIGHT_SHIFT: u8 = 0x85;
pub const KEY_RIGHT_ALT: u8 = 0x86;
pub const KEY_RIGHT_GUI: u8 = 0x87;

/// Offset between a non-printable key code and its USB HID usage ID.
pub const RAW_OFFSET: u8 = 0x88;

pub const KEY_ENTER: u8 = 0xB0;
pub const KEY_ESC: u8 = 0xB1;
pub const KEY_BACKSPACE: u8 = 0xB2;
pub const KEY_TAB: u8 = 0xB3;

pub const KEY_F1: u8 = 0xC2;
pub const KEY_F2: u8 = 0xC3;
pub const KEY_F3: u8 = 0xC4;
pub const KEY_F4: u8 = 0xC5;
pub const KEY_F5: u8 = 0xC6;
pub const KEY_F6: u8 = 0xC7;
pub const KEY_F7: u8 = 0xC8;
pub const KEY_F8: u8 = 0xC9;
pub const KEY_F9: u8 = 0xCA;
pub const KEY_F10: u8 = 0xCB;
pub const KEY_F11: u8 = 0xCC;
pub const KEY_F12: u8 = 0xCD;

pub const KEY_INSERT: u8 = 0xD1;
pub const KEY_HOME: u8 = 0xD2;
pub const KEY_PAGE_UP: u8 = 0xD3;
pub const KEY_DELETE: u8 = 0xD4;
pub const KEY_END: u8 = 0xD5;
pub const KEY_PAGE_DOWN: u8 = 0xD6;
pub const KEY_RIGHT_ARROW: u8 = 0xD7;
pub const KEY_LEFT_ARROW: u8 = 0xD8;
pub const KEY_DOWN_ARROW: u8 = 0xD9;
pub const KEY_UP_ARROW: u8 = 0xDA;

/// Modifier sets as zero-padded triples, ordered Ctrl, Shift, Alt.
pub const MOD_NONE: [u8; 3] = [0, 0, 0];
pub const MOD_CTRL: [u8; 3] = [KEY_LEFT_CTRL, 0, 0];
pub const MOD_SHIFT: [u8; 3] = [KEY_LEFT_SHIFT, 0, 0];
pub const MOD_ALT: [u8; 3] = [KEY_LEFT_ALT, 0, 0];
pub const MOD_CTRL_SHIFT: [u8; 3] = [KEY_LEFT_CTRL, KEY_LEFT_SHIFT, 0];
pub const MOD_CTRL_ALT: [u8; 3] = [KEY_LEFT_CTRL, KEY_LEFT_ALT, 0];
pub const MOD_SHIFT_ALT: [u8; 3] = [KEY_LEFT_SHIFT, KEY_LEFT_ALT, 0];
pub const MOD_CTRL_SHIFT_ALT: [u8; 3] = [KEY_LEFT_CTRL, KEY_LEFT_SHIFT, KEY_LEFT_ALT];

/// Check if a code is a modifier key (LCtrl..RGui).
pub fn is_modifier(code: u8) -> bool {
    (KEY_LEFT_CTRL..=KEY_RIGHT_GUI).contains(&code)
}

/// Get the HID modifier bit mask (bit 0 = LCtrl, bit 7 = RGui).
pub fn modifier_bit(code: u8) -> u8 {
    if is_modifier(code) {
        1 << (code - KEY_LEFT_CTRL)
    } else {
        0
    }
}

/// Display name for a non-printable code, if it has one.
pub fn display_name(code: u8) -> Option<&'static str> {
    Some(match code {
        KEY_LEFT_CTRL => "ctrl",
        KEY_LEFT_SHIFT => "shift",
        KEY_LEFT_ALT => "alt",
        KEY_LEFT_GUI => "gui",
        KEY_RIGHT_CTRL => "rctrl",
        KEY_RIGHT_SHIFT => "rshift",
        KEY_RIGHT_ALT => "ralt",
        KEY_RIGHT_GUI => "rgui",
        KEY_ENTER => "Enter",
        KEY_ESC => "Esc",
        KEY_BACKSPACE => "Backspace",
        KEY_TAB => "Tab",
        KEY_F1 => "F1",
        KEY_F2 => "F2",
        KEY_F3 => "F3",
        KEY_F4 => "F4",
        KEY_F5 => "F5",
        KEY_F6 => "F6",
        KEY_F7 => "F7",
        KEY_F8 => "F8",
        KEY_F9 => "F9",
        KEY_F10 => "F10",
        KEY_F11 => "F11",
        KEY_F12 => "F12",
        KEY_INSERT => "Insert",
        KEY_HOME => "Home",
        KEY_PAGE_UP => "PgUp",
        KEY_DELETE => "Delete",
        KEY_END => "End",
        KEY_PAGE_DOWN => "PgDn",
        KEY_RIGHT_ARROW => "Right",
        KEY_LEFT_ARROW => "Left",
        KEY_DOWN_ARROW => "Down",
        KEY_UP_ARROW => "Up",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_bits() {
        assert_eq!(modifier_bit(KEY_LEFT_CTRL), 0x01);
        assert_eq!(modifier_bit(KEY_LEFT_SHIFT), 0x02);
        assert_eq!(modifier_bit(KEY_LEFT_ALT), 0x04);
        assert_eq!(modifier_bit(KEY_RIGHT_GUI), 0x80);
        assert_eq!(modifier_bit(b'p'), 0);
        assert!(!is_modifier(b'p'));
        assert!(!is_modifier(KEY_F4));
    }

    #[test]
    fn test_raw_offset_matches_hid_usages() {
        // F4 is HID usage 0x3D, Backspace is 0x2A.
        assert_eq!(KEY_F4 - RAW_OFFSET, 0x3D);
        assert_eq!(KEY_BACKSPACE - RAW_OFFSET, 0x2A);
    }
}
