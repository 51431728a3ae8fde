//! Static panel configuration: predicates, virtual keys, physical inputs.
//!
//! This is the only file to touch when rebinding the panel. The tables
//! are plain data; the startup validation pass catches dangling names,
//! so a typo here halts the firmware instead of silently dropping a
//! binding.

use crate::input::PhysicalInput;
use crate::keycode::{KEY_BACKSPACE, KEY_F4, MOD_ALT};
use crate::predicate::Predicate;
use crate::vkey::VirtualKey;

pub const PREDICATE_COUNT: usize = 2;
pub const KEY_COUNT: usize = 12;
pub const INPUT_COUNT: usize = 9;

/// Mode flags. The master mode toggle keeps exactly one of them active.
pub fn predicates() -> [Predicate; PREDICATE_COUNT] {
    [Predicate::new("normal"), Predicate::new("combat")]
}

/// Simulator keybindings. The "off" side of each on/off pair is the same
/// key with Alt, matching the sim's inverse bindings.
pub fn virtual_keys() -> [VirtualKey; KEY_COUNT] {
    [
        VirtualKey::new("power_on", b'p'),
        VirtualKey::new("power_off", b'p').with_modifiers(MOD_ALT),
        VirtualKey::new("gear_down", b'0'),
        VirtualKey::new("gear_up", b'9'),
        VirtualKey::new("nav_lights_on", b'n'),
        VirtualKey::new("nav_lights_off", b'n').with_modifiers(MOD_ALT),
        VirtualKey::new("headlights_on", b'h'),
        VirtualKey::new("headlights_off", b'h').with_modifiers(MOD_ALT),
        VirtualKey::new("boost", b'b').guarded_by("normal"),
        VirtualKey::new("autoland", b'l').guarded_by("normal"),
        VirtualKey::new("camera", KEY_F4),
        VirtualKey::new("eject", KEY_BACKSPACE).guarded_by("combat"),
    ]
}

/// Switch wiring, in processing order. Pin numbers follow the Teensy 2.0
/// silkscreen; pin 11 (PD6) is the on-board LED and stays free.
pub fn physical_inputs() -> [PhysicalInput; INPUT_COUNT] {
    [
        PhysicalInput::toggle_2way("power", 0, "power_on", "power_off"),
        PhysicalInput::toggle_2way("gear", 1, "gear_up", "gear_down"),
        PhysicalInput::toggle_2way("nav_lights", 2, "nav_lights_on", "nav_lights_off"),
        PhysicalInput::toggle_2way("headlights", 3, "headlights_on", "headlights_off"),
        PhysicalInput::button("boost", 4, "boost"),
        PhysicalInput::button("autoland", 5, "autoland"),
        PhysicalInput::button("camera", 6, "camera"),
        PhysicalInput::button("eject", 7, "eject"),
        PhysicalInput::mode_toggle_2way("master_mode", 8, "normal", "combat"),
    ]
}
