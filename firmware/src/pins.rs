//! Panel switch input pins.
//!
//! Every switch contact is wired between its pin and ground and read
//! against the internal pull-up, so a closed contact reads low. Pin
//! numbers in the configuration follow the Teensy 2.0 silkscreen.

use avr_device::atmega32u4::Peripherals;

use simpanel_core::input::PhysicalInput;
use simpanel_core::PinReader;

#[derive(Clone, Copy)]
enum Port {
    B,
    C,
    D,
}

/// Teensy 2.0 digital pin → (port, bit).
///
/// Pin 11 is PD6, the on-board LED, and is deliberately unmapped so the
/// configuration cannot claim it.
fn port_bit(pin: u8) -> Option<(Port, u8)> {
    Some(match pin {
        0 => (Port::B, 0),
        1 => (Port::B, 1),
        2 => (Port::B, 2),
        3 => (Port::B, 3),
        4 => (Port::B, 7),
        5 => (Port::D, 0),
        6 => (Port::D, 1),
        7 => (Port::D, 2),
        8 => (Port::D, 3),
        9 => (Port::C, 6),
        10 => (Port::C, 7),
        12 => (Port::D, 7),
        13 => (Port::B, 4),
        14 => (Port::B, 5),
        15 => (Port::B, 6),
        _ => return None,
    })
}

/// Check that every configured pin exists on this board.
pub fn all_mapped(inputs: &[PhysicalInput]) -> bool {
    inputs.iter().all(|input| {
        let (pin_a, pin_b) = input.pins();
        port_bit(pin_a).is_some() && pin_b.map_or(true, |pin| port_bit(pin).is_some())
    })
}

/// Configure every configured pin as an input with its pull-up enabled.
pub fn init(dp: &Peripherals, inputs: &[PhysicalInput]) {
    for input in inputs {
        let (pin_a, pin_b) = input.pins();
        configure(dp, pin_a);
        if let Some(pin) = pin_b {
            configure(dp, pin);
        }
    }
}

fn configure(dp: &Peripherals, pin: u8) {
    let Some((port, bit)) = port_bit(pin) else {
        return;
    };
    let mask = 1u8 << bit;
    match port {
        Port::B => {
            dp.PORTB.ddrb.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            dp.PORTB.portb.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        }
        Port::C => {
            dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        }
        Port::D => {
            dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
        }
    }
}

/// Live pin levels for the panel loop.
pub struct PanelPins<'a> {
    dp: &'a Peripherals,
}

impl<'a> PanelPins<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self { dp }
    }
}

impl PinReader for PanelPins<'_> {
    fn is_active(&self, pin: u8) -> bool {
        let Some((port, bit)) = port_bit(pin) else {
            return false;
        };
        let levels = match port {
            Port::B => self.dp.PORTB.pinb.read().bits(),
            Port::C => self.dp.PORTC.pinc.read().bits(),
            Port::D => self.dp.PORTD.pind.read().bits(),
        };
        // Active low against the pull-up.
        levels & (1 << bit) == 0
    }
}
