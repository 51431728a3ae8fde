//! USB HID keyboard sink for ATmega32U4.
//!
//! Implements a standard 6KRO keyboard on the chip's built-in USB
//! controller via direct register access, and exposes the engine's
//! `HidSink` press/release interface on top of it. Pressed keys are kept
//! in per-slot state so overlapping modifier use is released correctly;
//! reports are only sent when they change.

use avr_device::atmega32u4::Peripherals;

use simpanel_core::keycode::{self, KEY_LEFT_SHIFT, RAW_OFFSET};
use simpanel_core::HidSink;

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; 6],
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; 6],
        }
    }
}

/// Shift flag in the ASCII translation table.
const SHIFTED: u8 = 0x80;

/// HID usage for each printable ASCII character 0x20..=0x7E.
/// The high bit marks characters that need Shift.
static ASCII_USAGE: [u8; 95] = [
    0x2C,          // ' '
    0x1E | SHIFTED, // !
    0x34 | SHIFTED, // "
    0x20 | SHIFTED, // #
    0x21 | SHIFTED, // $
    0x22 | SHIFTED, // %
    0x24 | SHIFTED, // &
    0x34,          // '
    0x26 | SHIFTED, // (
    0x27 | SHIFTED, // )
    0x25 | SHIFTED, // *
    0x2E | SHIFTED, // +
    0x36,          // ,
    0x2D,          // -
    0x37,          // .
    0x38,          // /
    0x27,          // 0
    0x1E,          // 1
    0x1F,          // 2
    0x20,          // 3
    0x21,          // 4
    0x22,          // 5
    0x23,          // 6
    0x24,          // 7
    0x25,          // 8
    0x26,          // 9
    0x33 | SHIFTED, // :
    0x33,          // ;
    0x36 | SHIFTED, // <
    0x2E,          // =
    0x37 | SHIFTED, // >
    0x38 | SHIFTED, // ?
    0x1F | SHIFTED, // @
    0x04 | SHIFTED, // A
    0x05 | SHIFTED, // B
    0x06 | SHIFTED, // C
    0x07 | SHIFTED, // D
    0x08 | SHIFTED, // E
    0x09 | SHIFTED, // F
    0x0A | SHIFTED, // G
    0x0B | SHIFTED, // H
    0x0C | SHIFTED, // I
    0x0D | SHIFTED, // J
    0x0E | SHIFTED, // K
    0x0F | SHIFTED, // L
    0x10 | SHIFTED, // M
    0x11 | SHIFTED, // N
    0x12 | SHIFTED, // O
    0x13 | SHIFTED, // P
    0x14 | SHIFTED, // Q
    0x15 | SHIFTED, // R
    0x16 | SHIFTED, // S
    0x17 | SHIFTED, // T
    0x18 | SHIFTED, // U
    0x19 | SHIFTED, // V
    0x1A | SHIFTED, // W
    0x1B | SHIFTED, // X
    0x1C | SHIFTED, // Y
    0x1D | SHIFTED, // Z
    0x2F,          // [
    0x31,          // \
    0x30,          // ]
    0x23 | SHIFTED, // ^
    0x2D | SHIFTED, // _
    0x35,          // `
    0x04,          // a
    0x05,          // b
    0x06,          // c
    0x07,          // d
    0x08,          // e
    0x09,          // f
    0x0A,          // g
    0x0B,          // h
    0x0C,          // i
    0x0D,          // j
    0x0E,          // k
    0x0F,          // l
    0x10,          // m
    0x11,          // n
    0x12,          // o
    0x13,          // p
    0x14,          // q
    0x15,          // r
    0x16,          // s
    0x17,          // t
    0x18,          // u
    0x19,          // v
    0x1A,          // w
    0x1B,          // x
    0x1C,          // y
    0x1D,          // z
    0x2F | SHIFTED, // {
    0x31 | SHIFTED, // |
    0x30 | SHIFTED, // }
    0x35 | SHIFTED, // ~
];

/// Translate a logical key code into (HID usage, modifier bits).
///
/// Modifier codes have no usage of their own; printable ASCII may pull in
/// LShift; non-printable codes are a plain offset.
fn translate(code: u8) -> Option<(u8, u8)> {
    if keycode::is_modifier(code) {
        return Some((0, keycode::modifier_bit(code)));
    }
    if code >= RAW_OFFSET {
        return Some((code - RAW_OFFSET, 0));
    }
    if (0x20..=0x7E).contains(&code) {
        let entry = ASCII_USAGE[(code - 0x20) as usize];
        let mods = if entry & SHIFTED != 0 {
            keycode::modifier_bit(KEY_LEFT_SHIFT)
        } else {
            0
        };
        return Some((entry & !SHIFTED, mods));
    }
    None
}

/// One pressed key: the logical code it was pressed as, the HID usage it
/// translated to, and the modifier bits it contributed.
#[derive(Clone, Copy)]
struct HeldSlot {
    code: u8,
    usage: u8,
    mods: u8,
}

/// USB device state plus the currently held report.
pub struct UsbKeyboard {
    configured: bool,
    slots: [Option<HeldSlot>; 6],
    report: KeyboardReport,
    last_report: KeyboardReport,
}

impl HidSink for UsbKeyboard {
    fn press(&mut self, code: u8, modifiers: &[u8]) {
        if self.slots.iter().flatten().any(|slot| slot.code == code) {
            return; // Already down.
        }
        let Some((usage, mut mods)) = translate(code) else {
            return;
        };
        for &modifier in modifiers {
            mods |= keycode::modifier_bit(modifier);
        }
        let Some(free) = self.slots.iter().position(Option::is_none) else {
            return; // More than 6 keys held: silently drop.
        };
        self.slots[free] = Some(HeldSlot { code, usage, mods });
        self.rebuild_report();
    }

    fn release(&mut self, code: u8) {
        let held = self
            .slots
            .iter()
            .position(|slot| slot.map_or(false, |s| s.code == code));
        if let Some(idx) = held {
            self.slots[idx] = None;
            self.rebuild_report();
        }
    }
}

// ============================================================================
// ATmega32U4 USB Register-Level Driver
// ============================================================================

// USB endpoint configuration for keyboard HID
const EP0_SIZE: u8 = 64; // Control endpoint size
const EP1_SIZE: u8 = 8; // Interrupt IN endpoint size (keyboard reports)

/// HID report descriptor for a standard keyboard.
static HID_REPORT_DESCRIPTOR: [u8; 64] = [
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    // Modifier keys (8 bits)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0xE0, //   Usage Minimum (224) - LCtrl
    0x29, 0xE7, //   Usage Maximum (231) - RGui
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    // Reserved byte
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant)
    // LEDs (5 bits)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x05, //   Usage Maximum (5)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    // LED padding (3 bits)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant)
    // Keycodes (6 bytes)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x05, 0x07, //   Usage Page (Key Codes)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x81, 0x00, //   Input (Data, Array)
    0xC0, // End Collection
];

// USB descriptors
static DEVICE_DESCRIPTOR: [u8; 18] = [
    18,   // bLength
    1,    // bDescriptorType (Device)
    0x00, 0x02, // bcdUSB (2.0)
    0,    // bDeviceClass (defined at interface level)
    0,    // bDeviceSubClass
    0,    // bDeviceProtocol
    EP0_SIZE, // bMaxPacketSize0
    0xC0, 0x16, // idVendor (0x16C0 — Van Ooijen Technische Informatica)
    0xA3, 0x05, // idProduct (0x05A3 — custom panel)
    0x01, 0x00, // bcdDevice (1.0)
    1,    // iManufacturer
    2,    // iProduct
    0,    // iSerialNumber
    1,    // bNumConfigurations
];

static CONFIG_DESCRIPTOR: [u8; 34] = [
    // Configuration descriptor
    9,    // bLength
    2,    // bDescriptorType (Configuration)
    34, 0, // wTotalLength
    1,    // bNumInterfaces
    1,    // bConfigurationValue
    0,    // iConfiguration
    0x80, // bmAttributes (bus powered)
    50,   // bMaxPower (100mA)
    // Interface descriptor
    9,    // bLength
    4,    // bDescriptorType (Interface)
    0,    // bInterfaceNumber
    0,    // bAlternateSetting
    1,    // bNumEndpoints
    3,    // bInterfaceClass (HID)
    1,    // bInterfaceSubClass (Boot)
    1,    // bInterfaceProtocol (Keyboard)
    0,    // iInterface
    // HID descriptor
    9,    // bLength
    0x21, // bDescriptorType (HID)
    0x11, 0x01, // bcdHID (1.11)
    0,    // bCountryCode
    1,    // bNumDescriptors
    0x22, // bDescriptorType (Report)
    HID_REPORT_DESCRIPTOR.len() as u8, 0, // wDescriptorLength
    // Endpoint descriptor (EP1 IN — interrupt)
    7,    // bLength
    5,    // bDescriptorType (Endpoint)
    0x81, // bEndpointAddress (EP1 IN)
    0x03, // bmAttributes (Interrupt)
    EP1_SIZE, 0, // wMaxPacketSize
    10,   // bInterval (10ms polling)
];

/// String descriptor 0 (language ID)
static STRING_DESC_0: [u8; 4] = [4, 3, 0x09, 0x04]; // English (US)

/// String descriptor 1 (manufacturer): "SimPanel"
static STRING_DESC_1: [u8; 18] = [
    18, 3, // bLength, bDescriptorType
    b'S', 0, b'i', 0, b'm', 0, b'P', 0, b'a', 0, b'n', 0, b'e', 0, b'l', 0,
];

/// String descriptor 2 (product): "Control Panel"
static STRING_DESC_2: [u8; 28] = [
    28, 3, // bLength, bDescriptorType
    b'C', 0, b'o', 0, b'n', 0, b't', 0, b'r', 0, b'o', 0, b'l', 0, b' ', 0, b'P', 0, b'a', 0,
    b'n', 0, b'e', 0, b'l', 0,
];

impl UsbKeyboard {
    pub const fn new() -> Self {
        Self {
            configured: false,
            slots: [None; 6],
            report: KeyboardReport::empty(),
            last_report: KeyboardReport::empty(),
        }
    }

    /// Recompute the wire report from the held slots.
    fn rebuild_report(&mut self) {
        let mut report = KeyboardReport::empty();
        let mut idx = 0usize;
        for slot in self.slots.iter().flatten() {
            report.modifiers |= slot.mods;
            if slot.usage != 0 && idx < 6 {
                report.keys[idx] = slot.usage;
                idx += 1;
            }
        }
        self.report = report;
    }

    /// Initialize the ATmega32U4 USB controller.
    pub fn init(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        // Pad regulator, then controller plus VBUS pad
        usb.uhwcon.write(|w| w.uvrege().set_bit());
        usb.usbcon
            .write(|w| w.usbe().set_bit().otgpade().set_bit());

        // PLL from the 16MHz crystal gives the 48MHz USB clock
        dp.PLL.pllcsr.write(|w| w.pindiv().set_bit().plle().set_bit());
        while dp.PLL.pllcsr.read().plock().bit_is_clear() {}

        // Unfreeze the clock and attach to the bus
        usb.usbcon.modify(|_, w| w.frzclk().clear_bit());
        usb.udcon.modify(|_, w| w.detach().clear_bit());

        usb.udien.write(|w| w.eorste().set_bit());

        self.configured = false;
    }

    /// Poll for USB events and handle them. Call this from the main loop.
    pub fn poll(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        let udint = usb.udint.read();

        // End of reset
        if udint.eorsti().bit_is_set() {
            usb.udint.modify(|_, w| w.eorsti().clear_bit());
            self.configure_ep0(dp);
            self.configured = false;
        }

        // Check for SETUP packet on EP0
        self.select_endpoint(dp, 0);
        let ueintx = usb.ueintx.read();
        if ueintx.rxstpi().bit_is_set() {
            self.handle_setup(dp);
        }
    }

    /// Send the current report if it has changed since the last send.
    pub fn flush(&mut self, dp: &Peripherals) {
        if !self.configured || self.report == self.last_report {
            return;
        }

        let usb = &dp.USB_DEVICE;
        self.select_endpoint(dp, 1);

        // Wait for endpoint ready (RWAL set means we can write)
        let mut timeout: u16 = 0xFFFF;
        while usb.ueintx.read().rwal().bit_is_clear() {
            timeout = timeout.wrapping_sub(1);
            if timeout == 0 {
                return;
            }
        }

        // Write 8-byte report
        usb.uedatx.write(|w| w.bits(self.report.modifiers));
        usb.uedatx.write(|w| w.bits(self.report.reserved));
        for &key in &self.report.keys {
            usb.uedatx.write(|w| w.bits(key));
        }

        // Clear FIFOCON and TXINI to send
        usb.ueintx
            .modify(|_, w| w.fifocon().clear_bit().txini().clear_bit());

        self.last_report = self.report;
    }

    fn configure_ep0(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(dp, 0);
        // Enable EP0 as control endpoint, 64 bytes
        usb.ueconx.write(|w| w.epen().set_bit());
        usb.uecfg0x.write(|w| w.eptype().bits(0b00));
        usb.uecfg1x.write(|w| w.epsize().bits(0b011).alloc().set_bit());
    }

    fn configure_ep1(&self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        self.select_endpoint(dp, 1);
        usb.ueconx.write(|w| w.epen().set_bit());
        // Interrupt IN endpoint
        usb.uecfg0x
            .write(|w| w.eptype().bits(0b11).epdir().set_bit());
        usb.uecfg1x.write(|w| w.epsize().bits(0b000).alloc().set_bit());
    }

    fn select_endpoint(&self, dp: &Peripherals, ep: u8) {
        dp.USB_DEVICE
            .uenum
            .write(|w| w.bits(ep & 0x07));
    }

    fn handle_setup(&mut self, dp: &Peripherals) {
        let usb = &dp.USB_DEVICE;

        // Read 8-byte SETUP packet
        let bm_request_type = usb.uedatx.read().bits();
        let b_request = usb.uedatx.read().bits();
        let w_value_l = usb.uedatx.read().bits();
        let w_value_h = usb.uedatx.read().bits();
        let _w_index_l = usb.uedatx.read().bits();
        let _w_index_h = usb.uedatx.read().bits();
        let w_length_l = usb.uedatx.read().bits();
        let w_length_h = usb.uedatx.read().bits();

        // Acknowledge SETUP
        usb.ueintx.modify(|_, w| w.rxstpi().clear_bit());

        let w_length = (w_length_h as u16) << 8 | w_length_l as u16;

        match (bm_request_type, b_request) {
            // GET_DESCRIPTOR
            (0x80, 0x06) => {
                let desc_type = w_value_h;
                let desc_index = w_value_l;
                match desc_type {
                    1 => self.send_descriptor(dp, &DEVICE_DESCRIPTOR, w_length),
                    2 => self.send_descriptor(dp, &CONFIG_DESCRIPTOR, w_length),
                    3 => {
                        // String descriptor
                        match desc_index {
                            0 => self.send_descriptor(dp, &STRING_DESC_0, w_length),
                            1 => self.send_descriptor(dp, &STRING_DESC_1, w_length),
                            2 => self.send_descriptor(dp, &STRING_DESC_2, w_length),
                            _ => self.stall(dp),
                        }
                    }
                    _ => self.stall(dp),
                }
            }

            // SET_ADDRESS
            (0x00, 0x05) => {
                // Send ZLP first, then set address
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.udaddr
                    .write(|w| w.uadd().bits(w_value_l & 0x7F).adden().set_bit());
            }

            // SET_CONFIGURATION
            (0x00, 0x09) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
                self.configure_ep1(dp);
                self.configured = true;
            }

            // GET_CONFIGURATION
            (0x80, 0x08) => {
                while usb.ueintx.read().txini().bit_is_clear() {}
                usb.uedatx
                    .write(|w| w.bits(if self.configured { 1 } else { 0 }));
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            // HID GET_DESCRIPTOR (interface-level)
            (0x81, 0x06) => {
                let desc_type = w_value_h;
                match desc_type {
                    0x22 => self.send_descriptor(dp, &HID_REPORT_DESCRIPTOR, w_length),
                    _ => self.stall(dp),
                }
            }

            // HID SET_IDLE
            (0x21, 0x0A) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            // HID SET_PROTOCOL
            (0x21, 0x0B) => {
                // Send ZLP
                usb.ueintx.modify(|_, w| w.txini().clear_bit());
            }

            _ => {
                self.stall(dp);
            }
        }
    }

    fn send_descriptor(&self, dp: &Peripherals, desc: &[u8], max_length: u16) {
        let usb = &dp.USB_DEVICE;
        let len = core::cmp::min(desc.len(), max_length as usize);
        let mut sent = 0;

        while sent < len {
            while usb.ueintx.read().txini().bit_is_clear() {}

            let chunk_end = core::cmp::min(sent + EP0_SIZE as usize, len);
            for &byte in &desc[sent..chunk_end] {
                usb.uedatx.write(|w| w.bits(byte));
            }

            usb.ueintx.modify(|_, w| w.txini().clear_bit());
            sent = chunk_end;
        }

        // Wait for status stage (host sends ZLP)
        while usb.ueintx.read().rxouti().bit_is_clear() {}
        usb.ueintx.modify(|_, w| w.rxouti().clear_bit());
    }

    fn stall(&self, dp: &Peripherals) {
        dp.USB_DEVICE
            .ueconx
            .modify(|_, w| w.stallrq().set_bit());
    }
}
