//! Simulator control panel firmware for ATmega32U4 (Teensy 2.0).
//!
//! This is the hardware shell around `simpanel-core`:
//! - Switch sampling on GPIO against internal pull-ups
//! - Per-input position debouncing and mode-gated dispatch (core)
//! - USB HID keyboard reports
//! - Startup validation with an LED blink code on a bad configuration

#![no_std]
#![no_main]
#![feature(asm_experimental_arch)]

mod hid;
mod pins;

use avr_device::atmega32u4::Peripherals;

use hid::UsbKeyboard;
use simpanel_core::config;
use simpanel_core::panel::Panel;
use simpanel_core::predicate::PredicateRegistry;
use simpanel_core::vkey::VirtualKeyRegistry;

/// Blink codes for fatal startup faults.
const FAULT_CONFIG: u8 = 2;
const FAULT_PIN_MAP: u8 = 3;
const FAULT_DISPATCH: u8 = 4;

/// Panic handler — on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Configure system clock (should already be 16MHz from Teensy bootloader fuses)
    // Disable clock prescaler (CLKPR)
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) }); // Prescaler = 1

    // On-board LED on PD6 for diagnostics
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });

    // Build the configuration tables. They live on the stack for the
    // whole run; the panel borrows them below.
    let mut predicates = config::predicates();
    let mut keys = config::virtual_keys();
    let mut inputs = config::physical_inputs();

    // A misconfigured panel must not run. Both checks halt with a blink
    // code before the tick loop can start.
    if !pins::all_mapped(&inputs) {
        halt_blink(&dp, FAULT_PIN_MAP);
    }

    pins::init(&dp, &inputs);

    let mut usb = UsbKeyboard::new();
    usb.init(&dp);

    let mut panel = match Panel::new(
        PredicateRegistry::new(&mut predicates),
        VirtualKeyRegistry::new(&mut keys),
        &mut inputs,
    ) {
        Ok(panel) => panel,
        Err(_) => halt_blink(&dp, FAULT_CONFIG),
    };

    // LED on to indicate the panel is running
    led(&dp, true);

    let reader = pins::PanelPins::new(&dp);
    let mut now_ms: u32 = 0;

    loop {
        // Poll USB (handle enumeration, control requests)
        usb.poll(&dp);

        // Sample, debounce and dispatch every input
        if panel.tick(now_ms, &reader, &mut usb).is_err() {
            // Unreachable after validation; treat it like a config fault.
            halt_blink(&dp, FAULT_DISPATCH);
        }

        // Push the report out if it changed
        usb.flush(&dp);

        // ~1ms tick
        delay_ms(1);
        now_ms = now_ms.wrapping_add(1);
    }
}

fn led(dp: &Peripherals, on: bool) {
    if on {
        dp.PORTD
            .portd
            .modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });
    } else {
        dp.PORTD
            .portd
            .modify(|r, w| unsafe { w.bits(r.bits() & !0x40) });
    }
}

/// Fatal halt: repeat `code` short flashes followed by a long pause.
fn halt_blink(dp: &Peripherals, code: u8) -> ! {
    loop {
        for _ in 0..code {
            led(dp, true);
            delay_ms(150);
            led(dp, false);
            delay_ms(150);
        }
        delay_ms(700);
    }
}

/// Busy-wait delay in milliseconds (approximate, at 16MHz).
fn delay_ms(ms: u16) {
    for _ in 0..ms {
        // ~1ms at 16MHz: 16000 cycles / 4 cycles per loop iteration
        for _ in 0..4000u16 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
