//! Script-driven bench simulator for the panel engine.
//!
//! Runs the exact `Panel` the firmware runs, with scripted switch
//! positions in place of GPIO and stdout in place of USB. One command
//! per line, `#` starts a comment:
//!
//! ```text
//! set <input> <position>   # move a switch: up/center/down, pressed/released, or 0-2
//! run <ticks>              # advance the clock by N 1ms ticks
//! ```

use anyhow::{anyhow, bail, Context, Result};

use simpanel_core::config;
use simpanel_core::input::InputKind;
use simpanel_core::panel::Panel;
use simpanel_core::predicate::PredicateRegistry;
use simpanel_core::vkey::VirtualKeyRegistry;
use simpanel_core::{HidSink, PinReader};

use crate::bindings::{describe_code, describe_key};

/// Pin levels under script control.
struct ScriptPins {
    active: [bool; 64],
}

impl ScriptPins {
    fn new() -> Self {
        Self {
            active: [false; 64],
        }
    }
}

impl PinReader for ScriptPins {
    fn is_active(&self, pin: u8) -> bool {
        self.active.get(pin as usize).copied().unwrap_or(false)
    }
}

/// Prints every HID call as the sim host would see it.
struct PrintSink;

impl HidSink for PrintSink {
    fn press(&mut self, code: u8, modifiers: &[u8]) {
        println!("press   {}", describe_key(code, modifiers));
    }

    fn release(&mut self, code: u8) {
        println!("release {}", describe_code(code));
    }
}

fn parse_position(kind: InputKind, word: &str) -> Result<u8> {
    let position = match (kind, word) {
        (InputKind::Button, "released" | "0") => 0,
        (InputKind::Button, "pressed" | "1") => 1,
        (InputKind::Toggle2Way, "up" | "0") => 0,
        (InputKind::Toggle2Way, "down" | "1") => 1,
        (InputKind::Toggle3Way, "up" | "0") => 0,
        (InputKind::Toggle3Way, "center" | "1") => 1,
        (InputKind::Toggle3Way, "down" | "2") => 2,
        _ => bail!("invalid position {word:?} for this switch"),
    };
    Ok(position)
}

/// Pin levels (a, b) that produce a given logical position.
fn pin_levels(kind: InputKind, position: u8) -> (bool, bool) {
    match kind {
        InputKind::Button => (position == 1, false),
        InputKind::Toggle2Way => (position == 0, false),
        InputKind::Toggle3Way => (position == 0, position == 2),
    }
}

pub fn run(script: &str) -> Result<()> {
    run_with(script, &mut PrintSink)
}

fn run_with(script: &str, sink: &mut impl HidSink) -> Result<()> {
    let mut predicates = config::predicates();
    let mut keys = config::virtual_keys();
    let mut inputs = config::physical_inputs();

    let mut panel = Panel::new(
        PredicateRegistry::new(&mut predicates),
        VirtualKeyRegistry::new(&mut keys),
        &mut inputs,
    )
    .map_err(|error| anyhow!("configuration error: {error}"))?;

    let mut pins = ScriptPins::new();
    let mut now_ms: u32 = 0;

    for (idx, raw_line) in script.lines().enumerate() {
        let lineno = idx + 1;
        let line = raw_line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap();
        match command {
            "set" => {
                let name = parts
                    .next()
                    .ok_or_else(|| anyhow!("line {lineno}: set needs an input name"))?;
                let word = parts
                    .next()
                    .ok_or_else(|| anyhow!("line {lineno}: set needs a position"))?;

                let (kind, pin_a, pin_b) = {
                    let input = panel
                        .inputs()
                        .iter()
                        .find(|input| input.name() == name)
                        .ok_or_else(|| anyhow!("line {lineno}: unknown input {name:?}"))?;
                    let (pin_a, pin_b) = input.pins();
                    (input.kind(), pin_a, pin_b)
                };

                let position =
                    parse_position(kind, word).with_context(|| format!("line {lineno}"))?;
                let (level_a, level_b) = pin_levels(kind, position);
                pins.active[pin_a as usize] = level_a;
                if let Some(pin_b) = pin_b {
                    pins.active[pin_b as usize] = level_b;
                }
            }
            "run" => {
                let ticks: u32 = parts
                    .next()
                    .ok_or_else(|| anyhow!("line {lineno}: run needs a tick count"))?
                    .parse()
                    .with_context(|| format!("line {lineno}: bad tick count"))?;
                for _ in 0..ticks {
                    panel
                        .tick(now_ms, &pins, sink)
                        .map_err(|error| anyhow!("dispatch error: {error}"))?;
                    now_ms = now_ms.wrapping_add(1);
                }
            }
            other => bail!("line {lineno}: unknown command {other:?}"),
        }

        if parts.next().is_some() {
            bail!("line {lineno}: trailing arguments");
        }
    }

    Ok(())
}
