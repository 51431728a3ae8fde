//! Render the panel binding tables as text.

use simpanel_core::config;
use simpanel_core::input::{InputKind, InputMode, PhysicalInput};
use simpanel_core::keycode;

/// Human-readable form of a logical key code.
pub fn describe_code(code: u8) -> String {
    if let Some(name) = keycode::display_name(code) {
        return name.to_string();
    }
    if (0x20..=0x7E).contains(&code) {
        return format!("'{}'", code as char);
    }
    format!("0x{code:02X}")
}

/// Key code plus its modifier set, e.g. `alt+'p'`.
pub fn describe_key(code: u8, modifiers: &[u8]) -> String {
    let mut out = String::new();
    for &modifier in modifiers {
        out.push_str(&describe_code(modifier));
        out.push('+');
    }
    out.push_str(&describe_code(code));
    out
}

fn kind_label(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Button => "button",
        InputKind::Toggle2Way => "2-way toggle",
        InputKind::Toggle3Way => "3-way toggle",
    }
}

/// Label of a logical position for a given switch kind.
pub fn position_label(kind: InputKind, position: u8) -> &'static str {
    match (kind, position) {
        (InputKind::Button, 0) => "released",
        (InputKind::Button, 1) => "pressed",
        (InputKind::Toggle3Way, 1) => "center",
        (InputKind::Toggle3Way, 2) => "down",
        (_, 0) => "up",
        (_, 1) => "down",
        _ => "?",
    }
}

fn render_input(out: &mut String, input: &PhysicalInput) {
    let (pin_a, pin_b) = input.pins();
    let pins = match pin_b {
        Some(pin_b) => format!("pins {pin_a},{pin_b}"),
        None => format!("pin {pin_a}"),
    };

    let mut actions = String::new();
    for (position, action) in input.actions().iter().enumerate() {
        let Some(action) = action else { continue };
        if !actions.is_empty() {
            actions.push_str(", ");
        }
        actions.push_str(position_label(input.kind(), position as u8));
        actions.push_str(" -> ");
        actions.push_str(action);
    }

    let mode = match input.mode() {
        InputMode::SendKey => "",
        InputMode::SetPredicate => "mode: ",
    };

    out.push_str(&format!(
        "  {:<12} {:<13} {:<9} {}{}\n",
        input.name(),
        kind_label(input.kind()),
        pins,
        mode,
        actions
    ));
}

/// Render every table the way `config.rs` defines it.
pub fn render() -> String {
    let mut out = String::new();

    out.push_str("predicates:\n");
    for predicate in config::predicates() {
        out.push_str(&format!("  {}\n", predicate.name()));
    }

    out.push_str("\nvirtual keys:\n");
    for key in config::virtual_keys() {
        let guard = match key.guard() {
            Some(guard) => format!("  when {guard}"),
            None => String::new(),
        };
        out.push_str(&format!(
            "  {:<15} {}{}\n",
            key.name(),
            describe_key(key.code(), key.modifiers()),
            guard
        ));
    }

    out.push_str("\ninputs:\n");
    for input in config::physical_inputs() {
        render_input(&mut out, &input);
    }

    out
}
