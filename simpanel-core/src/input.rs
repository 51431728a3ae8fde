//! Physical switch model: wiring, action bindings, runtime state.
//!
//! Every switch is a `PhysicalInput` built once at startup from the
//! configuration table. The runtime fields (debouncer, held key) are
//! mutated in place on every tick; nothing is ever reallocated.

use crate::debounce::Debouncer;

/// Reads the electrical level of a board pin. `true` means the switch
/// contact is closed (the pin is pulled low against its pull-up).
pub trait PinReader {
    fn is_active(&self, pin: u8) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Momentary push button: released = position 0, pressed = position 1.
    Button,
    /// 2-position toggle on one pin: up = position 0, down = position 1.
    Toggle2Way,
    /// 3-position toggle on two pins: up = 0, center = 1, down = 2.
    /// The center position leaves both contacts open.
    Toggle3Way,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Positions map to virtual key names to press and hold.
    SendKey,
    /// Positions map to predicate names to activate.
    SetPredicate,
}

/// Number of logical positions an input can report.
pub const MAX_POSITIONS: usize = 3;

pub struct PhysicalInput {
    name: &'static str,
    kind: InputKind,
    pin_a: u8,
    pin_b: Option<u8>,
    mode: InputMode,
    /// Per-position action: a virtual key name in `SendKey` mode, a
    /// predicate name in `SetPredicate` mode. Unmapped slots are no-ops.
    actions: [Option<&'static str>; MAX_POSITIONS],
    pub(crate) debouncer: Debouncer,
    /// Virtual key held on behalf of this input, by name.
    pub(crate) held: Option<&'static str>,
}

impl PhysicalInput {
    const fn raw(
        name: &'static str,
        kind: InputKind,
        pin_a: u8,
        pin_b: Option<u8>,
        mode: InputMode,
        actions: [Option<&'static str>; MAX_POSITIONS],
    ) -> Self {
        Self {
            name,
            kind,
            pin_a,
            pin_b,
            mode,
            actions,
            debouncer: Debouncer::new(),
            held: None,
        }
    }

    /// Momentary button sending a key while pressed. The released
    /// position is deliberately unmapped: letting go only releases the
    /// held key.
    pub const fn button(name: &'static str, pin: u8, key: &'static str) -> Self {
        Self::raw(
            name,
            InputKind::Button,
            pin,
            None,
            InputMode::SendKey,
            [None, Some(key), None],
        )
    }

    /// 2-way toggle holding one of two keys.
    pub const fn toggle_2way(
        name: &'static str,
        pin: u8,
        key_up: &'static str,
        key_down: &'static str,
    ) -> Self {
        Self::raw(
            name,
            InputKind::Toggle2Way,
            pin,
            None,
            InputMode::SendKey,
            [Some(key_up), Some(key_down), None],
        )
    }

    /// 3-way toggle holding up to three keys; `key_center` is usually
    /// `None`.
    pub const fn toggle_3way(
        name: &'static str,
        pin_a: u8,
        pin_b: u8,
        key_up: &'static str,
        key_center: Option<&'static str>,
        key_down: &'static str,
    ) -> Self {
        Self::raw(
            name,
            InputKind::Toggle3Way,
            pin_a,
            Some(pin_b),
            InputMode::SendKey,
            [Some(key_up), key_center, Some(key_down)],
        )
    }

    /// 2-way toggle selecting between two predicates.
    pub const fn mode_toggle_2way(
        name: &'static str,
        pin: u8,
        predicate_up: &'static str,
        predicate_down: &'static str,
    ) -> Self {
        Self::raw(
            name,
            InputKind::Toggle2Way,
            pin,
            None,
            InputMode::SetPredicate,
            [Some(predicate_up), Some(predicate_down), None],
        )
    }

    /// 3-way toggle selecting between up to three predicates.
    pub const fn mode_toggle_3way(
        name: &'static str,
        pin_a: u8,
        pin_b: u8,
        predicate_up: &'static str,
        predicate_center: Option<&'static str>,
        predicate_down: &'static str,
    ) -> Self {
        Self::raw(
            name,
            InputKind::Toggle3Way,
            pin_a,
            Some(pin_b),
            InputMode::SetPredicate,
            [Some(predicate_up), predicate_center, Some(predicate_down)],
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> InputKind {
        self.kind
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn pins(&self) -> (u8, Option<u8>) {
        (self.pin_a, self.pin_b)
    }

    pub fn action(&self, position: u8) -> Option<&'static str> {
        self.actions
            .get(position as usize)
            .copied()
            .flatten()
    }

    pub fn actions(&self) -> &[Option<&'static str>; MAX_POSITIONS] {
        &self.actions
    }

    /// The virtual key currently held on behalf of this input.
    pub fn held(&self) -> Option<&'static str> {
        self.held
    }

    /// Decode the current pin levels into a raw position.
    ///
    /// Returns `None` for the invalid dual-assert state of a 3-way
    /// toggle, which the debouncer treats as "no change".
    pub fn sample(&self, pins: &impl PinReader) -> Option<u8> {
        let a = pins.is_active(self.pin_a);
        match self.kind {
            InputKind::Button => Some(if a { 1 } else { 0 }),
            InputKind::Toggle2Way => Some(if a { 0 } else { 1 }),
            InputKind::Toggle3Way => {
                let b = match self.pin_b {
                    Some(pin) => pins.is_active(pin),
                    None => false,
                };
                match (a, b) {
                    (true, false) => Some(0),
                    (false, false) => Some(1),
                    (false, true) => Some(2),
                    // Both contacts asserted: electrically impossible on
                    // a healthy switch, so never a position change.
                    (true, true) => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedPins {
        active: [bool; 4],
    }

    impl PinReader for FixedPins {
        fn is_active(&self, pin: u8) -> bool {
            self.active[pin as usize]
        }
    }

    #[test]
    fn test_button_decoding() {
        let input = PhysicalInput::button("boost", 0, "boost");
        let mut pins = FixedPins { active: [false; 4] };

        assert_eq!(input.sample(&pins), Some(0));
        pins.active[0] = true;
        assert_eq!(input.sample(&pins), Some(1));
        assert_eq!(input.action(0), None);
        assert_eq!(input.action(1), Some("boost"));
    }

    #[test]
    fn test_toggle_2way_decoding() {
        let input = PhysicalInput::toggle_2way("power", 1, "power_on", "power_off");
        let mut pins = FixedPins { active: [false; 4] };

        assert_eq!(input.sample(&pins), Some(1));
        pins.active[1] = true;
        assert_eq!(input.sample(&pins), Some(0));
        assert_eq!(input.action(0), Some("power_on"));
        assert_eq!(input.action(1), Some("power_off"));
    }

    #[test]
    fn test_toggle_3way_decoding() {
        let input = PhysicalInput::toggle_3way("flaps", 2, 3, "flaps_up", None, "flaps_down");
        let mut pins = FixedPins { active: [false; 4] };

        assert_eq!(input.sample(&pins), Some(1)); // center
        pins.active[2] = true;
        assert_eq!(input.sample(&pins), Some(0)); // up
        pins.active[3] = true;
        assert_eq!(input.sample(&pins), None); // dual assert: invalid
        pins.active[2] = false;
        assert_eq!(input.sample(&pins), Some(2)); // down

        assert_eq!(input.action(1), None);
        assert_eq!(input.action(2), Some("flaps_down"));
    }
}
