//! Logical keyboard actions and the registry that drives the HID sink.

use crate::keycode::MOD_NONE;
use crate::predicate::PredicateRegistry;
use crate::UnknownName;

/// Receives the actual key events. Implemented by the USB keyboard in the
/// firmware and by printing/recording sinks on the host.
pub trait HidSink {
    fn press(&mut self, code: u8, modifiers: &[u8]);
    fn release(&mut self, code: u8);
}

/// A named keyboard action: key code, modifier set, optional guard.
///
/// A guarded key only fires while its predicate is true. This is how a
/// physically wired switch is made inert outside the right mode.
pub struct VirtualKey {
    name: &'static str,
    code: u8,
    modifiers: [u8; 3],
    guard: Option<&'static str>,
    held: bool,
}

impl VirtualKey {
    pub const fn new(name: &'static str, code: u8) -> Self {
        Self {
            name,
            code,
            modifiers: MOD_NONE,
            guard: None,
            held: false,
        }
    }

    pub const fn with_modifiers(mut self, modifiers: [u8; 3]) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub const fn guarded_by(mut self, predicate: &'static str) -> Self {
        self.guard = Some(predicate);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn code(&self) -> u8 {
        self.code
    }

    /// The configured modifiers, zero padding stripped.
    pub fn modifiers(&self) -> &[u8] {
        let n = self
            .modifiers
            .iter()
            .position(|&m| m == 0)
            .unwrap_or(self.modifiers.len());
        &self.modifiers[..n]
    }

    pub fn guard(&self) -> Option<&'static str> {
        self.guard
    }

    /// Whether a press has been delivered to the sink without a matching
    /// release yet.
    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Fixed table of virtual keys, looked up by linear scan.
pub struct VirtualKeyRegistry<'a> {
    pub(crate) slots: &'a mut [VirtualKey],
}

impl<'a> VirtualKeyRegistry<'a> {
    pub fn new(slots: &'a mut [VirtualKey]) -> Self {
        Self { slots }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|k| k.name == name)
    }

    fn find(&self, name: &'static str) -> Result<usize, UnknownName> {
        self.slots
            .iter()
            .position(|k| k.name == name)
            .ok_or(UnknownName(name))
    }

    /// Press a key. A false guard predicate makes this a silent no-op, as
    /// does pressing a key that is already held.
    pub fn press(
        &mut self,
        name: &'static str,
        predicates: &PredicateRegistry<'_>,
        sink: &mut dyn HidSink,
    ) -> Result<(), UnknownName> {
        let idx = self.find(name)?;
        if let Some(guard) = self.slots[idx].guard {
            if !predicates.get(guard)? {
                return Ok(());
            }
        }
        let key = &mut self.slots[idx];
        if !key.held {
            sink.press(key.code, key.modifiers());
            key.held = true;
        }
        Ok(())
    }

    /// Release a key. Safe to call speculatively: releasing a key that is
    /// not held is a no-op. The guard is deliberately not consulted here,
    /// so a key pressed while its predicate was true is still released
    /// after the predicate flips (no stuck keys across a mode change).
    pub fn release(
        &mut self,
        name: &'static str,
        sink: &mut dyn HidSink,
    ) -> Result<(), UnknownName> {
        let idx = self.find(name)?;
        let key = &mut self.slots[idx];
        if key.held {
            sink.release(key.code);
            key.held = false;
        }
        Ok(())
    }

    pub fn is_held(&self, name: &'static str) -> Result<bool, UnknownName> {
        Ok(self.slots[self.find(name)?].held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::{KEY_LEFT_ALT, MOD_ALT};
    use crate::predicate::Predicate;
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Press(u8, Vec<u8>),
        Release(u8),
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<Event>,
    }

    impl HidSink for Recorder {
        fn press(&mut self, code: u8, modifiers: &[u8]) {
            self.events.push(Event::Press(code, modifiers.to_vec()));
        }

        fn release(&mut self, code: u8) {
            self.events.push(Event::Release(code));
        }
    }

    fn preds(slots: &mut [Predicate]) -> PredicateRegistry<'_> {
        PredicateRegistry::new(slots)
    }

    #[test]
    fn test_press_and_release() {
        let mut pred_slots: [Predicate; 0] = [];
        let predicates = preds(&mut pred_slots);
        let mut key_slots = [VirtualKey::new("power_off", b'p').with_modifiers(MOD_ALT)];
        let mut keys = VirtualKeyRegistry::new(&mut key_slots);
        let mut sink = Recorder::default();

        keys.press("power_off", &predicates, &mut sink).unwrap();
        assert_eq!(keys.is_held("power_off"), Ok(true));
        keys.release("power_off", &mut sink).unwrap();
        assert_eq!(keys.is_held("power_off"), Ok(false));

        assert_eq!(
            sink.events,
            [
                Event::Press(b'p', [KEY_LEFT_ALT].to_vec()),
                Event::Release(b'p'),
            ]
        );
    }

    #[test]
    fn test_press_is_idempotent_while_held() {
        let mut pred_slots: [Predicate; 0] = [];
        let predicates = preds(&mut pred_slots);
        let mut key_slots = [VirtualKey::new("boost", b'b')];
        let mut keys = VirtualKeyRegistry::new(&mut key_slots);
        let mut sink = Recorder::default();

        keys.press("boost", &predicates, &mut sink).unwrap();
        keys.press("boost", &predicates, &mut sink).unwrap();
        assert_eq!(sink.events, [Event::Press(b'b', Vec::new())]);
    }

    #[test]
    fn test_release_not_held_is_noop() {
        let mut key_slots = [VirtualKey::new("boost", b'b')];
        let mut keys = VirtualKeyRegistry::new(&mut key_slots);
        let mut sink = Recorder::default();

        keys.release("boost", &mut sink).unwrap();
        keys.release("boost", &mut sink).unwrap();
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_guard_gates_press_only() {
        let mut pred_slots = [Predicate::new("combat")];
        let mut predicates = preds(&mut pred_slots);
        let mut key_slots = [VirtualKey::new("eject", b'e').guarded_by("combat")];
        let mut keys = VirtualKeyRegistry::new(&mut key_slots);
        let mut sink = Recorder::default();

        // Gated: no event, not held.
        keys.press("eject", &predicates, &mut sink).unwrap();
        assert!(sink.events.is_empty());
        assert_eq!(keys.is_held("eject"), Ok(false));

        // Ungated press goes through.
        predicates.set("combat", true).unwrap();
        keys.press("eject", &predicates, &mut sink).unwrap();
        assert_eq!(sink.events, [Event::Press(b'e', Vec::new())]);

        // Predicate flips back while held: release is still delivered.
        predicates.set("combat", false).unwrap();
        keys.release("eject", &mut sink).unwrap();
        assert_eq!(
            sink.events,
            [Event::Press(b'e', Vec::new()), Event::Release(b'e')]
        );
    }

    #[test]
    fn test_unknown_key() {
        let mut pred_slots: [Predicate; 0] = [];
        let predicates = preds(&mut pred_slots);
        let mut key_slots: [VirtualKey; 0] = [];
        let mut keys = VirtualKeyRegistry::new(&mut key_slots);
        let mut sink = Recorder::default();

        assert_eq!(
            keys.press("warp", &predicates, &mut sink),
            Err(UnknownName("warp"))
        );
        assert_eq!(keys.release("warp", &mut sink), Err(UnknownName("warp")));
    }
}
