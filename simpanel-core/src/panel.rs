//! Panel driver: startup validation, per-tick sampling and dispatch.

use core::fmt;

use crate::input::{InputKind, InputMode, PhysicalInput, PinReader};
use crate::predicate::PredicateRegistry;
use crate::vkey::{HidSink, VirtualKeyRegistry};
use crate::UnknownName;

/// A fatal misconfiguration, caught before the tick loop may start.
///
/// A panel with broken bindings must not run: every variant here halts
/// the firmware during startup instead of surfacing mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    DuplicatePredicate(&'static str),
    DuplicateKey(&'static str),
    DuplicateInput(&'static str),
    /// A virtual key's guard names a predicate that does not exist.
    UnknownGuard {
        key: &'static str,
        predicate: &'static str,
    },
    /// A send-key input position names a virtual key that does not exist.
    UnknownKey {
        input: &'static str,
        key: &'static str,
    },
    /// A set-predicate input position names a predicate that does not
    /// exist.
    UnknownPredicate {
        input: &'static str,
        predicate: &'static str,
    },
    /// A 3-way toggle needs two pins to tell its positions apart.
    MissingSecondPin(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::DuplicatePredicate(name) => {
                write!(f, "duplicate predicate {name:?}")
            }
            ConfigError::DuplicateKey(name) => write!(f, "duplicate virtual key {name:?}"),
            ConfigError::DuplicateInput(name) => write!(f, "duplicate input {name:?}"),
            ConfigError::UnknownGuard { key, predicate } => {
                write!(f, "virtual key {key:?} is guarded by unknown predicate {predicate:?}")
            }
            ConfigError::UnknownKey { input, key } => {
                write!(f, "input {input:?} references unknown virtual key {key:?}")
            }
            ConfigError::UnknownPredicate { input, predicate } => {
                write!(f, "input {input:?} references unknown predicate {predicate:?}")
            }
            ConfigError::MissingSecondPin(name) => {
                write!(f, "3-way toggle {name:?} is missing its second pin")
            }
        }
    }
}

/// The whole panel: both registries plus the input list, processed in
/// configuration order every tick.
pub struct Panel<'a> {
    predicates: PredicateRegistry<'a>,
    keys: VirtualKeyRegistry<'a>,
    inputs: &'a mut [PhysicalInput],
}

impl<'a> Panel<'a> {
    /// Build the panel, running the full validation pass first.
    pub fn new(
        predicates: PredicateRegistry<'a>,
        keys: VirtualKeyRegistry<'a>,
        inputs: &'a mut [PhysicalInput],
    ) -> Result<Self, ConfigError> {
        validate(&predicates, &keys, inputs)?;
        Ok(Self {
            predicates,
            keys,
            inputs,
        })
    }

    pub fn inputs(&self) -> &[PhysicalInput] {
        self.inputs
    }

    pub fn predicates(&self) -> &PredicateRegistry<'a> {
        &self.predicates
    }

    /// One polling pass: sample every input in configuration order and
    /// dispatch any position that stabilized this tick.
    ///
    /// Never fails after a successful validation pass; the `Err` arm
    /// exists so a name-resolution bug cannot pass silently.
    pub fn tick<P: PinReader, S: HidSink>(
        &mut self,
        now_ms: u32,
        pins: &P,
        sink: &mut S,
    ) -> Result<(), UnknownName> {
        let Self {
            predicates,
            keys,
            inputs,
        } = self;

        for input in inputs.iter_mut() {
            let raw = input.sample(pins);
            if let Some(position) = input.debouncer.update(raw, now_ms) {
                dispatch(input, position, predicates, keys, sink)?;
            }
        }
        Ok(())
    }
}

/// React to a freshly stabilized position on one input.
fn dispatch(
    input: &mut PhysicalInput,
    position: u8,
    predicates: &mut PredicateRegistry<'_>,
    keys: &mut VirtualKeyRegistry<'_>,
    sink: &mut dyn HidSink,
) -> Result<(), UnknownName> {
    let target = input.action(position);

    match input.mode() {
        InputMode::SendKey => {
            // Let go of the previous position's key first, so a shared
            // hardware key code is never double-held.
            if let Some(held) = input.held {
                if target != Some(held) {
                    keys.release(held, sink)?;
                    input.held = None;
                }
            }
            if let Some(name) = target {
                if input.held != Some(name) {
                    keys.press(name, predicates, sink)?;
                    // Recorded even when the press was gated off, so the
                    // eventual release still reaches the key.
                    input.held = Some(name);
                }
            }
        }
        InputMode::SetPredicate => {
            if let Some(name) = target {
                predicates.set(name, true)?;
                // Positions of one mode switch are mutually exclusive:
                // entering one clears every other predicate the same
                // switch references.
                for &other in input.actions().iter().flatten() {
                    if other != name {
                        predicates.set(other, false)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn validate(
    predicates: &PredicateRegistry<'_>,
    keys: &VirtualKeyRegistry<'_>,
    inputs: &[PhysicalInput],
) -> Result<(), ConfigError> {
    for (i, predicate) in predicates.slots.iter().enumerate() {
        if predicates.slots[..i]
            .iter()
            .any(|p| p.name() == predicate.name())
        {
            return Err(ConfigError::DuplicatePredicate(predicate.name()));
        }
    }

    for (i, key) in keys.slots.iter().enumerate() {
        if keys.slots[..i].iter().any(|k| k.name() == key.name()) {
            return Err(ConfigError::DuplicateKey(key.name()));
        }
        if let Some(guard) = key.guard() {
            if !predicates.contains(guard) {
                return Err(ConfigError::UnknownGuard {
                    key: key.name(),
                    predicate: guard,
                });
            }
        }
    }

    for (i, input) in inputs.iter().enumerate() {
        if inputs[..i].iter().any(|other| other.name() == input.name()) {
            return Err(ConfigError::DuplicateInput(input.name()));
        }
        if input.kind() == InputKind::Toggle3Way && input.pins().1.is_none() {
            return Err(ConfigError::MissingSecondPin(input.name()));
        }
        for &action in input.actions().iter().flatten() {
            match input.mode() {
                InputMode::SendKey => {
                    if !keys.contains(action) {
                        return Err(ConfigError::UnknownKey {
                            input: input.name(),
                            key: action,
                        });
                    }
                }
                InputMode::SetPredicate => {
                    if !predicates.contains(action) {
                        return Err(ConfigError::UnknownPredicate {
                            input: input.name(),
                            predicate: action,
                        });
                    }
                }
            }
        }
    }

    Ok(())
}
