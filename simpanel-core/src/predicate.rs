//! Named boolean mode flags ("predicates") gating virtual keys.

use crate::UnknownName;

/// A single mode flag. Every predicate starts out false.
pub struct Predicate {
    name: &'static str,
    state: bool,
}

impl Predicate {
    pub const fn new(name: &'static str) -> Self {
        Self { name, state: false }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Fixed table of predicates, looked up by linear scan.
///
/// The table stays well under ten entries, so a scan beats carrying a map.
pub struct PredicateRegistry<'a> {
    pub(crate) slots: &'a mut [Predicate],
}

impl<'a> PredicateRegistry<'a> {
    pub fn new(slots: &'a mut [Predicate]) -> Self {
        Self { slots }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.iter().any(|p| p.name == name)
    }

    pub fn get(&self, name: &'static str) -> Result<bool, UnknownName> {
        self.slots
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.state)
            .ok_or(UnknownName(name))
    }

    pub fn set(&mut self, name: &'static str, value: bool) -> Result<(), UnknownName> {
        let slot = self
            .slots
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or(UnknownName(name))?;
        slot.state = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set() {
        let mut slots = [Predicate::new("normal"), Predicate::new("combat")];
        let mut registry = PredicateRegistry::new(&mut slots);

        assert_eq!(registry.get("normal"), Ok(false));
        assert_eq!(registry.get("combat"), Ok(false));

        registry.set("combat", true).unwrap();
        assert_eq!(registry.get("combat"), Ok(true));
        assert_eq!(registry.get("normal"), Ok(false));

        registry.set("combat", false).unwrap();
        assert_eq!(registry.get("combat"), Ok(false));
    }

    #[test]
    fn test_unknown_name() {
        let mut slots = [Predicate::new("normal")];
        let mut registry = PredicateRegistry::new(&mut slots);

        assert_eq!(registry.get("warp"), Err(UnknownName("warp")));
        assert_eq!(registry.set("warp", true), Err(UnknownName("warp")));
        assert!(registry.contains("normal"));
        assert!(!registry.contains("warp"));
    }
}
