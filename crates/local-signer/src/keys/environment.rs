use std::collections::{BTreeMap, HashMap};

/// Read access to environment variables.
///
/// Handlers take this instead of calling `std::env` so tests can inject a map.
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment. Variables that are not valid Unicode are
/// treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}
