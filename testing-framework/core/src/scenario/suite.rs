use std::{collections::BTreeMap, sync::Arc};

use super::GeckoTest;

/// Named collection of tests, ordered by name.
#[derive(Clone, Default)]
pub struct GeckoTestSuite {
    tests: BTreeMap<String, Arc<dyn GeckoTest>>,
}

impl GeckoTestSuite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_test(mut self, name: impl Into<String>, test: impl GeckoTest + 'static) -> Self {
        self.add_test(name, test);
        self
    }

    /// Registers `test` under `name`, replacing any test already there.
    pub fn add_test(&mut self, name: impl Into<String>, test: impl GeckoTest + 'static) {
        self.tests.insert(name.into(), Arc::new(test));
    }

    #[must_use]
    pub fn test(&self, name: &str) -> Option<Arc<dyn GeckoTest>> {
        self.tests.get(name).cloned()
    }

    pub fn tests(&self) -> impl Iterator<Item = (&str, &Arc<dyn GeckoTest>)> {
        self.tests.iter().map(|(name, test)| (name.as_str(), test))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
