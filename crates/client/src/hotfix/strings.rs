//! Synchronous string lookups backed by the `strings-hotfixes` table.
//!
//! The table starts empty, is filled once by [`LocalStrings::preload`], and is
//! read synchronously afterwards. Lookups before preload completes return
//! their input unchanged.

use std::borrow::Cow;
use std::sync::{Arc, PoisonError, RwLock};

use super::{Hotfixes, StringTable};

/// Process-wide string replacement table with an explicit lifecycle.
#[derive(Debug, Default)]
pub struct LocalStrings {
    table: RwLock<Arc<StringTable>>,
}

impl LocalStrings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the resolved table. No-op for development and enterprise builds.
    ///
    /// Resolution failures keep the current table. Returns the number of
    /// replacements now loaded.
    pub async fn preload(&self, hotfixes: &Hotfixes) -> usize {
        let env = hotfixes.environment();
        if env.is_development() || env.enterprise {
            return self.len();
        }

        match hotfixes.strings().get(()).await {
            Ok(table) => {
                let count = table.len();
                self.replace(table);
                tracing::debug!(count, "string hotfixes loaded");
                count
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load string hotfixes");
                self.len()
            }
        }
    }

    /// Replace the whole table.
    pub fn replace(&self, table: StringTable) {
        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);
    }

    /// The replacement for `text`, or `text` itself.
    pub fn lookup<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let table = Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner));
        match table.get(text) {
            Some(replacement) => Cow::Owned(replacement.clone()),
            None => Cow::Borrowed(text),
        }
    }

    pub fn len(&self) -> usize {
        self.table.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every replacement, returning to the identity mapping.
    pub fn reset(&self) {
        self.replace(StringTable::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotfix::{Environment, HotfixPolicies};
    use crate::testing::StubSource;
    use hotfix_core::CacheDb;

    async fn hotfixes(source: StubSource, env: Environment) -> Hotfixes {
        let db = CacheDb::open_in_memory().await.unwrap();
        Hotfixes::new(Arc::new(source), db, env, HotfixPolicies::default())
    }

    #[tokio::test]
    async fn test_lookup_before_and_after_preload() {
        let strings = LocalStrings::new();
        let hotfixes = hotfixes(StubSource::new().with("strings.json", r#"{"Hello":"Hi"}"#), Environment::new("1.0.0")).await;

        assert_eq!(strings.lookup("Hello"), "Hello");

        assert_eq!(strings.preload(&hotfixes).await, 1);
        assert_eq!(strings.lookup("Hello"), "Hi");
        assert_eq!(strings.lookup("Goodbye"), "Goodbye");
    }

    #[tokio::test]
    async fn test_preload_skipped_for_enterprise() {
        let strings = LocalStrings::new();
        let env = Environment { enterprise: true, ..Environment::new("1.0.0") };
        let hotfixes = hotfixes(StubSource::new().with("strings.json", r#"{"Hello":"Hi"}"#), env).await;

        assert_eq!(strings.preload(&hotfixes).await, 0);
        assert_eq!(strings.lookup("Hello"), "Hello");
    }

    #[tokio::test]
    async fn test_preload_skipped_for_development() {
        let strings = LocalStrings::new();
        let hotfixes = hotfixes(StubSource::new().with("strings.json", r#"{"Hello":"Hi"}"#), Environment::new("0.0.0")).await;

        strings.preload(&hotfixes).await;
        assert!(strings.is_empty());
    }

    #[tokio::test]
    async fn test_preload_failure_degrades_to_identity() {
        let strings = LocalStrings::new();
        let hotfixes = hotfixes(StubSource::new().failing("strings.json"), Environment::new("1.0.0")).await;

        assert_eq!(strings.preload(&hotfixes).await, 0);
        assert_eq!(strings.lookup("Hello"), "Hello");
    }

    #[test]
    fn test_reset() {
        let strings = LocalStrings::new();
        strings.replace(StringTable::from([("Hello".to_string(), "Hi".to_string())]));
        assert_eq!(strings.len(), 1);

        strings.reset();
        assert!(strings.is_empty());
        assert_eq!(strings.lookup("Hello"), "Hello");
    }
}
