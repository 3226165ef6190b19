//! Applying resolved hotfixes.
//!
//! Nothing here returns an error. A hotfix that cannot be resolved is the same
//! as no hotfix at all.

use std::collections::BTreeMap;

use super::{BrokenFeature, Hotfixes, StyleTarget, inject_style_patch};

/// Option key that enables or disables a feature.
pub fn feature_option_key(feature_id: &str) -> String {
    format!("feature:{feature_id}")
}

impl Hotfixes {
    /// Features still broken in the running build; empty for development builds.
    pub async fn local_hotfixes(&self) -> Vec<BrokenFeature> {
        if self.environment().is_development() {
            return Vec::new();
        }

        match self.broken_features().get(()).await {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!(error = %e, "failed to resolve broken features");
                Vec::new()
            }
        }
    }

    /// Options that force-disable every feature known to be broken.
    pub async fn feature_overrides(&self) -> BTreeMap<String, bool> {
        self.local_hotfixes()
            .await
            .iter()
            .map(|feature| (feature_option_key(&feature.feature_id), false))
            .collect()
    }

    /// CSS patch for the running version, or an empty string.
    pub async fn style_patch(&self) -> String {
        match self.style().get(self.environment().version.clone()).await {
            Ok(css) => css,
            Err(e) => {
                tracing::warn!(error = %e, "failed to resolve style hotfix");
                String::new()
            }
        }
    }

    /// The style patch that applies to this build.
    ///
    /// Development and enterprise builds skip resolution entirely and get an
    /// empty patch.
    pub async fn active_style_patch(&self) -> String {
        let env = self.environment();
        if env.is_development() || env.enterprise {
            return String::new();
        }

        self.style_patch().await
    }

    /// Resolve the style patch and inject it into `target`.
    pub async fn apply_style_hotfixes<S: StyleTarget + ?Sized>(&self, target: &mut S) -> bool {
        let css = self.active_style_patch().await;
        inject_style_patch(target, self.environment(), &css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotfix::{Environment, HotfixPolicies, HtmlPage};
    use crate::testing::StubSource;
    use hotfix_core::CacheDb;
    use std::sync::Arc;

    const FEATURES_CSV: &str = "featureID,issue,unaffected\nfoo,123,2.0.0\nbar,456,\n";

    async fn hotfixes(source: Arc<StubSource>, env: Environment) -> Hotfixes {
        let db = CacheDb::open_in_memory().await.unwrap();
        Hotfixes::new(source, db, env, HotfixPolicies::default())
    }

    #[tokio::test]
    async fn test_feature_overrides() {
        let source = Arc::new(StubSource::new().with("broken-features.csv", FEATURES_CSV));
        let hotfixes = hotfixes(source, Environment::new("1.5.0")).await;

        let overrides = hotfixes.feature_overrides().await;
        assert_eq!(
            overrides,
            BTreeMap::from([("feature:bar".to_string(), false), ("feature:foo".to_string(), false)])
        );
    }

    #[tokio::test]
    async fn test_feature_overrides_after_fix_shipped() {
        let source = Arc::new(StubSource::new().with("broken-features.csv", FEATURES_CSV));
        let hotfixes = hotfixes(source, Environment::new("2.1.0")).await;

        let overrides = hotfixes.feature_overrides().await;
        assert_eq!(overrides.keys().collect::<Vec<_>>(), vec!["feature:bar"]);
    }

    #[tokio::test]
    async fn test_development_build_has_no_overrides() {
        let source = Arc::new(StubSource::new().with("broken-features.csv", FEATURES_CSV));
        let hotfixes = hotfixes(Arc::clone(&source), Environment::new("0.0.0")).await;

        assert!(hotfixes.feature_overrides().await.is_empty());
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_no_overrides() {
        let source = Arc::new(StubSource::new().failing("broken-features.csv"));
        let hotfixes = hotfixes(source, Environment::new("1.5.0")).await;

        assert!(hotfixes.feature_overrides().await.is_empty());
    }

    #[tokio::test]
    async fn test_apply_style_hotfixes() {
        let source = Arc::new(StubSource::new().with("style/1.5.0.css", ".broken{display:none}"));
        let hotfixes = hotfixes(source, Environment::new("1.5.0")).await;
        let mut page = HtmlPage::new("<body><div></div></body>");

        assert!(hotfixes.apply_style_hotfixes(&mut page).await);
        assert_eq!(page.as_str(), "<body><style>.broken{display:none}</style><div></div></body>");
    }

    #[tokio::test]
    async fn test_apply_style_enterprise_skips_fetch() {
        let source = Arc::new(StubSource::new().with("style/1.5.0.css", ".broken{display:none}"));
        let env = Environment { enterprise: true, ..Environment::new("1.5.0") };
        let hotfixes = hotfixes(Arc::clone(&source), env).await;
        let mut page = HtmlPage::new("<body></body>");

        assert!(!hotfixes.apply_style_hotfixes(&mut page).await);
        assert_eq!(page.as_str(), "<body></body>");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_active_style_patch_development_is_empty() {
        let source = Arc::new(StubSource::new().with("style/0.0.0.css", "a{}"));
        let hotfixes = hotfixes(Arc::clone(&source), Environment::new("0.0.0")).await;

        assert_eq!(hotfixes.active_style_patch().await, "");
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_apply_style_failure_is_noop() {
        let source = Arc::new(StubSource::new().failing("style/1.5.0.css"));
        let hotfixes = hotfixes(source, Environment::new("1.5.0")).await;
        let mut page = HtmlPage::new("<body></body>");

        assert!(!hotfixes.apply_style_hotfixes(&mut page).await);
        assert_eq!(page.as_str(), "<body></body>");
    }
}
