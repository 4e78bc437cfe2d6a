//! Remote target resolution
//!
//! A remote target is either a full URI (`https://host/path?query`) or just a
//! query suffix that is appended to the live-reload base URL.

use std::sync::Arc;

use pp_core::config::{LiveReloadConfig, SessionConfig};
use pp_core::error::ConfigError;
use pp_core::traits::{ClientFactory, RemoteSessionClient};
use pp_core::ResolvedTarget;

const SCHEME_DELIMITER: &str = "://";

/// Resolve base URL, credentials and query string for a session
pub fn resolve_target(
    config: &SessionConfig,
    live_reload: &LiveReloadConfig,
) -> Result<ResolvedTarget, ConfigError> {
    let remote = config.remote.as_deref().unwrap_or("");

    let (base_url, query_string) = if remote.contains(SCHEME_DELIMITER) {
        match remote.split_once('?') {
            Some((base, query)) => (base.to_string(), query.to_string()),
            None => (remote.to_string(), String::new()),
        }
    } else {
        let base = live_reload
            .url
            .clone()
            .ok_or_else(|| ConfigError::MissingBaseUrl(remote.to_string()))?;
        (base, remote.to_string())
    };

    let credentials = config
        .credentials
        .clone()
        .or_else(|| live_reload.password.clone());

    Ok(ResolvedTarget {
        base_url,
        credentials,
        query_string,
    })
}

/// Builds a fresh remote client for each operation
pub struct ClientResolver {
    live_reload: LiveReloadConfig,
    factory: Arc<dyn ClientFactory>,
}

impl ClientResolver {
    /// Create a resolver over the ambient live-reload settings
    pub fn new(live_reload: LiveReloadConfig, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            live_reload,
            factory,
        }
    }

    /// Resolve the target and build a client.
    ///
    /// Returns `None` after logging a warning when the target cannot be
    /// resolved; no client is constructed in that case.
    pub fn client(&self, config: &SessionConfig) -> Option<Arc<dyn RemoteSessionClient>> {
        match resolve_target(config, &self.live_reload) {
            Ok(target) => {
                tracing::debug!(
                    "Resolved remote playpen at {} (query: {:?})",
                    target.base_url,
                    target.query_string
                );
                Some(self.factory.create_client(&target))
            }
            Err(e) => {
                tracing::warn!("Cannot create remote playpen client: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{LogCapture, RecordingFactory, ScriptedClient};
    use pp_core::config::Secret;
    use tracing::Level;

    fn live_reload(url: Option<&str>, password: Option<&str>) -> LiveReloadConfig {
        LiveReloadConfig {
            url: url.map(str::to_string),
            password: password.map(Secret::from),
        }
    }

    #[test]
    fn test_full_uri_splits_at_first_question_mark() {
        let config = SessionConfig::remote("https://host/x?team=a&next=b?c");
        let target = resolve_target(&config, &LiveReloadConfig::default()).unwrap();
        assert_eq!(target.base_url, "https://host/x");
        assert_eq!(target.query_string, "team=a&next=b?c");
    }

    #[test]
    fn test_full_uri_without_query() {
        let config = SessionConfig::remote("https://host/x");
        let target = resolve_target(&config, &live_reload(Some("https://ignored"), None)).unwrap();
        assert_eq!(target.base_url, "https://host/x");
        assert_eq!(target.query_string, "");
    }

    #[test]
    fn test_query_suffix_uses_live_reload_url() {
        let config = SessionConfig::remote("team=a");
        let target =
            resolve_target(&config, &live_reload(Some("https://live.example.com"), None)).unwrap();
        assert_eq!(target.base_url, "https://live.example.com");
        assert_eq!(target.query_string, "team=a");
    }

    #[test]
    fn test_query_suffix_without_live_reload_url() {
        let config = SessionConfig::remote("team=a");
        let err = resolve_target(&config, &LiveReloadConfig::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingBaseUrl(ref t) if t == "team=a"));
    }

    #[test]
    fn test_credentials_fall_back_to_live_reload_password() {
        let config = SessionConfig::remote("team=a");
        let target = resolve_target(
            &config,
            &live_reload(Some("https://live"), Some("fallback")),
        )
        .unwrap();
        assert_eq!(target.credentials, Some(Secret::from("fallback")));

        let config = SessionConfig {
            credentials: Some(Secret::from("explicit")),
            ..SessionConfig::remote("team=a")
        };
        let target = resolve_target(
            &config,
            &live_reload(Some("https://live"), Some("fallback")),
        )
        .unwrap();
        assert_eq!(target.credentials, Some(Secret::from("explicit")));
    }

    #[test]
    fn test_resolver_does_not_build_client_for_unresolved_target() {
        let (logs, _guard) = LogCapture::install();
        let client = Arc::new(ScriptedClient::happy());
        let factory = Arc::new(RecordingFactory::new(Arc::clone(&client)));
        let resolver = ClientResolver::new(LiveReloadConfig::default(), factory.clone());

        assert!(resolver.client(&SessionConfig::remote("team=a")).is_none());
        assert!(factory.targets().is_empty());
        assert_eq!(client.total_calls(), 0);
        assert!(logs.contains(Level::WARN, "Cannot create remote playpen client"));
    }

    #[test]
    fn test_resolver_builds_client() {
        let client = Arc::new(ScriptedClient::happy());
        let factory = Arc::new(RecordingFactory::new(client));
        let resolver = ClientResolver::new(LiveReloadConfig::default(), factory.clone());

        assert!(resolver
            .client(&SessionConfig::remote("https://host/x?team=a"))
            .is_some());
        let targets = factory.targets();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].query_string, "team=a");
    }
}
