//! LLM backend abstraction for multi-provider support
//!
//! This crate provides a trait-based system for invoking language models
//! over HTTP. All providers implement the [`LlmBackend`] trait, allowing
//! the orchestrator to work with any provider without knowing
//! implementation details.

mod anthropic;
mod http_client;
mod openrouter;
mod types;

#[cfg(any(test, feature = "test-utils"))]
mod scripted;

pub use coinforge_config as config;
pub use coinforge_utils::error::LlmError;
pub use types::{LlmBackend, LlmInvocation, LlmResult, Message, Role};

// Test seam; not part of public API stability guarantees.
#[cfg(any(test, feature = "test-utils"))]
#[doc(hidden)]
pub use scripted::{ScriptedBackend, ScriptedResponse};

use std::sync::Arc;
use tracing::warn;

pub(crate) use anthropic::AnthropicBackend;
pub(crate) use openrouter::OpenRouterBackend;

use crate::config::Config;

/// Metadata recorded when a fallback provider was used.
#[derive(Debug, Clone)]
pub struct LlmFallbackInfo {
    pub primary_provider: String,
    pub fallback_provider: String,
    pub reason: String,
}

fn construct_backend_for_provider(
    provider: &str,
    config: &Config,
) -> Result<Arc<dyn LlmBackend>, LlmError> {
    match provider {
        "anthropic" => {
            let backend = AnthropicBackend::new_from_config(config)?;
            Ok(Arc::new(backend))
        }
        "openrouter" => {
            let backend = OpenRouterBackend::new_from_config(config)?;
            Ok(Arc::new(backend))
        }
        unknown => Err(LlmError::Unsupported(format!(
            "Unknown LLM provider '{unknown}'. Supported providers: anthropic, openrouter."
        ))),
    }
}

/// Create an LLM backend from configuration, returning fallback metadata
/// when the primary provider failed to construct and a configured
/// fallback took over.
///
/// # Errors
///
/// Returns `LlmError::Unsupported` for unknown providers and
/// `LlmError::Misconfiguration` when provider settings (model, API key
/// env var) are incomplete.
pub fn from_config_with_fallback(
    config: &Config,
) -> Result<(Arc<dyn LlmBackend>, Option<LlmFallbackInfo>), LlmError> {
    let provider = config.provider();

    match construct_backend_for_provider(provider, config) {
        Ok(backend) => Ok((backend, None)),
        Err(primary_error) => {
            let Some(fallback_provider) = config.llm.fallback_provider.as_deref() else {
                return Err(primary_error);
            };

            let reason = primary_error.to_string();
            warn!(
                primary = provider,
                fallback = fallback_provider,
                %reason,
                "Primary provider failed during construction; attempting fallback"
            );

            match construct_backend_for_provider(fallback_provider, config) {
                Ok(fallback_backend) => Ok((
                    fallback_backend,
                    Some(LlmFallbackInfo {
                        primary_provider: provider.to_string(),
                        fallback_provider: fallback_provider.to_string(),
                        reason,
                    }),
                )),
                Err(fallback_error) => {
                    warn!(
                        fallback = fallback_provider,
                        error = %fallback_error,
                        "Fallback provider also failed"
                    );
                    // The primary error is the more relevant one
                    Err(primary_error)
                }
            }
        }
    }
}

/// Create an LLM backend from configuration.
///
/// # Errors
///
/// See [`from_config_with_fallback`].
pub fn from_config(config: &Config) -> Result<Arc<dyn LlmBackend>, LlmError> {
    let (backend, _fallback_info) = from_config_with_fallback(config)?;
    Ok(backend)
}

#[cfg(test)]
mod factory_tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    // Single global lock for all tests that touch environment variables.
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    #[test]
    fn unknown_provider_fails_cleanly() {
        let _guard = env_guard();
        let mut config = Config::minimal_for_testing();
        config.llm.provider = Some("mystery".to_string());
        let err = from_config(&config).map(|_| ()).unwrap_err();
        assert!(matches!(err, LlmError::Unsupported(_)));
    }

    #[test]
    fn missing_api_key_is_misconfiguration() {
        let _guard = env_guard();
        // SAFETY: guarded by ENV_LOCK; no other test thread mutates env
        unsafe { std::env::remove_var("COINFORGE_TEST_MISSING_KEY") };

        let mut config = Config::minimal_for_testing();
        config.llm.anthropic = Some(coinforge_config::AnthropicConfig {
            model: Some("claude-sonnet-4-5".to_string()),
            api_key_env: Some("COINFORGE_TEST_MISSING_KEY".to_string()),
            ..Default::default()
        });
        let err = from_config(&config).map(|_| ()).unwrap_err();
        assert!(matches!(err, LlmError::Misconfiguration(_)));
    }

    #[test]
    fn fallback_is_attempted_when_primary_misconfigured() {
        let _guard = env_guard();
        // SAFETY: guarded by ENV_LOCK; no other test thread mutates env
        unsafe {
            std::env::remove_var("COINFORGE_TEST_MISSING_KEY");
            std::env::set_var("COINFORGE_TEST_PRESENT_KEY", "sk-test");
        }

        let mut config = Config::minimal_for_testing();
        config.llm.provider = Some("anthropic".to_string());
        config.llm.fallback_provider = Some("openrouter".to_string());
        config.llm.anthropic = Some(coinforge_config::AnthropicConfig {
            model: Some("claude-sonnet-4-5".to_string()),
            api_key_env: Some("COINFORGE_TEST_MISSING_KEY".to_string()),
            ..Default::default()
        });
        config.llm.openrouter = Some(coinforge_config::OpenRouterConfig {
            model: Some("vendor/model".to_string()),
            api_key_env: Some("COINFORGE_TEST_PRESENT_KEY".to_string()),
            ..Default::default()
        });

        let (_backend, fallback) = from_config_with_fallback(&config).unwrap();
        let info = fallback.expect("fallback metadata present");
        assert_eq!(info.primary_provider, "anthropic");
        assert_eq!(info.fallback_provider, "openrouter");

        unsafe { std::env::remove_var("COINFORGE_TEST_PRESENT_KEY") };
    }
}
