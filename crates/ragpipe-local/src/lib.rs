//! Local (reqwest-backed) implementations of the ragpipe collaborator
//! traits: the Anthropic completion client, a SearXNG search provider,
//! a web page text extractor, and the JSON-RPC tool-endpoint dispatcher.

use ragpipe_core::{Error, Result};
use std::time::Duration;

pub mod anthropic;
pub mod extract;
pub mod jsonrpc;
pub mod search;

pub(crate) fn env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Shared HTTP client with safety defaults.
///
/// No client-wide request timeout: the completion service is allowed to
/// take as long as it takes, and the search/extract/tool paths set their
/// own per-request timeouts. Connect/DNS stalls are still bounded.
pub fn default_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("ragpipe/0.1")
        .redirect(reqwest::redirect::Policy::limited(10))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| Error::NotConfigured(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testenv {
    /// Env vars are process-global; tests that mutate them hold this.
    pub static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    pub struct EnvGuard {
        k: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        pub fn set(k: &'static str, v: &str) -> Self {
            let prev = std::env::var(k).ok();
            std::env::set_var(k, v);
            Self { k, prev }
        }

        pub fn unset(k: &'static str) -> Self {
            let prev = std::env::var(k).ok();
            std::env::remove_var(k);
            Self { k, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(v) = self.prev.take() {
                std::env::set_var(self.k, v);
            } else {
                std::env::remove_var(self.k);
            }
        }
    }
}
