//! Bookmark link health probe.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The outcome of probing one URL. Transport failures report
/// `ok: false, status: None` instead of an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkStatus {
    pub ok: bool,
    pub status: Option<u16>,
}

/// Probes bookmark URLs for reachability.
///
/// HEAD first because it is cheap; some servers reject HEAD outright, so a
/// non-success falls back to GET.
#[derive(Clone)]
pub struct LinkChecker {
    client: reqwest::Client,
}

impl LinkChecker {
    /// Creates a checker with a 5 second timeout, following redirects.
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// Probes the URL. Never fails; every outcome maps to a [`LinkStatus`].
    pub async fn check(&self, url: &str) -> LinkStatus {
        match self.client.head(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if (200..400).contains(&status) {
                    return LinkStatus {
                        ok: true,
                        status: Some(status),
                    };
                }
                match self.client.get(url).send().await {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        LinkStatus {
                            ok: (200..400).contains(&status),
                            status: Some(status),
                        }
                    }
                    Err(_) => LinkStatus {
                        ok: false,
                        status: None,
                    },
                }
            }
            Err(_) => LinkStatus {
                ok: false,
                status: None,
            },
        }
    }
}

impl Default for LinkChecker {
    fn default() -> Self {
        Self::new()
    }
}
