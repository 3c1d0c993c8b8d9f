// src/router.rs

//! Classification of URLs the creative asks to open.
//!
//! The controller does not navigate anywhere itself. It classifies the URL
//! into a [`UrlAction`] and hands that to the host's
//! [`UrlRouter`](crate::host::UrlRouter), which performs the platform
//! navigation.

use crate::config::BridgeConfig;
use log::trace;
use std::collections::HashMap;
use url::Url;

/// Host used by native-browser and deep-link-with-fallback URLs.
const NAVIGATE_HOST: &str = "navigate";
/// Host used by share-intent URLs.
const SHARE_HOST: &str = "tweet";
const DEEP_LINK_PLUS_SCHEME: &str = "deeplink+";

/// What to do with a URL the creative opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlAction {
    /// `about:` URLs; nothing to open.
    Ignore,
    /// Open the decoded target in the platform browser.
    NativeBrowser { url: String },
    /// Open in the in-app browser.
    InAppBrowser { url: String },
    /// Hand to the platform's share intent.
    Share { url: String },
    /// Try `primary`; if it cannot be resolved, try `fallback`.
    DeepLinkWithFallback {
        primary: String,
        fallback: Option<String>,
    },
    /// Any other application deep link.
    DeepLink { url: String },
    /// Malformed or missing target.
    Unresolvable { url: String },
}

impl UrlAction {
    pub fn classify(raw: &str, bridge: &BridgeConfig) -> UrlAction {
        let unresolvable = || UrlAction::Unresolvable {
            url: raw.to_string(),
        };
        let Ok(url) = Url::parse(raw) else {
            trace!("UrlAction: '{}' does not parse", raw);
            return unresolvable();
        };

        let scheme = url.scheme();
        let action = if scheme == "about" {
            UrlAction::Ignore
        } else if scheme == "http" || scheme == "https" {
            UrlAction::InAppBrowser {
                url: raw.to_string(),
            }
        } else if scheme == bridge.native_browser_scheme() {
            if url.host_str() != Some(NAVIGATE_HOST) {
                return unresolvable();
            }
            match query_params(&url).remove("url") {
                Some(target) if Url::parse(&target).is_ok() => {
                    UrlAction::NativeBrowser { url: target }
                }
                _ => unresolvable(),
            }
        } else if scheme == bridge.share_scheme() {
            if url.host_str() != Some(SHARE_HOST) {
                return unresolvable();
            }
            UrlAction::Share {
                url: raw.to_string(),
            }
        } else if scheme == DEEP_LINK_PLUS_SCHEME {
            if url.host_str() != Some(NAVIGATE_HOST) {
                return unresolvable();
            }
            let mut params = query_params(&url);
            match params.remove("primaryUrl") {
                Some(primary) => UrlAction::DeepLinkWithFallback {
                    primary,
                    fallback: params.remove("fallbackUrl"),
                },
                None => unresolvable(),
            }
        } else {
            UrlAction::DeepLink {
                url: raw.to_string(),
            }
        };
        trace!("UrlAction: '{}' classified as {:?}", raw, action);
        action
    }
}

fn query_params(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}
