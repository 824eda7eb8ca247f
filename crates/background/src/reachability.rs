use bus::UnreachableReason;
use url::Url;

/// Schemes that belong to the browser itself; content scripts never run there.
const BROWSER_SCHEMES: &[&str] = &[
    "about",
    "chrome",
    "chrome-extension",
    "edge",
    "moz-extension",
    "resource",
    "view-source",
];

fn is_store_or_new_tab(url: &Url) -> bool {
    let host = url.host_str().unwrap_or_default();
    let path = url.path();
    (host == "chrome.google.com" && path.starts_with("/webstore/"))
        || host == "chromewebstore.google.com"
        || host == "addons.mozilla.org"
        || (host.starts_with("google.") && path.starts_with("/_/chrome/newtab"))
}

/// Why a tab that did not answer is out of reach, judged from its URL alone.
pub fn classify_unreachable(tab_url: &str) -> UnreachableReason {
    let Ok(url) = Url::parse(tab_url) else {
        return UnreachableReason::NoResponse;
    };
    if BROWSER_SCHEMES.contains(&url.scheme()) || is_store_or_new_tab(&url) {
        UnreachableReason::Forbidden
    } else if url.path().to_ascii_lowercase().ends_with(".pdf") {
        UnreachableReason::Pdf
    } else if url.scheme() == "file" {
        UnreachableReason::OfflineFile
    } else {
        UnreachableReason::NoResponse
    }
}
