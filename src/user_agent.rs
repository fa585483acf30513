//! Shared User-Agent string for catalog, identity and download traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/dataspace-downloader";

/// Default User-Agent for every request the client sends.
#[must_use]
pub(crate) fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("dataspace-downloader/{version} (earth-observation-client; +{PROJECT_UA_URL})")
}
