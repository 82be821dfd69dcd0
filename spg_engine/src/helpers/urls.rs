use log::debug;

/// The address of a local development server, which the gateway cannot reach.
pub const LOCAL_NOTIFY_PREFIX: &str = "http://localhost:18130/";
/// A non-routable stand-in, so that the gateway gives up quickly instead of retrying against localhost.
pub const NOTIFY_PLACEHOLDER_PREFIX: &str = "http://somewhere.elsenot.exist/";

/// Joins a path onto the public base URL of the shop.
pub fn ecommerce_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Rewrites a notify URL that points at a local development server to the non-routable placeholder. The rest of the
/// path is kept.
pub fn rewrite_local_notify_url(url: &str) -> String {
    match url.strip_prefix(LOCAL_NOTIFY_PREFIX) {
        Some(path) => {
            debug!("💳️ Notify URL {url} is only reachable locally. Rewriting it.");
            format!("{NOTIFY_PLACEHOLDER_PREFIX}{path}")
        },
        None => url.to_string(),
    }
}
