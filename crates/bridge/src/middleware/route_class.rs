//! Route classification for the session bridge.

/// Paths served to anyone, together with all of their sub-paths.
const PUBLIC_PREFIXES: &[&str] = &["/sign-in", "/sign-up"];

/// Protected paths that must be reachable without a backend token.
const SYNC_EXEMPT_PATHS: &[&str] = &["/api/sync-xano", "/api/logout", "/logout"];

/// File extensions served as static assets, never bridged.
const STATIC_EXTENSIONS: &[&str] = &[
    "html", "htm", "css", "js", "jpg", "jpeg", "webp", "png", "gif", "svg", "ttf", "woff",
    "woff2", "ico", "csv", "doc", "docx", "xls", "xlsx", "zip", "webmanifest",
];

/// How the session bridge treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// No authentication required.
    Public,
    /// Authentication required, backend token not required.
    SyncExempt,
    /// Authentication and backend token required.
    Protected,
}

impl RouteClass {
    /// Classify a request path.
    ///
    /// Matching is case-sensitive. A single trailing `/` is ignored except
    /// on the root.
    ///
    /// ```
    /// use xano_bridge::middleware::RouteClass;
    ///
    /// assert_eq!(RouteClass::of("/sign-in/factor-one"), RouteClass::Public);
    /// assert_eq!(RouteClass::of("/logout"), RouteClass::SyncExempt);
    /// assert_eq!(RouteClass::of("/app/dashboard"), RouteClass::Protected);
    /// ```
    #[must_use]
    pub fn of(path: &str) -> Self {
        let path = normalize(path);

        if path == "/" || PUBLIC_PREFIXES.iter().any(|p| is_path_or_subpath(path, p)) {
            Self::Public
        } else if SYNC_EXEMPT_PATHS.contains(&path) {
            Self::SyncExempt
        } else {
            Self::Protected
        }
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

/// Whether a path names a static file the bridge should leave alone.
///
/// API paths are always bridged, whatever they end in.
///
/// ```
/// use xano_bridge::middleware::is_static_asset;
///
/// assert!(is_static_asset("/favicon.ico"));
/// assert!(!is_static_asset("/api/export.csv"));
/// ```
#[must_use]
pub fn is_static_asset(path: &str) -> bool {
    if is_path_or_subpath(path, "/api") {
        return false;
    }

    path.rsplit('/')
        .next()
        .and_then(|file| file.rsplit_once('.'))
        .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext))
}

fn normalize(path: &str) -> &str {
    match path {
        "" => "/",
        "/" => path,
        _ => path.strip_suffix('/').unwrap_or(path),
    }
}

fn is_path_or_subpath(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
