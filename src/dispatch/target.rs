//! Internal vs external target classification.

/// Which path a request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Same backend as the application; sent directly.
    Internal,
    /// Any other absolute http(s) URL; sent through the proxy service.
    External,
}

/// Classify `url` against the application's `base_url`.
///
/// This is a literal string-prefix comparison, not an origin comparison:
/// a base of `http://localhost:5000` treats `http://localhost:5000/x` as
/// internal and `http://localhost:5000x` as internal too.
pub fn classify(url: &str, base_url: &str) -> Target {
    let absolute_http = url.starts_with("http://") || url.starts_with("https://");
    if !url.starts_with(base_url) && absolute_http {
        Target::External
    } else {
        Target::Internal
    }
}
