use url::Url;

/// Minimal URL/host helpers shared by the URL analyzer
pub struct DomainUtils;

impl DomainUtils {
    /// Lower-cased host of a URL.
    ///
    /// Falls back to a textual split when the string is not an absolute URL
    /// (e.g. `bit.ly/abc` or a malformed href), so checks still see a host.
    pub fn extract_host(url: &str) -> String {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                return host.to_lowercase();
            }
        }

        let lower = url.trim().to_lowercase();
        let rest = match lower.find("://") {
            Some(pos) => &lower[pos + 3..],
            None => lower.as_str(),
        };
        let end = rest.find(|c: char| matches!(c, '/' | '?' | '#')).unwrap_or(rest.len());
        let authority = &rest[..end];
        // Drop userinfo and port
        let host = authority.rsplit('@').next().unwrap_or(authority);
        match host.rfind(':') {
            Some(pos) if host[pos + 1..].chars().all(|c| c.is_ascii_digit()) => {
                host[..pos].to_string()
            }
            _ => host.to_string(),
        }
    }

    /// Whether the URL uses the https scheme (case-insensitive)
    pub fn is_https(url: &str) -> bool {
        match Url::parse(url) {
            Ok(parsed) => parsed.scheme() == "https",
            Err(_) => url.trim_start().to_lowercase().starts_with("https://"),
        }
    }
}
