//! Allow-list check for navigations that leave the application.

use url::Url;

use crate::config::ClientConfig;

/// Decides whether a redirect target is safe to follow.
///
/// Allowed: relative paths starting with a single `/` that stay on the
/// application's host, and `https` URLs whose host is the application's own or
/// on the allow-list. Everything else, including unparsable input and targets
/// carrying control characters, is rejected.
#[derive(Debug, Clone, Default)]
pub struct RedirectPolicy {
    app_origin: Option<Url>,
    allowed_hosts: Vec<String>,
}

impl RedirectPolicy {
    pub fn new<I, S>(app_origin: Option<&str>, allowed_hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let app_origin = app_origin
            .and_then(|origin| Url::parse(origin).ok())
            .filter(|url| url.host_str().is_some());
        let allowed_hosts = allowed_hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Self {
            app_origin,
            allowed_hosts,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.app_origin.as_deref(), &config.allowed_redirect_hosts)
    }

    pub fn is_allowed(&self, target: &str) -> bool {
        let target = target.trim();
        // URL parsers drop tabs and newlines: `/\t/host` is protocol-relative.
        if target.chars().any(char::is_control) {
            return false;
        }

        if target.starts_with('/') {
            if target.starts_with("//") || target.starts_with("/\\") {
                return false;
            }
            return match self.app_origin {
                Some(ref origin) => origin
                    .join(target)
                    .is_ok_and(|url| url.host_str() == origin.host_str()),
                None => true,
            };
        }

        let Ok(url) = Url::parse(target) else {
            return false;
        };
        if url.scheme() != "https" {
            return false;
        }
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();

        self.app_origin.as_ref().and_then(Url::host_str) == Some(host.as_str())
            || self.allowed_hosts.iter().any(|h| *h == host)
    }

    /// Absolute URL for an allowed target. Relative paths need an app origin.
    pub fn resolve(&self, target: &str) -> Option<Url> {
        if !self.is_allowed(target) {
            return None;
        }
        let target = target.trim();
        if target.starts_with('/') {
            self.app_origin.as_ref()?.join(target).ok()
        } else {
            Url::parse(target).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RedirectPolicy {
        RedirectPolicy::new(Some("https://app.coach.example"), ["checkout.stripe.com"])
    }

    #[test]
    fn relative_paths_are_allowed() {
        let p = policy();
        assert!(p.is_allowed("/dashboard"));
        assert!(p.is_allowed("/settings?tab=billing"));
        assert!(!p.is_allowed("//evil.example/phish"));
        assert!(!p.is_allowed("/\\evil.example"));
    }

    #[test]
    fn https_to_known_hosts_is_allowed() {
        let p = policy();
        assert!(p.is_allowed("https://app.coach.example/billing/success"));
        assert!(p.is_allowed("https://CHECKOUT.stripe.com/c/pay/cs_test"));
        assert!(!p.is_allowed("https://evil.example/"));
        assert!(!p.is_allowed("https://checkout.stripe.com@evil.example/"));
    }

    #[test]
    fn other_schemes_and_garbage_are_rejected() {
        let p = policy();
        assert!(!p.is_allowed("http://app.coach.example/"));
        assert!(!p.is_allowed("javascript:alert(1)"));
        assert!(!p.is_allowed("data:text/html,hi"));
        assert!(!p.is_allowed("not a url"));
        assert!(!p.is_allowed(""));
    }

    #[test]
    fn from_config_uses_origin_and_allow_list() {
        let config = ClientConfig {
            app_origin: Some("https://app.coach.example".into()),
            allowed_redirect_hosts: vec!["billing.example".into()],
            ..ClientConfig::default()
        };
        let p = RedirectPolicy::from_config(&config);
        assert!(p.is_allowed("https://billing.example/portal"));
        assert!(p.is_allowed("https://app.coach.example/"));
        assert!(!RedirectPolicy::default().is_allowed("https://app.coach.example/"));
    }

    #[test]
    fn control_characters_cannot_smuggle_a_host() {
        let p = policy();
        assert!(!p.is_allowed("/\t/evil.example/phish"));
        assert!(!p.is_allowed("/\n/evil.example"));
        assert!(!p.is_allowed("/\r\n/evil.example"));
        assert!(!p.is_allowed("https://app.coach.example/\tok"));
        assert!(!RedirectPolicy::default().is_allowed("/\t/evil.example/phish"));
        assert!(p.resolve("/\t/evil.example/phish").is_none());
    }

    #[test]
    fn resolve_anchors_relative_paths_on_the_app_origin() {
        let p = policy();
        assert_eq!(
            p.resolve("/dashboard?tab=team").map(String::from).as_deref(),
            Some("https://app.coach.example/dashboard?tab=team")
        );
        assert_eq!(
            p.resolve("https://checkout.stripe.com/c/pay").map(String::from).as_deref(),
            Some("https://checkout.stripe.com/c/pay")
        );
        assert!(p.resolve("https://evil.example/").is_none());
        assert!(RedirectPolicy::default().resolve("/dashboard").is_none());
    }
}
