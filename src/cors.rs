use http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Local dashboard origins allowed when none are configured.
pub const DEFAULT_CORS_ORIGINS: &str =
    "http://localhost,https://localhost,http://127.0.0.1,https://127.0.0.1";

/// Whether `origin` is allowed by the configured prefixes. `"*"` allows all.
#[must_use]
pub fn origin_allowed(origin: &HeaderValue, allowed: &[String]) -> bool {
    if allowed.iter().any(|o| o == "*") {
        return true;
    }
    origin
        .to_str()
        .is_ok_and(|origin| allowed.iter().any(|prefix| origin.starts_with(prefix.as_str())))
}

/// Build a CORS layer for gRPC-Web clients.
///
/// Origins match by prefix so `http://localhost` also admits any port.
#[must_use]
pub fn build_cors_layer(cors_origins: Vec<String>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, _| {
            origin_allowed(origin, &cors_origins)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origins(list: &str) -> Vec<String> {
        list.split(',').map(str::to_string).collect()
    }

    #[test]
    fn test_default_origins_admit_local_ports() {
        let allowed = origins(DEFAULT_CORS_ORIGINS);
        assert!(origin_allowed(&HeaderValue::from_static("http://localhost:5173"), &allowed));
        assert!(origin_allowed(&HeaderValue::from_static("https://127.0.0.1"), &allowed));
        assert!(!origin_allowed(&HeaderValue::from_static("https://evil.example"), &allowed));
    }

    #[test]
    fn test_wildcard_admits_everything() {
        let allowed = origins("*");
        assert!(origin_allowed(&HeaderValue::from_static("https://dashboard.example"), &allowed));
    }
}
