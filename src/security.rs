use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
};

/// Security headers middleware
pub struct SecurityHeaders;

impl<S, B> Transform<S, ServiceRequest> for SecurityHeaders
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SecurityHeadersMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SecurityHeadersMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct SecurityHeadersMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for SecurityHeadersMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();

        Box::pin(async move {
            let mut res = srv.call(req).await?;
            let headers = res.headers_mut();

            headers.insert(
                HeaderName::from_static("x-frame-options"),
                HeaderValue::from_static("DENY"),
            );
            headers.insert(
                HeaderName::from_static("x-content-type-options"),
                HeaderValue::from_static("nosniff"),
            );
            headers.insert(
                HeaderName::from_static("referrer-policy"),
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            );
            // JSON only; nothing here should ever be rendered as a page
            headers.insert(
                HeaderName::from_static("content-security-policy"),
                HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
            );

            if cfg!(not(debug_assertions)) {
                headers.insert(
                    HeaderName::from_static("strict-transport-security"),
                    HeaderValue::from_static("max-age=31536000; includeSubDomains"),
                );
            }

            Ok(res)
        })
    }
}

/// Input validation utilities
pub mod validation {
    use regex::Regex;
    use std::sync::OnceLock;
    use url::Url;

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

    /// Validate URL format and scheme
    pub fn validate_url(url: &str) -> Result<(), String> {
        if url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        if url.len() > 2048 {
            return Err("URL too long (max 2048 characters)".to_string());
        }

        let parsed = Url::parse(url).map_err(|_| "Invalid URL format".to_string())?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err("Invalid URL format. Must be HTTP or HTTPS".to_string());
        }

        Ok(())
    }

    /// Validate email format
    pub fn validate_email(email: &str) -> Result<(), String> {
        if email.is_empty() {
            return Err("Email cannot be empty".to_string());
        }

        if email.len() > 254 {
            return Err("Email too long (max 254 characters)".to_string());
        }

        let email_regex = EMAIL_REGEX.get_or_init(|| {
            Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
        });

        if !email_regex.is_match(email) {
            return Err("Invalid email format".to_string());
        }

        Ok(())
    }

    /// Object ids and slugs end up in request paths to the bucket
    pub fn validate_identifier(value: &str) -> Result<(), String> {
        if value.is_empty() || value.len() > 128 {
            return Err("must be 1-128 characters".to_string());
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err("may only contain letters, digits, '-' and '_'".to_string());
        }
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_validate_email() {
            assert!(validate_email("a@b.com").is_ok());
            assert!(validate_email("first.last+tag@mail.example.org").is_ok());
            assert!(validate_email("").is_err());
            assert!(validate_email("not-an-email").is_err());
            assert!(validate_email("a@b").is_err());
        }

        #[test]
        fn test_validate_url() {
            assert!(validate_url("https://example.com/post").is_ok());
            assert!(validate_url("http://localhost:3000/a").is_ok());
            assert!(validate_url("ftp://example.com").is_err());
            assert!(validate_url("example.com").is_err());
            assert!(validate_url("").is_err());
        }

        #[test]
        fn test_validate_identifier() {
            assert!(validate_identifier("65a1b2c3d4e5f6").is_ok());
            assert!(validate_identifier("my-article_2").is_ok());
            assert!(validate_identifier("../etc").is_err());
            assert!(validate_identifier("").is_err());
        }
    }
}

/// Rate limiting configuration for the API scope
pub use actix_governor::{GovernorConfig, GovernorConfigBuilder};

pub type RateLimiterConfig = GovernorConfig<
    actix_governor::PeerIpKeyExtractor,
    actix_governor::governor::middleware::StateInformationMiddleware,
>;

/// `None` only if the limits are misconfigured (zero period or burst).
pub fn create_rate_limiter() -> Option<RateLimiterConfig> {
    GovernorConfigBuilder::default()
        .per_second(10)
        .burst_size(20)
        .use_headers()
        .finish()
}
