//! Response cookie writer
//!
//! Resolvers cannot touch the HTTP response directly, so they queue cookies
//! on a per-request `ResponseCookies` handle which the GraphQL handler turns
//! into `Set-Cookie` headers once execution finishes.

use std::sync::{Arc, Mutex};

use axum::http::{header::SET_COOKIE, HeaderMap, HeaderValue};
use cookie::Cookie;

/// Per-request collection of cookies to emit with the response
#[derive(Clone, Default)]
pub struct ResponseCookies {
    jar: Arc<Mutex<Vec<Cookie<'static>>>>,
}

impl ResponseCookies {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a cookie, replacing any queued cookie with the same name
    pub fn add(&self, cookie: Cookie<'static>) {
        let mut jar = self.jar.lock().unwrap_or_else(|e| e.into_inner());
        jar.retain(|queued| queued.name() != cookie.name());
        jar.push(cookie);
    }

    /// Queue a removal cookie for `name`
    pub fn clear(&self, name: &str) {
        self.add(removal_cookie(name));
    }

    /// Clear `name` when the returned guard goes out of scope
    pub fn clear_on_drop(&self, name: impl Into<String>) -> ClearCookieGuard {
        ClearCookieGuard {
            cookies: self.clone(),
            name: name.into(),
        }
    }

    /// Snapshot of the queued cookies
    pub fn cookies(&self) -> Vec<Cookie<'static>> {
        self.jar.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Render the queued cookies as `Set-Cookie` headers
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in self.cookies() {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    headers.append(SET_COOKIE, value);
                }
                Err(e) => {
                    tracing::warn!(cookie = %cookie.name(), error = %e, "Skipping unencodable cookie");
                }
            }
        }
        headers
    }
}

/// Clears a cookie on drop, on every exit path of the owning scope
#[must_use = "the cookie is cleared when the guard is dropped"]
pub struct ClearCookieGuard {
    cookies: ResponseCookies,
    name: String,
}

impl Drop for ClearCookieGuard {
    fn drop(&mut self) {
        self.cookies.clear(&self.name);
    }
}

/// Cookie that instructs the client to delete `name`
pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build((name.to_string(), "")).path("/").build();
    cookie.make_removal();
    cookie
}

/// Read the value of cookie `name` from the request `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_clear_emits_removal_cookie() {
        let cookies = ResponseCookies::new();
        cookies.clear("qid");

        let headers = cookies.to_headers();
        let value = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(value.starts_with("qid=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Path=/"));
    }

    #[test]
    fn test_add_replaces_same_name() {
        let cookies = ResponseCookies::new();
        cookies.add(Cookie::new("qid", "first"));
        cookies.add(Cookie::new("other", "x"));
        cookies.add(Cookie::new("qid", "second"));

        let queued = cookies.cookies();
        assert_eq!(queued.len(), 2);
        assert!(queued
            .iter()
            .any(|c| c.name() == "qid" && c.value() == "second"));
    }

    #[test]
    fn test_guard_clears_on_early_return() {
        fn bail_early(cookies: &ResponseCookies) -> Result<(), &'static str> {
            let _clear = cookies.clear_on_drop("qid");
            Err("destroy failed")
        }

        let cookies = ResponseCookies::new();
        assert!(bail_early(&cookies).is_err());
        assert_eq!(cookies.cookies().len(), 1);
        assert_eq!(cookies.cookies()[0].value(), "");
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; qid=abc123"));
        headers.append(COOKIE, HeaderValue::from_static("lang=en"));

        assert_eq!(read_cookie(&headers, "qid").as_deref(), Some("abc123"));
        assert_eq!(read_cookie(&headers, "lang").as_deref(), Some("en"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_ignores_empty_value() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("qid="));
        assert_eq!(read_cookie(&headers, "qid"), None);
    }
}
