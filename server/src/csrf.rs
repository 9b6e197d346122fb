use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use uuid::Uuid;

static CSRF_COOKIE: &str = "_csrf";

pub static CSRF_FIELD: &str = "csrf_token";
pub static CSRF_ERROR: &str = "The CSRF token is missing or invalid.";

/// Returns the token bound to this browser, minting one on first use.
pub fn issue(jar: SignedCookieJar) -> (SignedCookieJar, String) {
    if let Some(cookie) = jar.get(CSRF_COOKIE) {
        let token = cookie.value().to_string();
        return (jar, token);
    }
    let token = Uuid::new_v4().simple().to_string();
    let jar = jar.add(
        Cookie::build((CSRF_COOKIE, token.clone()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    );
    (jar, token)
}

pub fn verify(jar: &SignedCookieJar, submitted: &str) -> Result<(), &'static str> {
    match jar.get(CSRF_COOKIE) {
        Some(cookie) if !submitted.is_empty() && cookie.value() == submitted => Ok(()),
        _ => Err(CSRF_ERROR),
    }
}
