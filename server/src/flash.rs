use std::fmt::Display;

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};
use serde::{Deserialize, Serialize};
use vodca::References;

static FLASH_COOKIE: &str = "_flash";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Danger,
}

impl Display for FlashLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlashLevel::Success => write!(f, "success"),
            FlashLevel::Danger => write!(f, "danger"),
        }
    }
}

/// One-shot notice carried across a redirect in a signed cookie.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, References)]
pub struct Flash {
    level: FlashLevel,
    message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Danger,
            message: message.into(),
        }
    }

    /// Queues the notice behind any that are still pending.
    pub fn attach(self, jar: SignedCookieJar) -> SignedCookieJar {
        let mut pending = pending(&jar);
        pending.push(self);
        match serde_json::to_string(&pending) {
            Ok(value) => jar.add(
                Cookie::build((FLASH_COOKIE, value))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .build(),
            ),
            Err(error) => {
                tracing::error!("Failed to encode flash messages: {error}");
                jar
            }
        }
    }

    /// Drains every pending notice. They are not shown again.
    pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
        let pending = pending(&jar);
        // Cleared even when the signature check failed.
        let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
        (jar, pending)
    }
}

fn pending(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}
