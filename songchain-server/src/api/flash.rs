//! Flash messages carried across the post-redirect-get cycle
//!
//! Messages are stored as base64 JSON in a signed cookie. A cookie that fails
//! signature or JSON checks is treated as empty.

use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "songchain_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashCategory {
    Success,
    Info,
    Error,
}

impl FlashCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashCategory::Success => "success",
            FlashCategory::Info => "info",
            FlashCategory::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: FlashCategory,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self { category: FlashCategory::Success, message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { category: FlashCategory::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { category: FlashCategory::Error, message: message.into() }
    }
}

fn decode(jar: &SignedCookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// Queue messages for the next page render
pub fn push(jar: SignedCookieJar, messages: Vec<FlashMessage>) -> SignedCookieJar {
    let mut pending = decode(&jar);
    pending.extend(messages);

    // Serializing plain strings and enums cannot fail
    let json = serde_json::to_vec(&pending).unwrap_or_default();
    let cookie = Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(json)))
        .path("/")
        .http_only(true);
    jar.add(cookie)
}

/// Read and clear pending messages
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<FlashMessage>) {
    let messages = decode(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, messages);
    }
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, messages)
}
