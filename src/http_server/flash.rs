//! One-shot notices carried across the redirect that follows a mutation.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Serialize;

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Failure,
}

impl NoticeLevel {
    fn as_str(self) -> &'static str {
        match self {
            NoticeLevel::Success => "success",
            NoticeLevel::Failure => "failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }

    /// `<level>:<message>`. The jar percent-encodes it on the wire.
    pub fn encode(&self) -> String {
        format!("{}:{}", self.level.as_str(), self.message)
    }

    pub fn decode(value: &str) -> Option<Self> {
        let (level, message) = value.split_once(':')?;
        let level = match level {
            "success" => NoticeLevel::Success,
            "failure" => NoticeLevel::Failure,
            _ => return None,
        };
        Some(Self {
            level,
            message: message.to_string(),
        })
    }
}

/// Attach a notice to the next rendered page.
pub fn set(jar: CookieJar, notice: &Notice) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, notice.encode()))
            .path("/")
            .http_only(true),
    )
}

/// Consume the pending notice, if any.
pub fn take(jar: CookieJar) -> (CookieJar, Option<Notice>) {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return (jar, None);
    };
    let notice = Notice::decode(cookie.value());
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, notice)
}
