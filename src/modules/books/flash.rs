//! One-shot status messages carried across a redirect in a cookie.

use axum::{
    extract::FromRequestParts,
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderValue,
    },
    response::{Html, IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

pub const FLASH_COOKIE: &str = "shelf_flash";

/// Most messages one cookie carries; older ones are dropped first.
pub const MAX_PENDING: usize = 5;

const CLEAR_COOKIE: &str = "shelf_flash=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Danger,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }
}

/// A message for the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub level: Level,
    pub message: String,
}

impl Status {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: Level::Danger,
            message: message.into(),
        }
    }
}

pub fn encode_cookie(messages: &[Status]) -> String {
    // Serializing plain strings and enums cannot fail.
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// `None` for anything that is not a cookie we wrote.
pub fn decode_cookie(value: &str) -> Option<Vec<Status>> {
    let json = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&json).ok()
}

/// Messages left by the previous response.
///
/// Whatever produces the next response through [`Flash::page`] or
/// [`Flash::redirect`] consumes them.
#[derive(Debug, Default)]
pub struct Flash {
    messages: Vec<Status>,
    cookie_present: bool,
}

impl Flash {
    pub fn messages(&self) -> &[Status] {
        &self.messages
    }

    /// Render `body` and clear the cookie if one was sent.
    pub fn page(self, body: String) -> Response {
        let mut response = Html(body).into_response();
        if self.cookie_present {
            response
                .headers_mut()
                .append(SET_COOKIE, HeaderValue::from_static(CLEAR_COOKIE));
        }
        response
    }

    /// Redirect with `status` appended to the messages not yet shown,
    /// keeping the newest [`MAX_PENDING`].
    pub fn redirect(self, to: &str, status: Status) -> Response {
        let mut messages = self.messages;
        messages.push(status);
        if messages.len() > MAX_PENDING {
            messages.drain(..messages.len() - MAX_PENDING);
        }

        let mut response = Redirect::to(to).into_response();
        let cookie = format!(
            "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
            encode_cookie(&messages)
        );
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(error) => tracing::warn!(%error, "dropping status message"),
        }
        response
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw) = find_cookie(parts) else {
            return Ok(Flash::default());
        };

        let messages = decode_cookie(&raw).unwrap_or_else(|| {
            tracing::debug!("ignoring malformed status cookie");
            Vec::new()
        });

        Ok(Flash {
            messages,
            cookie_present: true,
        })
    }
}

fn find_cookie(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == FLASH_COOKIE)
        .map(|(_, value)| value.to_string())
}
