//! Path routing and session bootstrap.
//!
//! `/` is the link creator, `/v/{token}` a shared link and `/{recipient}` the
//! older personal route. Only the personal route honours a `?theme=` override;
//! a shared link's theme is part of its token.

use percent_encoding::percent_decode_str;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use url::form_urlencoded;

use crate::link::{LINK_PREFIX, LinkCodec};
use crate::session::SessionState;
use crate::theme::ThemeId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    /// Link creator; no session.
    Home,
    /// Shared link carrying an encoded token.
    Token(String),
    /// Personal route with a percent-decoded recipient name.
    Recipient(String),
    /// Anything deeper than one segment outside `/v/`.
    Unknown,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error("link not found or invalid")]
    NotFound,
    #[error("route does not carry a session")]
    NoSession,
    #[error("invalid url: {0}")]
    BadUrl(String),
}

impl Route {
    /// Classify a path. Query and fragment, if present, are ignored.
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_matches('/');
        if trimmed.is_empty() {
            return Route::Home;
        }
        if let Some(token) = path.strip_prefix(LINK_PREFIX) {
            let token = token.trim_end_matches('/');
            return if token.contains('/') {
                Route::Unknown
            } else {
                Route::Token(token.to_owned())
            };
        }
        if trimmed == LINK_PREFIX.trim_matches('/') {
            return Route::Token(String::new());
        }
        if trimmed.contains('/') {
            return Route::Unknown;
        }
        let recipient = percent_decode_str(trimmed).decode_utf8_lossy();
        Route::Recipient(recipient.into_owned())
    }
}

/// Build the landing-stage state for `route`.
///
/// `query` is the raw query string without the leading `?`.
///
/// # Errors
///
/// `NotFound` for undecodable tokens and unknown paths, `NoSession` for the
/// link creator.
pub fn bootstrap(route: &Route, query: Option<&str>) -> Result<SessionState, BootstrapError> {
    match route {
        Route::Home => Err(BootstrapError::NoSession),
        Route::Unknown => Err(BootstrapError::NotFound),
        Route::Token(token) => match LinkCodec::decode(token) {
            Some(params) => Ok(SessionState::from_params(params)),
            None => Err(BootstrapError::NotFound),
        },
        Route::Recipient(name) => {
            let mut state = SessionState::default();
            state.set_recipient_name(name.as_str());
            if let Some(theme) = query.and_then(theme_override) {
                state.set_theme(theme);
            }
            Ok(state)
        }
    }
}

/// [`bootstrap`] for a full page URL.
///
/// # Errors
///
/// `BadUrl` when `href` does not parse, otherwise as [`bootstrap`].
pub fn bootstrap_href(href: &str) -> Result<SessionState, BootstrapError> {
    let url = Url::parse(href).map_err(|err| {
        warn!(error = %err, "unparseable page url");
        BootstrapError::BadUrl(err.to_string())
    })?;
    let route = Route::parse(url.path());
    debug!(?route, "routing");
    bootstrap(&route, url.query())
}

fn theme_override(query: &str) -> Option<ThemeId> {
    let (_, value) = form_urlencoded::parse(query.as_bytes()).find(|(key, _)| key == "theme")?;
    match value.parse::<ThemeId>() {
        Ok(theme) => Some(theme),
        Err(err) => {
            debug!(%err, "ignoring theme override");
            None
        }
    }
}
