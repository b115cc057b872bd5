//! Short, URL-safe link tokens carrying the session parameters.
//!
//! Token body is `recipient|sender|themeCode[|message]`, UTF-8, base64 with the
//! URL-safe alphabet and no padding. Recipient and sender escape `\` and `|`
//! with a backslash; the message is the trailing field and is written raw, so
//! the decoder takes everything after the third delimiter verbatim.
//!
//! Tokens without any delimiter are treated as the older JSON record form
//! (optionally percent-encoded) so previously shared links keep working.

use std::string::FromUtf8Error;

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{trace, warn};

use crate::theme::ThemeId;

/// Path prefix of shareable session links.
pub const LINK_PREFIX: &str = "/v/";

const DELIMITER: char = '|';
const ESCAPE: char = '\\';

// Browsers' atob tolerates stray trailing bits; old tokens were produced against it.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parameters a sender bakes into a link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    pub recipient: String,
    pub sender: String,
    pub theme: ThemeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionParams {
    pub fn new(recipient: impl Into<String>, sender: impl Into<String>, theme: ThemeId) -> Self {
        Self {
            recipient: recipient.into(),
            sender: sender.into(),
            theme,
            message: None,
        }
    }

    /// Attach a secret message. An empty message means "no message".
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = non_empty(message.into());
        self
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Why a token could not be turned back into [`SessionParams`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("token body is not UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("token body is not a legacy link record: {0}")]
    Legacy(#[from] serde_json::Error),
}

/// Encoder/decoder for link tokens.
pub struct LinkCodec;

impl LinkCodec {
    /// Encode parameters into a URL-path-safe token.
    ///
    /// Callers trim and validate names beforehand (see [`LinkRequest`]); the
    /// codec packs whatever it is given.
    pub fn encode(params: &SessionParams) -> String {
        let mut compact = String::with_capacity(
            params.recipient.len() + params.sender.len() + 8 + params.message.as_ref().map_or(0, String::len),
        );
        push_escaped(&mut compact, &params.recipient);
        compact.push(DELIMITER);
        push_escaped(&mut compact, &params.sender);
        compact.push(DELIMITER);
        compact.push(params.theme.code());
        if let Some(message) = params.message.as_deref().filter(|m| !m.is_empty()) {
            compact.push(DELIMITER);
            compact.push_str(message);
        }
        // URL_SAFE_NO_PAD is standard base64 with '+'->'-', '/'->'_' and the '=' padding stripped.
        URL_SAFE_NO_PAD.encode(compact.as_bytes())
    }

    /// Decode a token; `None` for anything malformed. Never panics.
    pub fn decode(token: &str) -> Option<SessionParams> {
        match Self::try_decode(token) {
            Ok(params) => Some(params),
            Err(err) => {
                warn!(error = %err, token_len = token.len(), "rejecting malformed link token");
                None
            }
        }
    }

    /// Decode a token, reporting why it failed.
    pub fn try_decode(token: &str) -> Result<SessionParams, DecodeError> {
        let mut b64: String = token
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();
        let pad = b64.len() % 4;
        if pad != 0 {
            b64.extend(std::iter::repeat_n('=', 4 - pad));
        }
        let bytes = LENIENT_STANDARD.decode(b64.as_bytes())?;
        let text = String::from_utf8(bytes)?;

        if text.contains(DELIMITER) {
            Ok(parse_compact(&text))
        } else {
            trace!("token has no delimiter, trying legacy record");
            parse_legacy(&text)
        }
    }
}

fn push_escaped(out: &mut String, field: &str) {
    for c in field.chars() {
        if c == ESCAPE || c == DELIMITER {
            out.push(ESCAPE);
        }
        out.push(c);
    }
}

fn parse_compact(text: &str) -> SessionParams {
    let mut fields: [String; 3] = Default::default();
    let mut message = None;
    let mut field = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        match c {
            // Only `\\` and `\|` are escapes; a lone backslash stays literal.
            ESCAPE if matches!(chars.peek(), Some((_, ESCAPE | DELIMITER))) => {
                if let Some((_, escaped)) = chars.next() {
                    fields[field].push(escaped);
                }
            }
            DELIMITER => {
                field += 1;
                if field == fields.len() {
                    message = non_empty(text[idx + c.len_utf8()..].to_owned());
                    break;
                }
            }
            other => fields[field].push(other),
        }
    }
    let [recipient, sender, theme] = fields;
    SessionParams {
        recipient,
        sender,
        theme: ThemeId::resolve_lenient(&theme),
        message,
    }
}

#[derive(Deserialize)]
struct LegacyRecord {
    #[serde(default)]
    recipient: Option<String>,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<LegacyRecord> for SessionParams {
    fn from(rec: LegacyRecord) -> Self {
        SessionParams {
            recipient: rec.recipient.unwrap_or_default(),
            sender: rec.sender.unwrap_or_default(),
            theme: rec
                .theme
                .as_deref()
                .and_then(|t| t.parse().ok())
                .unwrap_or_default(),
            message: rec.message.and_then(non_empty),
        }
    }
}

fn parse_legacy(text: &str) -> Result<SessionParams, DecodeError> {
    if let Ok(unescaped) = percent_decode_str(text).decode_utf8() {
        if let Ok(rec) = serde_json::from_str::<LegacyRecord>(&unescaped) {
            return Ok(rec.into());
        }
    }
    Ok(serde_json::from_str::<LegacyRecord>(text)?.into())
}

/// Path of the shareable link for `params`, e.g. `/v/QWRhfFFpbmd8bg`.
pub fn short_link(params: &SessionParams) -> String {
    format!("{LINK_PREFIX}{}", LinkCodec::encode(params))
}

/// Absolute shareable URL under `origin`.
pub fn share_url(origin: &str, params: &SessionParams) -> String {
    format!("{}{}", origin.trim_end_matches('/'), short_link(params))
}

/// Validation failures when creating a link.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    #[error("recipient name is required")]
    EmptyRecipient,
    #[error("sender name is required")]
    EmptySender,
}

/// Validated link-creation input: trimmed names, optional trimmed message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRequest {
    params: SessionParams,
}

impl LinkRequest {
    pub fn new(
        recipient: &str,
        sender: &str,
        theme: ThemeId,
        message: Option<&str>,
    ) -> Result<Self, LinkError> {
        let recipient = recipient.trim();
        let sender = sender.trim();
        if recipient.is_empty() {
            return Err(LinkError::EmptyRecipient);
        }
        if sender.is_empty() {
            return Err(LinkError::EmptySender);
        }
        let params = SessionParams::new(recipient, sender, theme)
            .with_message(message.map(str::trim).unwrap_or_default());
        Ok(Self { params })
    }

    pub fn params(&self) -> &SessionParams {
        &self.params
    }

    pub fn token(&self) -> String {
        LinkCodec::encode(&self.params)
    }

    pub fn short_link(&self) -> String {
        short_link(&self.params)
    }

    pub fn share_url(&self, origin: &str) -> String {
        share_url(origin, &self.params)
    }
}
