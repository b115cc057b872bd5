//! JS-facing surface.
//!
//! Link helpers are free functions; a page holds one [`ValentineSession`] and
//! pushes clicks into it. Structured values cross the boundary as JSON strings.

use thiserror::Error;
use tracing::info;
use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, SessionConfig};
use crate::link::{LinkCodec, LinkError, LinkRequest};
use crate::route::{BootstrapError, bootstrap_href};
use crate::session::chaos::{
    ChaosEvent, ChaosOutcome, SeededRandom, UnknownChaosEvent, UnknownChaosOutcome,
};
use crate::session::clock::SystemClock;
use crate::session::{Intent, SessionMachine, SessionState};
use crate::theme::{ThemeId, UnknownTheme};

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Theme(#[from] UnknownTheme),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    ChaosEvent(#[from] UnknownChaosEvent),
    #[error(transparent)]
    ChaosOutcome(#[from] UnknownChaosOutcome),
    #[error("serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no browser window")]
    NoWindow,
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn link_request(
    recipient: &str,
    sender: &str,
    theme: &str,
    message: Option<String>,
) -> Result<LinkRequest, WebError> {
    let theme: ThemeId = theme.parse()?;
    Ok(LinkRequest::new(recipient, sender, theme, message.as_deref())?)
}

/// Token for a validated link request.
#[wasm_bindgen(js_name = encodeLink)]
pub fn encode_link(
    recipient: &str,
    sender: &str,
    theme: &str,
    message: Option<String>,
) -> Result<String, JsValue> {
    Ok(link_request(recipient, sender, theme, message)?.token())
}

/// `/v/{token}` path for a validated link request.
#[wasm_bindgen(js_name = shortLink)]
pub fn short_link(
    recipient: &str,
    sender: &str,
    theme: &str,
    message: Option<String>,
) -> Result<String, JsValue> {
    Ok(link_request(recipient, sender, theme, message)?.short_link())
}

/// Decoded parameters as JSON, or `undefined` for a bad token.
#[wasm_bindgen(js_name = decodeLink)]
pub fn decode_link(token: &str) -> Option<String> {
    let params = LinkCodec::decode(token)?;
    serde_json::to_string(&params).ok()
}

type BrowserMachine = SessionMachine<SystemClock, SeededRandom>;

#[wasm_bindgen]
pub struct ValentineSession {
    machine: BrowserMachine,
}

impl ValentineSession {
    fn boot(state: SessionState, config: SessionConfig) -> Self {
        info!(theme = %state.theme(), "session created");
        Self {
            machine: SessionMachine::with_parts(
                state,
                config,
                SystemClock,
                SeededRandom::from_entropy(),
            ),
        }
    }

    pub fn machine(&self) -> &BrowserMachine {
        &self.machine
    }

    fn from_href_with(href: &str, config: SessionConfig) -> Result<Self, WebError> {
        Ok(Self::boot(bootstrap_href(href)?, config))
    }

    fn resolve(&mut self, kind: &str, outcome: &str) -> Result<bool, WebError> {
        let kind: ChaosEvent = kind.parse()?;
        let outcome: ChaosOutcome = outcome.parse()?;
        Ok(self.machine.resolve_chaos(kind, outcome))
    }
}

#[wasm_bindgen]
impl ValentineSession {
    /// Fresh landing-stage session, as previewed from the link creator.
    #[wasm_bindgen(constructor)]
    pub fn new(
        recipient: &str,
        sender: &str,
        theme: &str,
        message: Option<String>,
    ) -> Result<ValentineSession, JsValue> {
        let request = link_request(recipient, sender, theme, message)?;
        let state = SessionState::from_params(request.params().clone());
        Ok(Self::boot(state, SessionConfig::default()))
    }

    #[wasm_bindgen(js_name = fromHref)]
    pub fn from_href(href: &str) -> Result<ValentineSession, JsValue> {
        Ok(Self::from_href_with(href, SessionConfig::default())?)
    }

    #[wasm_bindgen(js_name = fromLocation)]
    pub fn from_location() -> Result<ValentineSession, JsValue> {
        let window = web_sys::window().ok_or(WebError::NoWindow)?;
        let href = window.location().href()?;
        Self::from_href(&href)
    }

    /// Like `fromHref` with a (possibly partial) JSON `SessionConfig`.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(href: &str, config_json: &str) -> Result<ValentineSession, JsValue> {
        let config = SessionConfig::from_json(config_json).map_err(WebError::from)?;
        Ok(Self::from_href_with(href, config)?)
    }

    pub fn start(&mut self) -> bool {
        self.machine.dispatch(Intent::Start).changed
    }

    /// Handle a NO click; returns the chaos event name (`"none"` if nothing fired).
    pub fn reject(&mut self) -> String {
        self.machine
            .dispatch(Intent::RejectionAttempt)
            .chaos
            .as_str()
            .to_owned()
    }

    pub fn accept(&mut self) -> bool {
        self.machine.dispatch(Intent::AcceptAttempt).changed
    }

    #[wasm_bindgen(js_name = resolveChaos)]
    pub fn resolve_chaos(&mut self, kind: &str, outcome: &str) -> Result<bool, JsValue> {
        Ok(self.resolve(kind, outcome)?)
    }

    #[wasm_bindgen(js_name = completeWrapped)]
    pub fn complete_wrapped(&mut self) -> bool {
        self.machine.dispatch(Intent::CompleteWrapped).changed
    }

    pub fn reset(&mut self) {
        self.machine.dispatch(Intent::ResetRequested);
    }

    pub fn stage(&self) -> String {
        self.machine.stage().as_str().to_owned()
    }

    /// Renderer snapshot as JSON.
    pub fn view(&self) -> Result<String, JsValue> {
        Ok(serde_json::to_string(&self.machine.view()).map_err(WebError::from)?)
    }

    #[wasm_bindgen(js_name = hesitationTime)]
    pub fn hesitation_time(&self) -> f64 {
        self.machine.hesitation_time()
    }

    /// Canned poem/personality/sentiment as JSON.
    #[wasm_bindgen(js_name = fallbackContent)]
    pub fn fallback_content(&mut self) -> Result<String, JsValue> {
        let content = self.machine.fallback_content();
        Ok(serde_json::to_string(&content).map_err(WebError::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Stage;

    // Only success paths run natively: building a JsValue needs a wasm host.

    #[test]
    fn link_request_parses_theme_and_trims() {
        let req = link_request("  Ada ", "Qing", "neon", Some(" hi ".into())).unwrap();
        assert_eq!(req.params().recipient, "Ada");
        assert_eq!(req.params().message.as_deref(), Some("hi"));
        assert!(matches!(
            link_request("Ada", "Qing", "plaid", None),
            Err(WebError::Theme(_))
        ));
        assert!(matches!(
            link_request(" ", "Qing", "neon", None),
            Err(WebError::Link(LinkError::EmptyRecipient))
        ));
    }

    #[test]
    fn decode_link_emits_json() {
        let token = encode_link("Ada", "Qing", "retro", None).unwrap();
        let json = decode_link(&token).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["recipient"], "Ada");
        assert_eq!(value["theme"], "retro");
        assert_eq!(decode_link("%%%"), None);
    }

    #[test]
    fn session_handle_drives_the_machine() {
        let token = encode_link("Ada", "Qing", "neon", None).unwrap();
        let href = format!("https://val.example/v/{token}");
        let mut session = ValentineSession::from_href_with(&href, SessionConfig::default()).unwrap();
        assert_eq!(session.stage(), "landing");
        assert!(session.start());
        for _ in 0..4 {
            session.reject();
        }
        assert_eq!(session.reject(), "swap");
        assert!(session.machine().state().controls().buttons_swapped);
        assert!(!session.resolve("hacked", "dismissed").unwrap());
        assert!(session.resolve("math", "solved").is_err());
        assert!(session.accept());
        assert_eq!(session.machine().stage(), Stage::Wrapped);
        assert!(session.complete_wrapped());
        assert_eq!(session.stage(), "success");
        session.reset();
        assert_eq!(session.stage(), "landing");
    }

    #[test]
    fn bad_href_is_reported() {
        assert!(matches!(
            ValentineSession::from_href_with("https://val.example/v/%%%", SessionConfig::default()),
            Err(WebError::Bootstrap(BootstrapError::NotFound))
        ));
    }
}
