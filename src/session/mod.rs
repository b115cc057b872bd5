//! Session stage machine: landing → game → wrapped → success.
//!
//! One [`SessionMachine`] owns one [`SessionState`]. Renderers read a
//! [`SessionView`] snapshot and push [`Intent`]s back; nothing here is global.
//! Requests that make no sense from the current stage are ignored (and logged
//! at debug level) rather than reported as errors.

pub mod chaos;
pub mod clock;
pub mod stats;

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SessionConfig;
use crate::fallback::{self, ContentRequest, FallbackContent};
use crate::link::SessionParams;
use crate::theme::ThemeId;
use crate::{QUESTION_VARIANTS, SENDER_UPDATES, TAUNTS};

use self::chaos::{ChaosEvent, ChaosOutcome, RandomSource, SeededRandom, chaos_event_for};
use self::clock::{Clock, SystemClock};
use self::stats::{PriceTier, StubbornnessTier, hesitation_time};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Landing,
    Game,
    Wrapped,
    Success,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Landing => "landing",
            Stage::Game => "game",
            Stage::Wrapped => "wrapped",
            Stage::Success => "success",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-game state of the accept/reject controls.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    pub buttons_swapped: bool,
    pub reverse_labels: bool,
    /// Latched: the reject control now completes the session.
    pub confession: bool,
    pub reject_scale: f64,
    /// Presentational chaos event waiting for the UI to resolve it.
    pub pending: Option<ChaosEvent>,
    pub taunt_index: usize,
    pub question_index: usize,
    pub sender_update_index: Option<usize>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            buttons_swapped: false,
            reverse_labels: false,
            confession: false,
            reject_scale: 1.0,
            pending: None,
            taunt_index: 0,
            question_index: 0,
            sender_update_index: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    stage: Stage,
    recipient_name: String,
    sender_name: String,
    theme: ThemeId,
    custom_message: Option<String>,
    start_time: Option<u64>,
    end_time: Option<u64>,
    spawn_count: u32,
    difficulty: f64,
    controls: ControlState,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            stage: Stage::Landing,
            recipient_name: String::new(),
            sender_name: String::new(),
            theme: ThemeId::default(),
            custom_message: None,
            start_time: None,
            end_time: None,
            spawn_count: 0,
            difficulty: SessionConfig::default().initial_difficulty,
            controls: ControlState::default(),
        }
    }
}

impl SessionState {
    /// Landing-stage state seeded from link parameters.
    pub fn from_params(params: SessionParams) -> Self {
        let mut state = Self::default();
        state.recipient_name = params.recipient;
        state.sender_name = params.sender;
        state.theme = params.theme;
        state.set_custom_message(params.message);
        state
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn recipient_name(&self) -> &str {
        &self.recipient_name
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn theme(&self) -> ThemeId {
        self.theme
    }

    pub fn custom_message(&self) -> Option<&str> {
        self.custom_message.as_deref()
    }

    pub fn start_time(&self) -> Option<u64> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<u64> {
        self.end_time
    }

    pub fn spawn_count(&self) -> u32 {
        self.spawn_count
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn controls(&self) -> &ControlState {
        &self.controls
    }

    pub fn set_recipient_name(&mut self, name: impl Into<String>) {
        self.recipient_name = name.into();
    }

    pub fn set_sender_name(&mut self, name: impl Into<String>) {
        self.sender_name = name.into();
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.theme = theme;
    }

    /// Empty messages are stored as absent.
    pub fn set_custom_message(&mut self, message: Option<String>) {
        self.custom_message = message.filter(|m| !m.is_empty());
    }

    pub fn hesitation_time(&self) -> f64 {
        hesitation_time(self.start_time, self.end_time)
    }

    pub fn stubbornness(&self) -> StubbornnessTier {
        StubbornnessTier::from_spawn_count(self.spawn_count)
    }

    pub fn price(&self) -> PriceTier {
        PriceTier::from_spawn_count(self.spawn_count)
    }

    /// The parameters this session would encode into a link.
    pub fn params(&self) -> SessionParams {
        SessionParams {
            recipient: self.recipient_name.clone(),
            sender: self.sender_name.clone(),
            theme: self.theme,
            message: self.custom_message.clone(),
        }
    }
}

/// User intents reported by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Start,
    RejectionAttempt,
    AcceptAttempt,
    ChaosResolved(ChaosEvent, ChaosOutcome),
    CompleteWrapped,
    ResetRequested,
}

/// Result of a dispatched intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Step {
    pub stage: Stage,
    pub changed: bool,
    pub chaos: ChaosEvent,
}

/// Snapshot handed to renderers.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub stage: Stage,
    pub recipient_name: String,
    pub sender_name: String,
    pub theme: ThemeId,
    pub custom_message: Option<String>,
    pub spawn_count: u32,
    pub difficulty: f64,
    pub hesitation_time: f64,
    pub stubbornness_tier: StubbornnessTier,
    pub stubbornness_label: &'static str,
    pub price_label: &'static str,
    pub controls: ControlState,
    pub taunt: Option<&'static str>,
    pub question: &'static str,
    pub sender_line: String,
    pub accept_label: &'static str,
    pub reject_label: &'static str,
}

pub struct SessionMachine<C: Clock = SystemClock, R: RandomSource = SeededRandom> {
    state: SessionState,
    config: SessionConfig,
    clock: C,
    rng: R,
}

impl SessionMachine<SystemClock, SeededRandom> {
    /// Machine on real time with an entropy-seeded coin.
    pub fn new(state: SessionState) -> Self {
        Self::with_parts(
            state,
            SessionConfig::default(),
            SystemClock,
            SeededRandom::from_entropy(),
        )
    }
}

impl<C: Clock, R: RandomSource> SessionMachine<C, R> {
    pub fn with_parts(mut state: SessionState, config: SessionConfig, clock: C, rng: R) -> Self {
        if state.stage == Stage::Landing && state.start_time.is_none() {
            state.difficulty = config.clamp_difficulty(config.initial_difficulty);
        }
        Self {
            state,
            config,
            clock,
            rng,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Mutable access for parameter setters (e.g. a theme override).
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    fn enter(&mut self, stage: Stage) {
        info!(from = %self.state.stage, to = %stage, "stage changed");
        self.state.stage = stage;
    }

    fn ignore(&self, op: &'static str) -> bool {
        debug!(op, stage = %self.state.stage, "ignored transition");
        false
    }

    /// landing → game. Stamps the start time and zeroes the counter.
    pub fn start(&mut self) -> bool {
        if self.state.stage != Stage::Landing {
            return self.ignore("start");
        }
        self.state.start_time = Some(self.clock.now_ms());
        self.state.end_time = None;
        self.state.spawn_count = 0;
        self.state.controls = ControlState::default();
        self.enter(Stage::Game);
        true
    }

    /// Count one NO click and return the chaos event it fired.
    ///
    /// Outside the game stage this does nothing and returns [`ChaosEvent::None`].
    pub fn register_rejection(&mut self) -> ChaosEvent {
        if self.state.stage != Stage::Game {
            self.ignore("register_rejection");
            return ChaosEvent::None;
        }
        let cfg = &self.config;
        let state = &mut self.state;
        state.spawn_count = state.spawn_count.saturating_add(1);
        let n = state.spawn_count;

        let step = if n > cfg.steep_after {
            cfg.steep_step
        } else {
            cfg.gentle_step
        };
        state.difficulty = cfg.clamp_difficulty(state.difficulty + step);

        let controls = &mut state.controls;
        controls.reject_scale = (controls.reject_scale - cfg.reject_shrink_step).max(cfg.reject_min_scale);
        controls.taunt_index = (controls.taunt_index + 1) % TAUNTS.len();
        if n > 3 && n % 4 == 0 {
            controls.question_index = (controls.question_index + 1).min(QUESTION_VARIANTS.len() - 1);
        }
        if n > 2 && n % 3 == 0 {
            let next = controls.sender_update_index.map_or(0, |i| i + 1);
            controls.sender_update_index = Some(next.min(SENDER_UPDATES.len() - 1));
        }

        let event = chaos_event_for(n, &mut self.rng);
        match event {
            ChaosEvent::None => {}
            ChaosEvent::Swap => controls.buttons_swapped = !controls.buttons_swapped,
            ChaosEvent::Tiny => controls.reject_scale = cfg.tiny_scale,
            ChaosEvent::Reverse => controls.reverse_labels = true,
            ChaosEvent::Confession => controls.confession = true,
            modal => controls.pending = Some(modal),
        }
        if event != ChaosEvent::None {
            debug!(click = n, %event, "chaos event");
        }
        event
    }

    /// game → wrapped. Stamps the end time; any pending modal is dropped.
    pub fn finish(&mut self) -> bool {
        if self.state.stage != Stage::Game {
            return self.ignore("finish");
        }
        self.state.end_time = Some(self.clock.now_ms());
        self.state.controls.pending = None;
        self.enter(Stage::Wrapped);
        true
    }

    /// wrapped → success.
    pub fn complete_wrapped(&mut self) -> bool {
        if self.state.stage != Stage::Wrapped {
            return self.ignore("complete_wrapped");
        }
        self.enter(Stage::Success);
        true
    }

    /// Back to landing from anywhere. Names, theme and message are kept;
    /// progress, timing and pending modals are discarded.
    pub fn reset(&mut self) {
        let state = &mut self.state;
        state.start_time = None;
        state.end_time = None;
        state.spawn_count = 0;
        state.difficulty = self.config.clamp_difficulty(self.config.initial_difficulty);
        state.controls = ControlState::default();
        if state.stage != Stage::Landing {
            self.enter(Stage::Landing);
        }
    }

    /// The UI finished showing a presentational chaos event.
    ///
    /// Ignored unless `kind` is the pending event.
    pub fn resolve_chaos(&mut self, kind: ChaosEvent, outcome: ChaosOutcome) -> bool {
        if self.state.stage != Stage::Game || self.state.controls.pending != Some(kind) {
            return self.ignore("resolve_chaos");
        }
        match outcome {
            ChaosOutcome::Solved => {
                self.state.controls.pending = None;
                self.finish()
            }
            ChaosOutcome::Failed => false,
            ChaosOutcome::Dismissed => {
                self.state.controls.pending = None;
                true
            }
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Step {
        let before = self.state.stage;
        let mut chaos = ChaosEvent::None;
        match intent {
            Intent::Start => {
                self.start();
            }
            Intent::RejectionAttempt => {
                if self.state.controls.confession {
                    self.finish();
                } else {
                    chaos = self.register_rejection();
                }
            }
            Intent::AcceptAttempt => {
                self.finish();
            }
            Intent::ChaosResolved(kind, outcome) => {
                self.resolve_chaos(kind, outcome);
            }
            Intent::CompleteWrapped => {
                self.complete_wrapped();
            }
            Intent::ResetRequested => self.reset(),
        }
        Step {
            stage: self.state.stage,
            changed: self.state.stage != before,
            chaos,
        }
    }

    pub fn hesitation_time(&self) -> f64 {
        self.state.hesitation_time()
    }

    pub fn stubbornness(&self) -> StubbornnessTier {
        self.state.stubbornness()
    }

    pub fn price(&self) -> PriceTier {
        self.state.price()
    }

    pub fn content_request(&self) -> ContentRequest {
        ContentRequest {
            spawn_count: self.state.spawn_count,
            hesitation_time: self.hesitation_time(),
            recipient_name: self.state.recipient_name.clone(),
            sender_name: self.state.sender_name.clone(),
        }
    }

    /// Local stand-in for the remote poem/sentiment service.
    pub fn fallback_content(&mut self) -> FallbackContent {
        let request = self.content_request();
        fallback::content(&request, &mut self.rng)
    }

    pub fn view(&self) -> SessionView {
        let state = &self.state;
        let controls = &state.controls;
        let tier = state.stubbornness();
        let sender_line = match controls.sender_update_index {
            Some(idx) => SENDER_UPDATES[idx].replace("{name}", &state.sender_name),
            None => format!("From {} 💌", state.sender_name),
        };
        let accept_label = if controls.reverse_labels && !controls.confession {
            "NO 💔"
        } else {
            "YES 💕"
        };
        let reject_label = if controls.confession {
            "I give up 🏳️"
        } else if controls.reverse_labels {
            "YES 💕"
        } else {
            "NO"
        };
        SessionView {
            stage: state.stage,
            recipient_name: state.recipient_name.clone(),
            sender_name: state.sender_name.clone(),
            theme: state.theme,
            custom_message: state.custom_message.clone(),
            spawn_count: state.spawn_count,
            difficulty: state.difficulty,
            hesitation_time: state.hesitation_time(),
            stubbornness_tier: tier,
            stubbornness_label: tier.label(),
            price_label: state.price().label(),
            controls: controls.clone(),
            taunt: (state.spawn_count > 0).then(|| TAUNTS[controls.taunt_index]),
            question: QUESTION_VARIANTS[controls.question_index],
            sender_line,
            accept_label,
            reject_label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::chaos::ScriptedRandom;
    use super::clock::ManualClock;
    use super::*;
    use tracing_test::traced_test;

    fn machine(coin: bool) -> (SessionMachine<ManualClock, ScriptedRandom>, ManualClock) {
        let clock = ManualClock::new(10_000);
        let params = SessionParams::new("Ada", "Qing", ThemeId::Neon);
        let m = SessionMachine::with_parts(
            SessionState::from_params(params),
            SessionConfig::default(),
            clock.clone(),
            ScriptedRandom::always(coin),
        );
        (m, clock)
    }

    #[test]
    fn starts_on_landing_with_defaults() {
        let (m, _) = machine(false);
        assert_eq!(m.stage(), Stage::Landing);
        assert_eq!(m.state().spawn_count(), 0);
        assert_eq!(m.state().difficulty(), 5.0);
        assert_eq!(m.state().start_time(), None);
    }

    #[test]
    fn only_listed_transitions_move_the_stage() {
        let (mut m, _) = machine(false);
        assert!(!m.finish());
        assert!(!m.complete_wrapped());
        assert_eq!(m.register_rejection(), ChaosEvent::None);
        assert_eq!(m.state().spawn_count(), 0);
        assert_eq!(m.stage(), Stage::Landing);

        assert!(m.start());
        assert!(!m.start());
        assert!(!m.complete_wrapped());
        assert_eq!(m.stage(), Stage::Game);

        assert!(m.finish());
        assert!(!m.start());
        assert!(!m.finish());
        assert_eq!(m.register_rejection(), ChaosEvent::None);
        assert_eq!(m.stage(), Stage::Wrapped);

        assert!(m.complete_wrapped());
        assert_eq!(m.stage(), Stage::Success);
    }

    #[test]
    fn timestamps_are_set_once() {
        let (mut m, clock) = machine(false);
        m.start();
        assert_eq!(m.state().start_time(), Some(10_000));
        clock.advance(2_000);
        m.start();
        assert_eq!(m.state().start_time(), Some(10_000));
        m.finish();
        clock.advance(5_000);
        m.finish();
        assert_eq!(m.state().end_time(), Some(12_000));
        assert_eq!(m.hesitation_time(), 2.0);
    }

    #[test]
    fn difficulty_ramp_gentle_then_steep_then_clamped() {
        let (mut m, _) = machine(false);
        m.start();
        for _ in 0..5 {
            m.register_rejection();
        }
        assert!((m.state().difficulty() - 6.0).abs() < 1e-9);
        m.register_rejection();
        assert!((m.state().difficulty() - 6.5).abs() < 1e-9);
        for _ in 0..100 {
            m.register_rejection();
            assert!(m.state().difficulty() <= 10.0);
        }
        assert_eq!(m.state().difficulty(), 10.0);
    }

    #[test]
    fn state_mutating_events_flip_flags_without_pending() {
        let (mut m, _) = machine(false);
        m.start();
        for _ in 0..4 {
            m.register_rejection();
        }
        assert_eq!(m.register_rejection(), ChaosEvent::Swap);
        assert!(m.state().controls().buttons_swapped);
        assert_eq!(m.state().controls().pending, None);
    }

    #[test]
    fn presentational_events_stay_pending_until_resolved() {
        let (mut m, _) = machine(false);
        m.start();
        for _ in 0..7 {
            m.register_rejection();
        }
        assert_eq!(m.register_rejection(), ChaosEvent::MathChallenge);
        assert_eq!(m.state().controls().pending, Some(ChaosEvent::MathChallenge));

        assert!(!m.resolve_chaos(ChaosEvent::Hacked, ChaosOutcome::Dismissed));
        assert!(!m.resolve_chaos(ChaosEvent::MathChallenge, ChaosOutcome::Failed));
        assert_eq!(m.state().controls().pending, Some(ChaosEvent::MathChallenge));

        assert!(m.resolve_chaos(ChaosEvent::MathChallenge, ChaosOutcome::Dismissed));
        assert_eq!(m.state().controls().pending, None);
        assert_eq!(m.stage(), Stage::Game);
    }

    #[test]
    fn solving_a_challenge_finishes_the_game() {
        let (mut m, clock) = machine(false);
        m.start();
        for _ in 0..12 {
            m.register_rejection();
        }
        assert_eq!(m.state().controls().pending, Some(ChaosEvent::CaptchaChallenge));
        clock.advance(4_200);
        assert!(m.resolve_chaos(ChaosEvent::CaptchaChallenge, ChaosOutcome::Solved));
        assert_eq!(m.stage(), Stage::Wrapped);
        assert_eq!(m.hesitation_time(), 4.2);
        assert_eq!(m.state().controls().pending, None);
    }

    #[test]
    fn reset_discards_progress_and_pending_modal() {
        let (mut m, _) = machine(false);
        m.start();
        for _ in 0..15 {
            m.register_rejection();
        }
        assert_eq!(m.state().controls().pending, Some(ChaosEvent::FakeCrash));
        m.reset();
        let s = m.state();
        assert_eq!(s.stage(), Stage::Landing);
        assert_eq!(s.spawn_count(), 0);
        assert_eq!(s.start_time(), None);
        assert_eq!(s.end_time(), None);
        assert_eq!(s.difficulty(), 5.0);
        assert_eq!(s.controls(), &ControlState::default());
        assert_eq!(s.recipient_name(), "Ada");
        assert_eq!(s.theme(), ThemeId::Neon);
    }

    #[test]
    fn confession_turns_reject_into_finish() {
        let (mut m, _) = machine(false);
        m.dispatch(Intent::Start);
        for _ in 0..34 {
            m.dispatch(Intent::RejectionAttempt);
        }
        let step = m.dispatch(Intent::RejectionAttempt);
        assert_eq!(step.chaos, ChaosEvent::Confession);
        assert!(m.state().controls().confession);
        assert_eq!(m.view().reject_label, "I give up 🏳️");

        let step = m.dispatch(Intent::RejectionAttempt);
        assert!(step.changed);
        assert_eq!(step.stage, Stage::Wrapped);
        assert_eq!(m.state().spawn_count(), 35);
    }

    #[test]
    fn reject_control_shrinks_then_tiny() {
        let (mut m, _) = machine(false);
        m.start();
        m.register_rejection();
        assert!((m.state().controls().reject_scale - 0.95).abs() < 1e-9);
        for _ in 0..23 {
            m.register_rejection();
        }
        assert!((m.state().controls().reject_scale - 0.3).abs() < 1e-9);
        assert_eq!(m.register_rejection(), ChaosEvent::Tiny);
        assert_eq!(m.state().controls().reject_scale, 0.15);
    }

    #[test]
    fn view_tracks_taunts_questions_and_sender_line() {
        let (mut m, _) = machine(false);
        m.start();
        let v = m.view();
        assert_eq!(v.taunt, None);
        assert_eq!(v.question, QUESTION_VARIANTS[0]);
        assert_eq!(v.sender_line, "From Qing 💌");

        for _ in 0..4 {
            m.register_rejection();
        }
        let v = m.view();
        assert_eq!(v.taunt, Some(TAUNTS[4]));
        assert_eq!(v.question, QUESTION_VARIANTS[1]);
        assert_eq!(v.sender_line, SENDER_UPDATES[0].replace("{name}", "Qing"));
        assert_eq!(v.stubbornness_tier, StubbornnessTier::BitOfATease);
    }

    #[test]
    fn reverse_swaps_labels() {
        let (mut m, _) = machine(false);
        m.start();
        for _ in 0..30 {
            m.register_rejection();
        }
        let v = m.view();
        assert!(v.controls.reverse_labels);
        assert_eq!(v.accept_label, "NO 💔");
        assert_eq!(v.reject_label, "YES 💕");
    }

    #[test]
    fn view_serializes_camel_case() {
        let (m, _) = machine(false);
        let json = serde_json::to_value(m.view()).unwrap();
        assert_eq!(json["stage"], "landing");
        assert_eq!(json["recipientName"], "Ada");
        assert_eq!(json["theme"], "neon");
        assert_eq!(json["controls"]["rejectScale"], 1.0);
    }

    #[test]
    #[traced_test]
    fn ignored_transitions_are_logged() {
        let (mut m, _) = machine(false);
        m.finish();
        assert!(logs_contain("ignored transition"));
        m.start();
        assert!(logs_contain("stage changed"));
    }
}
