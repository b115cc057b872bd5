//! Chaos events: the twists thrown at the recipient as they keep clicking NO.
//!
//! The policy is a pure function of the cumulative rejection count. Fixed
//! thresholds fire specific events; beyond the first swap, every third click
//! flips a coin for an extra swap. The coin comes from a [`RandomSource`] so
//! tests and replays can pin it.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use super::clock::{Clock, SystemClock};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChaosEvent {
    #[default]
    None,
    /// Toggle the on-screen order of the accept/reject controls.
    Swap,
    MathChallenge,
    CaptchaChallenge,
    FakeCrash,
    Jumpscare,
    Hacked,
    /// Shrink the reject control to its minimum size.
    Tiny,
    /// Swap the labels of accept and reject.
    Reverse,
    /// From here on the reject control completes the session.
    Confession,
}

/// Fixed click counts and the event each one fires.
pub const CHAOS_THRESHOLDS: [(u32, ChaosEvent); 8] = [
    (5, ChaosEvent::Swap),
    (8, ChaosEvent::MathChallenge),
    (12, ChaosEvent::CaptchaChallenge),
    (15, ChaosEvent::FakeCrash),
    (18, ChaosEvent::Jumpscare),
    (22, ChaosEvent::Hacked),
    (25, ChaosEvent::Tiny),
    (30, ChaosEvent::Reverse),
];

/// Count at which the confession latch engages (and stays engaged).
pub const CONFESSION_AT: u32 = 35;

/// Probability of the bonus swap on eligible clicks.
pub const BONUS_SWAP_CHANCE: f64 = 0.5;

const FIRST_SWAP_AT: u32 = 5;

impl ChaosEvent {
    pub const ALL: [ChaosEvent; 10] = [
        ChaosEvent::None,
        ChaosEvent::Swap,
        ChaosEvent::MathChallenge,
        ChaosEvent::CaptchaChallenge,
        ChaosEvent::FakeCrash,
        ChaosEvent::Jumpscare,
        ChaosEvent::Hacked,
        ChaosEvent::Tiny,
        ChaosEvent::Reverse,
        ChaosEvent::Confession,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChaosEvent::None => "none",
            ChaosEvent::Swap => "swap",
            ChaosEvent::MathChallenge => "math-challenge",
            ChaosEvent::CaptchaChallenge => "captcha-challenge",
            ChaosEvent::FakeCrash => "fake-crash",
            ChaosEvent::Jumpscare => "jumpscare",
            ChaosEvent::Hacked => "hacked",
            ChaosEvent::Tiny => "tiny",
            ChaosEvent::Reverse => "reverse",
            ChaosEvent::Confession => "confession",
        }
    }

    /// Events shown as a modal that stays up until the UI resolves it.
    pub fn is_presentational(self) -> bool {
        matches!(
            self,
            ChaosEvent::MathChallenge
                | ChaosEvent::CaptchaChallenge
                | ChaosEvent::FakeCrash
                | ChaosEvent::Jumpscare
                | ChaosEvent::Hacked
        )
    }

    /// Events that flip a persistent control flag and resolve immediately.
    pub fn is_state_mutating(self) -> bool {
        matches!(
            self,
            ChaosEvent::Swap | ChaosEvent::Tiny | ChaosEvent::Reverse | ChaosEvent::Confession
        )
    }
}

impl fmt::Display for ChaosEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown chaos event '{0}'")]
pub struct UnknownChaosEvent(pub String);

impl FromStr for ChaosEvent {
    type Err = UnknownChaosEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChaosEvent::ALL
            .into_iter()
            .find(|ev| ev.as_str() == s)
            .ok_or_else(|| UnknownChaosEvent(s.to_owned()))
    }
}

/// How the UI reports a presentational event ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChaosOutcome {
    /// Challenge answered "yes"; the game is won.
    Solved,
    /// Wrong answer; the modal stays up.
    Failed,
    /// Skipped, closed, or timed out.
    Dismissed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown chaos outcome '{0}'")]
pub struct UnknownChaosOutcome(pub String);

impl FromStr for ChaosOutcome {
    type Err = UnknownChaosOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solved" => Ok(ChaosOutcome::Solved),
            "failed" => Ok(ChaosOutcome::Failed),
            "dismissed" | "skipped" => Ok(ChaosOutcome::Dismissed),
            other => Err(UnknownChaosOutcome(other.to_owned())),
        }
    }
}

/// Which event the `n`th rejection fires.
pub fn chaos_event_for<R: RandomSource + ?Sized>(n: u32, rng: &mut R) -> ChaosEvent {
    if let Some(&(_, event)) = CHAOS_THRESHOLDS.iter().find(|(at, _)| *at == n) {
        return event;
    }
    if n >= CONFESSION_AT {
        return ChaosEvent::Confession;
    }
    if n > FIRST_SWAP_AT && n % 3 == 0 && rng.chance(BONUS_SWAP_CHANCE) {
        return ChaosEvent::Swap;
    }
    ChaosEvent::None
}

/// Randomness port used by the session and the content fallback.
pub trait RandomSource {
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
    /// Uniform index in `0..len`; `0` when `len == 0`.
    fn index(&mut self, len: usize) -> usize;
}

/// `SmallRng`-backed source.
#[derive(Clone, Debug)]
pub struct SeededRandom(SmallRng);

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Seed from the platform's entropy, or from the clock if that is unavailable.
    pub fn from_entropy() -> Self {
        let mut buf = [0u8; 8];
        let seed = match getrandom::getrandom(&mut buf) {
            Ok(()) => u64::from_le_bytes(buf),
            Err(err) => {
                warn!(error = %err, "no entropy source, seeding from clock");
                SystemClock.now_ms()
            }
        };
        Self::from_seed(seed)
    }
}

impl RandomSource for SeededRandom {
    fn chance(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 { 0 } else { self.0.gen_range(0..len) }
    }
}

/// Replays a fixed list of coin flips (then repeats `fallback`); indices
/// always come out as 0. For tests and deterministic replays.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRandom {
    coins: VecDeque<bool>,
    fallback: bool,
}

impl ScriptedRandom {
    pub fn new(coins: impl IntoIterator<Item = bool>, fallback: bool) -> Self {
        Self {
            coins: coins.into_iter().collect(),
            fallback,
        }
    }

    pub fn always(coin: bool) -> Self {
        Self::new([], coin)
    }
}

impl RandomSource for ScriptedRandom {
    fn chance(&mut self, _p: f64) -> bool {
        self.coins.pop_front().unwrap_or(self.fallback)
    }

    fn index(&mut self, _len: usize) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_fire_regardless_of_coin() {
        for coin in [true, false] {
            let mut rng = ScriptedRandom::always(coin);
            for (at, event) in CHAOS_THRESHOLDS {
                assert_eq!(chaos_event_for(at, &mut rng), event, "click {at}");
            }
        }
    }

    #[test]
    fn confession_from_35_on() {
        let mut rng = ScriptedRandom::always(false);
        for n in [35, 36, 39, 100, u32::MAX] {
            assert_eq!(chaos_event_for(n, &mut rng), ChaosEvent::Confession);
        }
        assert_ne!(chaos_event_for(34, &mut rng), ChaosEvent::Confession);
    }

    #[test]
    fn bonus_swap_only_on_eligible_clicks() {
        let mut heads = ScriptedRandom::always(true);
        let mut tails = ScriptedRandom::always(false);
        for n in [6, 9, 21, 24, 27, 33] {
            assert_eq!(chaos_event_for(n, &mut heads), ChaosEvent::Swap, "click {n}");
            assert_eq!(chaos_event_for(n, &mut tails), ChaosEvent::None, "click {n}");
        }
        for n in [0, 1, 3, 4, 7, 10, 11, 34] {
            assert_eq!(chaos_event_for(n, &mut heads), ChaosEvent::None, "click {n}");
        }
    }

    #[test]
    fn coin_is_consumed_only_when_eligible() {
        let mut rng = ScriptedRandom::new([false, true], false);
        assert_eq!(chaos_event_for(7, &mut rng), ChaosEvent::None);
        assert_eq!(chaos_event_for(6, &mut rng), ChaosEvent::None);
        assert_eq!(chaos_event_for(9, &mut rng), ChaosEvent::Swap);
    }

    #[test]
    fn event_classes_partition_non_none() {
        for ev in ChaosEvent::ALL {
            let classes = [ev.is_presentational(), ev.is_state_mutating()];
            let count = classes.iter().filter(|c| **c).count();
            assert_eq!(count, usize::from(ev != ChaosEvent::None), "{ev}");
            assert_eq!(ev.as_str().parse::<ChaosEvent>(), Ok(ev));
        }
    }

    #[test]
    fn outcomes_parse() {
        assert_eq!("skipped".parse(), Ok(ChaosOutcome::Dismissed));
        assert_eq!("solved".parse(), Ok(ChaosOutcome::Solved));
        assert!("maybe".parse::<ChaosOutcome>().is_err());
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let mut a = SeededRandom::from_seed(7);
        let mut b = SeededRandom::from_seed(7);
        let xs: Vec<bool> = (0..32).map(|_| a.chance(0.5)).collect();
        let ys: Vec<bool> = (0..32).map(|_| b.chance(0.5)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.index(0), 0);
        assert!(a.index(3) < 3);
    }
}
