//! Read-only statistics derived from a finished (or running) session.

use serde::{Deserialize, Serialize};

/// Seconds between start and end, rounded to one decimal. Zero when either
/// timestamp is unset (a zero timestamp counts as unset) or the end precedes
/// the start.
pub fn hesitation_time(start_ms: Option<u64>, end_ms: Option<u64>) -> f64 {
    match (start_ms.filter(|t| *t > 0), end_ms.filter(|t| *t > 0)) {
        (Some(start), Some(end)) => {
            let elapsed = end.saturating_sub(start);
            (elapsed as f64 / 100.0).round() / 10.0
        }
        _ => 0.0,
    }
}

/// How hard the recipient resisted, bucketed by rejection count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StubbornnessTier {
    /// 0
    ZeroResistance,
    /// 1–3
    EasyCatch,
    /// 4–7
    BitOfATease,
    /// 8–12
    MadeMeSweat,
    /// 13–20
    HardToGet,
    /// 21–30
    AbsolutelyStubborn,
    /// 31+
    Unhinged,
}

impl StubbornnessTier {
    pub const ALL: [StubbornnessTier; 7] = [
        StubbornnessTier::ZeroResistance,
        StubbornnessTier::EasyCatch,
        StubbornnessTier::BitOfATease,
        StubbornnessTier::MadeMeSweat,
        StubbornnessTier::HardToGet,
        StubbornnessTier::AbsolutelyStubborn,
        StubbornnessTier::Unhinged,
    ];

    pub fn from_spawn_count(count: u32) -> Self {
        match count {
            0 => StubbornnessTier::ZeroResistance,
            1..=3 => StubbornnessTier::EasyCatch,
            4..=7 => StubbornnessTier::BitOfATease,
            8..=12 => StubbornnessTier::MadeMeSweat,
            13..=20 => StubbornnessTier::HardToGet,
            21..=30 => StubbornnessTier::AbsolutelyStubborn,
            _ => StubbornnessTier::Unhinged,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StubbornnessTier::ZeroResistance => "Zero Resistance 😳",
            StubbornnessTier::EasyCatch => "Easy Catch 💋",
            StubbornnessTier::BitOfATease => "Bit of a Tease 😏",
            StubbornnessTier::MadeMeSweat => "Made Me Sweat 🥵",
            StubbornnessTier::HardToGet => "Hard to Get (I Like It) 🔥",
            StubbornnessTier::AbsolutelyStubborn => "ABSOLUTELY STUBBORN 😤",
            StubbornnessTier::Unhinged => "UNHINGED BEHAVIOR 🫠",
        }
    }
}

/// Receipt price, bucketed by rejection count.
///
/// Buckets are total over all counts: 0, 1–3, 4–7, 8–12, 13–15, 16+. The
/// 13–15 bucket is priced below 8–12; that is how the receipt has always read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceTier {
    Priceless,
    Starter,
    Standard,
    Premium,
    MidHigh,
    HardToGetTax,
}

impl PriceTier {
    pub fn from_spawn_count(count: u32) -> Self {
        match count {
            0 => PriceTier::Priceless,
            1..=3 => PriceTier::Starter,
            4..=7 => PriceTier::Standard,
            8..=12 => PriceTier::Premium,
            13..=15 => PriceTier::MidHigh,
            _ => PriceTier::HardToGetTax,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriceTier::Priceless => "$0.00 (Priceless)",
            PriceTier::Starter => "$4.99",
            PriceTier::Standard => "$19.99",
            PriceTier::Premium => "$99.99",
            PriceTier::MidHigh => "$49.99",
            PriceTier::HardToGetTax => "$999.99 (HARD TO GET TAX)",
        }
    }
}
