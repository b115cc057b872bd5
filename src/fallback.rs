//! Canned stand-in for the remote poem/sentiment service.
//!
//! Used when the remote service is unreachable, rate limited or not configured.
//! Everything is keyed by [`StubbornnessTier`] so the tone tracks how long the
//! recipient held out.

use serde::{Deserialize, Serialize};

use crate::session::chaos::RandomSource;
use crate::session::stats::StubbornnessTier;

/// What the content service is asked about.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub spawn_count: u32,
    pub hesitation_time: f64,
    pub recipient_name: String,
    pub sender_name: String,
}

/// Scores are percentages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentiment {
    pub excitement: u8,
    pub hesitation: u8,
    pub playfulness: u8,
    pub romance: u8,
    pub mood_label: &'static str,
    pub emoji: &'static str,
    /// One-line caption shown under the mood.
    pub description: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackContent {
    pub tier: StubbornnessTier,
    pub poem: String,
    pub personality: &'static str,
    pub sentiment: Sentiment,
}

const fn mood(
    (excitement, hesitation, playfulness, romance): (u8, u8, u8, u8),
    mood_label: &'static str,
    emoji: &'static str,
    description: &'static str,
) -> Sentiment {
    Sentiment {
        excitement,
        hesitation,
        playfulness,
        romance,
        mood_label,
        emoji,
        description,
    }
}

struct TierPool {
    personalities: &'static [&'static str],
    sentiments: &'static [Sentiment],
    poems: &'static [&'static str],
}

const ZERO: TierPool = TierPool {
    personalities: &[
        "Your resistance? Non-existent. You saw what you wanted and claimed it immediately!",
        "Zero hesitation energy! You know a good thing when you see it.",
        "You said YES faster than I could blink. Respect.",
    ],
    sentiments: &[
        mood((95, 5, 30, 90), "Instantly Smitten", "😍", "You couldn't click YES fast enough!"),
        mood((98, 2, 25, 95), "Love at First Sight", "💘", "Zero hesitation, pure romance!"),
        mood((100, 0, 20, 100), "Absolutely Certain", "💖", "The fastest YES in history!"),
    ],
    poems: ZERO_RESISTANCE_POEMS,
};

const EASY: TierPool = TierPool {
    personalities: &[
        "A little playful resistance, but your heart knew the answer all along!",
        "You played it cool for like... 3 whole seconds. Iconic.",
        "Just enough hesitation to be cute, not enough to be annoying!",
    ],
    sentiments: &[
        mood((85, 20, 60, 80), "Playfully Shy", "🥰", "A little hesitation, but the heart won!"),
        mood((88, 15, 55, 85), "Adorably Hesitant", "🙈", "Played it cool for exactly 3 seconds!"),
    ],
    poems: LIGHT_RESISTANCE_POEMS,
};

const TEASE: TierPool = TierPool {
    personalities: &[
        "A certified tease. You made me work for it, and I respect that.",
        "You enjoyed the chase a little too much. Noted.",
        "Flirty, stubborn, and fully aware of what you were doing.",
    ],
    sentiments: &[
        mood((78, 35, 80, 72), "Certified Tease", "😏", "You made me work for it!"),
        mood((80, 30, 85, 70), "Charmingly Coy", "☺️", "A little tease never hurt anyone!"),
    ],
    poems: LIGHT_RESISTANCE_POEMS,
};

const SWEAT: TierPool = TierPool {
    personalities: &[
        "You had me sweating for a minute there. Worth it.",
        "Hard to get, easy to love. Classic combo.",
        "You made this a whole workout. Cardio for the heart.",
    ],
    sentiments: &[
        mood((70, 55, 85, 65), "Worth The Chase", "🏆", "Made the victory extra sweet!"),
        mood((72, 50, 80, 68), "Tough Cookie", "💪", "Resistance level: Impressive!"),
    ],
    poems: MODERATE_RESISTANCE_POEMS,
};

const HARD: TierPool = TierPool {
    personalities: &[
        "Very stubborn, very committed to the bit. Still ended up here.",
        "You fought the YES button like it owed you money.",
        "Resistance level: main character. Ending: romance.",
    ],
    sentiments: &[
        mood((69, 65, 88, 62), "Hard To Please", "👑", "Royalty doesn't surrender easily!"),
        mood((67, 70, 90, 60), "Controlled Chaos", "🎪", "Every click was a mini drama!"),
    ],
    poems: MODERATE_RESISTANCE_POEMS,
};

const STUBBORN: TierPool = TierPool {
    personalities: &[
        "Historic levels of stubbornness. Legendary!",
        "You fought like a final boss. Defeated!",
        "Absolute UNIT of resistance. Still won though!",
    ],
    sentiments: &[
        mood((60, 85, 95, 58), "Maximum Resistance", "💪", "You put up a legendary fight!"),
        mood((61, 80, 92, 60), "Boss Battle Energy", "😤", "Final boss of dating apps!"),
    ],
    poems: HEAVY_RESISTANCE_POEMS,
};

const UNHINGED: TierPool = TierPool {
    personalities: &[
        "You're wonderfully chaotic and I love that!",
        "This took FOREVER. Worth it? Debatable. Memorable? Absolutely!",
        "You're certifiably unhinged. So am I. Match made in chaos!",
    ],
    sentiments: &[
        mood((50, 95, 100, 55), "Unbreakable Will", "🫠", "Absolute legend. The resistance was REAL."),
        mood((48, 90, 98, 57), "Chaos Incarnate", "🌪️", "You're absolutely UNHINGED (in the best way)!"),
    ],
    poems: EXTREME_RESISTANCE_POEMS,
};

fn pool(tier: StubbornnessTier) -> &'static TierPool {
    match tier {
        StubbornnessTier::ZeroResistance => &ZERO,
        StubbornnessTier::EasyCatch => &EASY,
        StubbornnessTier::BitOfATease => &TEASE,
        StubbornnessTier::MadeMeSweat => &SWEAT,
        StubbornnessTier::HardToGet => &HARD,
        StubbornnessTier::AbsolutelyStubborn => &STUBBORN,
        StubbornnessTier::Unhinged => &UNHINGED,
    }
}

const ZERO_RESISTANCE_POEMS: &[&str] = &[
    "Zero hesitation, just straight to the yes,\nNo games with you, I must confess.\nYou saw the vibe, you caught the feels,\nThis instant love? {name}, it's real. 💕",
    "Not even a second to think it through,\nYou already knew what you wanted to do.\nInstant yes, no playing around,\nLooks like your soulmate's been found. 💖",
    "One look was all it ever took,\nYou read my heart like an open book.\nNo chase required, we're past that stage,\nThis love story starts on the same page. 💕",
    "Zero resistance, maximum rizz,\nYou knew exactly what the assignment is.\nNo need to run, no need to hide,\nYou chose to stay right by my side. 🔥",
    "No drama, no chase, just pure connection,\nYou gave your heart without objection.\nSome call it fast, I call it fate,\nWe both knew we couldn't wait. 💖",
];

const LIGHT_RESISTANCE_POEMS: &[&str] = &[
    "{count} little no's before you caved,\nPlaying coy, but your heart behaved.\nThat tiny chase was kinda cute,\nBut {name}, you know I'm absolute. 💕",
    "You teased me {count} times, I'll let it slide,\nBut we both knew you couldn't hide.\nA little resistance adds some spice,\nNow you're mine, and that's so nice. 🔥",
    "Took {count} tries to get you to admit,\nBut we both knew this was it.\nA little chase, a little play,\nNow you're stuck with me, by the way. 💖",
    "Only {count} times you pushed me away,\nBefore your heart had the final say.\nPlaying hard to get? That's fine,\nThe point is now you're finally mine. 🔥",
    "{count} no's couldn't stop what's meant to be,\nYou played it cool but wanted me.\nNow drop the act, embrace the feels,\nThis is love, and baby, it's real. 💕",
];

const MODERATE_RESISTANCE_POEMS: &[&str] = &[
    "{count} times you said no, made me earn it,\nBut I never once thought to quit.\nYou're worth every single click,\nStubborn love hits different, quick. 💕",
    "You really made me work for this,\n{count} rejections before the kiss.\nBut champions train for moments like these,\nNow you're mine, yeah, down on my knees. 🔥",
    "Stubborn one, aren't you? That's okay,\n{count} no's won't make me go away.\nI love a challenge, love the chase,\nNow look at the smile on your face. 💖",
    "Made me chase {count} times around,\nBut look who's caught, who's finally found.\nYou built your walls up really high,\nI climbed them all, won't even lie. 🔥",
    "Every \"no\" was a test, I knew,\n{count} of them before the breakthrough.\nBut here's the truth, {name},\nI'd do it again just to call you mine. 💖",
];

const HEAVY_RESISTANCE_POEMS: &[&str] = &[
    "{count} rejections? You're a whole mood,\nBut I never once changed my attitude.\nYou made me earn every single inch,\nBut loving you? That was a cinch. 💕",
    "They'll write legends about your resistance,\n{count} times you tested my persistence.\nBut look at us now, baby, look,\nI'm the ending of your book. 🔥",
    "Stubborn level: legendary mode,\n{count} times down this rocky road.\nBut I'm built different, won't back down,\nNow you're wearing love's crown. 💖",
    "{count} whole attempts before you cracked,\nYour walls were up, defenses stacked.\nBut love finds ways through any door,\nNow you're mine forevermore. 💕",
    "You gave me {count} reasons to leave,\nBut I gave you one reason to believe.\nSometimes the hardest ones to break\nAre the ones worth every heartache. 🔥",
];

const EXTREME_RESISTANCE_POEMS: &[&str] = &[
    "{count} TIMES? {name}, you're unhinged,\nMy finger's literally feeling singed.\nBut you know what? It's kinda hot,\nThat crazy resistance you've got. 💕",
    "Legend has it {count} is the number,\nThe amount of times you made me wonder.\nBut here we are, chaos complete,\nMy stubborn love just can't be beat. 🔥",
    "{count} clicks of pure insanity,\nTesting the limits of my sanity.\nBut I'm just as crazy, that's the catch,\nLooks like we're a perfect match. 💕",
    "{count}? That's not resistance, that's WAR,\nBut look who won, keeping score.\nYou brought the chaos, I brought the love,\nWe fit together like hand and glove. 💕",
    "If I had a dollar for each no,\n{count} dollars would be quite the show.\nBut I'd trade them all for this moment here,\nYou saying yes, loud and clear. 💖",
];

const POEM_INTROS: &[&str] = &[
    "{count} times you said no,",
    "You clicked reject {count} times,",
    "After {count} rejections,",
    "{count} attempts to push me away,",
];

const POEM_MIDDLES: &[&str] = &[
    "but here we are, standing tall,\n",
    "yet love refused to fall,\n",
    "still my heart answered the call,\n",
    "but none of that matters at all,\n",
];

const POEM_ENDINGS: &[&str] = &[
    "Now you're mine, {name}, and that's the deal,\nThis love between us is completely real. 💕",
    "Because in the end, love always wins,\nAnd with you, my forever begins. 💖",
    "Your resistance made this love worthwhile,\nNow let me see you smile. 🔥",
    "What matters now is we're finally here,\nTogether, with nothing left to fear. 💕",
];

/// Chance that a poem for a non-zero count is stitched from fragments
/// instead of drawn from the tier's pool.
pub const HYBRID_POEM_CHANCE: f64 = 0.25;

fn pick<R: RandomSource + ?Sized>(items: &'static [&'static str], rng: &mut R) -> &'static str {
    items[rng.index(items.len()).min(items.len() - 1)]
}

fn fill(template: &str, spawn_count: u32, recipient: &str) -> String {
    let name = if recipient.trim().is_empty() { "babe" } else { recipient };
    template
        .replace("{count}", &spawn_count.to_string())
        .replace("{name}", name)
}

/// Poem for the wrapped slides, drawn from the pool of the count's
/// stubbornness tier. `{count}` and `{name}` are filled in; an empty name
/// becomes "babe".
pub fn poem<R: RandomSource + ?Sized>(spawn_count: u32, recipient: &str, rng: &mut R) -> String {
    if spawn_count > 0 && rng.chance(HYBRID_POEM_CHANCE) {
        return hybrid_poem(spawn_count, recipient, rng);
    }
    let tier = StubbornnessTier::from_spawn_count(spawn_count);
    fill(pick(pool(tier).poems, rng), spawn_count, recipient)
}

/// Intro, middle and ending picked independently, for extra variety.
pub fn hybrid_poem<R: RandomSource + ?Sized>(spawn_count: u32, recipient: &str, rng: &mut R) -> String {
    let template = format!(
        "{} {}{}",
        pick(POEM_INTROS, rng),
        pick(POEM_MIDDLES, rng),
        pick(POEM_ENDINGS, rng)
    );
    fill(&template, spawn_count, recipient)
}

pub fn content<R: RandomSource + ?Sized>(request: &ContentRequest, rng: &mut R) -> FallbackContent {
    let tier = StubbornnessTier::from_spawn_count(request.spawn_count);
    let pool = pool(tier);
    let personality = pick(pool.personalities, rng);
    let sentiment = pool.sentiments[rng.index(pool.sentiments.len()).min(pool.sentiments.len() - 1)];
    FallbackContent {
        tier,
        poem: poem(request.spawn_count, &request.recipient_name, rng),
        personality,
        sentiment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::chaos::{ScriptedRandom, SeededRandom};

    fn request(spawn_count: u32) -> ContentRequest {
        ContentRequest {
            spawn_count,
            hesitation_time: 3.5,
            recipient_name: "Ada".into(),
            sender_name: "Qing".into(),
        }
    }

    #[test]
    fn every_tier_has_content() {
        for tier in StubbornnessTier::ALL {
            let p = pool(tier);
            assert!(!p.personalities.is_empty(), "{tier:?}");
            assert!(!p.sentiments.is_empty(), "{tier:?}");
            assert!(!p.poems.is_empty(), "{tier:?}");
            for s in p.sentiments {
                assert!(!s.description.is_empty());
                for score in [s.excitement, s.hesitation, s.playfulness, s.romance] {
                    assert!(score <= 100);
                }
            }
        }
    }

    #[test]
    fn poem_fills_placeholders() {
        let mut rng = ScriptedRandom::always(true);
        let text = poem(7, "Ada", &mut rng);
        assert!(text.starts_with("7 times you said no,"));
        assert!(text.contains("Ada"));
        assert!(!text.contains('{'));

        let instant = poem(0, "", &mut rng);
        assert!(instant.contains("babe"));
        assert!(!instant.contains('{'));
    }

    #[test]
    fn poems_come_from_the_tier_pool() {
        let mut rng = ScriptedRandom::always(false);
        let light = poem(2, "Ada", &mut rng);
        let extreme = poem(40, "Ada", &mut rng);
        assert_ne!(light.replace('2', ""), extreme.replace("40", ""));
        assert_eq!(light, fill(LIGHT_RESISTANCE_POEMS[0], 2, "Ada"));
        assert_eq!(extreme, fill(EXTREME_RESISTANCE_POEMS[0], 40, "Ada"));
    }

    #[test]
    fn every_pool_poem_fills_cleanly() {
        for tier in StubbornnessTier::ALL {
            for template in pool(tier).poems {
                assert!(!fill(template, 9, "Ada").contains('{'), "{tier:?}: {template}");
            }
        }
    }

    #[test]
    fn content_follows_stubbornness_tier() {
        let mut rng = SeededRandom::from_seed(3);
        for count in [0, 2, 6, 10, 18, 25, 40] {
            let out = content(&request(count), &mut rng);
            assert_eq!(out.tier, StubbornnessTier::from_spawn_count(count));
            assert!(pool(out.tier).personalities.contains(&out.personality));
            assert!(pool(out.tier).sentiments.contains(&out.sentiment));
        }
    }

    #[test]
    fn content_serializes_for_the_renderer() {
        let mut rng = ScriptedRandom::always(false);
        let json = serde_json::to_value(content(&request(0), &mut rng)).unwrap();
        assert_eq!(json["tier"], "zero-resistance");
        assert_eq!(json["sentiment"]["moodLabel"], "Instantly Smitten");
        assert_eq!(
            json["sentiment"]["description"],
            "You couldn't click YES fast enough!"
        );
    }
}
