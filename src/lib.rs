//! Valentine "wrapped" core crate.
//!
//! Share links, routing, the landing → game → wrapped → success session machine
//! and its derived statistics. Rendering lives in the browser; the UI pushes
//! intents into a [`session::SessionMachine`] (or the wasm [`web::ValentineSession`]
//! wrapper) and draws the returned [`session::SessionView`].

use wasm_bindgen::prelude::*;

pub mod config;
pub mod fallback;
pub mod link;
pub mod route;
pub mod session;
pub mod theme;
pub mod web;

pub use config::{ConfigError, SessionConfig};
pub use link::{LinkCodec, LinkError, LinkRequest, SessionParams};
pub use route::{BootstrapError, Route, bootstrap, bootstrap_href};
pub use session::{Intent, SessionMachine, SessionState, SessionView, Stage};
pub use theme::ThemeId;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Game copy
// Indices into these tables live in `session::ControlState`.
// -----------------------------------------------------------------------------

/// Lines shown after each NO click, cycled.
pub const TAUNTS: &[&str] = &[
    "Wrong answer 🙈", "Oops! Try again 💕", "That's not it 🌹", "Hmm, think again 💝",
    "Are you sure? 🥺", "Really? 😢", "But why tho 💔", "Reconsider pls 🙏",
    "I saw you hesitate 👀", "Your finger slipped right? 😌", "Let me ask again... 💫",
    "The universe wants you to say YES ✨", "Cupid is disappointed 😤", "Try clicking the other one 👉",
    "Error 404: NO not found 🚫", "That button doesn't work 🔧", "Nice try 😏",
    "You're breaking my heart 💔", "Even your phone wants you to say YES 📱", "Plot twist: Say YES 🎬",
    "I believe in you 💪", "So close! Try the pink one 🎀", "Almost got it! 👆",
    "Loading better decision... ⏳", "Achievement unlocked: Stubbornness 🏆", "Bruh 😐",
    "Nah fr? 💀", "You're wildin' 😭", "Caught in 4K 📸", "Main character energy but wrong script 🎭",
    "The math ain't mathing 🧮", "This is your sign ✨", "Manifesting your YES 🔮",
    "Love finds a way 💕", "You miss 100% of YES you don't click 🏀",
    "Your future self will thank you 🙌", "The audacity 😤", "I'm literally right here 🙋",
    "Not the no again 😩", "Real ones say YES 👑", "Okay but have you considered... YES? 🤔",
    "This is not a drill 🚨", "Trust the process 🙏", "You're on thin ice bestie 🧊",
    "The algorithm wants you to click YES 📊", "Bet you won't say YES 🎰",
    "*sad violin noises* 🎻", "Look at me... I am the captain now 🚢",
];

/// The question escalates every fourth NO click and stops at the last entry.
pub const QUESTION_VARIANTS: &[&str] = &[
    "Will you be my Valentine? 💕",
    "So... Valentine? 🥺",
    "Seriously though? 😅",
    "Come on now... 💔",
    "This is getting silly 🙃",
    "I'm not giving up 💪",
    "We can do this all day ⏰",
    "You know you want to 😏",
    "Just one little YES 🙏",
    "The button's RIGHT THERE 👆",
    "PLEASE 😭😭😭",
    "I'm on my knees 🧎",
    "Last chance... jk 😈",
    "Fine, I'll wait ⏳",
    "*stares intensely* 👁️👁️",
];

/// Status lines about the sender; `{name}` is the sender's name.
pub const SENDER_UPDATES: &[&str] = &[
    "{name} is waiting...",
    "{name} is getting nervous...",
    "{name}'s heart is racing...",
    "{name} is sweating...",
    "{name} is questioning everything...",
    "{name}'s hope is fading...",
    "{name} is dramatically sighing...",
    "{name} needs therapy after this...",
    "{name} is writing their villain arc...",
    "{name} has entered their flop era...",
    "{name} is contemplating life choices...",
];
