//! Stages of the surprise and the tones a wish can be written in.

/// Clicks allowed on a screen before the click budget pushes the recipient on.
pub const MAX_CLICKS_PER_STAGE: u32 = 25;

/// One screen of the surprise.
///
/// `Welcome` through `Impact` form the linear path. `AiWish` hangs off
/// `Celebration` and only ever returns there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Welcome,
    Roast,
    Fact,
    Reasons,
    Shayari,
    Celebration,
    Impact,
    AiWish,
}

impl Stage {
    /// The next stage on the linear path, if there is one.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Welcome => Some(Stage::Roast),
            Stage::Roast => Some(Stage::Fact),
            Stage::Fact => Some(Stage::Reasons),
            Stage::Reasons => Some(Stage::Shayari),
            Stage::Shayari => Some(Stage::Celebration),
            Stage::Celebration => Some(Stage::Impact),
            Stage::Impact | Stage::AiWish => None,
        }
    }

    /// Whether running out of clicks here moves the recipient forward.
    pub fn is_budgeted(&self) -> bool {
        matches!(
            self,
            Stage::Roast | Stage::Fact | Stage::Reasons | Stage::Shayari
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Welcome => "welcome",
            Stage::Roast => "roast",
            Stage::Fact => "fact",
            Stage::Reasons => "reasons",
            Stage::Shayari => "shayari",
            Stage::Celebration => "celebration",
            Stage::Impact => "impact",
            Stage::AiWish => "ai-wish",
        }
    }
}

/// Flavour of the generated birthday wish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WishTone {
    #[default]
    Heartfelt,
    Funny,
    Roast,
}

impl WishTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            WishTone::Heartfelt => "heartfelt",
            WishTone::Funny => "funny",
            WishTone::Roast => "roast",
        }
    }

    pub fn all() -> Vec<WishTone> {
        vec![WishTone::Heartfelt, WishTone::Funny, WishTone::Roast]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            WishTone::Heartfelt => "Heartfelt",
            WishTone::Funny => "Funny Wish",
            WishTone::Roast => "Last Roast",
        }
    }
}
