//! The stage controller: which screen is showing and what happens on each
//! click.
//!
//! Everything here is synchronous. Actions that need generated text hand back
//! a [`Fetch`] for the caller to run; the result comes back through
//! [`Controller::complete_wish`] or [`Controller::complete_reasons`] together
//! with the [`Ticket`] it was issued under.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::decoy::{DecoyField, Press};
use crate::stage::{Stage, WishTone, MAX_CLICKS_PER_STAGE};
use crate::state::Recipient;

/// Something the recipient did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Press the floating button at this index (welcome screen).
    PressDecoy(usize),
    /// "Okay, next fact!" (roast screen).
    Next,
    /// "Show me more" (fact screen).
    ShowMore,
    /// "Almost done..." (reasons screen).
    Continue,
    /// "Let's Party!" (shayari screen).
    LetsParty,
    ChooseTone(WishTone),
    /// "Wait, one more thing..." (celebration screen).
    OneMoreThing,
    Back,
    Regenerate,
    Reset,
    /// A click that landed on no control.
    StrayClick,
}

/// Identifies the request a fetch result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    epoch: u64,
    serial: u64,
}

/// Text the caller should request from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    Wish { ticket: Ticket, tone: WishTone },
    Reasons { ticket: Ticket },
}

pub struct Controller {
    recipient: Recipient,
    stage: Stage,
    clicks: u32,
    decoys: DecoyField,
    ai_wish: String,
    wish_type: WishTone,
    reasons: Vec<String>,
    loading_wish: bool,
    loading_reasons: bool,
    // Bumped on every full reset; results from an older epoch are dropped.
    epoch: u64,
    // Latest wish request within the epoch.
    wish_serial: u64,
    rng: StdRng,
}

impl Controller {
    pub fn new(recipient: Recipient) -> Self {
        Self::with_rng(recipient, StdRng::from_os_rng())
    }

    pub fn with_rng(recipient: Recipient, mut rng: StdRng) -> Self {
        let decoys = DecoyField::generate(&mut rng);
        Self {
            recipient,
            stage: Stage::Welcome,
            clicks: 0,
            decoys,
            ai_wish: String::new(),
            wish_type: WishTone::default(),
            reasons: Vec::new(),
            loading_wish: false,
            loading_reasons: false,
            epoch: 0,
            wish_serial: 0,
            rng,
        }
    }

    /// Apply one action and return the fetches it started.
    ///
    /// Every action counts as a click. Actions that mean nothing on the
    /// current stage are just clicks.
    pub fn apply(&mut self, action: Action) -> Vec<Fetch> {
        self.register_click();

        let mut fetches = match (self.stage, action) {
            (Stage::Welcome, Action::PressDecoy(index)) => match self.decoys.press(index) {
                Press::Real => self.enter(Stage::Roast),
                Press::Decoy => {
                    self.decoys.reshuffle(&mut self.rng);
                    Vec::new()
                }
                Press::Missed => Vec::new(),
            },
            (Stage::Roast, Action::Next) => self.enter(Stage::Fact),
            (Stage::Fact, Action::ShowMore) => self.enter(Stage::Reasons),
            (Stage::Reasons, Action::Continue) => self.enter(Stage::Shayari),
            (Stage::Shayari, Action::LetsParty) => self.enter(Stage::Celebration),
            (Stage::Celebration, Action::ChooseTone(tone)) => {
                self.wish_type = tone;
                let mut fetches = self.enter(Stage::AiWish);
                fetches.push(self.request_wish());
                fetches
            }
            (Stage::Celebration, Action::OneMoreThing) => self.enter(Stage::Impact),
            (Stage::AiWish, Action::Back) => self.enter(Stage::Celebration),
            (Stage::AiWish, Action::Regenerate) if !self.loading_wish => vec![self.request_wish()],
            (Stage::Impact, Action::Reset) => {
                self.reset();
                Vec::new()
            }
            _ => Vec::new(),
        };

        fetches.extend(self.enforce_click_budget());
        fetches
    }

    /// Move on one stage if the click budget is spent on a budgeted stage.
    ///
    /// Safe to call at any time; it does nothing unless the budget is spent.
    pub fn enforce_click_budget(&mut self) -> Vec<Fetch> {
        if self.clicks < MAX_CLICKS_PER_STAGE || !self.stage.is_budgeted() {
            return Vec::new();
        }
        match self.stage.next() {
            Some(next) => {
                tracing::debug!(from = self.stage.as_str(), to = next.as_str(), "click budget spent");
                self.enter(next)
            }
            None => Vec::new(),
        }
    }

    /// Back to the welcome screen with all generated text forgotten.
    pub fn reset(&mut self) {
        tracing::debug!(epoch = self.epoch + 1, "full reset");
        self.epoch += 1;
        self.ai_wish.clear();
        self.reasons.clear();
        self.loading_wish = false;
        self.loading_reasons = false;
        self.enter(Stage::Welcome);
    }

    /// Store a finished wish. Returns false if the result was stale.
    pub fn complete_wish(&mut self, ticket: Ticket, text: String) -> bool {
        if ticket.epoch != self.epoch || ticket.serial != self.wish_serial {
            tracing::debug!(?ticket, "dropping stale wish");
            return false;
        }
        self.ai_wish = text;
        self.loading_wish = false;
        true
    }

    /// Store finished reasons. Returns false if the result was stale.
    pub fn complete_reasons(&mut self, ticket: Ticket, reasons: Vec<String>) -> bool {
        if ticket.epoch != self.epoch {
            tracing::debug!(?ticket, "dropping stale reasons");
            return false;
        }
        self.reasons = reasons;
        self.loading_reasons = false;
        true
    }

    fn register_click(&mut self) {
        self.clicks = (self.clicks + 1).min(MAX_CLICKS_PER_STAGE);
    }

    fn enter(&mut self, stage: Stage) -> Vec<Fetch> {
        tracing::debug!(from = self.stage.as_str(), to = stage.as_str(), "stage change");
        self.stage = stage;
        self.clicks = 0;

        if stage == Stage::Welcome {
            self.decoys = DecoyField::generate(&mut self.rng);
        } else {
            self.decoys.clear();
        }

        if stage == Stage::Reasons && self.reasons.is_empty() && !self.loading_reasons {
            self.loading_reasons = true;
            return vec![Fetch::Reasons {
                ticket: Ticket {
                    epoch: self.epoch,
                    serial: 0,
                },
            }];
        }
        Vec::new()
    }

    fn request_wish(&mut self) -> Fetch {
        self.wish_serial += 1;
        self.loading_wish = true;
        Fetch::Wish {
            ticket: Ticket {
                epoch: self.epoch,
                serial: self.wish_serial,
            },
            tone: self.wish_type,
        }
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn click_count(&self) -> u32 {
        self.clicks
    }

    pub fn decoys(&self) -> &DecoyField {
        &self.decoys
    }

    pub fn ai_wish(&self) -> &str {
        &self.ai_wish
    }

    pub fn wish_type(&self) -> WishTone {
        self.wish_type
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn is_loading_wish(&self) -> bool {
        self.loading_wish
    }

    pub fn is_loading_reasons(&self) -> bool {
        self.loading_reasons
    }
}
