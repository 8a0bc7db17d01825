//! UI-agnostic application state types
//!
//! Shared between the stage controller and whatever renders it.

/// Youngest age the surprise is written for.
pub const MIN_AGE: u32 = 1;

/// Oldest accepted age. Generated reasons scale with age, so it is bounded.
pub const MAX_AGE: u32 = 150;

/// The person the surprise is for. Fixed for a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub age: u32,
}

impl Recipient {
    pub fn new(name: &str, age: u32) -> Self {
        Self {
            name: name.to_string(),
            age,
        }
    }
}
