pub mod ai;
pub mod config;
pub mod confetti;
pub mod controller;
pub mod decoy;
pub mod gateway;
pub mod provider;
pub mod session;
pub mod stage;
pub mod state;

// Re-export main types for convenience
pub use ai::{ClaudeClient, GeminiClient, GenerationOptions, OllamaClient, OpenAIClient, ProviderClient};
pub use config::Config;
pub use confetti::{Confetti, ConfettiLoop, Particle};
pub use controller::{Action, Controller, Fetch, Ticket};
pub use decoy::{DecoyButton, DecoyField, Press};
pub use gateway::{AiGateway, TextGateway};
pub use provider::Provider;
pub use session::Session;
pub use stage::{Stage, WishTone, MAX_CLICKS_PER_STAGE};
pub use state::Recipient;
