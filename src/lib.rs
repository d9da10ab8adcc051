// Links Tour Simulator - Rust Implementation
//
// This library simulates multi-round professional golf tournaments against
// a virtual clock:
// - Clock-driven group scheduler with pace-of-play and human-pause semantics
// - Skill-and-variance stroke model with self-consistent per-hole stats
// - Live leaderboards, projected cut lines and Monte-Carlo win probabilities
// - Stroke play with a 36-hole cut and playoffs, plus Ryder-Cup match play

pub mod analytics;
pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod seed;
pub mod store;

// Re-export commonly used types
pub use api::{CreateTournament, Engine, TournamentSnapshot};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use models::course::{Course, Hole, TeeBox};
pub use models::golfer::{Golfer, Ratings};
pub use models::tournament::{Tournament, TournamentEntry, TournamentFormat, TournamentStatus};
pub use store::Store;
