// Derived views over tournament state: positions, the projected cut line,
// low rounds of the day, and Monte-Carlo win probabilities.

pub mod leaderboard;
pub mod probability;
