// Tournament simulation engine: routing, pace, the stroke model, pairing,
// the cut, round rollover and the clock-driven tick scheduler.

pub mod cut;
pub mod pace;
pub mod pairing;
pub mod rounds;
pub mod routing;
pub mod scoring;
pub mod tick;
