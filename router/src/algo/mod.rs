pub mod hadlock;
pub mod pattern;
