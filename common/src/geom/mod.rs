pub mod conversion;
pub mod coord;
