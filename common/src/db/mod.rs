pub mod core;
pub mod demand;
pub mod indices;
pub mod parser;
