pub mod application;
pub mod evaluation;
