pub mod disabled;
pub mod gemini;
pub mod mock;
