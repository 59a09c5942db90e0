pub mod generator;
pub mod handlers;
pub mod level;
pub mod prompts;
