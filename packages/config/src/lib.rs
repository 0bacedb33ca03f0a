// ABOUTME: Emojipost configuration crate
// ABOUTME: Environment variable names, defaults, and typed lookup helpers

pub mod constants;
pub mod env;
