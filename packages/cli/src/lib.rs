// ABOUTME: Emojipost CLI library
// ABOUTME: Host configuration and logging setup shared by the emojipost binary

pub mod config;
pub mod logging;
