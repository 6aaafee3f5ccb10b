//! Utility helpers

mod tokens;

pub use tokens::format_tokens;
