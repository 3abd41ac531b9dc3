//! Typed client for the Google Generative Language API.
//!
//! The rest of the workspace treats this as an opaque text-completion
//! service: one prompt string in, one completion string out. No retry
//! policy lives here; callers decide what a failed completion means.

mod client;
mod error;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
