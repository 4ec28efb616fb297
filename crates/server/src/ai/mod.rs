//! LLM translation: Gemini client and the natural-language pipeline step

pub mod client;
pub mod translate;

pub use client::GeminiClient;
