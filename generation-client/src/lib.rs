// Generation Client Library
//
// This crate provides HTTP clients for the upstream generation services:
// an OpenAI-compatible chat completions endpoint for deck outlines and
// Gemini / OpenAI image generation for slide illustrations.

mod errors;
mod image;
mod outline;

pub use errors::ClientError;
pub use image::{illustration_prompt, ImageBinding, ImageClient, ImageSettings};
pub use outline::{outline_prompts, ChatSettings, OutlineClient};
