//! Decoding engine - context, strategy cascade, recognizers and recursive expansion

mod context;
mod dispatch;
mod expand;
pub mod recognizers;
mod strategy;

pub use context::{DecodeContext, Target};
pub use dispatch::{Decoder, DecoderConfig, DEFAULT_MAX_DEPTH};
pub use recognizers::RecognizeError;
pub use strategy::{Strategy, CASCADE};
