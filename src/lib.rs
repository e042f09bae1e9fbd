// Memebot library
//
// The caption engine lives in `meme`; everything else is the chat webhook
// built around it.

pub mod bot;
pub mod cloudinary;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod meme;
pub mod messenger;
pub mod metrics;
pub mod server;
pub mod session;
