//! Student wellness AI proxies.
//!
//! Two stateless HTTP handlers forward text to a generative-text provider:
//! `POST /chat-gemini` for supportive chat replies and
//! `POST /generate-blog-content` for community blog drafts. Both always
//! answer 200 and fall back to pre-written text when the provider fails.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod services;
pub mod startup;
