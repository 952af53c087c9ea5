//! # LetterKit Server
//!
//! Service glue for the letter generation endpoint.
//!
//! This crate provides:
//! - JSON request/response bodies with validation
//! - A per-client fixed-window rate limiter
//! - A TTL response cache keyed by a SHA-256 of the request
//! - Single-flight deduplication of identical concurrent generations
//! - A timeout around the upstream [`LetterGenerator`]
//!
//! # Shared state
//!
//! The limiter, cache and in-flight table live in a [`HandlerContext`]
//! built once and shared by `Arc`. Nothing is kept in process globals, so
//! tests and embedders can run several independent services side by side.
//!
//! # Request flow
//!
//! 1. Reject bodies over `max_body_bytes` (413)
//! 2. Charge the client's rate limit window (429)
//! 3. Parse and validate the body (400)
//! 4. Serve from cache, or join/start the in-flight generation
//! 5. Map upstream failures to 502 and timeouts to 504

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod cache;
mod config;
mod error;
mod generator;
mod handler;
mod messages;
mod rate_limit;
mod server;
mod single_flight;

pub use cache::{CacheKey, ResponseCache};
pub use config::{CacheConfig, RateLimitConfig, ServerConfig};
pub use error::{GenerateError, ServerError, ServerResult};
pub use generator::{LetterGenerator, MockGenerator};
pub use handler::{HandlerContext, RequestHandler};
pub use messages::{
    ErrorBody, GenerateRequest, GenerateResponse, MAX_FIELD_CHARS, MAX_PROMPT_CHARS,
};
pub use rate_limit::RateLimiter;
pub use server::{error_response, LetterServer};
pub use single_flight::SingleFlight;
