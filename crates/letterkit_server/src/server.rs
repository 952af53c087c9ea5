//! Generation service façade.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::generator::LetterGenerator;
use crate::handler::{HandlerContext, RequestHandler};
use crate::messages::ErrorBody;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{error, warn};

/// The letter generation service.
///
/// Wraps a [`RequestHandler`] and turns every outcome into an HTTP status
/// plus JSON body, ready to be written by whatever transport hosts it.
///
/// # Example
///
/// ```
/// use letterkit_server::{LetterServer, MockGenerator, ServerConfig};
///
/// let server = LetterServer::new(ServerConfig::default(), MockGenerator::new());
///
/// // A transport would call:
/// // let (status, body) = server.handle_generate(peer_ip, &request_body).await;
/// assert_eq!(server.cached_responses(), 0);
/// ```
pub struct LetterServer<G: LetterGenerator> {
    handler: RequestHandler<G>,
    context: Arc<HandlerContext>,
}

impl<G: LetterGenerator> LetterServer<G> {
    /// Creates a server with fresh shared state.
    pub fn new(config: ServerConfig, generator: G) -> Self {
        Self::with_context(Arc::new(HandlerContext::new(config)), Arc::new(generator))
    }

    /// Creates a server over existing shared state.
    pub fn with_context(context: Arc<HandlerContext>, generator: Arc<G>) -> Self {
        let handler = RequestHandler::new(Arc::clone(&context), generator);
        Self { handler, context }
    }

    /// Handles a generation request and returns `(status, json_body)`.
    pub async fn handle_generate(&self, client: IpAddr, body: &[u8]) -> (u16, Vec<u8>) {
        match self.handler.handle_generate(client, body).await {
            Ok(body) => (200, body),
            Err(err) => error_response(&err),
        }
    }

    /// Number of cached responses.
    pub fn cached_responses(&self) -> usize {
        self.context.cache.len()
    }

    /// Number of generation calls in flight.
    pub fn in_flight(&self) -> usize {
        self.context.flights.in_flight()
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<HandlerContext> {
        &self.context
    }
}

/// Maps an error to its status code and JSON body.
pub fn error_response(err: &ServerError) -> (u16, Vec<u8>) {
    let status = err.status_code();
    if err.is_server_error() {
        error!(status, error = %err, "generation request failed");
    } else {
        warn!(status, error = %err, "generation request rejected");
    }

    let body = serde_json::to_vec(&ErrorBody::from(err))
        .unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec());
    (status, body)
}
