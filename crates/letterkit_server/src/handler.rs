//! Request handler for the generation endpoint.

use crate::cache::{CacheKey, ResponseCache};
use crate::config::ServerConfig;
use crate::error::{GenerateError, ServerError, ServerResult};
use crate::generator::LetterGenerator;
use crate::messages::{GenerateRequest, GenerateResponse};
use crate::rate_limit::RateLimiter;
use crate::single_flight::SingleFlight;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared state for request handling.
///
/// Constructed once per process and handed to every handler by `Arc`;
/// nothing here lives in module-level statics.
#[derive(Debug)]
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// Per-client rate limiter.
    pub limiter: RateLimiter,
    /// Finished generation results.
    pub cache: ResponseCache<GenerateResponse>,
    /// Generation calls currently in flight.
    pub flights: SingleFlight<CacheKey, Result<GenerateResponse, GenerateError>>,
}

impl HandlerContext {
    /// Creates a handler context.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            cache: ResponseCache::new(config.cache.clone()),
            flights: SingleFlight::new(),
            config,
        }
    }
}

/// Handler for generation requests.
pub struct RequestHandler<G: LetterGenerator> {
    context: Arc<HandlerContext>,
    generator: Arc<G>,
}

impl<G: LetterGenerator> RequestHandler<G> {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>, generator: Arc<G>) -> Self {
        Self { context, generator }
    }

    /// Handles a raw JSON body from `client` and returns the JSON response.
    ///
    /// Order of checks: body size, rate limit, parsing, validation. Only
    /// then is the cache consulted and, on a miss, the generator called.
    ///
    /// # Errors
    ///
    /// Returns a client error for oversized, throttled or invalid requests,
    /// and a server error if generation fails or times out.
    pub async fn handle_generate(&self, client: IpAddr, body: &[u8]) -> ServerResult<Vec<u8>> {
        let limit = self.context.config.max_body_bytes;
        if body.len() > limit {
            return Err(ServerError::PayloadTooLarge {
                size: body.len(),
                limit,
            });
        }

        self.context.limiter.check(client)?;

        let request: GenerateRequest = serde_json::from_slice(body)
            .map_err(|e| ServerError::InvalidRequest(format!("malformed JSON body: {e}")))?;
        request.validate()?;

        let response = self.generate(request).await?;
        Ok(serde_json::to_vec(&response)?)
    }

    /// Generates a letter, going through the cache and single-flight group.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Generation`] if the upstream call fails or
    /// exceeds the configured timeout.
    pub async fn generate(&self, request: GenerateRequest) -> ServerResult<GenerateResponse> {
        let key = CacheKey::for_request(&request)?;

        if let Some(hit) = self.context.cache.get(&key) {
            debug!(?key, "cache hit");
            return Ok(hit);
        }
        debug!(?key, "cache miss");

        let response = self
            .context
            .flights
            .run(key, move || self.generate_and_cache(key, request))
            .await?;
        Ok(response)
    }

    /// Calls the generator under the configured timeout and caches a
    /// successful result.
    ///
    /// Runs as the single-flight work, so the cache is filled before the
    /// key leaves the in-flight table; a request arriving in between finds
    /// one or the other.
    async fn generate_and_cache(
        &self,
        key: CacheKey,
        request: GenerateRequest,
    ) -> Result<GenerateResponse, GenerateError> {
        let timeout = self.context.config.generation_timeout;
        let response = match tokio::time::timeout(timeout, self.generator.generate(&request)).await
        {
            Ok(result) => result?,
            Err(_) => return Err(GenerateError::Timeout(timeout)),
        };

        self.context.cache.insert(key, response.clone());
        info!(?key, "letter generated");
        Ok(response)
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<HandlerContext> {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::generator::MockGenerator;
    use crate::messages::GenerateResponse;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn create_handler(config: ServerConfig) -> (RequestHandler<MockGenerator>, Arc<MockGenerator>) {
        let generator = Arc::new(MockGenerator::new());
        let context = Arc::new(HandlerContext::new(config));
        (RequestHandler::new(context, Arc::clone(&generator)), generator)
    }

    fn client() -> IpAddr {
        IpAddr::from([192, 168, 1, 20])
    }

    #[tokio::test]
    async fn generate_round_trip() {
        let (handler, generator) = create_handler(ServerConfig::default());
        let body = br#"{"prompt":"Ask for a meeting next week","language":"en"}"#;

        let out = handler.handle_generate(client(), body).await.unwrap();
        let response: GenerateResponse = serde_json::from_slice(&out).unwrap();
        assert!(response.content.contains("Ask for a meeting next week"));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn repeated_request_served_from_cache() {
        let (handler, generator) = create_handler(ServerConfig::default());
        let body = br#"{"prompt":"Thank the committee","language":"en"}"#;

        let first = handler.handle_generate(client(), body).await.unwrap();
        let second = handler.handle_generate(client(), body).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(generator.calls(), 1);
        assert_eq!(handler.context().cache.len(), 1);
    }

    #[tokio::test]
    async fn oversized_body_rejected_before_parsing() {
        let (handler, generator) =
            create_handler(ServerConfig::default().with_max_body_bytes(16));
        let body = br#"{"prompt":"this body is far too long","language":"en"}"#;

        let err = handler.handle_generate(client(), body).await.unwrap_err();
        assert_eq!(err.status_code(), 413);
        assert_eq!(generator.calls(), 0);
        assert_eq!(handler.context().limiter.tracked_clients(), 0);
    }

    #[tokio::test]
    async fn malformed_and_invalid_bodies() {
        let (handler, _) = create_handler(ServerConfig::default());

        let err = handler.handle_generate(client(), b"{not json").await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));

        let err = handler
            .handle_generate(client(), br#"{"prompt":"  "}"#)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn rate_limit_applies_per_client() {
        let config = ServerConfig::default()
            .with_rate_limit(RateLimitConfig::new(1, Duration::from_secs(60)));
        let (handler, _) = create_handler(config);
        let body = br#"{"prompt":"Hello","language":"en"}"#;

        handler.handle_generate(client(), body).await.unwrap();
        let err = handler.handle_generate(client(), body).await.unwrap_err();
        assert!(matches!(err, ServerError::RateLimited { .. }));

        handler
            .handle_generate(IpAddr::from([10, 0, 0, 9]), body)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn result_is_cached_before_flight_ends() {
        let (handler, generator) = create_handler(ServerConfig::default());
        let request = GenerateRequest::new("Reference letter", letterkit_core::Language::English);
        let key = CacheKey::for_request(&request).unwrap();

        let cached_while_in_flight = AtomicBool::new(false);
        let seen = &cached_while_in_flight;
        let handler = &handler;
        let context = Arc::clone(handler.context());
        let ctx = &context;

        let result = context
            .flights
            .run(key, move || async move {
                let result = handler.generate_and_cache(key, request).await;
                seen.store(
                    ctx.cache.get(&key).is_some() && ctx.flights.in_flight() == 1,
                    Ordering::SeqCst,
                );
                result
            })
            .await;

        assert!(result.is_ok());
        assert!(cached_while_in_flight.load(Ordering::SeqCst));
        assert_eq!(context.flights.in_flight(), 0);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn upstream_failure_is_not_cached() {
        let (handler, generator) = create_handler(ServerConfig::default());
        generator.set_failure(Some(GenerateError::Upstream("503 from model".into())));
        let request = GenerateRequest::new("Resignation letter", letterkit_core::Language::English);

        let err = handler.generate(request.clone()).await.unwrap_err();
        assert_eq!(err.status_code(), 502);
        assert!(handler.context().cache.is_empty());

        generator.set_failure(None);
        handler.generate(request).await.unwrap();
        assert_eq!(generator.calls(), 2);
    }
}
