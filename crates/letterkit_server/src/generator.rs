//! Upstream letter generation.

use crate::error::GenerateError;
use crate::messages::{GenerateRequest, GenerateResponse};
use letterkit_core::Language;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Produces letter fields from a request.
///
/// This trait abstracts the upstream model call so the handler can be
/// exercised without network access. Implementations must be cheap to
/// share behind an `Arc`.
pub trait LetterGenerator: Send + Sync + 'static {
    /// Generates a letter for `request`.
    fn generate(
        &self,
        request: &GenerateRequest,
    ) -> impl Future<Output = Result<GenerateResponse, GenerateError>> + Send;
}

/// A deterministic generator for testing.
///
/// By default it echoes the prompt back as the letter body with a greeting
/// and closing in the request's language.
#[derive(Debug, Default)]
pub struct MockGenerator {
    calls: AtomicUsize,
    delay: Duration,
    failure: Mutex<Option<GenerateError>>,
}

impl MockGenerator {
    /// Creates a mock that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call wait `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes subsequent calls fail with `error` (or succeed again with `None`).
    pub fn set_failure(&self, error: Option<GenerateError>) {
        *self.failure.lock() = error;
    }

    /// Number of generation calls started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn render(request: &GenerateRequest) -> GenerateResponse {
        let name = request.recipient_name.as_deref();
        let (greeting, closing, default_subject) = match request.language {
            Language::Arabic => (
                format!("{}،", name.map_or("السادة المحترمين".to_owned(), |n| format!("السيد/ة {n}"))),
                "وتفضلوا بقبول فائق الاحترام",
                "خطاب رسمي",
            ),
            Language::English => (
                format!("Dear {},", name.unwrap_or("Sir or Madam")),
                "Yours sincerely",
                "Formal letter",
            ),
        };

        let mut response = GenerateResponse::new(
            format!("{greeting}\n\n{}", request.prompt.trim()),
            request.subject.clone().unwrap_or_else(|| default_subject.to_owned()),
        )
        .with_closing(closing);
        response.recipient_name = request.recipient_name.clone();
        response
    }
}

impl LetterGenerator for MockGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let failure = self.failure.lock().clone();
        match failure {
            Some(error) => Err(error),
            None => Ok(Self::render(request)),
        }
    }
}
