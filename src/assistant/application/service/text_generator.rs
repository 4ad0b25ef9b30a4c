use crate::{SupervisorResult, assistant::application::request::generation_request::GenerationRequest};
use async_trait::async_trait;

/// Boundary to a hosted text-generation model.
///
/// Implementations must report a rejected credential as
/// [`SupervisorError::InvalidCredential`](crate::SupervisorError::InvalidCredential)
/// and every other failure as
/// [`SupervisorError::ExternalService`](crate::SupervisorError::ExternalService).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produces the reply text for `request`.
    async fn generate(&self, request: GenerationRequest) -> SupervisorResult<String>;
}
