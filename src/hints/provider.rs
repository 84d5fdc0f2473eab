use std::sync::Arc;
use async_trait::async_trait;
use crate::error::HintError;
use crate::hints::context::ProblemContext;
use crate::hints::level::HintLevel;

/// Anything that can turn a problem and a level into hint text.
///
/// Implementations own their transport, timeouts and cancellation; every
/// failure (including an empty payload) comes back as `Err`, never as an
/// empty string the engine has to second-guess.
#[async_trait]
pub trait HintProvider: Send + Sync {
    /// Short name used in log fields and error context
    fn name(&self) -> &str;

    async fn generate_hint(&self, context: &ProblemContext, level: HintLevel) -> Result<String, HintError>;
}

#[async_trait]
impl<P: HintProvider + ?Sized> HintProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate_hint(&self, context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        (**self).generate_hint(context, level).await
    }
}

#[async_trait]
impl<P: HintProvider + ?Sized> HintProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn generate_hint(&self, context: &ProblemContext, level: HintLevel) -> Result<String, HintError> {
        (**self).generate_hint(context, level).await
    }
}
