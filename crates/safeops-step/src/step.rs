use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use crate::args::StepArgs;
use crate::error::StepError;

/// A unit of pipeline work.
///
/// A step reads its arguments, does its work (reading the codebase, writing
/// artifacts) and must write every declared output to the path it was given.
#[async_trait]
pub trait Step: Send + Sync {
  async fn call(&self, args: StepArgs) -> Result<(), StepError>;
}

/// A [`Step`] backed by an async function or closure.
pub struct FnStep<F, Fut> {
  f: F,
  _future: PhantomData<fn() -> Fut>,
}

/// Wrap an async function as a [`Step`].
///
/// ```ignore
/// registry.register("demo", "noop", step_fn(|_args| async { Ok(()) }));
/// ```
pub fn step_fn<F, Fut>(f: F) -> FnStep<F, Fut>
where
  F: Fn(StepArgs) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), StepError>> + Send + 'static,
{
  FnStep {
    f,
    _future: PhantomData,
  }
}

#[async_trait]
impl<F, Fut> Step for FnStep<F, Fut>
where
  F: Fn(StepArgs) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), StepError>> + Send + 'static,
{
  async fn call(&self, args: StepArgs) -> Result<(), StepError> {
    (self.f)(args).await
  }
}
