//! Closure-backed operations

use super::Operation;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

/// Adapts an async closure into an [`Operation`]
///
/// This is how concrete call sites (message senders, text transformers, report
/// renderers) enter the pipeline without a dedicated type.
pub struct FnOperation<F, I, O> {
    identity: String,
    description: String,
    cost: f64,
    func: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<F, Fut, I, O> FnOperation<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O>> + Send + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    /// Create an operation; the description defaults to the identity and the cost to 1.0
    pub fn new(identity: impl Into<String>, func: F) -> Self {
        let identity = identity.into();
        Self {
            description: identity.clone(),
            identity,
            cost: 1.0,
            func,
            _marker: PhantomData,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }
}

impl<F, I, O> fmt::Debug for FnOperation<F, I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnOperation")
            .field("identity", &self.identity)
            .field("description", &self.description)
            .field("cost", &self.cost)
            .finish()
    }
}

#[async_trait]
impl<F, Fut, I, O> Operation for FnOperation<F, I, O>
where
    F: Fn(I) -> Fut + Send + Sync,
    Fut: Future<Output = Result<O>> + Send + 'static,
    I: Send + 'static,
    O: Send + 'static,
{
    type Input = I;
    type Output = O;

    async fn execute(&self, input: I) -> Result<O> {
        (self.func)(input).await
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn describe(&self) -> String {
        self.description.clone()
    }

    fn estimated_cost(&self) -> f64 {
        self.cost
    }
}
