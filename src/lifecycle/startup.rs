//! Startup orchestration.
//!
//! # Responsibilities
//! - Run named boot steps once, in registration order
//! - Stop at the first failing step and report which one failed
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steps run sequentially, never concurrently
//! - The listener is bound by the caller only after `run` succeeds

use std::future::Future;

use futures_util::future::{BoxFuture, FutureExt};
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("boot step '{step}' failed: {source}")]
    StepFailed {
        step: &'static str,
        #[source]
        source: BoxError,
    },
}

type Step = Box<dyn FnOnce() -> BoxFuture<'static, Result<(), BoxError>> + Send>;

/// Ordered list of async setup steps.
#[derive(Default)]
pub struct BootSequence {
    steps: Vec<(&'static str, Step)>,
}

impl BootSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a step. Steps run in the order they are added.
    pub fn step<F, Fut>(mut self, name: &'static str, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        self.steps.push((name, Box::new(move || f().boxed())));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub async fn run(self) -> Result<(), StartupError> {
        let total = self.steps.len();
        for (index, (name, step)) in self.steps.into_iter().enumerate() {
            tracing::debug!(step = name, index = index + 1, total, "Running boot step");
            step()
                .await
                .map_err(|source| StartupError::StepFailed { step: name, source })?;
        }
        tracing::info!(steps = total, "Boot sequence complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn runs_steps_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let (a, b) = (log.clone(), log.clone());

        let boot = BootSequence::new()
            .step("first", move || async move {
                a.lock().unwrap().push("first");
                Ok(())
            })
            .step("second", move || async move {
                b.lock().unwrap().push("second");
                Ok(())
            });
        assert_eq!(boot.len(), 2);

        boot.run().await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[tokio::test]
    async fn first_failure_stops_the_sequence() {
        let ran_after = Arc::new(Mutex::new(false));
        let flag = ran_after.clone();

        let err = BootSequence::new()
            .step("metrics-exporter", || async { Err::<(), BoxError>("address in use".into()) })
            .step("later", move || async move {
                *flag.lock().unwrap() = true;
                Ok(())
            })
            .run()
            .await
            .unwrap_err();

        let StartupError::StepFailed { step, source } = err;
        assert_eq!(step, "metrics-exporter");
        assert_eq!(source.to_string(), "address in use");
        assert!(!*ran_after.lock().unwrap());
    }

    #[tokio::test]
    async fn empty_sequence_succeeds() {
        let boot = BootSequence::new();
        assert!(boot.is_empty());
        assert!(boot.run().await.is_ok());
    }
}
