//! Ordered, fail-fast execution of asynchronous steps.

use std::future::Future;

/// Runs `step` for each item in order, one at a time.
///
/// A step starts only after the previous one has completed. The first error
/// stops the run: later items are never started and the error is returned
/// exactly as the step produced it.
///
/// # Errors
///
/// Returns the error of the first failing step.
pub async fn run_sequence<I, F, Fut, E>(items: I, mut step: F) -> Result<(), E>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    for item in items {
        step(item).await?;
    }

    Ok(())
}
