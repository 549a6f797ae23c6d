use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Run a future, turning a panic into `Err(message)`.
///
/// Background tasks use this so a panic still produces a final event
/// instead of silently ending the task.
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}
