use std::future::Future;
use std::time::Duration;

use scan_session_core::PlatformError;

/// Run `fut`, failing with `PlatformError::Timeout` once `timeout` elapses.
pub(crate) async fn with_timeout<T, F>(timeout: Option<Duration>, fut: F) -> Result<T, PlatformError>
where
    F: Future<Output = Result<T, PlatformError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| PlatformError::Timeout)?,
        None => fut.await,
    }
}
