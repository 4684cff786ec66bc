use std::future::Future;

/// Run `op` until it succeeds or `max_attempts` attempts have failed.
///
/// `op` receives the 1-based attempt number. Attempts run back to back with
/// no delay. On exhaustion the last error is returned together with the
/// number of attempts made.
pub async fn retry<T, E, F, Fut>(max_attempts: u32, mut op: F) -> Result<T, (u32, E)>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err((attempt, e)),
            Err(_) => {}
        }
    }
}
