// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@on1.no>

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry an async operation with a linearly increasing delay
/// (`base_delay × attempt`) between attempts.
pub async fn retry_async<F, Fut, T, E>(
    mut op: F,
    attempts: usize,
    base_delay: Duration,
) -> Result<T, E>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(v) => return Ok(v),
            Err(_) if attempt < attempts => {
                sleep(base_delay.saturating_mul(attempt as u32)).await;
                attempt += 1;
                continue;
            }
            Err(e) => return Err(e),
        }
    }
}
