use std::future::Future;
use std::time::Duration;

use tcgwatch_core::error::WatchError;

/// Fetch every page of an offset/limit list endpoint.
///
/// `fetch` is called with `(offset, limit)` where `offset = limit * page`.
/// Stops at the first page shorter than `page_size`. `delay` is slept between
/// pages, never after the last one. The first failing page aborts the whole
/// fetch.
pub async fn fetch_all_pages<T, F, Fut>(
    page_size: u32,
    delay: Duration,
    mut fetch: F,
) -> Result<Vec<T>, WatchError>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>, WatchError>>,
{
    if page_size == 0 {
        return Err(WatchError::Config {
            message: "page size must be greater than zero".into(),
        });
    }

    let mut items = Vec::new();
    let mut page: u32 = 0;
    loop {
        let offset = page_size.checked_mul(page).ok_or_else(|| {
            WatchError::Other(format!("page offset overflow after {page} pages"))
        })?;
        let batch = fetch(offset, page_size).await?;
        let fetched = batch.len();
        items.extend(batch);
        tracing::debug!(page, offset, fetched, total = items.len(), "fetched page");

        if fetched < page_size as usize {
            return Ok(items);
        }

        page += 1;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
