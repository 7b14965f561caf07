use anyhow::Result;
use chrono::NaiveDate;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// date => holiday name; a cached None is a confirmed non-holiday, so the
/// common working-day lookup never touches the database twice.
pub static HOLIDAY_CACHE: Lazy<Cache<NaiveDate, Option<String>>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(4_096)
        .time_to_live(Duration::from_secs(86_400)) // 24h TTL
        .build()
});

/// Record a single date, called when a holiday is created or removed.
pub async fn mark(date: NaiveDate, name: Option<String>) {
    HOLIDAY_CACHE.insert(date, name).await;
}

/// Holiday name for a date, cache first with database fallback.
pub async fn holiday_name(
    pool: &MySqlPool,
    date: NaiveDate,
) -> Result<Option<String>, sqlx::Error> {
    if let Some(cached) = HOLIDAY_CACHE.get(&date).await {
        return Ok(cached);
    }

    let name: Option<String> =
        sqlx::query_scalar("SELECT name FROM holidays WHERE date = ? AND is_deleted = 0")
            .bind(date)
            .fetch_optional(pool)
            .await?;

    HOLIDAY_CACHE.insert(date, name.clone()).await;
    Ok(name)
}

/// Batch insert a chunk of calendar rows
async fn batch_mark(rows: &[(NaiveDate, String)]) {
    let futures: Vec<_> = rows
        .iter()
        .map(|(date, name)| HOLIDAY_CACHE.insert(*date, Some(name.clone())))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load the holiday calendar into the in-memory cache (batched)
pub async fn warmup_holiday_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (NaiveDate, String)>(
        r#"
        SELECT date, name
        FROM holidays
        WHERE is_deleted = 0
        ORDER BY date
        "#,
    )
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row?);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!("Holiday cache warmup complete: {} calendar dates", total_count);

    Ok(())
}
