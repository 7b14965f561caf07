use moka::future::Cache;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::time::Duration;

/// Which request workflow a cached listing belongs to.
#[derive(Debug, Clone, Copy)]
pub enum Flow {
    Leave,
    Correction,
    Complaint,
}

fn build() -> Cache<String, Value> {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(60))
        .build()
}

static LEAVE_LISTS: Lazy<Cache<String, Value>> = Lazy::new(build);
static CORRECTION_LISTS: Lazy<Cache<String, Value>> = Lazy::new(build);
static COMPLAINT_LISTS: Lazy<Cache<String, Value>> = Lazy::new(build);

fn cache_for(flow: Flow) -> &'static Cache<String, Value> {
    match flow {
        Flow::Leave => &LEAVE_LISTS,
        Flow::Correction => &CORRECTION_LISTS,
        Flow::Complaint => &COMPLAINT_LISTS,
    }
}

pub async fn get(flow: Flow, key: &str) -> Option<Value> {
    cache_for(flow).get(key).await
}

pub async fn put(flow: Flow, key: String, value: Value) {
    cache_for(flow).insert(key, value).await;
}

/// Drop every cached page for a flow. Called after any successful mutation
/// of the underlying rows so subsequent reads reflect the new state.
pub fn invalidate(flow: Flow) {
    cache_for(flow).invalidate_all();
}
