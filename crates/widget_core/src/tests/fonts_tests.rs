use super::*;
use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc,
};

use anyhow::anyhow;

struct CountingLoader {
    calls: AtomicU32,
    fail_first: AtomicBool,
}

impl CountingLoader {
    fn new(fail_first: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail_first: AtomicBool::new(fail_first),
        })
    }
}

#[async_trait]
impl FontLoader for CountingLoader {
    async fn load_all(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_first.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("font host unreachable"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn loads_exactly_once_across_repeated_calls() {
    let loader = CountingLoader::new(false);
    let service = FontService::new(loader.clone());

    service.ensure_loaded().await.expect("first");
    service.ensure_loaded().await.expect("second");
    service.ensure_loaded().await.expect("third");

    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_load_is_retried_on_the_next_call() {
    let loader = CountingLoader::new(true);
    let service = FontService::new(loader.clone());

    assert!(service.ensure_loaded().await.is_err());
    service.ensure_loaded().await.expect("retry succeeds");
    service.ensure_loaded().await.expect("cached");

    assert_eq!(loader.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn concurrent_callers_share_one_load() {
    let loader = CountingLoader::new(false);
    let service = FontService::new(loader.clone());

    let (a, b) = tokio::join!(service.ensure_loaded(), service.ensure_loaded());
    a.expect("a");
    b.expect("b");

    assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
}
