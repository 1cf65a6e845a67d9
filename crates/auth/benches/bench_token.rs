use auth::{InMemoryTokenStore, TokenStore};
use chrono::Duration;
use common::UserId;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_issue(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("token_store/issue", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = InMemoryTokenStore::new();
                store
                    .issue(UserId::new(), Duration::hours(1))
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_validate_with_refresh(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryTokenStore::new();
    let token = rt.block_on(async { store.issue(UserId::new(), Duration::hours(1)).await.unwrap() });

    c.bench_function("token_store/validate_with_refresh", |b| {
        b.iter(|| {
            rt.block_on(async {
                store
                    .validate(&token.value, Duration::hours(1))
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_issue, bench_validate_with_refresh);
criterion_main!(benches);
