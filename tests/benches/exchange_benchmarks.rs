//! # Newswire Exchange Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Correlation | one dispatcher round-trip over the in-memory bus |
//! | Correlation | N concurrent round-trips on one reply topic |
//! | News store | page query over a large rubric |
//! | Moderation | word list scan of a comment |

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures::future::join_all;
use nw_01_api_gateway::{spawn_reply_routers, CorrelationDispatcher, ExchangeRequest};
use nw_02_news::{InMemoryNewsStore, NewsStore};
use nw_04_moderation::{ModerationClassifier, WordListClassifier};
use serde_json::{json, Value};
use shared_bus::{BusSubscriber, ExchangeHandler, ExchangeLoop, ExchangeTopics, InMemoryBus};
use shared_types::{DomainError, NewsItem, NewsPageQuery, Operation, ServiceIdentity};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::sync::watch;

// ============================================================================
// Correlation round-trips
// ============================================================================

struct Echo;

#[async_trait]
impl ExchangeHandler for Echo {
    async fn handle(&self, _operation: &Operation, payload: &Value) -> Result<Value, DomainError> {
        Ok(payload.clone())
    }
}

/// Dispatcher plus an echo backend on the comments topic.
fn wire(rt: &Runtime) -> (Arc<CorrelationDispatcher>, watch::Sender<bool>) {
    rt.block_on(async {
        let bus = Arc::new(InMemoryBus::new());
        let topics = ExchangeTopics::default();
        let dispatcher = Arc::new(CorrelationDispatcher::new(
            ServiceIdentity::new("api-gateway", "bench"),
            bus.clone(),
            topics.clone(),
            Duration::from_secs(5),
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        spawn_reply_routers(&dispatcher, bus.as_ref(), shutdown_rx.clone())
            .expect("reply routers");

        let exchange_loop = ExchangeLoop::new(
            ServiceIdentity::new("comments", "bench"),
            Arc::new(Echo),
            bus.clone(),
            bus.subscribe("comments.requests").expect("subscribe"),
            topics.reply_routes("comments.requests"),
        );
        tokio::spawn(exchange_loop.run(shutdown_rx));
        (dispatcher, shutdown_tx)
    })
}

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let (dispatcher, _shutdown) = wire(&rt);
    let dispatcher = dispatcher.as_ref();

    let mut group = c.benchmark_group("correlation");

    group.bench_function("single_round_trip", |b| {
        b.to_async(&rt).iter(|| async move {
            let request = ExchangeRequest::new(Operation::ListComments, json!({ "id_news": 1 }));
            black_box(dispatcher.call(request).await.expect("reply"))
        })
    });

    for concurrency in [8u64, 64, 256] {
        group.throughput(Throughput::Elements(concurrency));
        group.bench_with_input(
            BenchmarkId::new("concurrent_round_trips", concurrency),
            &concurrency,
            |b, &n| {
                b.to_async(&rt).iter(|| async move {
                    let calls = (0..n).map(|i| {
                        dispatcher.call(ExchangeRequest::new(
                            Operation::ListComments,
                            json!({ "id_news": i }),
                        ))
                    });
                    black_box(join_all(calls).await)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// Backend domain
// ============================================================================

fn bench_news_page(c: &mut Criterion) {
    let store = InMemoryNewsStore::new();
    store
        .append(
            (0..10_000)
                .map(|i| NewsItem {
                    title: format!("headline {i}"),
                    rubric: if i % 4 == 0 { "sport" } else { "it" }.to_string(),
                    public_time: i,
                    link: format!("https://bench.example/{i}"),
                    ..NewsItem::default()
                })
                .collect(),
        )
        .expect("seed store");

    let mut group = c.benchmark_group("news-store");
    for (name, filter) in [("unfiltered", ""), ("filtered", "headline 99")] {
        let query = NewsPageQuery {
            rubric: "it".to_string(),
            count: 20,
            filter: filter.to_string(),
            page: 3,
        };
        group.bench_function(name, |b| b.iter(|| black_box(store.page(&query))));
    }
    group.finish();
}

fn bench_moderation(c: &mut Criterion) {
    let words: Vec<String> = (0..500).map(|i| format!("word{i}")).collect();
    let classifier = WordListClassifier::new(&words);
    let comment = "A perfectly ordinary comment about the match last night. ".repeat(8);

    c.bench_function("moderation/word_list_scan", |b| {
        b.iter(|| black_box(classifier.is_offensive(&comment)))
    });
}

criterion_group!(benches, bench_round_trip, bench_news_page, bench_moderation);
criterion_main!(benches);
