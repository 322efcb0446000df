use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use wallet_core::{Amount, Identity};
use wallet_infra::{AccountStore, InMemoryAccountStore, InMemoryTransactionLog, LedgerEngine, Page};
use wallet_ledger::TransferRequest;

type Engine = LedgerEngine<InMemoryAccountStore, InMemoryTransactionLog>;

fn identity(i: usize) -> Identity {
    Identity::parse(&format!("holder{i}@bench.io")).unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

fn seeded_engine(rt: &tokio::runtime::Runtime, holders: usize) -> Arc<Engine> {
    let engine = Arc::new(LedgerEngine::new(
        InMemoryAccountStore::new(),
        InMemoryTransactionLog::new(),
    ));
    rt.block_on(async {
        for i in 0..holders {
            let owner = identity(i);
            engine.accounts().open(&owner).await.unwrap();
            engine
                .accounts()
                .deposit(&owner, Amount::new(1_000_000_000).unwrap())
                .await
                .unwrap();
        }
    });
    engine
}

fn bench_sequential_transfers(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("sequential_transfers");

    for batch in [10usize, 100, 1_000] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            let engine = seeded_engine(&rt, 2);
            b.iter(|| {
                rt.block_on(async {
                    for i in 0..batch {
                        let (from, to) = if i % 2 == 0 { (0, 1) } else { (1, 0) };
                        let request = TransferRequest::new(identity(from), identity(to).as_str(), 1);
                        black_box(engine.transfer(request).await.unwrap());
                    }
                });
            });
        });
    }

    group.finish();
}

fn bench_contended_transfers(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("contended_transfers");

    for holders in [2usize, 16, 128] {
        let tasks = 256usize;
        group.throughput(Throughput::Elements(tasks as u64));
        group.bench_with_input(BenchmarkId::from_parameter(holders), &holders, |b, &holders| {
            let engine = seeded_engine(&rt, holders);
            b.iter(|| {
                rt.block_on(async {
                    let handles: Vec<_> = (0..tasks)
                        .map(|i| {
                            let engine = engine.clone();
                            let from = i % holders;
                            let to = (i + 1) % holders;
                            tokio::spawn(async move {
                                let request =
                                    TransferRequest::new(identity(from), identity(to).as_str(), 1);
                                engine.transfer(request).await
                            })
                        })
                        .collect();
                    for handle in handles {
                        black_box(handle.await.unwrap().unwrap());
                    }
                });
            });
        });
    }

    group.finish();
}

fn bench_history_page(c: &mut Criterion) {
    let rt = runtime();
    let engine = seeded_engine(&rt, 2);
    rt.block_on(async {
        for _ in 0..5_000 {
            let request = TransferRequest::new(identity(0), identity(1).as_str(), 1);
            engine.transfer(request).await.unwrap();
        }
    });

    c.bench_function("history_first_page_of_5000", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(engine.history(&identity(0), Page::new(1)).await.unwrap());
            });
        });
    });
}

criterion_group!(
    benches,
    bench_sequential_transfers,
    bench_contended_transfers,
    bench_history_page
);
criterion_main!(benches);
