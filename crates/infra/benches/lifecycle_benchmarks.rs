use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use salesdoc_core::{CurrencyId, CustomerId, DocumentId, ProductId, StoreId, UserId};
use salesdoc_documents::{DocumentKind, DocumentStatus, NewDocument, NewLineItem};
use salesdoc_engine::{DocumentFilter, DocumentSort, LifecycleEngine, Page, RequestContext};
use salesdoc_infra::{
    InMemoryDocumentStore, InMemoryInvoiceService, StaticCapabilityChecker, StaticRateSource,
};

type BenchEngine = LifecycleEngine<
    Arc<InMemoryDocumentStore>,
    Arc<StaticRateSource>,
    Arc<InMemoryInvoiceService>,
    Arc<StaticCapabilityChecker>,
>;

fn setup() -> (BenchEngine, RequestContext, CurrencyId) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let rates = Arc::new(StaticRateSource::new());
    let invoices = Arc::new(InMemoryInvoiceService::new());
    let capabilities = Arc::new(StaticCapabilityChecker::new());

    let actor = UserId::new();
    capabilities.grant_all(actor);

    let currency_id = CurrencyId::new();
    rates.set_rate(currency_id, Decimal::new(1_500_000, 6));

    let engine = LifecycleEngine::new(store, rates, invoices, capabilities, CurrencyId::new());
    (engine, RequestContext::new(actor, Utc::now()), currency_id)
}

fn new_row(currency_id: CurrencyId, now: chrono::DateTime<Utc>, n: u64) -> NewDocument {
    NewDocument {
        id: DocumentId::new(),
        kind: DocumentKind::Order,
        ref_number: format!("SO-{n:06}"),
        document_date: now.date_naive(),
        customer_id: CustomerId::new(),
        store_id: StoreId::new(),
        currency_id,
        line_items: vec![NewLineItem {
            product_id: ProductId::new(),
            quantity: 3,
            unit_price: Decimal::new(4_999, 2),
        }],
        valid_until: Some(now.date_naive() + Duration::days(30)),
    }
}

fn bench_full_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");
    group.throughput(Throughput::Elements(1));

    group.bench_function("create_send_accept_convert", |b| {
        let (engine, ctx, currency_id) = setup();
        let mut n = 0u64;
        b.iter(|| {
            n += 1;
            let doc = engine
                .create(&ctx, new_row(currency_id, ctx.now, n))
                .unwrap();
            engine.send(&ctx, doc.id()).unwrap();
            engine.accept(&ctx, doc.id()).unwrap();
            black_box(engine.convert(&ctx, doc.id(), None).unwrap());
        });
    });

    group.finish();
}

fn bench_listing_with_derived_expiry(c: &mut Criterion) {
    let (engine, ctx, currency_id) = setup();
    for n in 0..500 {
        let doc = engine
            .create(&ctx, new_row(currency_id, ctx.now, n))
            .unwrap();
        if n % 2 == 0 {
            engine.send(&ctx, doc.id()).unwrap();
        }
    }
    // Read far enough ahead that every sent document derives as expired.
    let late = RequestContext::new(ctx.actor, ctx.now + Duration::days(60));
    let filter = DocumentFilter {
        status: Some(DocumentStatus::Expired),
        ..DocumentFilter::default()
    };

    let mut group = c.benchmark_group("listing");
    group.throughput(Throughput::Elements(500));
    group.bench_function("filter_expired_500_docs", |b| {
        b.iter(|| {
            let page = engine
                .list(
                    &late,
                    black_box(&filter),
                    DocumentSort::default(),
                    Page::default(),
                )
                .unwrap();
            black_box(page.total)
        });
    });
    group.finish();
}

criterion_group!(benches, bench_full_lifecycle, bench_listing_with_derived_expiry);
criterion_main!(benches);
