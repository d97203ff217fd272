//! Benchmarks for the list processor and page-control windowing

use chrono::{TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ecofind_core::{
    dialog::DialogEngine,
    listing::{FilterValue, Scalar, SortDirection, process},
    pager::PageControls,
    presets,
    types::{Role, User},
};
use std::hint::black_box;

/// Realistic KYC population: a third sellers, half verified
fn users(count: usize) -> Vec<User> {
    (0..count)
        .map(|n| User {
            id: format!("u{n}"),
            name: format!("Trader {:05}", (n * 7919) % count),
            email: format!("trader{n}@ecofind.test"),
            role: if n % 3 == 0 { Role::Seller } else { Role::User },
            address: String::new(),
            country_code: None,
            phone_number: None,
            is_email_verified: true,
            is_document_verified: n % 2 == 0,
            created_at: Utc
                .timestamp_opt(1_700_000_000 + i64::try_from(n).unwrap_or(0) * 3600, 0)
                .single()
                .unwrap_or_default(),
            business_desc: None,
            business_type: Some(if n % 4 == 0 { "Recycling" } else { "Logistics" }.to_string()),
            verification_doc_url: None,
        })
        .collect()
}

/// Benchmark the full search, filter, sort and page pipeline
fn bench_list_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_processing");

    for size in [100_usize, 1_000, 10_000] {
        let records = users(size);
        let config = presets::kyc_users(10);

        group.throughput(Throughput::Elements(size as u64));

        let state = presets::kyc_state();
        group.bench_with_input(BenchmarkId::new("default_view", size), &records, |b, records| {
            b.iter(|| process(black_box(records), &state, &config).map(|page| page.total_items))
        });

        let mut filtered = presets::kyc_state();
        filtered.set_search("recycling");
        filtered.set_filter(
            presets::kyc::ROLE,
            FilterValue::Equals(Scalar::Text("SELLER".to_string())),
        );
        filtered.set_sort("createdAt", SortDirection::Desc);
        group.bench_with_input(BenchmarkId::new("filtered_view", size), &records, |b, records| {
            b.iter(|| process(black_box(records), &filtered, &config).map(|page| page.total_items))
        });
    }

    group.finish();
}

/// Benchmark page-control windowing across a long listing
fn bench_page_controls(c: &mut Criterion) {
    c.bench_function("page_controls_sweep", |b| {
        b.iter(|| {
            (1..=1_000)
                .map(|page| PageControls::new(black_box(page), 1_000).pages.len())
                .sum::<usize>()
        })
    });
}

/// Benchmark a complete scripted conversation up to the confirmation prompt
fn bench_dialog(c: &mut Criterion) {
    c.bench_function("dialog_to_confirm", |b| {
        b.iter(|| {
            let mut engine = DialogEngine::trade_in();
            let _ = engine.select_option("yes");
            let _ = engine.submit_details([
                ("companyName", "Acme Plastics"),
                ("userName", "Jo"),
                ("phoneNumber", "555"),
            ]);
            engine.transcript().len()
        })
    });
}

criterion_group!(benches, bench_list_processing, bench_page_controls, bench_dialog);
criterion_main!(benches);
