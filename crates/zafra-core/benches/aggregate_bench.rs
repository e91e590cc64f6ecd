//! # Aggregation Benchmarks
//!
//! Performance benchmarks for zafra-core views.
//!
//! Run with: `cargo bench -p zafra-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use zafra_core::{
    Carrier, CarrierDraft, FreightDraft, FreightRecord, HarvestDraft, HarvestFilter,
    HarvestIntake, Linked, Record, RecordId, freight_by_carrier, filter_by_dimensions,
    filter_by_text, harvest_grand_total,
};

/// N carriers, each with ten freight trips.
fn create_freight(carriers: usize) -> (Vec<Carrier>, Vec<FreightRecord>) {
    let parents: Vec<Carrier> = (0..carriers)
        .map(|i| {
            Carrier::assemble(
                RecordId(i as u64 + 1),
                CarrierDraft {
                    name: format!("Carrier {}", i),
                    ..CarrierDraft::default()
                },
            )
        })
        .collect();

    let trips = (0..carriers * 10)
        .map(|i| {
            FreightRecord::assemble(
                RecordId(1_000_000 + i as u64),
                Linked::new(
                    FreightDraft {
                        product: "Soja".into(),
                        distance_km: (i % 300) as f64,
                        rate_per_km: 2.5,
                        carrier_id: RecordId((i % carriers) as u64 + 1),
                        ..FreightDraft::default()
                    },
                    None,
                ),
            )
        })
        .collect();

    (parents, trips)
}

fn create_intakes(size: usize) -> Vec<HarvestIntake> {
    (0..size)
        .map(|i| {
            HarvestIntake::assemble(
                RecordId(i as u64 + 1),
                HarvestDraft {
                    parcel_id: RecordId((i % 7) as u64 + 1),
                    supplier_id: RecordId((i % 5) as u64 + 1),
                    carrier_id: RecordId((i % 3) as u64 + 1),
                    product: if i % 2 == 0 { "Soja" } else { "Maíz" }.into(),
                    incoming_weight_kg: 1000.0,
                    final_weight_kg: 950.0,
                    ..HarvestDraft::default()
                },
            )
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_freight_by_carrier(c: &mut Criterion) {
    let mut group = c.benchmark_group("freight_by_carrier");

    for size in [10, 100, 500].iter() {
        let (carriers, freight) = create_freight(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(freight_by_carrier(&carriers, &freight)));
        });
    }

    group.finish();
}

fn bench_harvest_grand_total(c: &mut Criterion) {
    let mut group = c.benchmark_group("harvest_grand_total");

    for size in [100, 1000, 10000].iter() {
        let intakes = create_intakes(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(harvest_grand_total(&intakes)));
        });
    }

    group.finish();
}

fn bench_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("filters");

    for size in [100, 1000, 10000].iter() {
        let intakes = create_intakes(*size);
        let filter = HarvestFilter::any().parcel(RecordId(3)).product("Soja");
        group.bench_with_input(BenchmarkId::new("dimensions", size), size, |b, _| {
            b.iter(|| black_box(filter_by_dimensions(&intakes, &filter)));
        });

        let (carriers, _) = create_freight(*size);
        group.bench_with_input(BenchmarkId::new("text", size), size, |b, _| {
            b.iter(|| black_box(filter_by_text(&carriers, "carrier 9")));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_freight_by_carrier,
    bench_harvest_grand_total,
    bench_filters,
);

criterion_main!(benches);
