//! Benchmarks for the client-side filter engine

#![allow(missing_docs)]

use casedash_core::{CaseId, CaseRecord, FilterCriteria, filter_cases, options, turnaround_seconds};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

const GROUPS: [&str; 4] = ["Apollo", "Fortis", "Max", "Manipal"];
const TPAS: [&str; 5] = ["Vidal", "Paramount", "Medi Assist", "MDIndia", "Raksha"];

fn generate_cases(count: usize) -> Vec<CaseRecord> {
    (0..count)
        .map(|i| CaseRecord {
            id: CaseId::Number(i64::try_from(i).unwrap_or_default()),
            patient_name: format!("Patient {i}"),
            al_number: (i % 3 != 0).then(|| format!("AL-{i:06}")),
            policy_number: (i % 4 != 0).then(|| format!("POL-{i:06}")),
            hospital_group: GROUPS[i % GROUPS.len()].to_string(),
            tpa_name: TPAS[i % TPAS.len()].to_string(),
            parsed_time: Some("2024-01-01T00:00:00Z".to_string()),
            saved_time: Some("2024-01-01T00:00:42Z".to_string()),
            status: if i % 2 == 0 { "Saved" } else { "Parsed" }.to_string(),
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_cases");

    for size in [100, 1_000, 10_000] {
        let cases = generate_cases(size);
        let search = FilterCriteria::new().with_search_text("al-0001");
        let combined = FilterCriteria::new()
            .with_search_text("patient 1")
            .with_hospital_group("Apollo")
            .with_tpa("Vidal");

        group.bench_with_input(BenchmarkId::new("search", size), &cases, |b, cases| {
            b.iter(|| filter_cases(black_box(cases), black_box(&search)));
        });
        group.bench_with_input(BenchmarkId::new("combined", size), &cases, |b, cases| {
            b.iter(|| filter_cases(black_box(cases), black_box(&combined)));
        });
    }

    group.finish();
}

fn bench_options(c: &mut Criterion) {
    let cases = generate_cases(10_000);

    c.bench_function("tpa_options_for_group", |b| {
        b.iter(|| options::tpa_options(black_box(&cases), black_box(Some("Fortis"))));
    });
}

fn bench_turnaround(c: &mut Criterion) {
    c.bench_function("turnaround_seconds", |b| {
        b.iter(|| {
            turnaround_seconds(
                black_box(Some("2024-01-01T00:00:00Z")),
                black_box(Some("2024-01-01T00:00:10.250Z")),
            )
        });
    });
}

criterion_group!(benches, bench_filter, bench_options, bench_turnaround);
criterion_main!(benches);
