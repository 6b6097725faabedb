use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::io::Write;
use xdb_region::{CachePolicy, Searcher};

#[path = "../tests/common/mod.rs"]
mod common;

fn fixture_path() -> tempfile::NamedTempFile {
    let mut records = Vec::new();
    for i in 0u8..=255 {
        records.push((
            common::ipv4(10, 0, i, 0),
            common::ipv4(10, 0, i, 255),
            "CN|0|Shanghai|Shanghai|Telecom",
        ));
    }
    let bytes = common::build_xdb(
        4,
        vec![common::Slot {
            row: 10,
            col: 0,
            records,
        }],
    );
    let mut f = tempfile::NamedTempFile::new().expect("create temp xdb");
    f.write_all(&bytes).unwrap();
    f.flush().unwrap();
    f
}

fn bench_policies(c: &mut Criterion) {
    let fixture = fixture_path();
    let mut group = c.benchmark_group("search_ipv4");

    for policy in [CachePolicy::Content, CachePolicy::VectorIndex, CachePolicy::File] {
        let searcher = Searcher::new(policy, fixture.path()).expect("open searcher");
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{policy:?}")),
            &searcher,
            |b, searcher| {
                b.iter(|| searcher.search_str("10.0.128.77").unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_policies);
criterion_main!(benches);
