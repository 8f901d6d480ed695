use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use lexmerge::{distance, find_clusters, EditCosts, Sense, SenseGuid, Word};

const SYLLABLES: [&str; 8] = ["ka", "ti", "mbu", "nya", "wa", "zi", "lo", "pe"];

fn vernacular(seed: usize) -> String {
    (0..3)
        .map(|k| SYLLABLES[(seed / 8usize.pow(k)) % SYLLABLES.len()])
        .collect()
}

fn make_entries(n: usize) -> Vec<Word> {
    (0..n)
        .map(|i| {
            Word::new(format!("w{i}"), vernacular(i))
                .with_sense(Sense::new(SenseGuid::from_u128(i as u128 + 1), "en", "gloss"))
        })
        .collect()
}

fn bench_similarity(c: &mut Criterion) {
    let mut group = c.benchmark_group("similarity");

    let costs = EditCosts::new(4, 3, 5);
    group.throughput(Throughput::Elements(1));
    group.bench_function("distance_short", |b| {
        b.iter(|| distance(black_box("testing"), black_box("toasting"), costs));
    });
    group.bench_function("distance_long", |b| {
        b.iter(|| {
            distance(
                black_box("nyakatimbuwazilope"),
                black_box("nyakatimbuwazilopeka"),
                costs,
            )
        });
    });

    for n in [64usize, 256] {
        let entries = make_entries(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("find_clusters_{n}"), |b| {
            b.iter(|| find_clusters(black_box(&entries), EditCosts::uniform(1), 1));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_similarity);
criterion_main!(benches);
