use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use phrasaurus::embedding::EmbeddingStore;
use phrasaurus::orthography::{AlignmentCosts, PhraseScorer};
use phrasaurus::orthography::batch::orthographic_distances;
use phrasaurus::phrase::Phrase;
use phrasaurus::util::partition::Partitioner;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

fn random_phrase(rng: &mut StdRng) -> Phrase {
    let words = rng.random_range(1..=3);
    let words: Vec<String> = (0..words)
        .map(|_| {
            let len = rng.random_range(2..=10);
            (0..len)
                .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
                .collect()
        })
        .collect();
    Phrase::new(words).unwrap()
}

fn generate_pairs(count: usize) -> Vec<(Phrase, Phrase)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| (random_phrase(&mut rng), random_phrase(&mut rng)))
        .collect()
}

fn bench_alignment(c: &mut Criterion) {
    let pairs = generate_pairs(1000);
    let plain = PhraseScorer::default();
    let permuting = PhraseScorer::new(
        AlignmentCosts::non_abbreviations(),
        AlignmentCosts::abbreviations(),
        Some(1.0),
    );

    let mut group = c.benchmark_group("alignment");
    group.bench_function("orthographic", |b| {
        b.iter(|| {
            for (a, p) in &pairs {
                black_box(plain.orthographic_distance(black_box(a), black_box(p)));
            }
        })
    });
    group.bench_function("orthographic_permuted", |b| {
        b.iter(|| {
            for (a, p) in &pairs {
                black_box(permuting.orthographic_distance(black_box(a), black_box(p)));
            }
        })
    });
    group.bench_function("abbreviation", |b| {
        b.iter(|| {
            for (a, p) in &pairs {
                black_box(plain.abbreviation_distance(black_box(a), black_box(p)));
            }
        })
    });
    for threads in [1, 4] {
        let partitioner = Partitioner::new(threads).unwrap();
        group.bench_function(format!("batch_{threads}_threads"), |b| {
            b.iter(|| black_box(orthographic_distances(&pairs, &plain, &partitioner)))
        });
    }
    group.finish();
}

fn bench_similarity_scan(c: &mut Criterion) {
    let dimension = 128;
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = EmbeddingStore::new(dimension).unwrap();
    for i in 0..10_000 {
        let vector: Vec<f32> = (0..dimension).map(|_| rng.random_range(-1.0..1.0)).collect();
        store
            .insert(Phrase::parse(&format!("w{i}")).unwrap(), vector)
            .unwrap();
    }
    store.normalize_all();
    let query = store.iter().next().unwrap().1.to_vec();

    let mut group = c.benchmark_group("similarity_scan");
    for threads in [1, 4] {
        let partitioner = Partitioner::new(threads).unwrap();
        group.bench_function(format!("{threads}_threads"), |b| {
            b.iter(|| {
                black_box(
                    store
                        .calculate_scores_threaded(black_box(&query), &partitioner)
                        .unwrap(),
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_alignment, bench_similarity_scan);
criterion_main!(benches);
