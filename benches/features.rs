//! 特徴量ベクトル化のベンチマーク

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use teburi::domain::features::vectorize;
use teburi::domain::{Hand, Landmark, LANDMARKS_PER_HAND};

fn bench_vectorize(c: &mut Criterion) {
    let landmarks = (0..LANDMARKS_PER_HAND)
        .map(|i| Landmark::new(i as f32 * 0.01, i as f32 * 0.02))
        .collect();
    let one_hand = vec![Hand::from_landmarks(landmarks).unwrap()];
    let no_hands: Vec<Hand> = Vec::new();

    c.bench_function("vectorize_one_hand", |b| {
        b.iter(|| vectorize(black_box(&one_hand)))
    });
    c.bench_function("vectorize_no_hands", |b| {
        b.iter(|| vectorize(black_box(&no_hands)))
    });
}

criterion_group!(benches, bench_vectorize);
criterion_main!(benches);
