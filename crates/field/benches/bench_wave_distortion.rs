use std::hint::black_box;
use std::time::Instant;

use aurum_field::{ParticleSet, WaveDistortion};

fn bench_distort(count: usize, iterations: usize) {
    let mut set = ParticleSet::sphere(count, 1.6);
    let wave = WaveDistortion::default();

    let start = Instant::now();
    for i in 0..iterations {
        set.distort(black_box(&wave), i as f64 / 60.0);
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    black_box(set.current());
    println!(
        "  distort ({count} particles, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_sample(count: usize, iterations: usize) {
    let start = Instant::now();
    for _ in 0..iterations {
        black_box(aurum_field::fibonacci_sphere(black_box(count), 1.6));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  sample ({count} particles, {iterations} iters): {per_iter:?}/iter");
}

fn main() {
    println!("=== Particle Field Benchmarks ===\n");

    println!("Wave distortion (per-frame pass):");
    bench_distort(3_000, 1000);
    bench_distort(30_000, 100);
    bench_distort(300_000, 10);

    println!("\nFibonacci sampling:");
    bench_sample(3_000, 100);
    bench_sample(30_000, 10);

    println!("\n=== Done ===");
}
