//! Oscillator benchmarks for the PICOSYNTH engine
//!
//! Measures the pure waveform generators and the LFSR noise source.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use picosynth::oscillator::{self, Lfsr};

fn bench_sine(c: &mut Criterion) {
    c.bench_function("wave_sine_sweep", |b| {
        b.iter(|| {
            for phase in (0..0x8000).step_by(37) {
                black_box(oscillator::sine(black_box(phase as i16)));
            }
        })
    });
}

fn bench_saw(c: &mut Criterion) {
    c.bench_function("wave_saw_sweep", |b| {
        b.iter(|| {
            for phase in (0..0x8000).step_by(37) {
                black_box(oscillator::saw(black_box(phase as i16)));
            }
        })
    });
}

fn bench_triangle(c: &mut Criterion) {
    c.bench_function("wave_triangle_sweep", |b| {
        b.iter(|| {
            for phase in (0..0x8000).step_by(37) {
                black_box(oscillator::triangle(black_box(phase as i16)));
            }
        })
    });
}

fn bench_exp_fall(c: &mut Criterion) {
    c.bench_function("wave_exp_fall_sweep", |b| {
        b.iter(|| {
            for phase in (0..0x8000).step_by(37) {
                black_box(oscillator::exp_fall(black_box(phase as i16)));
            }
        })
    });
}

fn bench_noise(c: &mut Criterion) {
    let mut lfsr = Lfsr::default();
    c.bench_function("wave_noise_1000", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(lfsr.next_sample());
            }
        })
    });
}

fn bench_midi_table(c: &mut Criterion) {
    c.bench_function("midi_to_freq_all_notes", |b| {
        b.iter(|| {
            for note in 0..128u8 {
                black_box(picosynth::midi_to_freq(black_box(note)));
            }
        })
    });
}

criterion_group!(
    oscillator_benches,
    bench_sine,
    bench_saw,
    bench_triangle,
    bench_exp_fall,
    bench_noise,
    bench_midi_table,
);

criterion_main!(oscillator_benches);
