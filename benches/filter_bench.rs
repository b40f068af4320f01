//! Filter benchmarks for the PICOSYNTH engine
//!
//! Measures one-pole filter voices end to end, including coefficient
//! smoothing under a moving target.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use picosynth::{Node, Synth, Tap, Waveform};

fn filtered_voice(coeff: i16, high_pass: bool) -> Synth {
    let mut synth = Synth::new(1, 4).unwrap();
    let voice = synth.voice_mut(0).unwrap();
    *voice.node_mut(0).unwrap() = Node::osc(None, Some(Tap::Freq), Waveform::Saw);
    *voice.node_mut(1).unwrap() = if high_pass {
        Node::high_pass(None, Some(Tap::Node(0)), coeff)
    } else {
        Node::low_pass(None, Some(Tap::Node(0)), coeff)
    };
    voice.set_out(1);
    synth.note_on(0, 57);
    synth
}

fn bench_lowpass(c: &mut Criterion) {
    let mut synth = filtered_voice(5000, false);
    c.bench_function("lowpass_voice_1000_samples", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(synth.process());
            }
        })
    });
}

fn bench_highpass(c: &mut Criterion) {
    let mut synth = filtered_voice(5000, true);
    c.bench_function("highpass_voice_1000_samples", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(synth.process());
            }
        })
    });
}

fn bench_coeff_smoothing(c: &mut Criterion) {
    let mut synth = filtered_voice(0, false);
    let mut target: i16 = 0;
    c.bench_function("lowpass_moving_cutoff_1000_samples", |b| {
        b.iter(|| {
            target = ((i32::from(target) + 1000) & 0x7FFF) as i16;
            if let Some(node) = synth.voice_mut(0).unwrap().node_mut(1) {
                node.set_filter_coeff(target);
            }
            for _ in 0..1000 {
                black_box(synth.process());
            }
        })
    });
}

criterion_group!(
    filter_benches,
    bench_lowpass,
    bench_highpass,
    bench_coeff_smoothing,
);

criterion_main!(filter_benches);
