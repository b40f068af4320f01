// Test utilities and helper functions for PICOSYNTH engine tests

#![allow(dead_code)]

use picosynth::{Q15, SAMPLE_RATE};

/// Renders `count` samples from the synth into a buffer.
pub fn render(synth: &mut picosynth::Synth, count: usize) -> Vec<Q15> {
    (0..count).map(|_| synth.process()).collect()
}

/// Largest absolute sample value in the buffer.
pub fn peak(samples: &[Q15]) -> i32 {
    samples.iter().map(|&s| i32::from(s).abs()).max().unwrap_or(0)
}

/// Number of sign flips between consecutive samples (zero counts as
/// positive, so pure silence has no flips).
pub fn sign_changes(samples: &[Q15]) -> usize {
    samples
        .windows(2)
        .filter(|w| (w[0] < 0) != (w[1] < 0))
        .count()
}

/// Sample count for a duration in milliseconds at the engine rate.
pub fn samples_for_ms(ms: u32) -> usize {
    (ms * SAMPLE_RATE / 1000) as usize
}

/// True when the buffer contains `run` consecutive zero samples.
pub fn has_silent_run(samples: &[Q15], run: usize) -> bool {
    samples.windows(run).any(|w| w.iter().all(|&s| s == 0))
}

/// Random Q15 value drawn from the full range.
pub fn random_q15<R: rand::Rng>(rng: &mut R) -> Q15 {
    rng.gen::<i16>()
}
