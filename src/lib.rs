//! PICOSYNTH - Lightweight Fixed-Point Modular Synthesizer
//!
//! This crate provides the core audio synthesis engine for PICOSYNTH,
//! a polyphonic synthesizer designed for resource-constrained targets:
//! small embedded systems, single-threaded audio callbacks, WebAssembly.
//! All DSP runs in Q15 fixed-point arithmetic; `process()` produces one
//! mono 16-bit sample per call and never allocates.
//!
//! # Architecture
//!
//! A [`Synth`] owns a fixed set of [`Voice`]s. Each voice owns an ordered
//! array of [`Node`]s (oscillators, ADSR envelopes, one-pole filters,
//! mixers) wired together with typed [`Tap`] edges. Every sample is
//! rendered in two passes per voice: pass 1 computes each node's new
//! output from committed state, pass 2 commits outputs and advances
//! internal state. Downstream nodes therefore always observe the values
//! committed at the end of the previous sample, independent of node
//! declaration order.
//!
//! # Example
//!
//! ```rust
//! use picosynth::{Node, Synth, Tap, Waveform};
//!
//! let mut synth = Synth::new(1, 8).unwrap();
//! let voice = synth.voice_mut(0).unwrap();
//! *voice.node_mut(0).unwrap() = Node::env_ms(None, 10, 100, 80, 50);
//! *voice.node_mut(1).unwrap() =
//!     Node::osc(Some(Tap::Node(0)), Some(Tap::Freq), Waveform::Sine);
//! voice.set_out(1);
//!
//! synth.note_on(0, 60); // C4
//! let sample = synth.process();
//! assert!((-32768..=32767).contains(&i32::from(sample)));
//! ```

pub mod envelope;
pub mod filter;
pub mod fixed;
pub mod node;
pub mod oscillator;
pub mod presets;
pub mod synth;
pub mod voice;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use fixed::{q15_mul, q15_sat, Q15, Q15_MAX, Q15_MIN};
pub use node::{Node, NodeKind, Tap};
pub use oscillator::{midi_to_freq, Lfsr, Waveform};
pub use presets::{Patch, PatchNode};
pub use synth::Synth;
pub use voice::Voice;

/// Output sample rate in Hz. All millisecond-based timings and the MIDI
/// frequency table are derived from this at compile time.
pub const SAMPLE_RATE: u32 = 11025;

/// Envelope block length in samples. Envelope rates are recomputed once
/// per block and applied per-sample within it; the `u8` type bounds the
/// block at 255 samples. Typical values: 16, 32, 64.
pub const BLOCK_SIZE: u8 = 32;

/// Upper bound on the per-voice node count accepted by [`Synth::new`].
/// Also the width of the voice usage bitmask, so every legal voice is
/// fully tracked by the dead-node skip optimization.
pub const MAX_NODES: usize = 16;

/// Converts a duration in milliseconds to a sample count at [`SAMPLE_RATE`].
pub const fn ms_to_samples(ms: u32) -> u32 {
    ms * SAMPLE_RATE / 1000
}
