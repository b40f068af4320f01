//! WebAssembly Audio Engine Bridge
//!
//! This module exposes the engine to JavaScript via wasm-bindgen. It
//! wraps a two-voice piano instrument (main tone plus hammer transient,
//! from [`crate::presets`]) behind a small control surface and renders
//! into a fixed buffer so the audio callback never grows the WASM heap:
//! the render buffer is allocated once at construction and requests
//! beyond [`MAX_BUFFER_SAMPLES`] are rejected before touching the engine.

use js_sys::Int16Array;
use wasm_bindgen::prelude::*;

use crate::fixed::{Q15, Q15_MAX};
use crate::node::NodeKind;
use crate::oscillator::Waveform;
use crate::presets::{piano_hammer, piano_tone, Patch, PatchNode};
use crate::synth::Synth;
use crate::SAMPLE_RATE;

#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Ceiling on a single render request (one second of audio). The buffer
/// is allocated once; larger requests are rejected, not grown.
pub const MAX_BUFFER_SAMPLES: usize = SAMPLE_RATE as usize;

/// Maps a JS-side waveform index to a waveform, defaulting to sine.
fn wave_from_index(idx: u8) -> Waveform {
    match idx {
        1 => Waveform::Triangle,
        2 => Waveform::Saw,
        3 => Waveform::Square,
        4 => Waveform::Noise,
        _ => Waveform::Sine,
    }
}

/// Tweakable parameters of the piano instrument, applied by rebuilding
/// the two voice patches.
struct PianoParams {
    tone_wave: Waveform,
    partial_wave: Waveform,
    tone_filter_coeff: Q15,
    hammer_filter_coeff: Q15,
}

impl Default for PianoParams {
    fn default() -> Self {
        Self {
            tone_wave: Waveform::Sine,
            partial_wave: Waveform::Triangle,
            tone_filter_coeff: 5000,
            hammer_filter_coeff: 6500,
        }
    }
}

impl PianoParams {
    /// The main-tone patch with the current parameters substituted in.
    fn tone_patch(&self) -> Patch {
        let mut patch = piano_tone();
        for node in &mut patch.nodes {
            match node {
                PatchNode::Osc { wave, detune, .. } => {
                    *wave = if detune.is_some() {
                        self.partial_wave
                    } else {
                        self.tone_wave
                    };
                }
                PatchNode::LowPass { coeff, .. } => *coeff = self.tone_filter_coeff,
                _ => {}
            }
        }
        patch
    }

    fn hammer_patch(&self) -> Patch {
        let mut patch = piano_hammer();
        for node in &mut patch.nodes {
            if let PatchNode::LowPass { coeff, .. } = node {
                *coeff = self.hammer_filter_coeff;
            }
        }
        patch
    }
}

/// Two-voice piano instrument driven from JavaScript.
#[wasm_bindgen]
pub struct PianoSynth {
    synth: Synth,
    params: PianoParams,
    buffer: Vec<i16>,
}

#[wasm_bindgen]
impl PianoSynth {
    /// Builds the instrument and its render buffer.
    #[wasm_bindgen(constructor)]
    pub fn new() -> PianoSynth {
        console_error_panic_hook::set_once();

        let mut piano = PianoSynth {
            synth: Synth::new(2, 8).expect("piano voices fit MAX_NODES"),
            params: PianoParams::default(),
            buffer: vec![0; MAX_BUFFER_SAMPLES],
        };
        piano.apply_params();
        piano
    }

    /// Sample rate the engine renders at; feed this to the AudioContext.
    pub fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Triggers a note on both voices and refreshes the inharmonicity
    /// detune (~0.2% sharp second partial).
    pub fn note_on(&mut self, note: u8) {
        self.synth.note_on(0, note);
        self.synth.note_on(1, note);
        let detune = self.synth.voice(0).map_or(0, |v| v.freq() / 500);
        for vi in 0..2 {
            if let Some(voice) = self.synth.voice_mut(vi) {
                voice.set_detune(detune);
            }
        }
    }

    /// Releases both voices into their envelope tails.
    pub fn note_off(&mut self) {
        self.synth.note_off(0);
        self.synth.note_off(1);
    }

    /// Renders `samples` mono Q15 samples into the internal buffer and
    /// returns them as an `Int16Array`. Requests beyond
    /// [`MAX_BUFFER_SAMPLES`] are rejected.
    pub fn render(&mut self, samples: usize) -> Result<Int16Array, JsValue> {
        if samples > MAX_BUFFER_SAMPLES {
            return Err(JsValue::from_str("render request exceeds buffer capacity"));
        }
        for slot in &mut self.buffer[..samples] {
            *slot = self.synth.process();
        }
        Ok(Int16Array::from(&self.buffer[..samples]))
    }

    /// Selects the fundamental waveform of the main tone.
    pub fn set_tone_wave(&mut self, wave_idx: u8) {
        self.params.tone_wave = wave_from_index(wave_idx);
        self.apply_params();
    }

    /// Selects the waveform of the detuned second partial.
    pub fn set_partial_wave(&mut self, wave_idx: u8) {
        self.params.partial_wave = wave_from_index(wave_idx);
        self.apply_params();
    }

    /// Eases the main-tone filter toward a new coefficient without
    /// rebuilding the patch, so changes are click-free while playing.
    pub fn set_tone_filter(&mut self, coeff: i16) {
        let target = coeff.clamp(0, Q15_MAX);
        self.params.tone_filter_coeff = target;
        if let Some(voice) = self.synth.voice_mut(0) {
            let mut idx = 0;
            while let Some(node) = voice.node_mut(idx) {
                if matches!(node.kind(), NodeKind::LowPass(_)) {
                    node.set_filter_coeff(target);
                }
                idx += 1;
            }
        }
    }

    /// Number of voices currently producing audio.
    pub fn active_voices(&self) -> usize {
        self.synth.active_voice_count()
    }
}

impl PianoSynth {
    /// Rebuilds both voice patches from the current parameters. Playing
    /// notes restart from silence; use [`PianoSynth::set_tone_filter`]
    /// for click-free live control of the cutoff.
    fn apply_params(&mut self) {
        let tone = self.params.tone_patch();
        let hammer = self.params.hammer_patch();
        if let Some(voice) = self.synth.voice_mut(0) {
            tone.apply(voice);
        }
        if let Some(voice) = self.synth.voice_mut(1) {
            hammer.apply(voice);
        }
    }
}

impl Default for PianoSynth {
    fn default() -> Self {
        Self::new()
    }
}
