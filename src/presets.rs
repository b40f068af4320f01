//! Preset Module
//!
//! Serializable patch descriptions. A [`Patch`] is a declarative voice
//! definition (node specs plus the output index) that can be stored as
//! JSON and applied to any voice with enough node slots. The factory
//! functions ship the classic two-voice piano sound: [`piano_tone`] for
//! the main body and [`piano_hammer`] for the strike transient layered
//! on a second voice.

use serde::{Deserialize, Serialize};

use crate::fixed::{Q15, Q15_MAX};
use crate::node::{Node, Tap};
use crate::oscillator::Waveform;
use crate::voice::Voice;

/// Declarative description of one node slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PatchNode {
    /// Oscillator with an optional detune edge.
    Osc {
        gain: Option<Tap>,
        freq: Option<Tap>,
        detune: Option<Tap>,
        wave: Waveform,
    },

    /// Envelope from raw per-sample rates (internal resolution).
    Env {
        gain: Option<Tap>,
        attack: i32,
        decay: i32,
        sustain: Q15,
        release: i32,
    },

    /// Envelope from millisecond timings and a sustain percentage.
    EnvMs {
        gain: Option<Tap>,
        atk_ms: u16,
        dec_ms: u16,
        sus_pct: u8,
        rel_ms: u16,
    },

    /// One-pole low-pass filter.
    LowPass {
        gain: Option<Tap>,
        input: Option<Tap>,
        coeff: Q15,
    },

    /// One-pole high-pass filter.
    HighPass {
        gain: Option<Tap>,
        input: Option<Tap>,
        coeff: Q15,
    },

    /// 3-input mixer.
    Mix {
        gain: Option<Tap>,
        inputs: [Option<Tap>; 3],
    },
}

impl PatchNode {
    /// Builds the runtime node this spec describes.
    pub fn build(&self) -> Node {
        match *self {
            PatchNode::Osc {
                gain,
                freq,
                detune,
                wave,
            } => {
                let mut node = Node::osc(gain, freq, wave);
                node.set_detune(detune);
                node
            }
            PatchNode::Env {
                gain,
                attack,
                decay,
                sustain,
                release,
            } => Node::env(gain, attack, decay, sustain, release),
            PatchNode::EnvMs {
                gain,
                atk_ms,
                dec_ms,
                sus_pct,
                rel_ms,
            } => Node::env_ms(gain, atk_ms, dec_ms, sus_pct, rel_ms),
            PatchNode::LowPass { gain, input, coeff } => Node::low_pass(gain, input, coeff),
            PatchNode::HighPass { gain, input, coeff } => Node::high_pass(gain, input, coeff),
            PatchNode::Mix { gain, inputs } => Node::mix(gain, inputs[0], inputs[1], inputs[2]),
        }
    }
}

/// A complete voice definition: node specs in slot order plus the output
/// node index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub name: String,
    pub nodes: Vec<PatchNode>,
    pub out: u8,
}

impl Patch {
    /// Applies this patch to a voice: fills the leading slots, clears any
    /// remaining ones, and selects the output node (which recomputes the
    /// usage mask). Specs beyond the voice's capacity are ignored.
    pub fn apply(&self, voice: &mut Voice) {
        let mut idx = 0;
        for spec in &self.nodes {
            match voice.node_mut(idx) {
                Some(slot) => *slot = spec.build(),
                None => break,
            }
            idx += 1;
        }
        while let Some(slot) = voice.node_mut(idx) {
            *slot = Node::default();
            idx += 1;
        }
        voice.set_out(usize::from(self.out));
    }

    /// Serializes the patch to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes a patch from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Piano main tone: sine fundamental plus a detunable triangle partial,
/// both shaped by one envelope, mixed and warmed by a low-pass filter.
///
/// Wire the host's inharmonicity offset into the voice detune cell
/// (slightly sharp partials read as piano strings).
pub fn piano_tone() -> Patch {
    Patch {
        name: "piano-tone".to_string(),
        nodes: vec![
            PatchNode::LowPass {
                gain: None,
                input: Some(Tap::Node(4)),
                coeff: 5000,
            },
            PatchNode::Env {
                gain: None,
                attack: 12000,
                decay: 350,
                sustain: (Q15_MAX as i32 * 2 / 10) as Q15,
                release: 50,
            },
            PatchNode::Osc {
                gain: Some(Tap::Node(1)),
                freq: Some(Tap::Freq),
                detune: None,
                wave: Waveform::Sine,
            },
            PatchNode::Osc {
                gain: Some(Tap::Node(1)),
                freq: Some(Tap::Freq),
                detune: Some(Tap::Detune),
                wave: Waveform::Triangle,
            },
            PatchNode::Mix {
                gain: None,
                inputs: [Some(Tap::Node(2)), Some(Tap::Node(3)), None],
            },
        ],
        out: 0,
    }
}

/// Piano hammer strike: a fast-decaying bright sawtooth transient over a
/// softer triangle body, each with its own envelope, mixed and filtered.
/// Meant to layer on a second voice under [`piano_tone`].
pub fn piano_hammer() -> Patch {
    Patch {
        name: "piano-hammer".to_string(),
        nodes: vec![
            PatchNode::LowPass {
                gain: None,
                input: Some(Tap::Node(5)),
                coeff: 6500,
            },
            PatchNode::Env {
                gain: None,
                attack: 15000,
                decay: 1200,
                sustain: Q15_MAX / 25,
                release: 30,
            },
            PatchNode::Osc {
                gain: Some(Tap::Node(1)),
                freq: Some(Tap::Freq),
                detune: None,
                wave: Waveform::Saw,
            },
            PatchNode::Env {
                gain: None,
                attack: 10000,
                decay: 250,
                sustain: (Q15_MAX as i32 * 15 / 100) as Q15,
                release: 40,
            },
            PatchNode::Osc {
                gain: Some(Tap::Node(3)),
                freq: Some(Tap::Freq),
                detune: None,
                wave: Waveform::Triangle,
            },
            PatchNode::Mix {
                gain: None,
                inputs: [Some(Tap::Node(2)), Some(Tap::Node(4)), None],
            },
        ],
        out: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Synth;

    #[test]
    fn test_patch_json_round_trip() {
        let patch = piano_tone();
        let json = patch.to_json().unwrap();
        let parsed = Patch::from_json(&json).unwrap();
        assert_eq!(patch, parsed);
    }

    #[test]
    fn test_piano_patches_produce_sound() {
        let mut synth = Synth::new(2, 8).unwrap();
        piano_tone().apply(synth.voice_mut(0).unwrap());
        piano_hammer().apply(synth.voice_mut(1).unwrap());
        synth.note_on(0, 60);
        synth.note_on(1, 60);

        let heard = (0..2000).any(|_| synth.process() != 0);
        assert!(heard, "piano patches rendered pure silence");
    }

    #[test]
    fn test_apply_clears_trailing_slots() {
        let mut synth = Synth::new(1, 8).unwrap();
        let voice = synth.voice_mut(0).unwrap();
        *voice.node_mut(7).unwrap() = Node::mix(None, None, None, None);
        piano_tone().apply(voice);
        assert_eq!(*voice.node(7).unwrap(), Node::default());
    }

    #[test]
    fn test_apply_to_small_voice_ignores_overflow() {
        let mut synth = Synth::new(1, 2).unwrap();
        let voice = synth.voice_mut(0).unwrap();
        // Six-node patch onto a two-node voice: only the prefix lands.
        piano_hammer().apply(voice);
        assert!(voice.node(1).is_some());
        assert!(voice.node(2).is_none());
    }
}
