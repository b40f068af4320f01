//! Node Module
//!
//! A [`Node`] is one unit of processing inside a voice: an oscillator, an
//! ADSR envelope, a one-pole filter, or a 3-input mixer. Nodes read each
//! other through typed [`Tap`] edges instead of raw pointers: a tap names
//! another node's committed output or one of the voice's control cells,
//! so cross-voice wiring and dangling references are unrepresentable.
//!
//! Every node carries an optional gain tap. When wired, the node's raw
//! output is multiplied by the resolved gain value before it is
//! committed; wiring an envelope's output to an oscillator's gain is the
//! canonical way to shape a note.
//!
//! Re-initializing a slot is simply assigning a fresh `Node` value
//! through [`Voice::node_mut`](crate::Voice::node_mut); all prior state
//! is discarded.

use serde::{Deserialize, Serialize};

use crate::envelope::{rate_from_ms, Env};
use crate::filter::OnePole;
use crate::fixed::{Q15, Q15_MAX};
use crate::oscillator::{Osc, Waveform};

/// A signal edge: where a node input reads its value from.
///
/// All taps resolve within the owning voice. `Node` taps read the
/// referenced node's output as committed at the end of the previous
/// sample's state pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tap {
    /// Another node's committed output, by index within the voice.
    Node(u8),

    /// The voice's base-frequency cell, set by note-on.
    Freq,

    /// The voice's auxiliary detune cell, set by the host.
    Detune,
}

/// 3-input mixer payload. Unwired inputs contribute nothing; the sum is
/// saturated only when the node output is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mixer {
    pub inputs: [Option<Tap>; 3],
}

/// Variant payload of a node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NodeKind {
    /// Unconfigured slot. Voice evaluation stops at the first empty slot,
    /// so the node array is a populated prefix followed by spares.
    #[default]
    Empty,

    /// Phase-accumulator oscillator.
    Osc(Osc),

    /// ADSR envelope.
    Env(Env),

    /// One-pole low-pass filter.
    LowPass(OnePole),

    /// One-pole high-pass filter (input minus the low-pass signal).
    HighPass(OnePole),

    /// 3-input summing mixer.
    Mix(Mixer),
}

/// One processing node: a variant payload, an optional gain tap, and the
/// committed Q15 output other nodes read through [`Tap::Node`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) gain: Option<Tap>,
    pub(crate) out: Q15,
}

impl Node {
    /// Creates an oscillator node. `freq` is the phase-increment source,
    /// typically [`Tap::Freq`]; use [`Node::set_detune`] afterwards to
    /// wire a detune signal.
    pub fn osc(gain: Option<Tap>, freq: Option<Tap>, wave: Waveform) -> Self {
        Self {
            kind: NodeKind::Osc(Osc::new(freq, wave)),
            gain,
            out: 0,
        }
    }

    /// Creates an envelope node from raw per-sample rates at internal
    /// resolution. A negative `sustain` inverts the output.
    pub fn env(gain: Option<Tap>, attack: i32, decay: i32, sustain: Q15, release: i32) -> Self {
        Self {
            kind: NodeKind::Env(Env::new(attack, decay, sustain, release)),
            gain,
            out: 0,
        }
    }

    /// Creates an envelope node from millisecond timings and a sustain
    /// percentage (0-100).
    pub fn env_ms(gain: Option<Tap>, atk_ms: u16, dec_ms: u16, sus_pct: u8, rel_ms: u16) -> Self {
        let sustain = (i32::from(sus_pct) * i32::from(Q15_MAX) / 100) as Q15;
        Self::env(
            gain,
            rate_from_ms(atk_ms),
            rate_from_ms(dec_ms),
            sustain,
            rate_from_ms(rel_ms),
        )
    }

    /// Creates a low-pass filter node. `coeff` 0 passes only DC;
    /// `Q15_MAX` is effectively a bypass.
    pub fn low_pass(gain: Option<Tap>, input: Option<Tap>, coeff: Q15) -> Self {
        Self {
            kind: NodeKind::LowPass(OnePole::new(input, coeff)),
            gain,
            out: 0,
        }
    }

    /// Creates a high-pass filter node.
    pub fn high_pass(gain: Option<Tap>, input: Option<Tap>, coeff: Q15) -> Self {
        Self {
            kind: NodeKind::HighPass(OnePole::new(input, coeff)),
            gain,
            out: 0,
        }
    }

    /// Creates a 3-input mixer node.
    pub fn mix(
        gain: Option<Tap>,
        in1: Option<Tap>,
        in2: Option<Tap>,
        in3: Option<Tap>,
    ) -> Self {
        Self {
            kind: NodeKind::Mix(Mixer {
                inputs: [in1, in2, in3],
            }),
            gain,
            out: 0,
        }
    }

    /// The node's most recently committed output.
    pub fn out(&self) -> Q15 {
        self.out
    }

    /// The variant payload, for inspection.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// The gain tap, if wired.
    pub fn gain(&self) -> Option<Tap> {
        self.gain
    }

    /// Wires or clears the oscillator's detune input. No-op for other
    /// node kinds.
    pub fn set_detune(&mut self, detune: Option<Tap>) {
        if let NodeKind::Osc(osc) = &mut self.kind {
            osc.detune = detune;
        }
    }

    /// Requests a new filter coefficient; the live coefficient eases
    /// toward it over ~4 ms. No-op for non-filter nodes.
    pub fn set_filter_coeff(&mut self, coeff: Q15) {
        if let NodeKind::LowPass(f) | NodeKind::HighPass(f) = &mut self.kind {
            f.set_target(coeff);
        }
    }

    /// Note-on reset: clears the committed output and all variant state.
    /// Filters snap their live coefficient to the target and envelopes
    /// force an immediate block-rate refresh.
    pub(crate) fn reset(&mut self) {
        self.out = 0;
        match &mut self.kind {
            NodeKind::Empty | NodeKind::Mix(_) => {}
            NodeKind::Osc(osc) => osc.reset(),
            NodeKind::Env(env) => env.reset(),
            NodeKind::LowPass(f) | NodeKind::HighPass(f) => f.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_node_is_empty() {
        let node = Node::default();
        assert_eq!(node.kind, NodeKind::Empty);
        assert_eq!(node.out(), 0);
        assert_eq!(node.gain(), None);
    }

    #[test]
    fn test_osc_constructor() {
        let node = Node::osc(Some(Tap::Node(0)), Some(Tap::Freq), Waveform::Saw);
        match node.kind() {
            NodeKind::Osc(osc) => {
                assert_eq!(osc.freq, Some(Tap::Freq));
                assert_eq!(osc.detune, None);
                assert_eq!(osc.wave, Waveform::Saw);
            }
            other => panic!("expected oscillator, got {:?}", other),
        }
        assert_eq!(node.gain(), Some(Tap::Node(0)));
    }

    #[test]
    fn test_env_ms_sustain_percent() {
        let node = Node::env_ms(None, 10, 100, 80, 50);
        match node.kind() {
            NodeKind::Env(env) => assert!(env.is_idle()),
            other => panic!("expected envelope, got {:?}", other),
        }
    }

    #[test]
    fn test_set_detune_only_affects_oscillators() {
        let mut flt = Node::low_pass(None, Some(Tap::Node(0)), 5000);
        flt.set_detune(Some(Tap::Detune));
        match flt.kind() {
            NodeKind::LowPass(f) => assert_eq!(f.input, Some(Tap::Node(0))),
            other => panic!("expected low-pass, got {:?}", other),
        }

        let mut osc = Node::osc(None, Some(Tap::Freq), Waveform::Sine);
        osc.set_detune(Some(Tap::Detune));
        match osc.kind() {
            NodeKind::Osc(o) => assert_eq!(o.detune, Some(Tap::Detune)),
            other => panic!("expected oscillator, got {:?}", other),
        }
    }

    #[test]
    fn test_set_filter_coeff_updates_target_only() {
        let mut node = Node::low_pass(None, None, 1000);
        node.set_filter_coeff(30000);
        match node.kind() {
            NodeKind::LowPass(f) => {
                assert_eq!(f.coeff(), 1000);
                assert_eq!(f.coeff_target, 30000);
            }
            other => panic!("expected low-pass, got {:?}", other),
        }
        // Non-filter nodes ignore the call
        let mut mix = Node::mix(None, None, None, None);
        mix.set_filter_coeff(123);
        assert_eq!(mix.kind, NodeKind::Mix(Mixer::default()));
    }

    #[test]
    fn test_reset_clears_output() {
        let mut node = Node::osc(None, Some(Tap::Freq), Waveform::Square);
        node.out = 1234;
        node.reset();
        assert_eq!(node.out(), 0);
    }
}
