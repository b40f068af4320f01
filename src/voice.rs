//! Voice Module
//!
//! A [`Voice`] is one polyphonic channel: an ordered array of nodes, the
//! current MIDI note and gate, a base-frequency cell written by note-on,
//! an auxiliary detune cell written by the host, and the index of the
//! node whose output the synth mixes.
//!
//! # Two-pass rendering
//!
//! Each sample is rendered in two passes. Pass 1 computes every node's
//! new output from committed state only, so a tap always observes the
//! value committed at the end of the previous sample regardless of node
//! declaration order. Pass 2 commits the new outputs (with saturation)
//! and advances each node's internal state.
//!
//! # Dead-node skipping
//!
//! [`Voice::set_out`] traces the dependency closure of the output node
//! over the typed tap edges into a bitmask; nodes outside the closure are
//! skipped entirely in both passes. Already-marked bits short-circuit the
//! trace, so malformed cyclic wiring terminates instead of recursing
//! forever. A voice that never had `set_out` called evaluates every
//! populated node.

use crate::fixed::{q15_sat, Q15};
use crate::node::{Node, NodeKind, Tap};
use crate::oscillator::{midi_to_freq, Lfsr};
use crate::MAX_NODES;

/// One polyphonic channel: a wired node graph plus note state.
#[derive(Debug, Clone)]
pub struct Voice {
    note: u8,
    gate: bool,
    out_idx: u8,
    /// Bit N set means node N is in the output node's dependency closure.
    usage_mask: u16,
    freq: Q15,
    detune: Q15,
    nodes: Vec<Node>,
}

impl Voice {
    pub(crate) fn new(num_nodes: usize) -> Self {
        Self {
            note: 0,
            gate: false,
            out_idx: 0,
            usage_mask: 0,
            freq: 0,
            detune: 0,
            nodes: vec![Node::default(); num_nodes],
        }
    }

    /// The node at `idx`, or `None` when out of range.
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Mutable access to the node at `idx`. Assigning a fresh node value
    /// re-initializes the slot and clears all prior state.
    pub fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx)
    }

    /// Selects which node provides the voice output and recomputes the
    /// usage mask. Out-of-range indices are ignored.
    pub fn set_out(&mut self, idx: usize) {
        if idx < self.nodes.len() {
            self.out_idx = idx as u8;
            self.rebuild_usage_mask();
        }
    }

    /// The base-frequency cell read through [`Tap::Freq`].
    pub fn freq(&self) -> Q15 {
        self.freq
    }

    /// Overrides the base frequency directly (bypassing MIDI tuning).
    pub fn set_freq(&mut self, freq: Q15) {
        self.freq = freq;
    }

    /// The detune cell read through [`Tap::Detune`].
    pub fn detune(&self) -> Q15 {
        self.detune
    }

    /// Sets the detune cell read through [`Tap::Detune`].
    pub fn set_detune(&mut self, detune: Q15) {
        self.detune = detune;
    }

    /// The current MIDI note.
    pub fn note(&self) -> u8 {
        self.note
    }

    /// True while the key is held.
    pub fn gate(&self) -> bool {
        self.gate
    }

    pub(crate) fn note_on(&mut self, note: u8) {
        self.note = note;
        self.gate = true;
        self.freq = midi_to_freq(note);
        for node in &mut self.nodes {
            node.reset();
        }
    }

    pub(crate) fn note_off(&mut self) {
        self.gate = false;
        // Force envelopes to re-rate next sample; without this, release
        // would not start until the next block boundary.
        for node in &mut self.nodes {
            if let NodeKind::Env(env) = &mut node.kind {
                env.reset_block();
            }
        }
    }

    /// True when every envelope node has fully released. Together with a
    /// cleared gate this means the voice can no longer produce output.
    pub(crate) fn envelopes_idle(&self) -> bool {
        self.nodes.iter().all(|n| match &n.kind {
            NodeKind::Env(env) => env.is_idle(),
            _ => true,
        })
    }

    /// Resolves a tap against this voice's state. Out-of-range node taps
    /// read as silence.
    fn tap(&self, tap: Tap) -> Q15 {
        match tap {
            Tap::Node(idx) => self.nodes.get(usize::from(idx)).map_or(0, |n| n.out),
            Tap::Freq => self.freq,
            Tap::Detune => self.detune,
        }
    }

    fn rebuild_usage_mask(&mut self) {
        self.usage_mask = 0;
        if usize::from(self.out_idx) < self.nodes.len() {
            self.mark_used(usize::from(self.out_idx));
        }
    }

    /// Marks `idx` and everything it reads from. Marked bits terminate
    /// the walk, so cycles cannot recurse forever.
    fn mark_used(&mut self, idx: usize) {
        if idx >= self.nodes.len() {
            return;
        }
        let bit = 1u16 << idx;
        if self.usage_mask & bit != 0 {
            return;
        }
        self.usage_mask |= bit;

        let node = &self.nodes[idx];
        let mut deps: [Option<Tap>; 4] = [node.gain, None, None, None];
        match &node.kind {
            NodeKind::Osc(osc) => {
                deps[1] = osc.freq;
                deps[2] = osc.detune;
            }
            NodeKind::LowPass(f) | NodeKind::HighPass(f) => {
                deps[1] = f.input;
            }
            NodeKind::Mix(m) => {
                deps[1..4].copy_from_slice(&m.inputs);
            }
            NodeKind::Empty | NodeKind::Env(_) => {}
        }

        for dep in deps.into_iter().flatten() {
            if let Tap::Node(j) = dep {
                self.mark_used(usize::from(j));
            }
        }
    }

    /// Renders one sample: pass 1 computes outputs from committed state,
    /// pass 2 commits and advances. Returns the output node's new value.
    pub(crate) fn render(&mut self, noise: &mut Lfsr) -> Q15 {
        let mask = self.usage_mask;
        let mut tmp = [0i32; MAX_NODES];

        // Pass 1: compute outputs from current state
        for i in 0..self.nodes.len() {
            if matches!(self.nodes[i].kind, NodeKind::Empty) {
                break;
            }
            if mask != 0 && mask & (1 << i) == 0 {
                continue;
            }
            let raw = match &self.nodes[i].kind {
                NodeKind::Osc(osc) => i32::from(osc.wave.sample(osc.phase(), noise)),
                NodeKind::Env(env) => env.output(),
                NodeKind::LowPass(f) => f.lowpass_output(),
                NodeKind::HighPass(f) => match f.input {
                    // High-pass is the input minus the low-pass signal
                    Some(tap) => i32::from(self.tap(tap)) - f.lowpass_output(),
                    None => 0,
                },
                NodeKind::Mix(m) => m
                    .inputs
                    .iter()
                    .flatten()
                    .map(|&tap| i32::from(self.tap(tap)))
                    .sum(),
                NodeKind::Empty => 0,
            };
            tmp[i] = match self.nodes[i].gain {
                Some(g) => ((i64::from(raw) * i64::from(self.tap(g))) >> 15) as i32,
                None => raw,
            };
        }

        // Pass 2: commit outputs and advance state for the next sample
        let gate = self.gate;
        for i in 0..self.nodes.len() {
            if matches!(self.nodes[i].kind, NodeKind::Empty) {
                break;
            }
            if mask != 0 && mask & (1 << i) == 0 {
                continue;
            }
            self.nodes[i].out = q15_sat(tmp[i]);

            // Resolve this node's inputs before mutating it
            match &self.nodes[i].kind {
                NodeKind::Osc(osc) => {
                    let freq = osc.freq.map_or(0, |t| self.tap(t));
                    let detune = osc.detune.map_or(0, |t| self.tap(t));
                    if let NodeKind::Osc(osc) = &mut self.nodes[i].kind {
                        osc.advance(freq, detune);
                    }
                }
                NodeKind::Env(_) => {
                    if let NodeKind::Env(env) = &mut self.nodes[i].kind {
                        env.advance(gate);
                    }
                }
                NodeKind::LowPass(f) | NodeKind::HighPass(f) => {
                    let input = f.input.map_or(0, |t| i32::from(self.tap(t)));
                    let out = self.nodes[i].out;
                    if let NodeKind::LowPass(f) | NodeKind::HighPass(f) =
                        &mut self.nodes[i].kind
                    {
                        f.advance(input, out);
                    }
                }
                NodeKind::Empty | NodeKind::Mix(_) => {}
            }
        }

        self.nodes.get(usize::from(self.out_idx)).map_or(0, |n| n.out)
    }
}
