//! Renders a short melody with the shipped piano patches and writes it
//! to `piano.wav` as mono 16-bit PCM.
//!
//! Run with `cargo run --example piano`.

use std::fs::File;
use std::io::{self, BufWriter, Write};

use picosynth::presets::{piano_hammer, piano_tone};
use picosynth::{Synth, SAMPLE_RATE};

/// (MIDI note, duration in ms); 0 is a rest.
const MELODY: [(u8, u32); 16] = [
    (64, 400),
    (64, 400),
    (65, 400),
    (67, 400),
    (67, 400),
    (65, 400),
    (64, 400),
    (62, 400),
    (60, 400),
    (60, 400),
    (62, 400),
    (64, 400),
    (64, 600),
    (62, 200),
    (62, 800),
    (0, 400),
];

/// Gate drops this long before the end of each note.
const RELEASE_MS: u32 = 150;

fn write_wav(path: &str, samples: &[i16]) -> io::Result<()> {
    let mut f = BufWriter::new(File::create(path)?);
    let data_size = (samples.len() * 2) as u32;

    f.write_all(b"RIFF")?;
    f.write_all(&(data_size + 36).to_le_bytes())?;
    f.write_all(b"WAVE")?;
    f.write_all(b"fmt ")?;
    f.write_all(&16u32.to_le_bytes())?; // PCM chunk size
    f.write_all(&1u16.to_le_bytes())?; // PCM format
    f.write_all(&1u16.to_le_bytes())?; // mono
    f.write_all(&SAMPLE_RATE.to_le_bytes())?;
    f.write_all(&(SAMPLE_RATE * 2).to_le_bytes())?; // byte rate
    f.write_all(&2u16.to_le_bytes())?; // block align
    f.write_all(&16u16.to_le_bytes())?; // bits per sample
    f.write_all(b"data")?;
    f.write_all(&data_size.to_le_bytes())?;
    for &s in samples {
        f.write_all(&s.to_le_bytes())?;
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let mut synth = Synth::new(2, 8).expect("piano voices fit MAX_NODES");
    piano_tone().apply(synth.voice_mut(0).expect("voice 0"));
    piano_hammer().apply(synth.voice_mut(1).expect("voice 1"));

    let mut audio = Vec::new();
    for &(note, ms) in &MELODY {
        if note != 0 {
            synth.note_on(0, note);
            synth.note_on(1, note);
            // Slightly sharp second partial (~0.2%) reads as string
            // inharmonicity.
            let detune = synth.voice(0).map_or(0, |v| v.freq() / 500);
            for vi in 0..2 {
                if let Some(voice) = synth.voice_mut(vi) {
                    voice.set_detune(detune);
                }
            }
        }

        let held = ms.saturating_sub(RELEASE_MS) * SAMPLE_RATE / 1000;
        let released = RELEASE_MS.min(ms) * SAMPLE_RATE / 1000;
        for _ in 0..held {
            audio.push(synth.process());
        }
        synth.note_off(0);
        synth.note_off(1);
        for _ in 0..released {
            audio.push(synth.process());
        }
    }

    write_wav("piano.wav", &audio)?;
    println!(
        "wrote piano.wav: {} samples at {} Hz",
        audio.len(),
        SAMPLE_RATE
    );
    Ok(())
}
