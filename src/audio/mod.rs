//! Audio I/O for the CLI frontend.
//!
//! Reads raw f32le PCM from stdin, one interleaved channel per input
//! pin, runs it through a [`Simulator`] and writes the first output
//! port back to stdout.

use std::io::{self, Read, Write};

use crate::error::{NodalError, Result};
use crate::Simulator;

/// Buffer size for audio processing (in frames).
pub const BUFFER_SIZE: usize = 256;

/// Deinterleaving reader: stdin frames to per-pin sample buffers.
pub struct AudioInput {
    channels: usize,
    bytes: Vec<u8>,
}

impl AudioInput {
    /// Create a reader for the given channel count.
    pub fn new(channels: usize) -> Self {
        Self {
            channels,
            bytes: vec![0u8; BUFFER_SIZE * channels * 4],
        }
    }

    /// Read up to [`BUFFER_SIZE`] frames from stdin into the per-channel
    /// buffers. Returns the number of whole frames read, 0 on EOF.
    pub fn read_block(&mut self, channels: &mut [Vec<f64>]) -> Result<usize> {
        let bytes_read = io::stdin()
            .read(&mut self.bytes)
            .map_err(|e| NodalError::AudioInputError {
                message: e.to_string(),
            })?;

        let frames = bytes_read / (self.channels * 4);

        for frame in 0..frames {
            for (channel, buffer) in channels.iter_mut().enumerate() {
                let offset = (frame * self.channels + channel) * 4;
                let bytes = [
                    self.bytes[offset],
                    self.bytes[offset + 1],
                    self.bytes[offset + 2],
                    self.bytes[offset + 3],
                ];
                buffer[frame] = f32::from_le_bytes(bytes) as f64;
            }
        }

        Ok(frames)
    }
}

/// Mono writer: output-port samples back to stdout.
pub struct AudioOutput {
    bytes: Vec<u8>,
}

impl AudioOutput {
    /// Create a new audio output writer.
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; BUFFER_SIZE * 4],
        }
    }

    /// Write a block of samples to stdout.
    pub fn write_block(&mut self, samples: &[f64]) -> Result<()> {
        let bytes_needed = samples.len() * 4;
        if self.bytes.len() < bytes_needed {
            self.bytes.resize(bytes_needed, 0);
        }

        for (i, &sample) in samples.iter().enumerate() {
            self.bytes[i * 4..i * 4 + 4].copy_from_slice(&(sample as f32).to_le_bytes());
        }

        io::stdout()
            .write_all(&self.bytes[..bytes_needed])
            .map_err(|e| NodalError::AudioOutputError {
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Flush the output stream.
    pub fn flush(&mut self) -> Result<()> {
        io::stdout()
            .flush()
            .map_err(|e| NodalError::AudioOutputError {
                message: e.to_string(),
            })
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new()
    }
}

/// Process audio from stdin to stdout using the given simulator.
///
/// Expects as many interleaved input channels as the circuit has input
/// pins; emits the simulator's first output port.
pub fn process_audio(simulator: &mut Simulator) -> Result<()> {
    let nb_inputs = simulator.circuit().nb_input_pins();
    if nb_inputs == 0 {
        return Err(NodalError::AudioInputError {
            message: "circuit has no input pins".to_string(),
        });
    }

    let mut input = AudioInput::new(nb_inputs);
    let mut output = AudioOutput::new();

    let mut in_channels = vec![vec![0.0f64; BUFFER_SIZE]; nb_inputs];
    let mut out_samples = vec![0.0f64; BUFFER_SIZE];

    loop {
        let frames = input.read_block(&mut in_channels)?;

        if frames == 0 {
            break;
        }

        {
            let inputs: Vec<&[f64]> = in_channels
                .iter()
                .map(|channel| &channel[..frames])
                .collect();
            let mut outputs = [&mut out_samples[..frames]];
            simulator.process_block(&inputs, &mut outputs)?;
        }

        output.write_block(&out_samples[..frames])?;
    }

    output.flush()?;
    Ok(())
}
