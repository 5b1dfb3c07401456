use crate::{BanklineError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

/// Mono audio resampler used to bridge device rates and engine rates
/// (capture -> 16 kHz for recognition, synthesis -> device rate for
/// playback).
pub struct AudioResampler {
    resampler: SincFixedIn<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl AudioResampler {
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        if input_rate == 0 || output_rate == 0 {
            return Err(BanklineError::Config(
                "Sample rates must be greater than 0".into(),
            ));
        }

        let resample_ratio = output_rate as f64 / input_rate as f64;

        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let chunk_size = 1024;

        let resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, chunk_size, 1)
            .map_err(|e| {
                BanklineError::AudioProcessing(format!("Failed to create resampler: {}", e))
            })?;

        debug!("Created resampler: {} Hz -> {} Hz", input_rate, output_rate);

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Resample a mono buffer.
    pub fn resample(&mut self, input: &[f32]) -> Result<Vec<f32>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = self.resampler.input_frames_max();
        let ratio = self.output_rate as f64 / self.input_rate as f64;
        let mut output = Vec::with_capacity((input.len() as f64 * ratio * 1.1) as usize);

        let mut offset = 0;
        while offset < input.len() {
            let frames_remaining = input.len() - offset;
            let frames_to_read = frames_remaining.min(chunk_size);

            // SincFixedIn requires exactly chunk_size frames per call;
            // zero-pad the tail chunk.
            let mut planar = vec![vec![0.0f32; chunk_size]];
            planar[0][..frames_to_read].copy_from_slice(&input[offset..offset + frames_to_read]);

            let processed = self
                .resampler
                .process(&planar, None)
                .map_err(|e| BanklineError::AudioProcessing(format!("Resampling failed: {}", e)))?;

            let produced = processed[0].len();
            let frames_to_take = if frames_remaining < chunk_size {
                ((frames_to_read as f64) * ratio).ceil() as usize
            } else {
                produced
            };

            output.extend_from_slice(&processed[0][..frames_to_take.min(produced)]);
            offset += frames_to_read;
        }

        Ok(output)
    }

    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }
}

/// Resample a mono buffer in one step; pass-through when the rates match.
pub fn resample_audio(input: &[f32], input_rate: u32, output_rate: u32) -> Result<Vec<f32>> {
    if input_rate == output_rate {
        return Ok(input.to_vec());
    }

    let mut resampler = AudioResampler::new(input_rate, output_rate)?;
    resampler.resample(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_rates() {
        assert!(AudioResampler::new(0, 48000).is_err());
        assert!(AudioResampler::new(16000, 0).is_err());
    }

    #[test]
    fn downsampling_shrinks_buffer() {
        let mut resampler = AudioResampler::new(48000, 16000).unwrap();
        let input: Vec<f32> = (0..3072).map(|i| (i as f32 * 0.01).sin()).collect();
        let output = resampler.resample(&input).unwrap();
        assert!(!output.is_empty());
        assert!(output.len() < input.len());
    }

    #[test]
    fn matching_rates_pass_through() {
        let input = vec![0.1, 0.2, 0.3];
        let output = resample_audio(&input, 16000, 16000).unwrap();
        assert_eq!(output, input);
    }
}
