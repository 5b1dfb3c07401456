use crate::{BanklineError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

/// Canonical RIFF/fmt/data header length for the files we write.
pub const WAV_HEADER_LEN: usize = 44;

/// Encode audio samples into an in-memory WAV container (16-bit PCM).
///
/// Samples are f32 in -1.0..=1.0, interleaved for multi-channel input.
pub fn encode_wav(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)
            .map_err(|e| BanklineError::Io(format!("Failed to create WAV writer: {}", e)))?;

        for &sample in samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| BanklineError::Io(format!("Failed to write sample: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| BanklineError::Io(format!("Failed to finalize WAV data: {}", e)))?;
    }

    Ok(cursor.into_inner())
}

/// Decode an in-memory WAV container back into f32 samples.
pub fn decode_wav(data: &[u8]) -> Result<(Vec<f32>, u32, u16)> {
    let mut reader = WavReader::new(Cursor::new(data))
        .map_err(|e| BanklineError::Io(format!("Failed to read WAV data: {}", e)))?;

    let spec = reader.spec();

    let samples: Result<Vec<f32>> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(|e| BanklineError::Io(format!("Failed to read sample: {}", e))))
            .collect(),
        SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| {
                    s.map(|sample| sample as f32 / i16::MAX as f32)
                        .map_err(|e| BanklineError::Io(format!("Failed to read sample: {}", e)))
                })
                .collect(),
            32 => reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|sample| sample as f32 / i32::MAX as f32)
                        .map_err(|e| BanklineError::Io(format!("Failed to read sample: {}", e)))
                })
                .collect(),
            other => Err(BanklineError::AudioProcessing(format!(
                "Unsupported bit depth: {}",
                other
            ))),
        },
    };

    Ok((samples?, spec.sample_rate, spec.channels))
}

/// Convert interleaved multi-channel audio to mono by averaging frames.
pub fn to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }
    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn encode_decode_round_trip() {
        let sample_rate = 16000;
        let samples: Vec<f32> = (0..sample_rate as usize)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();

        let data = encode_wav(&samples, sample_rate, 1).unwrap();
        let (decoded, rate, channels) = decode_wav(&data).unwrap();

        assert_eq!(rate, sample_rate);
        assert_eq!(channels, 1);
        assert_eq!(decoded.len(), samples.len());
        for (original, read) in samples.iter().zip(decoded.iter()) {
            // precision loss from the i16 conversion is expected
            assert!((original - read).abs() < 0.001);
        }
    }

    #[test]
    fn encoded_header_is_canonical_length() {
        let data = encode_wav(&[0.0; 8], 16000, 1).unwrap();
        assert_eq!(data.len(), WAV_HEADER_LEN + 8 * 2);
    }

    #[test]
    fn to_mono_averages_frames() {
        let stereo = vec![0.5, 0.3, 0.7, 0.1];
        let mono = to_mono(&stereo, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.4).abs() < 0.001);
        assert!((mono[1] - 0.4).abs() < 0.001);
    }

    #[test]
    fn to_mono_passes_mono_through() {
        let mono = vec![0.1, 0.2];
        assert_eq!(to_mono(&mono, 1), mono);
    }
}
