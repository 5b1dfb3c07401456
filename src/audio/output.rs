use crate::voice::synthesizer::CancelFlag;
use crate::{BanklineError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Sample rate of the default output device.
pub fn output_sample_rate() -> Result<u32> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| BanklineError::AudioDevice("No output device available".into()))?;
    let config = device
        .default_output_config()
        .map_err(|e| BanklineError::AudioDevice(format!("Failed to get output config: {}", e)))?;
    Ok(config.sample_rate().0)
}

/// Play mono samples through the default output device, blocking until the
/// buffer drains or `cancel` fires. Intended to run on a blocking worker;
/// the cpal stream never leaves this thread.
pub fn play_blocking(samples: &[f32], cancel: &CancelFlag) -> Result<()> {
    if samples.is_empty() || cancel.is_cancelled() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| BanklineError::AudioDevice("No output device available".into()))?;

    info!(
        "Using output device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );

    let config: StreamConfig = device
        .default_output_config()
        .map_err(|e| BanklineError::AudioDevice(format!("Failed to get output config: {}", e)))?
        .into();

    let channels = config.channels as usize;
    let buffer = Arc::new(Mutex::new(samples.to_vec()));
    let buffer_for_callback = Arc::clone(&buffer);

    let err_fn = |err| {
        error!("Audio output stream error: {}", err);
    };

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut buf = buffer_for_callback.lock();
                let frames_needed = data.len() / channels;
                let frames_available = buf.len().min(frames_needed);

                for i in 0..frames_available {
                    let sample = buf[i];
                    for c in 0..channels {
                        data[i * channels + c] = sample;
                    }
                }
                buf.drain(0..frames_available);

                // Fill the remainder with silence
                for value in data.iter_mut().skip(frames_available * channels) {
                    *value = 0.0;
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| BanklineError::AudioDevice(format!("Failed to build output stream: {}", e)))?;

    stream
        .play()
        .map_err(|e| BanklineError::AudioDevice(format!("Failed to start output stream: {}", e)))?;

    // Wait until the callback has consumed everything or playback is
    // cancelled by a newer utterance.
    while !cancel.is_cancelled() {
        if buffer.lock().is_empty() {
            // Let the device drain its last hardware buffer
            std::thread::sleep(Duration::from_millis(50));
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
    Ok(())
}
