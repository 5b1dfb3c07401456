use crate::audio::capture::{CaptureBackend, CaptureStream};
use crate::{BanklineError, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::StreamConfig;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Microphone capture backed by the default cpal input device.
///
/// `cpal::Stream` is not `Send`, so each open stream lives on a dedicated
/// thread; the handle talks to it through channels.
pub struct CpalCapture;

impl CpalCapture {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureBackend for CpalCapture {
    async fn open(&self) -> Result<Box<dyn CaptureStream>> {
        let (sample_tx, sample_rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let (ready_tx, ready_rx) = oneshot::channel();

        std::thread::spawn(move || run_capture_thread(sample_tx, stop_rx, ready_tx));

        let sample_rate = ready_rx
            .await
            .map_err(|_| BanklineError::AudioDevice("Capture thread died".into()))??;

        Ok(Box::new(CpalStream {
            sample_rate,
            sample_rx,
            stop_tx: Some(stop_tx),
        }))
    }

    fn name(&self) -> &str {
        "cpal"
    }
}

fn run_capture_thread(
    sample_tx: mpsc::Sender<Vec<f32>>,
    stop_rx: crossbeam_channel::Receiver<()>,
    ready_tx: oneshot::Sender<Result<u32>>,
) {
    let host = cpal::default_host();

    let device = match host.default_input_device() {
        Some(device) => device,
        None => {
            let _ = ready_tx.send(Err(BanklineError::AudioDevice(
                "No input device available".into(),
            )));
            return;
        }
    };

    info!(
        "Using input device: {}",
        device.name().unwrap_or_else(|_| "Unknown".to_string())
    );

    let config: StreamConfig = match device.default_input_config() {
        Ok(config) => config.into(),
        Err(e) => {
            let _ = ready_tx.send(Err(BanklineError::AudioDevice(format!(
                "Failed to get input config: {}",
                e
            ))));
            return;
        }
    };

    let channels = config.channels as usize;
    let sample_rate = config.sample_rate.0;

    let err_fn = |err| {
        error!("Audio input stream error: {}", err);
    };

    let stream = match device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            // Convert to mono if necessary
            let samples = if channels == 1 {
                data.to_vec()
            } else {
                data.chunks(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                    .collect()
            };

            if let Err(e) = sample_tx.try_send(samples) {
                debug!("Failed to forward audio chunk: {}", e);
            }
        },
        err_fn,
        None,
    ) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(BanklineError::AudioDevice(format!(
                "Failed to build input stream: {}",
                e
            ))));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(BanklineError::AudioDevice(format!(
            "Failed to start input stream: {}",
            e
        ))));
        return;
    }

    if ready_tx.send(Ok(sample_rate)).is_err() {
        return;
    }

    // Park until the handle is closed or dropped
    let _ = stop_rx.recv();
    drop(stream);
    debug!("Released microphone stream");
}

struct CpalStream {
    sample_rate: u32,
    sample_rx: mpsc::Receiver<Vec<f32>>,
    stop_tx: Option<crossbeam_channel::Sender<()>>,
}

#[async_trait]
impl CaptureStream for CpalStream {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<f32>>> {
        Ok(self.sample_rx.recv().await)
    }

    async fn close(&mut self) {
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.try_send(());
        }
        self.sample_rx.close();
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.try_send(());
        }
    }
}
