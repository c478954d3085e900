use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::engine::{AudioBuffer, AudioOutput};
use super::processing::prepare_for_device;

// Extra time allowed past the buffer length before playback is abandoned
const PLAYBACK_GRACE: Duration = Duration::from_secs(2);
const DRAIN_DELAY: Duration = Duration::from_millis(120);

/// Plays synthesized speech on the default output device
pub struct CpalOutput {
    volume: f32,
}

impl CpalOutput {
    pub fn new(volume: f32) -> Self {
        Self { volume }
    }
}

impl AudioOutput for CpalOutput {
    fn play(&self, audio: &AudioBuffer) -> Result<()> {
        if audio.samples.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device()
            .context("No output device available")?;

        let config = device.default_output_config()
            .context("Failed to get default output config")?;
        let sample_format = config.sample_format();
        let stream_config: cpal::StreamConfig = config.into();

        let frames = prepare_for_device(audio, stream_config.sample_rate.0, stream_config.channels, self.volume)?;
        let duration = Duration::from_secs_f64(
            frames.len() as f64 / (stream_config.sample_rate.0 as f64 * stream_config.channels.max(1) as f64),
        );

        let frames = Arc::new(frames);
        let finished = Arc::new(AtomicBool::new(false));

        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, frames, Arc::clone(&finished)),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, frames, Arc::clone(&finished)),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, frames, Arc::clone(&finished)),
            other => anyhow::bail!("Unsupported output sample format: {:?}", other),
        }?;

        stream.play().context("Failed to start audio output stream")?;
        tracing::debug!("Playing {:.2}s of speech", duration.as_secs_f64());

        let deadline = Instant::now() + duration + PLAYBACK_GRACE;
        while !finished.load(Ordering::SeqCst) {
            if Instant::now() >= deadline {
                tracing::warn!("Audio output stalled; abandoning utterance");
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        std::thread::sleep(DRAIN_DELAY);
        Ok(())
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frames: Arc<Vec<f32>>,
    finished: Arc<AtomicBool>,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let position = AtomicUsize::new(0);
    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let start = position.load(Ordering::SeqCst);
            let end = (start + data.len()).min(frames.len());
            let chunk = &frames[start..end];
            for (i, slot) in data.iter_mut().enumerate() {
                *slot = T::from_sample(chunk.get(i).copied().unwrap_or(0.0));
            }
            position.store(end, Ordering::SeqCst);
            if end >= frames.len() {
                finished.store(true, Ordering::SeqCst);
            }
        },
        |err| {
            tracing::error!("Audio output error: {}", err);
        },
        None,
    ).context("Failed to build output stream")?;
    Ok(stream)
}
