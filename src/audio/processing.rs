use std::io::Read;
use anyhow::{Context, Result};
use rubato::{SincFixedIn, SincInterpolationType, SincInterpolationParameters, WindowFunction, Resampler};

use crate::engine::AudioBuffer;

/// Decodes a WAV stream into mono f32 samples.
pub fn decode_wav<R: Read>(reader: R) -> Result<AudioBuffer> {
    let reader = hound::WavReader::new(reader).context("Invalid WAV data")?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()
            .context("Failed to read WAV samples")?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<f32>, hound::Error>>()
                .context("Failed to read WAV samples")?
        }
    };

    Ok(AudioBuffer {
        samples: downmix(&interleaved, channels),
        sample_rate: spec.sample_rate,
        channels: 1,
    })
}

pub fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_rate as f64 / from_rate as f64;
    let mut resampler = SincFixedIn::<f32>::new(
        ratio,
        2.0,
        params,
        samples.len(),
        1, // mono
    )?;

    let input = vec![samples.to_vec()];
    let output = resampler.process(&input, None)?;

    Ok(output.into_iter().next().unwrap_or_default())
}

/// Turns a mono buffer into interleaved frames for an output device,
/// resampled to `device_rate` and scaled by `volume`.
pub fn prepare_for_device(audio: &AudioBuffer, device_rate: u32, device_channels: u16, volume: f32) -> Result<Vec<f32>> {
    let mono = downmix(&audio.samples, audio.channels as usize);
    let mono = resample(&mono, audio.sample_rate, device_rate)?;
    let gain = volume.clamp(0.0, 1.0);
    let channels = device_channels.max(1) as usize;

    let mut frames = Vec::with_capacity(mono.len() * channels);
    for sample in mono {
        let value = (sample * gain).clamp(-1.0, 1.0);
        frames.extend(std::iter::repeat(value).take(channels));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use super::*;

    fn wav_bytes(channels: u16, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in samples {
                writer.write_sample(*s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_16_bit_wav_to_unit_range() {
        let audio = decode_wav(Cursor::new(wav_bytes(1, &[0, 16384, -32768]))).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 1);
        assert_eq!(audio.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn decodes_stereo_wav_as_mono() {
        let audio = decode_wav(Cursor::new(wav_bytes(2, &[16384, 0, -16384, -16384]))).unwrap();
        assert_eq!(audio.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn rejects_non_wav_input() {
        assert!(decode_wav(Cursor::new(b"not a wav".to_vec())).is_err());
    }

    #[test]
    fn prepare_fans_out_channels_and_applies_volume() {
        let audio = AudioBuffer { samples: vec![0.5, -1.0], sample_rate: 48000, channels: 1 };
        let frames = prepare_for_device(&audio, 48000, 2, 0.5).unwrap();
        assert_eq!(frames, vec![0.25, 0.25, -0.5, -0.5]);
    }

    #[test]
    fn resample_changes_length_by_rate_ratio() {
        let samples = vec![0.0f32; 22050];
        let out = resample(&samples, 22050, 44100).unwrap();
        let expected = 44100f32;
        assert!((out.len() as f32 - expected).abs() / expected < 0.05);
    }
}
