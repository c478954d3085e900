pub mod espeak;
pub mod queue;
pub mod say;

use std::process::Command;
use anyhow::Result;
use serde::{Serialize, Deserialize};

pub use queue::SpeechEngine;

/// Which platform speech capability backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Auto,
    Espeak,
    Say,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::Auto
    }
}

/// One entry of the platform voice catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub identifier: String,
    pub name: String,
    /// BCP-47 style code, e.g. "ko-KR"
    pub language: String,
}

/// A unit of text submitted for playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    pub text: String,
    pub voice: Voice,
}

/// Audio buffer for passing audio data between modules
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Platform text-to-speech: voice catalog + text -> PCM
pub trait SpeechBackend: Send + Sync {
    fn name(&self) -> &'static str;
    /// Fresh snapshot of the voices installed right now
    fn voices(&self) -> Result<Vec<Voice>>;
    fn synthesize(&self, utterance: &Utterance) -> Result<AudioBuffer>;
}

/// Blocking sink for synthesized audio
pub trait AudioOutput: Send {
    fn play(&self, audio: &AudioBuffer) -> Result<()>;
}

/// Factory to create the speech backend for the requested kind
pub fn create_backend(kind: BackendKind, rate_wpm: Option<u32>) -> Result<Box<dyn SpeechBackend>> {
    match kind {
        BackendKind::Auto | BackendKind::Say if cfg!(target_os = "macos") => {
            Ok(Box::new(say::SayBackend::new(rate_wpm)))
        }
        BackendKind::Say => anyhow::bail!("The `say` speech backend is only available on macOS"),
        BackendKind::Auto | BackendKind::Espeak => Ok(Box::new(espeak::EspeakBackend::new(rate_wpm))),
    }
}

/// Runs a catalog/synthesis helper and returns its stdout, failing on a non-zero exit.
pub(crate) fn run_tool(command: &mut Command) -> Result<Vec<u8>> {
    let program = command.get_program().to_string_lossy().into_owned();
    let output = command
        .output()
        .map_err(|e| anyhow::anyhow!("Failed to run {}: {}", program, e))?;
    if !output.status.success() {
        anyhow::bail!(
            "{} exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(output.stdout)
}

/// Normalizes platform language tags to BCP-47 casing: "en_us" -> "en-US".
pub fn normalize_language(tag: &str) -> String {
    tag.split(['-', '_'])
        .filter(|part| !part.is_empty())
        .enumerate()
        .map(|(i, part)| {
            let alpha = part.chars().all(|c| c.is_ascii_alphabetic());
            if i > 0 && alpha && part.len() == 2 {
                part.to_ascii_uppercase()
            } else if i > 0 && alpha && part.len() == 4 {
                let mut s = part[..1].to_ascii_uppercase();
                s.push_str(&part[1..].to_ascii_lowercase());
                s
            } else {
                part.to_ascii_lowercase()
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn primary_subtag(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

/// Voices whose language starts with `prefix` ("ko" matches "ko-KR").
pub fn filter_by_language(voices: Vec<Voice>, prefix: &str) -> Vec<Voice> {
    voices.into_iter().filter(|v| v.language.starts_with(prefix)).collect()
}

/// Picks the platform default voice for a language hint: an exact tag match
/// wins, otherwise the first voice sharing the primary language subtag.
pub fn default_voice_for<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    let wanted = normalize_language(language);
    if wanted.is_empty() {
        return None;
    }
    voices
        .iter()
        .find(|v| v.language.eq_ignore_ascii_case(&wanted))
        .or_else(|| {
            let primary = primary_subtag(&wanted);
            voices
                .iter()
                .find(|v| primary_subtag(&v.language).eq_ignore_ascii_case(primary))
        })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{mpsc, Arc, Mutex};
    use super::*;

    pub fn voice(identifier: &str, language: &str) -> Voice {
        Voice {
            identifier: identifier.to_string(),
            name: identifier.to_string(),
            language: language.to_string(),
        }
    }

    /// In-memory catalog that records every utterance it renders
    pub struct FakeBackend {
        pub catalog: Mutex<Vec<Voice>>,
        pub rendered: Arc<Mutex<Vec<Utterance>>>,
        pub catalog_reads: Arc<AtomicUsize>,
        pub fail_catalog: bool,
    }

    impl FakeBackend {
        pub fn new(catalog: Vec<Voice>) -> Self {
            Self {
                catalog: Mutex::new(catalog),
                rendered: Arc::new(Mutex::new(Vec::new())),
                catalog_reads: Arc::new(AtomicUsize::new(0)),
                fail_catalog: false,
            }
        }
    }

    impl SpeechBackend for FakeBackend {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn voices(&self) -> Result<Vec<Voice>> {
            self.catalog_reads.fetch_add(1, Ordering::SeqCst);
            if self.fail_catalog {
                anyhow::bail!("catalog unavailable");
            }
            Ok(self.catalog.lock().unwrap().clone())
        }

        fn synthesize(&self, utterance: &Utterance) -> Result<AudioBuffer> {
            self.rendered.lock().unwrap().push(utterance.clone());
            Ok(AudioBuffer {
                samples: vec![0.0; 16],
                sample_rate: 16000,
                channels: 1,
            })
        }
    }

    /// Signals once per played buffer; optionally blocks until released
    pub struct RecordingOutput {
        pub played: mpsc::Sender<usize>,
        pub gate: Option<Mutex<mpsc::Receiver<()>>>,
    }

    impl AudioOutput for RecordingOutput {
        fn play(&self, audio: &AudioBuffer) -> Result<()> {
            if let Some(gate) = &self.gate {
                let _ = gate.lock().unwrap().recv();
            }
            let _ = self.played.send(audio.samples.len());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::voice;
    use super::*;

    #[test]
    fn normalizes_platform_language_tags() {
        assert_eq!(normalize_language("en-us"), "en-US");
        assert_eq!(normalize_language("ko_KR"), "ko-KR");
        assert_eq!(normalize_language("ja"), "ja");
        assert_eq!(normalize_language("sr-latn-rs"), "sr-Latn-RS");
        assert_eq!(normalize_language("en-029"), "en-029");
    }

    #[test]
    fn filters_catalog_by_language_prefix() {
        let catalog = vec![voice("ko-KR-A", "ko-KR"), voice("en-US-B", "en-US")];
        let korean = filter_by_language(catalog, "ko");
        assert_eq!(korean, vec![voice("ko-KR-A", "ko-KR")]);
    }

    #[test]
    fn language_prefix_is_case_sensitive() {
        let catalog = vec![voice("ko-KR-A", "ko-KR")];
        assert!(filter_by_language(catalog, "KO").is_empty());
    }

    #[test]
    fn default_voice_prefers_exact_language() {
        let catalog = vec![
            voice("en-GB-1", "en-GB"),
            voice("en-US-1", "en-US"),
        ];
        assert_eq!(default_voice_for(&catalog, "en-US").unwrap().identifier, "en-US-1");
        assert_eq!(default_voice_for(&catalog, "en_us").unwrap().identifier, "en-US-1");
    }

    #[test]
    fn default_voice_falls_back_to_primary_language() {
        let catalog = vec![voice("ja", "ja"), voice("en-US-1", "en-US")];
        assert_eq!(default_voice_for(&catalog, "ja-JP").unwrap().identifier, "ja");
        assert_eq!(default_voice_for(&catalog, "en").unwrap().identifier, "en-US-1");
    }

    #[test]
    fn default_voice_is_none_without_a_match() {
        let catalog = vec![voice("en-US-1", "en-US")];
        assert!(default_voice_for(&catalog, "ko-KR").is_none());
        assert!(default_voice_for(&catalog, "").is_none());
    }

    #[test]
    fn say_backend_is_rejected_off_macos() {
        let result = create_backend(BackendKind::Say, None);
        assert_eq!(result.is_ok(), cfg!(target_os = "macos"));
    }
}
