use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use anyhow::{Context, Result};

use super::{filter_by_language, AudioOutput, SpeechBackend, Utterance, Voice};

struct Job {
    utterance: Utterance,
    generation: u64,
}

/// The shared synthesis engine. Utterances are played one after another on a
/// dedicated worker thread; `enqueue` never waits for playback.
pub struct SpeechEngine {
    backend: Arc<dyn SpeechBackend>,
    queue: Option<Sender<Job>>,
    generation: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl SpeechEngine {
    pub fn spawn(backend: Box<dyn SpeechBackend>, output: Box<dyn AudioOutput>) -> Result<Self> {
        let backend: Arc<dyn SpeechBackend> = Arc::from(backend);
        let generation = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::channel::<Job>();

        let worker_backend = Arc::clone(&backend);
        let worker_generation = Arc::clone(&generation);
        let worker = std::thread::Builder::new()
            .name("speech-queue".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    if job.generation < worker_generation.load(Ordering::SeqCst) {
                        tracing::debug!("Dropping cancelled utterance ({} chars)", job.utterance.text.len());
                        continue;
                    }
                    let audio = match worker_backend.synthesize(&job.utterance) {
                        Ok(audio) => audio,
                        Err(e) => {
                            tracing::warn!("Speech synthesis failed with voice '{}': {}", job.utterance.voice.identifier, e);
                            continue;
                        }
                    };
                    if let Err(e) = output.play(&audio) {
                        tracing::warn!("Speech playback failed: {}", e);
                    }
                }
                tracing::debug!("Speech queue closed");
            })
            .context("Failed to start speech worker thread")?;

        tracing::info!("Speech engine started (backend: {})", backend.name());

        Ok(Self {
            backend,
            queue: Some(tx),
            generation,
            worker: Some(worker),
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Snapshot of the catalog; an unavailable catalog reads as empty.
    pub fn all_voices(&self) -> Vec<Voice> {
        match self.backend.voices() {
            Ok(voices) => voices,
            Err(e) => {
                tracing::warn!("Failed to list voices from {}: {}", self.backend.name(), e);
                Vec::new()
            }
        }
    }

    pub fn voices(&self, language_prefix: &str) -> Vec<Voice> {
        filter_by_language(self.all_voices(), language_prefix)
    }

    /// Queues one utterance behind anything already waiting.
    pub fn enqueue(&self, utterance: Utterance) -> Result<()> {
        let queue = self.queue.as_ref().context("Speech engine is shut down")?;
        let job = Job {
            utterance,
            generation: self.generation.load(Ordering::SeqCst),
        };
        queue
            .send(job)
            .map_err(|_| anyhow::anyhow!("Speech worker is no longer running"))
    }

    /// Drops every utterance still waiting. The one playing finishes.
    pub fn stop_pending(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Speech queue cleared (generation {})", generation);
    }
}

impl Drop for SpeechEngine {
    fn drop(&mut self) {
        self.queue = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Speech worker panicked");
            }
        }
    }
}
