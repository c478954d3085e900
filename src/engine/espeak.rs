use std::io::Write;
use std::process::{Command, Stdio};
use anyhow::{Context, Result};

use super::{normalize_language, run_tool, AudioBuffer, SpeechBackend, Utterance, Voice};
use crate::audio::processing::decode_wav;

const ESPEAK: &str = "espeak-ng";

/// espeak-ng command line synthesizer
pub struct EspeakBackend {
    rate_wpm: Option<u32>,
}

impl EspeakBackend {
    pub fn new(rate_wpm: Option<u32>) -> Self {
        Self { rate_wpm }
    }
}

impl SpeechBackend for EspeakBackend {
    fn name(&self) -> &'static str {
        ESPEAK
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        let stdout = run_tool(Command::new(ESPEAK).arg("--voices"))?;
        Ok(parse_voice_list(&String::from_utf8_lossy(&stdout)))
    }

    fn synthesize(&self, utterance: &Utterance) -> Result<AudioBuffer> {
        let wav = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .context("Failed to create temp file for speech")?;

        let mut command = Command::new(ESPEAK);
        command.arg("-v").arg(&utterance.voice.identifier);
        if let Some(rate) = self.rate_wpm {
            command.arg("-s").arg(rate.to_string());
        }
        command
            .arg("-w")
            .arg(wav.path())
            .arg("--stdin")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().with_context(|| format!("Failed to run {}", ESPEAK))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(utterance.text.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                ESPEAK,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let file = std::fs::File::open(wav.path())?;
        decode_wav(std::io::BufReader::new(file))
    }
}

/// Parses `espeak-ng --voices`:
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  ko              --/M      Korean             sit/ko
/// ```
fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let language = columns.next()?;
            let _age_gender = columns.next()?;
            let name = columns.next()?;
            Some(Voice {
                identifier: language.to_string(),
                name: name.replace('_', " "),
                language: normalize_language(language),
            })
        })
        .collect()
}
