use std::io::Write;
use std::process::{Command, Stdio};
use anyhow::{Context, Result};

use super::{normalize_language, run_tool, AudioBuffer, SpeechBackend, Utterance, Voice};
use crate::audio::processing::decode_wav;

const SAY: &str = "say";

/// macOS `say`, backed by the system speech synthesizer
pub struct SayBackend {
    rate_wpm: Option<u32>,
}

impl SayBackend {
    pub fn new(rate_wpm: Option<u32>) -> Self {
        Self { rate_wpm }
    }
}

impl SpeechBackend for SayBackend {
    fn name(&self) -> &'static str {
        SAY
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        let stdout = run_tool(Command::new(SAY).arg("-v").arg("?"))?;
        Ok(parse_voice_list(&String::from_utf8_lossy(&stdout)))
    }

    fn synthesize(&self, utterance: &Utterance) -> Result<AudioBuffer> {
        let wav = tempfile::Builder::new()
            .suffix(".wav")
            .tempfile()
            .context("Failed to create temp file for speech")?;

        let mut command = Command::new(SAY);
        command.arg("-v").arg(&utterance.voice.identifier);
        if let Some(rate) = self.rate_wpm {
            command.arg("-r").arg(rate.to_string());
        }
        command
            .arg("--file-format=WAVE")
            .arg("--data-format=LEI16@22050")
            .arg("-o")
            .arg(wav.path())
            .arg("-f")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        let mut child = command.spawn().with_context(|| format!("Failed to run {}", SAY))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(utterance.text.as_bytes())?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            anyhow::bail!(
                "{} exited with {}: {}",
                SAY,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let file = std::fs::File::open(wav.path())?;
        decode_wav(std::io::BufReader::new(file))
    }
}

/// Parses `say -v ?` lines of the form `Name   xx_YY   # sample sentence`.
/// Older voices use `-` in the locale (`en-scotland`).
/// Names may contain spaces, so the locale is the last token before `#`.
fn parse_voice_list(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let head = line.split('#').next()?.trim();
            let (name, locale) = head.rsplit_once(char::is_whitespace)?;
            let name = name.trim();
            if name.is_empty() || !locale.contains(['_', '-']) {
                return None;
            }
            Some(Voice {
                identifier: name.to_string(),
                name: name.to_string(),
                language: normalize_language(locale),
            })
        })
        .collect()
}
