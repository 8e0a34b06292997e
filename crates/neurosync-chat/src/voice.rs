//! Voice I/O adapters around platform speech programs.
//!
//! Synthesis and recognition both shell out to whatever engine the host
//! provides. A missing engine disables the capability silently; the rest of
//! the app keeps working.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tokio::process::{Child, Command};

use crate::media::MEDIA_MARKER;

/// Voice capture state: either idle or one recognition session is running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening,
}

/// Voice names preferred over the engine default, in preference order
const PREFERRED_VOICES: &[&str] = &["Samantha", "Daniel", "Karen", "Alex"];

/// Speaking rate in words per minute. Fixed per deployment; config exposes
/// only an on/off toggle.
const SPEECH_RATE_WPM: u32 = 190;

/// Recognizer program looked up on $PATH when config names none
const DEFAULT_RECOGNIZER: &str = "hear";

/// Upper bound on one recognition session, so an engine that never detects
/// end-of-speech cannot hold the listening state forever
const LISTEN_WINDOW: Duration = Duration::from_secs(15);

static SPOKEN_TEXT_STRIP: LazyLock<Regex> = LazyLock::new(|| {
    // Marker through end of string, across newlines
    Regex::new(&format!("(?s){}.*$", regex::escape(MEDIA_MARKER))).unwrap()
});

/// Spoken rendition of a reply: the media marker and everything after it are
/// removed so image prompts are never vocalized
pub fn spoken_text(content: &str) -> String {
    SPOKEN_TEXT_STRIP.replace(content, "").trim().to_string()
}

#[derive(Debug, Clone)]
enum SynthEngine {
    /// macOS `say`
    Say(PathBuf),
    /// espeak-ng or espeak
    Espeak(PathBuf),
}

impl SynthEngine {
    fn discover() -> Option<Self> {
        if let Ok(path) = which::which("say") {
            return Some(Self::Say(path));
        }
        for name in ["espeak-ng", "espeak"] {
            if let Ok(path) = which::which(name) {
                return Some(Self::Espeak(path));
            }
        }
        None
    }

    /// Enumerate the engine's voices and pick a preferred one, if any
    fn pick_voice(&self) -> Option<String> {
        let output = match self {
            Self::Say(path) => std::process::Command::new(path).args(["-v", "?"]).output(),
            Self::Espeak(path) => std::process::Command::new(path).arg("--voices").output(),
        }
        .ok()?;
        let listing = String::from_utf8_lossy(&output.stdout);
        let voices = match self {
            Self::Say(_) => parse_say_voices(&listing),
            Self::Espeak(_) => parse_espeak_voices(&listing),
        };
        preferred_voice(&voices)
    }

    fn spawn(&self, text: &str, voice: Option<&str>) -> std::io::Result<Child> {
        let rate = SPEECH_RATE_WPM.to_string();
        let mut command = match self {
            Self::Say(path) => {
                let mut command = Command::new(path);
                if let Some(voice) = voice {
                    command.args(["-v", voice]);
                }
                command.args(["-r", &rate]);
                command.arg(text);
                command
            }
            Self::Espeak(path) => {
                let mut command = Command::new(path);
                if let Some(voice) = voice {
                    command.args(["-v", voice]);
                }
                command.args(["-s", &rate]);
                command.arg(text);
                command
            }
        };
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
    }
}

/// Speech synthesis: fire-and-forget, cancel-never-queue.
pub struct Speaker {
    engine: Option<SynthEngine>,
    voice: Option<String>,
    current: Option<Child>,
}

impl Speaker {
    /// Look up a synthesis engine on $PATH and pick a preferred voice
    pub fn discover() -> Self {
        let engine = SynthEngine::discover();
        let voice = engine.as_ref().and_then(SynthEngine::pick_voice);
        match &engine {
            Some(engine) => tracing::debug!(?engine, ?voice, "speech synthesis available"),
            None => tracing::debug!("no speech synthesis engine on PATH"),
        }
        Self {
            engine,
            voice,
            current: None,
        }
    }

    /// A speaker that ignores every request
    pub fn disabled() -> Self {
        Self {
            engine: None,
            voice: None,
            current: None,
        }
    }

    /// Check whether a synthesis engine was found
    pub fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    /// Speak a reply and return immediately. Any utterance still playing is
    /// cancelled first.
    pub fn speak(&mut self, content: &str) {
        let Some(engine) = &self.engine else {
            return;
        };
        let text = spoken_text(content);
        if text.is_empty() {
            return;
        }

        if let Some(mut child) = self.current.take() {
            let _ = child.start_kill();
        }

        match engine.spawn(&text, self.voice.as_deref()) {
            Ok(child) => self.current = Some(child),
            Err(e) => tracing::warn!("speech synthesis failed to start: {e}"),
        }
    }
}

/// Speech recognition via an external transcriber program.
#[derive(Debug, Clone)]
pub struct Recognizer {
    program: Option<PathBuf>,
}

impl Recognizer {
    /// Look up a recognizer on $PATH. `override_name` comes from config;
    /// when unset the default candidate is searched for.
    pub fn discover(override_name: Option<&str>) -> Self {
        let name = override_name.unwrap_or(DEFAULT_RECOGNIZER);
        let program = which::which(name).ok();
        if program.is_none() {
            tracing::debug!(program = name, "speech recognition unavailable");
        }
        Self { program }
    }

    /// A recognizer that never captures
    pub fn disabled() -> Self {
        Self { program: None }
    }

    /// Check whether the capability is available
    pub fn is_available(&self) -> bool {
        self.program.is_some()
    }

    /// Run one recognition session and return the first transcript line.
    ///
    /// Returns `None` when the capability is unavailable, the program fails,
    /// or the listening window elapses without a result.
    pub async fn listen_once(&self) -> Option<String> {
        let program = self.program.as_ref()?;

        let mut command = Command::new(program);
        command
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(LISTEN_WINDOW, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("speech recognition failed to run: {e}");
                return None;
            }
            Err(_) => {
                tracing::debug!("listening window elapsed without a transcript");
                return None;
            }
        };

        first_transcript(&String::from_utf8_lossy(&output.stdout))
    }
}

/// First non-empty line of a recognition run
fn first_transcript(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

fn parse_say_voices(listing: &str) -> Vec<String> {
    // `say -v ?` pads columns with runs of spaces; names can contain single
    // spaces ("Bad News"), so split on the first double space
    listing
        .lines()
        .filter_map(|line| line.split("  ").next())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn parse_espeak_voices(listing: &str) -> Vec<String> {
    // Columns: Pty Language Age/Gender VoiceName File
    listing
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(3))
        .map(str::to_string)
        .collect()
}

fn preferred_voice(voices: &[String]) -> Option<String> {
    for preferred in PREFERRED_VOICES {
        let preferred = preferred.to_lowercase();
        if let Some(voice) = voices
            .iter()
            .find(|voice| voice.to_lowercase().contains(&preferred))
        {
            return Some(voice.clone());
        }
    }
    None
}
