use std::cell::RefCell;
use std::process::{Child, Command, Stdio};

/// Speaks a reading aloud. Calls return immediately.
pub trait Speaker {
    fn pronounce(&self, text: &str);
}

/// Speech disabled.
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn pronounce(&self, _text: &str) {}
}

/// Runs an external TTS program with the text as its last argument. A new
/// utterance cuts off the previous one.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: RefCell<Option<Child>>,
}

impl CommandSpeaker {
    /// `None` for a blank command line.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            current: RefCell::new(None),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn cancel_current(&self) {
        if let Some(mut child) = self.current.borrow_mut().take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Speaker for CommandSpeaker {
    fn pronounce(&self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.cancel_current();
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            Ok(child) => *self.current.borrow_mut() = Some(child),
            Err(e) => log::warn!("speech command {:?} failed to start: {e}", self.program),
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        if let Some(mut child) = self.current.get_mut().take() {
            let _ = child.try_wait();
        }
    }
}

pub fn speaker_from_command(command: &str) -> Box<dyn Speaker> {
    match CommandSpeaker::from_command_line(command) {
        Some(speaker) => {
            log::info!("speech enabled via {}", speaker.program());
            Box::new(speaker)
        }
        None => Box::new(SilentSpeaker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_command_disables_speech() {
        assert!(CommandSpeaker::from_command_line("   ").is_none());
    }

    #[test]
    fn command_line_is_split_on_whitespace() {
        let speaker = CommandSpeaker::from_command_line("espeak-ng  -v ja").unwrap();
        assert_eq!(speaker.program(), "espeak-ng");
        assert_eq!(speaker.args(), ["-v", "ja"]);
    }

    #[test]
    fn missing_program_does_not_panic() {
        let speaker =
            CommandSpeaker::from_command_line("kotoba-test-no-such-speech-program").unwrap();
        speaker.pronounce("さかな");
        assert!(speaker.current.borrow().is_none());
    }
}
