//! Line commands accepted on stdin.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Press the overlay button.
    Toggle,
    /// Press the microphone button inside the overlay.
    Listen,
    /// Pick a recognition language by code.
    Language(String),
    /// Speak a phrase into the simulated microphone.
    Say(String),
    /// Make the simulated recognizer fail with a platform error code.
    Fail(String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" => Command::Empty,
            "toggle" | "t" => Command::Toggle,
            "listen" | "l" => Command::Listen,
            "lang" if !rest.is_empty() => Command::Language(rest.to_string()),
            "say" if !rest.is_empty() => Command::Say(rest.to_string()),
            "fail" if !rest.is_empty() => Command::Fail(rest.to_string()),
            "silence" => Command::Fail("no-speech".to_string()),
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
commands:
  toggle | t         open or close the voice overlay
  listen | l         start listening (overlay must be open)
  lang <code>        switch language: jpn ger eng rus spa swe fre dut hun slv
  say <text>         speak into the microphone
  silence            end listening without speech
  fail <code>        raise a recognizer error (not-allowed, network, ...)
  help               show this help
  quit               exit";
