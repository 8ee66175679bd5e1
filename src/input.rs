//! Terminal input routing.
//!
//! Lines typed by the user become [`UserEvent`]s. Skip requests bypass the
//! event queue and go straight to the [`SkipTrigger`], so they reach a
//! phase that is busy sleeping or typing rather than waiting for input.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::hub::Protocol;
use crate::phase::SkipTrigger;

/// Discrete user action consumed by the phase controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserEvent {
    /// Confirm the briefing (or submit an empty access code at the prompt)
    Acknowledge,
    /// Abort the scripted sequence and jump to the hub
    Skip,
    /// Choose a protocol in the hub
    SelectProtocol(Protocol),
    /// Submit an access code for protocol 2
    SubmitAccessCode(String),
    /// Choose a mission level in the open level modal
    SelectLevel(String),
    /// Close any open modal
    CloseModal,
    /// Leave the terminal
    Quit,
    /// Input that is not a command (an access code at the prompt)
    Text(String),
}

/// Command words accepted at the prompt, used for typo suggestions.
pub const COMMANDS: &[&str] = &["ok", "ready", "skip", "code", "close", "quit"];

/// Maps one input line to an event.
///
/// `levels` is the level order of the mission catalog; the letters `a`,
/// `b`, ... select levels by position.
#[must_use]
pub fn parse_line(line: &str, levels: &[String]) -> UserEvent {
    let line = line.trim_end_matches(['\r', '\n']);
    let word = line.trim();
    let lower = word.to_lowercase();

    if let Some((head, code)) = word.split_once(char::is_whitespace)
        && head.eq_ignore_ascii_case("code")
    {
        return UserEvent::SubmitAccessCode(code.trim_start().to_string());
    }

    match lower.as_str() {
        "" | "ok" | "ready" | "listo" => return UserEvent::Acknowledge,
        "s" | "skip" | "h" => return UserEvent::Skip,
        "1" => return UserEvent::SelectProtocol(Protocol::One),
        "2" => return UserEvent::SelectProtocol(Protocol::Two),
        "x" | "close" => return UserEvent::CloseModal,
        "q" | "quit" | "exit" => return UserEvent::Quit,
        _ => {}
    }

    if let Some(level) = levels.iter().find(|l| l.as_str() == lower) {
        return UserEvent::SelectLevel(level.clone());
    }

    let mut chars = lower.chars();
    if let (Some(letter @ 'a'..='z'), None) = (chars.next(), chars.next()) {
        let index = usize::from(letter as u8 - b'a');
        if let Some(level) = levels.get(index) {
            return UserEvent::SelectLevel(level.clone());
        }
    }

    UserEvent::Text(line.to_string())
}

/// Suggests the closest command word for a mistyped input.
///
/// Returns a match only if its Damerau-Levenshtein distance is at most 2.
#[must_use]
pub fn suggest_command(input: &str) -> Option<&'static str> {
    let input = input.trim().to_lowercase();
    COMMANDS
        .iter()
        .map(|c| (*c, strsim::damerau_levenshtein(&input, c)))
        .filter(|(_, dist)| *dist <= 2)
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c)
}

/// Spawns a task reading lines from `reader` until EOF.
///
/// Skip requests trigger `skip` directly; everything else is forwarded on
/// `events`. The task ends when the reader closes or the receiver is
/// dropped; dropping `events` then signals the controller that input is
/// closed.
pub fn spawn_reader<Rd>(
    reader: Rd,
    events: mpsc::UnboundedSender<UserEvent>,
    skip: SkipTrigger,
    levels: Vec<String>,
) -> JoinHandle<()>
where
    Rd: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("input closed");
                    break;
                }
                Err(e) => {
                    debug!(error = %e, "input read failed");
                    break;
                }
            };

            match parse_line(&line, &levels) {
                UserEvent::Skip => {
                    if skip.request_skip() {
                        info!("skip requested");
                    }
                }
                event => {
                    if events.send(event).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::InterruptSignal;

    fn levels() -> Vec<String> {
        ["primaria_baja", "primaria_alta", "secundaria", "preparatoria"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn acknowledge_words() {
        assert_eq!(parse_line("", &levels()), UserEvent::Acknowledge);
        assert_eq!(parse_line("  OK \n", &levels()), UserEvent::Acknowledge);
        assert_eq!(parse_line("ready", &levels()), UserEvent::Acknowledge);
    }

    #[test]
    fn skip_words() {
        for word in ["s", "skip", "H", "SKIP"] {
            assert_eq!(parse_line(word, &levels()), UserEvent::Skip, "{word}");
        }
    }

    #[test]
    fn protocol_and_level_selection() {
        assert_eq!(
            parse_line("2", &levels()),
            UserEvent::SelectProtocol(Protocol::Two)
        );
        assert_eq!(
            parse_line("c", &levels()),
            UserEvent::SelectLevel("secundaria".to_string())
        );
        assert_eq!(
            parse_line("Preparatoria", &levels()),
            UserEvent::SelectLevel("preparatoria".to_string())
        );
        // Letter beyond the catalog is just text
        assert_eq!(parse_line("z", &levels()), UserEvent::Text("z".to_string()));
    }

    #[test]
    fn code_keeps_case_and_symbols() {
        assert_eq!(
            parse_line("code AURORAyMfIVSrI-O5Nd2", &levels()),
            UserEvent::SubmitAccessCode("AURORAyMfIVSrI-O5Nd2".to_string())
        );
    }

    #[test]
    fn code_word_is_case_insensitive() {
        for line in ["Code AURORA-x", "cOdE\tAURORA-x", "CODE   AURORA-x"] {
            assert_eq!(
                parse_line(line, &levels()),
                UserEvent::SubmitAccessCode("AURORA-x".to_string()),
                "{line:?}"
            );
        }
        // The bare word is not a submission
        assert_eq!(parse_line("code", &levels()), UserEvent::Text("code".to_string()));
    }

    #[test]
    fn unknown_text_is_preserved() {
        assert_eq!(
            parse_line("AURORAxMxIxSxIxOxNx2\r\n", &levels()),
            UserEvent::Text("AURORAxMxIxSxIxOxNx2".to_string())
        );
    }

    #[test]
    fn suggestions() {
        assert_eq!(suggest_command("skp"), Some("skip"));
        assert_eq!(suggest_command("qiut"), Some("quit"));
        assert_eq!(suggest_command("completely different"), None);
    }

    #[tokio::test]
    async fn reader_routes_skip_and_forwards_rest() {
        let signal = InterruptSignal::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"1\nskip\nq\n";
        let handle = spawn_reader(input, tx, signal.skip_trigger(), levels());
        handle.await.unwrap();

        assert!(signal.is_triggered());
        assert_eq!(
            rx.recv().await,
            Some(UserEvent::SelectProtocol(Protocol::One))
        );
        assert_eq!(rx.recv().await, Some(UserEvent::Quit));
        assert_eq!(rx.recv().await, None);
    }
}
