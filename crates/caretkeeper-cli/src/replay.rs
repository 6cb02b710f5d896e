//! Headless replay of scripted editing sessions.
//!
//! A script is one command per line; blank lines and `#` comments are
//! skipped:
//!
//! ```text
//! caret 0/0 1        # place the caret without telling the editor
//! click 0 1          # place the caret the way a pointer click would
//! key ArrowRight     # a named key, optionally followed by ctrl / shift / meta
//! type zw            # one key press per character
//! compose é          # an IME session committing the text
//! paste some text    # Ctrl+V with the text on the clipboard
//! undo
//! tick
//! ```

use anyhow::{Context, Result, anyhow, bail};
use caretkeeper_engine::editing::CaretSnapshot;
use caretkeeper_engine::playback::Playback;
use caretkeeper_engine::{KeyEvent, NodePath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Caret { path: NodePath, offset: usize },
    Click { path: NodePath, offset: usize },
    Key(KeyEvent),
    Type(String),
    Compose(String),
    Paste(String),
    Undo,
    Tick,
}

/// What a replayed session ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub content: String,
    pub caret: Option<CaretSnapshot>,
    pub history_depth: usize,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "content: {}", self.content)?;
        match &self.caret {
            Some(caret) => writeln!(f, "caret: {caret}")?,
            None => writeln!(f, "caret: none")?,
        }
        write!(f, "history: {}", self.history_depth)
    }
}

pub fn parse_script(src: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (index, line) in src.lines().enumerate() {
        if let Some(command) =
            parse_line(line).with_context(|| format!("line {}: {}", index + 1, line.trim()))?
        {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Parses one script line; `None` for blanks and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));

    let command = match verb {
        "caret" => {
            let (path, offset) = parse_position(rest)?;
            Command::Caret { path, offset }
        }
        "click" => {
            let (path, offset) = parse_position(rest)?;
            Command::Click { path, offset }
        }
        "key" => Command::Key(parse_key(rest)?),
        "type" => Command::Type(required_text(rest)?),
        "compose" => Command::Compose(required_text(rest)?),
        "paste" => Command::Paste(required_text(rest)?),
        "undo" => Command::Undo,
        "tick" => Command::Tick,
        other => bail!("unknown command {other:?}"),
    };
    Ok(Some(command))
}

/// Text commands keep everything after the verb, `#` included.
fn strip_comment(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return "";
    }
    let keeps_text = ["type ", "compose ", "paste "]
        .iter()
        .any(|verb| trimmed.starts_with(verb));
    match line.find(" #") {
        Some(at) if !keeps_text => &line[..at],
        _ => line,
    }
}

fn parse_position(rest: &str) -> Result<(NodePath, usize)> {
    let mut parts = rest.split_whitespace();
    let (Some(path), Some(offset), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("expected <path> <offset>");
    };
    let path: NodePath = path
        .parse()
        .with_context(|| format!("invalid path {path:?}"))?;
    let offset = offset
        .parse()
        .with_context(|| format!("invalid offset {offset:?}"))?;
    Ok((path, offset))
}

fn parse_key(rest: &str) -> Result<KeyEvent> {
    let mut parts = rest.split_whitespace();
    let name = parts.next().ok_or_else(|| anyhow!("expected a key name"))?;
    let mut chars = name.chars();
    let mut event = match (chars.next(), chars.next()) {
        (Some(c), None) => KeyEvent::for_char(c),
        _ if name == "Space" => KeyEvent::for_char(' '),
        _ => KeyEvent::named(name),
    };
    for modifier in parts {
        event = match modifier {
            "ctrl" => event.with_ctrl(),
            "shift" => event.with_shift(),
            "meta" => event.with_meta(),
            other => bail!("unknown modifier {other:?}"),
        };
    }
    Ok(event)
}

fn required_text(rest: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("expected text");
    }
    Ok(rest.to_string())
}

/// Runs `commands` in order against `playback`.
pub fn run(playback: &mut Playback, commands: &[Command]) -> Result<Outcome> {
    for (step, command) in commands.iter().enumerate() {
        log::info!("step {}: {command:?}", step + 1);
        match command {
            Command::Caret { path, offset } => playback
                .place_caret(path.indexes(), *offset)
                .with_context(|| format!("caret {path} {offset}"))?,
            Command::Click { path, offset } => playback
                .click(path.indexes(), *offset)
                .with_context(|| format!("click {path} {offset}"))?,
            Command::Key(event) => {
                playback.press(event);
            }
            Command::Type(text) => {
                playback.type_text(text);
            }
            Command::Compose(text) => {
                playback.compose(text);
            }
            Command::Paste(text) => {
                playback.paste(text);
            }
            Command::Undo => {
                if playback.undo().is_empty() {
                    log::info!("nothing to undo");
                }
            }
            Command::Tick => {
                playback.tick();
            }
        }
    }
    Ok(outcome(playback))
}

pub fn outcome(playback: &Playback) -> Outcome {
    let editor = playback.editor();
    Outcome {
        content: playback.content(),
        caret: editor.caret_store().capture(editor.surface()).ok(),
        history_depth: editor.history().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caretkeeper_engine::EditorOptions;
    use pretty_assertions::assert_eq;

    fn replay(markup: &str, script: &str) -> Outcome {
        let mut playback = Playback::from_markup(markup, EditorOptions::default()).unwrap();
        let commands = parse_script(script).unwrap();
        run(&mut playback, &commands).unwrap()
    }

    #[test]
    fn parses_every_command() {
        let script = "\
# a comment
caret 0/0 1
click / 2
key ArrowRight
key z ctrl   # undo shortcut
type a b
compose é
paste two words
undo
tick
";
        let commands = parse_script(script).unwrap();
        assert_eq!(
            commands,
            vec![
                Command::Caret {
                    path: NodePath::new(vec![0, 0]),
                    offset: 1
                },
                Command::Click {
                    path: NodePath::root(),
                    offset: 2
                },
                Command::Key(KeyEvent::named("ArrowRight")),
                Command::Key(KeyEvent::for_char('z').with_ctrl()),
                Command::Type("a b".to_string()),
                Command::Compose("é".to_string()),
                Command::Paste("two words".to_string()),
                Command::Undo,
                Command::Tick,
            ]
        );
    }

    #[test]
    fn type_keeps_hash_characters() {
        assert_eq!(
            parse_line("type a #1").unwrap(),
            Some(Command::Type("a #1".to_string()))
        );
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_script("tick\nwobble 1\n").unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
        assert!(parse_line("caret 0/x 1").is_err());
        assert!(parse_line("key ArrowLeft hyper").is_err());
        assert!(parse_line("type").is_err());
    }

    #[test]
    fn replays_insertion_between_formats() {
        let outcome = replay(
            "<p><b>x</b><i>y</i></p>",
            "click 0 1\ntype z\n",
        );
        assert_eq!(outcome.content, "<p><b>x</b>z<i>y</i></p>");
        assert_eq!(outcome.caret.unwrap().to_string(), "0/1@1");
        assert_eq!(outcome.history_depth, 1);
    }

    #[test]
    fn replays_arrow_into_bold_then_undo() {
        let outcome = replay(
            "<p>a<b>bold</b>c</p>",
            "click 0/0 1\nkey ArrowRight\ntype X\nundo\n",
        );
        assert_eq!(outcome.content, "<p>a<b>bold</b>c</p>");
        assert_eq!(outcome.history_depth, 0);
    }

    #[test]
    fn stale_caret_stops_the_replay() {
        let mut playback = Playback::from_markup("<p>a</p>", EditorOptions::default()).unwrap();
        let commands = parse_script("caret 4/2 0\n").unwrap();
        assert!(run(&mut playback, &commands).is_err());
    }

    #[test]
    fn outcome_display() {
        let outcome = Outcome {
            content: "<p>a</p>".to_string(),
            caret: None,
            history_depth: 3,
        };
        assert_eq!(outcome.to_string(), "content: <p>a</p>\ncaret: none\nhistory: 3");
    }
}
