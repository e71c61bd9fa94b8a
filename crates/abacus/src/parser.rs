use thiserror::Error;

pub const ACTION_LABEL: &str = "Action:";
pub const ACTION_INPUT_LABEL: &str = "Action Input:";

/// The action and argument extracted from a model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAction {
    pub name: String,
    pub input: String,
}

impl ParsedAction {
    pub fn new<N: Into<String>, I: Into<String>>(name: N, input: I) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("expected two lines (`Action:` and `Action Input:`), found one")]
    MissingLine,

    #[error("line {line} is missing the `{label}` label")]
    MissingLabel { label: &'static str, line: usize },

    #[error("expected exactly two lines, found {0}")]
    UnexpectedLines(usize),
}

/// Turns a raw model reply into an action.
///
/// The agent loop only depends on this trait, so the text contract can be replaced
/// (for example by native tool calls) without changing the loop.
pub trait ResponseParser: Send + Sync {
    fn parse(&self, reply: &str) -> Result<ParsedAction, ParseError>;
}

/// Parses the two-line `Action:` / `Action Input:` contract.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionParser;

impl ActionParser {
    pub fn new() -> Self {
        Self
    }
}

impl ResponseParser for ActionParser {
    fn parse(&self, reply: &str) -> Result<ParsedAction, ParseError> {
        let lines: Vec<&str> = reply.trim().split('\n').collect();
        match lines.len() {
            0 | 1 => return Err(ParseError::MissingLine),
            2 => {}
            n => return Err(ParseError::UnexpectedLines(n)),
        }

        let name = labelled_value(lines[0], ACTION_LABEL, 0)?;
        let input = labelled_value(lines[1], ACTION_INPUT_LABEL, 1)?;
        Ok(ParsedAction::new(name, input))
    }
}

/// The text between the first occurrence of `label` and the next one, trimmed
fn labelled_value(line: &str, label: &'static str, index: usize) -> Result<String, ParseError> {
    line.split(label)
        .nth(1)
        .map(|value| value.trim().to_string())
        .ok_or(ParseError::MissingLabel { label, line: index })
}
