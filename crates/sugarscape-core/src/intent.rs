//! Action intents and the decoder for free-text oracle responses.
//!
//! An oracle answers with three labelled fields:
//!
//! ```text
//! Action: [Move to (1,0)]
//! Message: [Found food to the east]
//! Thought: [Low energy, heading for the cluster]
//! ```
//!
//! The `Action` field is decoded by a strict grammar into an
//! [`ActionIntent`]. Anything outside the grammar decodes to
//! [`ActionIntent::Stay`].

use crate::types::{truncate_words, AgentId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of words kept from an oracle message.
pub const MAX_MESSAGE_WORDS: usize = 50;

/// What an agent wants to do this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionIntent {
    /// Unit orthogonal step: exactly one of `dx`, `dy` is ±1, the other 0.
    Move { dx: i64, dy: i64 },
    Stay,
    Share { target: AgentId, amount: u64 },
    Attack { target: AgentId },
    Reproduce,
}

impl ActionIntent {
    /// Build a move, rejecting anything but a unit orthogonal step.
    pub fn step(dx: i64, dy: i64) -> Result<Self, IntentParseError> {
        let unit = |v: i64| (-1..=1).contains(&v);
        if unit(dx) && unit(dy) && (dx == 0) != (dy == 0) {
            Ok(ActionIntent::Move { dx, dy })
        } else {
            Err(IntentParseError::NotUnitStep(dx, dy))
        }
    }

    /// Short name used for logging and counters.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionIntent::Move { .. } => "move",
            ActionIntent::Stay => "stay",
            ActionIntent::Share { .. } => "share",
            ActionIntent::Attack { .. } => "attack",
            ActionIntent::Reproduce => "reproduce",
        }
    }
}

impl Default for ActionIntent {
    fn default() -> Self {
        ActionIntent::Stay
    }
}

/// Renders in the same grammar [`FromStr`] accepts.
impl fmt::Display for ActionIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionIntent::Move { dx, dy } => write!(f, "Move to ({},{})", dx, dy),
            ActionIntent::Stay => write!(f, "Stay"),
            ActionIntent::Share { target, amount } => write!(f, "Share: {}-{}", target, amount),
            ActionIntent::Attack { target } => write!(f, "Attack: {}", target),
            ActionIntent::Reproduce => write!(f, "Reproduce"),
        }
    }
}

/// Why an action string failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentParseError {
    #[error("empty action")]
    Empty,
    #[error("unknown action verb: {0}")]
    UnknownVerb(String),
    #[error("malformed coordinates: {0}")]
    BadCoordinates(String),
    #[error("move ({0},{1}) is not a unit orthogonal step")]
    NotUnitStep(i64, i64),
    #[error("malformed target id: {0}")]
    BadTarget(String),
    #[error("malformed share amount: {0}")]
    BadAmount(String),
}

impl FromStr for ActionIntent {
    type Err = IntentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(IntentParseError::Empty);
        }

        let (verb, rest) = split_verb(s);
        match verb.to_ascii_lowercase().as_str() {
            "stay" if rest.is_empty() => Ok(ActionIntent::Stay),
            "reproduce" if rest.is_empty() => Ok(ActionIntent::Reproduce),
            "move" => parse_move(rest),
            "share" => parse_share(rest),
            "attack" => {
                let target = parse_target(rest.strip_prefix(':').unwrap_or(rest))?;
                Ok(ActionIntent::Attack { target })
            }
            _ => Err(IntentParseError::UnknownVerb(s.to_string())),
        }
    }
}

/// Split off the leading alphabetic verb; the remainder is trimmed.
fn split_verb(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(s.len());
    (&s[..end], s[end..].trim())
}

fn parse_move(rest: &str) -> Result<ActionIntent, IntentParseError> {
    let rest = rest.strip_prefix(':').unwrap_or(rest).trim_start();
    let rest = match rest.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("to") => rest[2..].trim_start(),
        _ => rest,
    };
    let inner = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| IntentParseError::BadCoordinates(rest.to_string()))?;
    let mut parts = inner.split(',');
    let (dx, dy) = match (parts.next(), parts.next(), parts.next()) {
        (Some(dx), Some(dy), None) => (dx.trim(), dy.trim()),
        _ => return Err(IntentParseError::BadCoordinates(inner.to_string())),
    };
    let dx: i64 = dx
        .parse()
        .map_err(|_| IntentParseError::BadCoordinates(inner.to_string()))?;
    let dy: i64 = dy
        .parse()
        .map_err(|_| IntentParseError::BadCoordinates(inner.to_string()))?;
    ActionIntent::step(dx, dy)
}

fn parse_share(rest: &str) -> Result<ActionIntent, IntentParseError> {
    let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
    let (target, amount) = rest
        .split_once('-')
        .ok_or_else(|| IntentParseError::BadAmount(rest.to_string()))?;
    let target = parse_target(target)?;
    let amount = amount
        .trim()
        .parse::<u64>()
        .map_err(|_| IntentParseError::BadAmount(amount.to_string()))?;
    Ok(ActionIntent::Share { target, amount })
}

fn parse_target(raw: &str) -> Result<AgentId, IntentParseError> {
    raw.trim()
        .parse::<u64>()
        .map(AgentId)
        .map_err(|_| IntentParseError::BadTarget(raw.trim().to_string()))
}

/// A decided intent with its outgoing message and rationale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Decision {
    pub intent: ActionIntent,
    /// Free text for nearby agents, at most [`MAX_MESSAGE_WORDS`] words.
    pub message: String,
    pub rationale: String,
}

impl Decision {
    pub fn new(intent: ActionIntent) -> Self {
        Self {
            intent,
            message: String::new(),
            rationale: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl AsRef<str>) -> Self {
        self.message = truncate_words(message.as_ref(), MAX_MESSAGE_WORDS);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        self.rationale = rationale.into();
        self
    }

    /// The decision substituted for any oracle failure: `Stay`, no words.
    pub fn fallback() -> Self {
        Self::default()
    }

    /// Decode a free-text oracle response.
    ///
    /// Total: a missing or undecodable `Action` field yields
    /// [`Decision::fallback`], dropping message and thought. A missing
    /// `Thought` field yields an empty rationale.
    pub fn from_response(response: &str) -> Self {
        let Some(intent) = labelled_field(response, "Action")
            .and_then(|raw| raw.parse::<ActionIntent>().ok())
        else {
            return Self::fallback();
        };
        let message = labelled_field(response, "Message").unwrap_or_default();
        let rationale = labelled_field(response, "Thought").unwrap_or_default();
        Decision::new(intent)
            .with_message(message)
            .with_rationale(rationale.trim())
    }
}

/// Find `Label: [value]` (or `Label: value`) on a single line.
///
/// The label must open the line, optionally after whitespace or list
/// markup. Bracketed values end at the first `]`.
pub fn labelled_field<'a>(response: &'a str, label: &str) -> Option<&'a str> {
    response.lines().find_map(|line| {
        let line = line.trim_start_matches(|c: char| c.is_whitespace() || c == '*' || c == '-');
        let head = line.get(..label.len())?;
        if !head.eq_ignore_ascii_case(label) {
            return None;
        }
        let value = line[label.len()..]
            .trim_start_matches('*')
            .strip_prefix(':')?
            .trim_start_matches('*')
            .trim();
        match value.strip_prefix('[') {
            Some(open) => open.find(']').map(|end| open[..end].trim()),
            None => Some(value.trim_end_matches('*').trim()),
        }
    })
}
