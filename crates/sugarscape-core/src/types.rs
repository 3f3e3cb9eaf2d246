//! Shared types used across the sugarscape crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The current tick of the simulation.
pub type Tick = u64;

/// Agent energy. Signed because upkeep can push it below zero before the
/// end-of-tick death check.
pub type Energy = i64;

/// Unique identifier for an agent.
///
/// Assigned monotonically from zero by the registry and never reused,
/// so ascending id order is also creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u64);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cell on the square grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i64,
    pub y: i64,
}

impl GridPos {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Step by `(dx, dy)` and wrap both axes onto a torus of side `size`.
    pub fn wrapped_step(self, dx: i64, dy: i64, size: i64) -> Self {
        Self {
            x: (self.x + dx).rem_euclid(size),
            y: (self.y + dy).rem_euclid(size),
        }
    }

    /// Raw offset from `self` to `other`. No wrap-around compensation.
    pub fn offset_to(self, other: GridPos) -> (i64, i64) {
        (other.x - self.x, other.y - self.y)
    }

    /// Chebyshev distance, computed on the raw offset.
    pub fn chebyshev(self, other: GridPos) -> i64 {
        let (dx, dy) = self.offset_to(other);
        dx.abs().max(dy.abs())
    }

    pub fn within(self, other: GridPos, range: i64) -> bool {
        self.chebyshev(other) <= range
    }

    /// Whether the cell lies inside a grid of side `size` without wrapping.
    pub fn in_bounds(self, size: i64) -> bool {
        (0..size).contains(&self.x) && (0..size).contains(&self.y)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A message broadcast by an agent to everyone in view range.
///
/// Delivered into the receiver's next-tick buffer and readable for exactly
/// one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: AgentId,
    pub text: String,
    /// Sender position when the message was sent.
    pub origin: GridPos,
    /// Tick in which the message was sent.
    pub sent_tick: Tick,
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Truncate to at most `max_words` whitespace-separated words.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_step_crosses_both_edges() {
        assert_eq!(GridPos::new(9, 0).wrapped_step(1, 0, 10), GridPos::new(0, 0));
        assert_eq!(GridPos::new(0, 0).wrapped_step(0, -1, 10), GridPos::new(0, 9));
    }

    #[test]
    fn chebyshev_ignores_wrap() {
        let a = GridPos::new(0, 0);
        let b = GridPos::new(9, 1);
        assert_eq!(a.chebyshev(b), 9);
        assert!(!a.within(b, 5));
        assert!(a.within(GridPos::new(-3, 5), 5));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_words("one two  three four", 2), "one two");
    }

    #[test]
    fn agent_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&AgentId(7)).unwrap(), "7");
    }
}
