//! Personality traits: the sixteen MBTI categories and their population weights.
//!
//! Every agent may carry one personality, fixed at creation. New agents
//! draw from a [`TraitTable`], a weighted distribution that defaults to
//! real-world population shares.

use crate::error::{Result, SimError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the sixteen personality categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Personality {
    Intj,
    Intp,
    Entj,
    Entp,
    Infj,
    Infp,
    Enfj,
    Enfp,
    Istj,
    Isfj,
    Estj,
    Esfj,
    Istp,
    Isfp,
    Estp,
    Esfp,
}

impl Personality {
    /// All categories in table order.
    pub const ALL: [Personality; 16] = [
        Personality::Intj,
        Personality::Intp,
        Personality::Entj,
        Personality::Entp,
        Personality::Infj,
        Personality::Infp,
        Personality::Enfj,
        Personality::Enfp,
        Personality::Istj,
        Personality::Isfj,
        Personality::Estj,
        Personality::Esfj,
        Personality::Istp,
        Personality::Isfp,
        Personality::Estp,
        Personality::Esfp,
    ];

    /// Four-letter code, e.g. `"INTJ"`.
    pub fn code(self) -> &'static str {
        match self {
            Personality::Intj => "INTJ",
            Personality::Intp => "INTP",
            Personality::Entj => "ENTJ",
            Personality::Entp => "ENTP",
            Personality::Infj => "INFJ",
            Personality::Infp => "INFP",
            Personality::Enfj => "ENFJ",
            Personality::Enfp => "ENFP",
            Personality::Istj => "ISTJ",
            Personality::Isfj => "ISFJ",
            Personality::Estj => "ESTJ",
            Personality::Esfj => "ESFJ",
            Personality::Istp => "ISTP",
            Personality::Isfp => "ISFP",
            Personality::Estp => "ESTP",
            Personality::Esfp => "ESFP",
        }
    }

    /// Short archetype description used in oracle prompts.
    pub fn description(self) -> &'static str {
        match self {
            Personality::Intj => "Architect - Strategic, independent, high standards.",
            Personality::Intp => "Logician - Innovative, analytical, curious.",
            Personality::Entj => "Commander - Bold, strong-willed, charismatic.",
            Personality::Entp => "Debater - Quick-witted, clever, resourceful.",
            Personality::Infj => "Advocate - Insightful, principled, passionate.",
            Personality::Infp => "Mediator - Empathetic, creative, idealistic.",
            Personality::Enfj => "Protagonist - Charismatic, inspiring, empathetic.",
            Personality::Enfp => "Campaigner - Enthusiastic, creative, sociable.",
            Personality::Istj => "Logistician - Honest, dutiful, practical.",
            Personality::Isfj => "Defender - Warm, responsible, harmonious.",
            Personality::Estj => "Executive - Efficient, strong-willed, organized.",
            Personality::Esfj => "Consul - Sociable, caring, loyal.",
            Personality::Istp => "Virtuoso - Practical, adaptable, analytical.",
            Personality::Isfp => "Adventurer - Gentle, sensitive, artistic.",
            Personality::Estp => "Entrepreneur - Energetic, perceptive, bold.",
            Personality::Esfp => "Entertainer - Spontaneous, energetic, sociable.",
        }
    }

    /// Share of the world population with this type.
    pub fn population_weight(self) -> f64 {
        DEFAULT_WEIGHTS[self as usize]
    }
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Personality {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Personality::ALL
            .iter()
            .copied()
            .find(|p| p.code() == upper)
            .ok_or_else(|| SimError::invalid_config("personality", s, "unknown personality code"))
    }
}

/// Population shares in [`Personality::ALL`] order (Myers-Briggs survey data).
pub const DEFAULT_WEIGHTS: [f64; 16] = [
    0.021, 0.033, 0.018, 0.032, 0.015, 0.044, 0.025, 0.081, 0.116, 0.138, 0.087, 0.123, 0.054,
    0.088, 0.043, 0.085,
];

/// Weighted distribution over the sixteen personalities.
///
/// Weights need not sum to one; they are normalized by the sampler.
#[derive(Debug, Clone)]
pub struct TraitTable {
    weights: Vec<f64>,
    index: WeightedIndex<f64>,
}

impl TraitTable {
    /// Build a table from sixteen weights in [`Personality::ALL`] order.
    ///
    /// Rejects the wrong length, negative or non-finite entries, and an
    /// all-zero vector.
    pub fn new(weights: Vec<f64>) -> Result<Self> {
        if weights.len() != Personality::ALL.len() {
            return Err(SimError::invalid_config(
                "trait_weights",
                weights.len(),
                "expected exactly 16 weights",
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SimError::invalid_config(
                "trait_weights",
                bad,
                "weights must be finite and non-negative",
            ));
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(SimError::invalid_config(
                "trait_weights",
                total,
                "weights must sum to a positive value",
            ));
        }
        let index = WeightedIndex::new(&weights)
            .map_err(|e| SimError::invalid_config("trait_weights", total, e.to_string()))?;
        Ok(Self { weights, index })
    }

    /// Normalized weight of one category.
    pub fn probability(&self, personality: Personality) -> f64 {
        let total: f64 = self.weights.iter().sum();
        self.weights[personality as usize] / total
    }

    /// Draw a personality.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Personality {
        Personality::ALL[self.index.sample(rng)]
    }
}

impl Default for TraitTable {
    fn default() -> Self {
        // DEFAULT_WEIGHTS are sixteen positive finite values.
        let weights = DEFAULT_WEIGHTS.to_vec();
        let index = WeightedIndex::new(&weights).unwrap_or_else(|_| unreachable!());
        Self { weights, index }
    }
}
