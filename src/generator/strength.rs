//! Heuristic password strength scoring.
//!
//! The score adds up four signals:
//!
//! | Signal | Points |
//! |---|---|
//! | length >= 16 / >= 12 / >= 8 | 3 / 2 / 1 |
//! | each class present (lower, upper, digit, symbol) | 1 |
//! | no common weak substring | 2 |
//! | entropy estimate > 100 / > 80 / > 60 bits | 3 / 2 / 1 |
//!
//! and maps to a label: very weak (< 3), weak (< 5), medium (< 7),
//! strong (< 10), very strong (>= 10).  The thresholds are part of the
//! contract; UI feedback depends on them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Substrings that cost a password its pattern bonus.
const COMMON_PATTERNS: [&str; 7] = [
    "123", "abc", "qwerty", "password", "admin", "welcome", "letmein",
];

const PATTERN_BONUS: u32 = 2;

/// Highest reachable score: 3 + 4 + 2 + 3.
pub const MAX_SCORE: u32 = 12;

/// Pool sizes assumed per class present, for the entropy estimate.
const LOWER_POOL: u32 = 26;
const UPPER_POOL: u32 = 26;
const DIGIT_POOL: u32 = 10;
const SYMBOL_POOL: u32 = 32;

/// Ordered strength labels, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrengthLabel {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl StrengthLabel {
    /// Label for a raw score.
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s >= 10 => StrengthLabel::VeryStrong,
            s if s >= 7 => StrengthLabel::Strong,
            s if s >= 5 => StrengthLabel::Medium,
            s if s >= 3 => StrengthLabel::Weak,
            _ => StrengthLabel::VeryWeak,
        }
    }
}

impl fmt::Display for StrengthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StrengthLabel::VeryWeak => "very weak",
            StrengthLabel::Weak => "weak",
            StrengthLabel::Medium => "medium",
            StrengthLabel::Strong => "strong",
            StrengthLabel::VeryStrong => "very strong",
        };
        f.write_str(text)
    }
}

/// Result of `check_strength`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthScore {
    pub score: u32,
    pub label: StrengthLabel,
}

/// Which of the four scoring classes occur in a password.
#[derive(Debug, Default, Clone, Copy)]
struct ClassesPresent {
    lower: bool,
    upper: bool,
    digit: bool,
    symbol: bool,
}

impl ClassesPresent {
    fn scan(password: &str) -> Self {
        let mut found = Self::default();
        for c in password.chars() {
            match c {
                'a'..='z' => found.lower = true,
                'A'..='Z' => found.upper = true,
                '0'..='9' => found.digit = true,
                _ => found.symbol = true,
            }
        }
        found
    }

    fn count(self) -> u32 {
        [self.lower, self.upper, self.digit, self.symbol]
            .into_iter()
            .map(u32::from)
            .sum()
    }

    fn pool_size(self) -> u32 {
        u32::from(self.lower) * LOWER_POOL
            + u32::from(self.upper) * UPPER_POOL
            + u32::from(self.digit) * DIGIT_POOL
            + u32::from(self.symbol) * SYMBOL_POOL
    }
}

/// Score a candidate password.  Pure; never fails.
pub fn check_strength(password: &str) -> StrengthScore {
    let length = password.chars().count();
    let classes = ClassesPresent::scan(password);

    let mut score = length_points(length);
    score += classes.count();

    let lowered = password.to_lowercase();
    if !COMMON_PATTERNS.iter().any(|pattern| lowered.contains(pattern)) {
        score += PATTERN_BONUS;
    }

    score += entropy_points(entropy_bits(length, classes.pool_size()));

    StrengthScore {
        score,
        label: StrengthLabel::from_score(score),
    }
}

fn length_points(length: usize) -> u32 {
    match length {
        l if l >= 16 => 3,
        l if l >= 12 => 2,
        l if l >= 8 => 1,
        _ => 0,
    }
}

/// `length * log2(pool)`; an empty pool carries no entropy.
fn entropy_bits(length: usize, pool_size: u32) -> f64 {
    if pool_size == 0 {
        return 0.0;
    }
    length as f64 * f64::from(pool_size).log2()
}

fn entropy_points(bits: f64) -> u32 {
    if bits > 100.0 {
        3
    } else if bits > 80.0 {
        2
    } else if bits > 60.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_password_is_very_weak() {
        let s = check_strength("");
        // Only the pattern bonus applies.
        assert_eq!(s.score, 2);
        assert_eq!(s.label, StrengthLabel::VeryWeak);
    }

    #[test]
    fn length_tiers() {
        assert_eq!(length_points(7), 0);
        assert_eq!(length_points(8), 1);
        assert_eq!(length_points(11), 1);
        assert_eq!(length_points(12), 2);
        assert_eq!(length_points(15), 2);
        assert_eq!(length_points(16), 3);
    }

    #[test]
    fn entropy_tiers_are_strict() {
        assert_eq!(entropy_points(60.0), 0);
        assert_eq!(entropy_points(60.1), 1);
        assert_eq!(entropy_points(80.0), 1);
        assert_eq!(entropy_points(80.1), 2);
        assert_eq!(entropy_points(100.0), 2);
        assert_eq!(entropy_points(100.1), 3);
    }

    #[test]
    fn label_boundaries() {
        assert_eq!(StrengthLabel::from_score(2), StrengthLabel::VeryWeak);
        assert_eq!(StrengthLabel::from_score(3), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(4), StrengthLabel::Weak);
        assert_eq!(StrengthLabel::from_score(5), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(6), StrengthLabel::Medium);
        assert_eq!(StrengthLabel::from_score(7), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(9), StrengthLabel::Strong);
        assert_eq!(StrengthLabel::from_score(10), StrengthLabel::VeryStrong);
    }

    #[test]
    fn unicode_counts_as_symbol() {
        let classes = ClassesPresent::scan("ü");
        assert!(classes.symbol);
        assert_eq!(classes.pool_size(), SYMBOL_POOL);
    }

    #[test]
    fn label_display_and_serde() {
        assert_eq!(StrengthLabel::VeryStrong.to_string(), "very strong");
        assert_eq!(
            serde_json::to_string(&StrengthLabel::VeryWeak).unwrap(),
            "\"very-weak\""
        );
    }
}
