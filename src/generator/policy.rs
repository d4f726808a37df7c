//! Character classes and the password policy that selects them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 16;

/// Upper bound on a single generated password.
pub const MAX_LENGTH: usize = 1024;

/// One of the four character classes a policy can select.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    Lowercase,
    Uppercase,
    Digits,
    Symbols,
}

impl CharClass {
    /// All classes, in pool order.
    pub const ALL: [CharClass; 4] = [
        CharClass::Lowercase,
        CharClass::Uppercase,
        CharClass::Digits,
        CharClass::Symbols,
    ];

    /// The characters this class draws from.
    pub fn charset(self) -> &'static str {
        match self {
            CharClass::Lowercase => LOWERCASE,
            CharClass::Uppercase => UPPERCASE,
            CharClass::Digits => DIGITS,
            CharClass::Symbols => SYMBOLS,
        }
    }

    /// Does `c` belong to this class's charset?
    pub fn contains(self, c: char) -> bool {
        self.charset().contains(c)
    }

    /// The class `c` was drawn from, if any.
    pub fn of(c: char) -> Option<CharClass> {
        Self::ALL.into_iter().find(|class| class.contains(c))
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CharClass::Lowercase => "lowercase",
            CharClass::Uppercase => "uppercase",
            CharClass::Digits => "digits",
            CharClass::Symbols => "symbols",
        };
        f.write_str(name)
    }
}

/// What to generate: a length and a set of character classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    length: usize,
    classes: BTreeSet<CharClass>,
}

impl PasswordPolicy {
    pub fn new(length: usize, classes: impl IntoIterator<Item = CharClass>) -> Self {
        Self {
            length,
            classes: classes.into_iter().collect(),
        }
    }

    /// A policy selecting every class.
    pub fn with_all_classes(length: usize) -> Self {
        Self::new(length, CharClass::ALL)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn classes(&self) -> &BTreeSet<CharClass> {
        &self.classes
    }

    /// Check that the policy can actually be satisfied.
    ///
    /// Every selected class must fit in the password at least once, so
    /// `length` may not be smaller than the number of classes.
    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(VaultError::InvalidPolicy(
                "at least one character class must be selected".into(),
            ));
        }
        if self.length == 0 {
            return Err(VaultError::InvalidPolicy(
                "length must be at least 1".into(),
            ));
        }
        if self.length > MAX_LENGTH {
            return Err(VaultError::InvalidPolicy(format!(
                "length cannot exceed {MAX_LENGTH}"
            )));
        }
        if self.length < self.classes.len() {
            return Err(VaultError::InvalidPolicy(format!(
                "length {} is too short to include all {} selected classes",
                self.length,
                self.classes.len()
            )));
        }
        Ok(())
    }

    /// The concatenated character pool of every selected class.
    pub fn pool(&self) -> Vec<char> {
        self.classes
            .iter()
            .flat_map(|class| class.charset().chars())
            .collect()
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::with_all_classes(DEFAULT_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charsets_are_disjoint() {
        for c in CharClass::ALL.iter().flat_map(|cl| cl.charset().chars()) {
            let owners = CharClass::ALL.iter().filter(|cl| cl.contains(c)).count();
            assert_eq!(owners, 1, "{c:?} belongs to {owners} classes");
        }
    }

    #[test]
    fn pool_concatenates_selected_classes() {
        let policy = PasswordPolicy::new(8, [CharClass::Digits, CharClass::Lowercase]);
        assert_eq!(policy.pool().len(), 36);
        assert_eq!(PasswordPolicy::default().pool().len(), 26 + 26 + 10 + 26);
    }

    #[test]
    fn empty_class_set_is_invalid() {
        let policy = PasswordPolicy::new(10, []);
        assert!(matches!(policy.validate(), Err(VaultError::InvalidPolicy(_))));
    }

    #[test]
    fn zero_length_is_invalid() {
        let policy = PasswordPolicy::new(0, [CharClass::Digits]);
        assert!(policy.validate().is_err());
    }

    #[test]
    fn length_shorter_than_class_count_is_invalid() {
        assert!(PasswordPolicy::with_all_classes(3).validate().is_err());
        assert!(PasswordPolicy::with_all_classes(4).validate().is_ok());
    }

    #[test]
    fn default_policy_is_valid() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.length(), 16);
        assert_eq!(policy.classes().len(), 4);
        policy.validate().unwrap();
    }

    #[test]
    fn class_of_character() {
        assert_eq!(CharClass::of('q'), Some(CharClass::Lowercase));
        assert_eq!(CharClass::of('Q'), Some(CharClass::Uppercase));
        assert_eq!(CharClass::of('7'), Some(CharClass::Digits));
        assert_eq!(CharClass::of('?'), Some(CharClass::Symbols));
        assert_eq!(CharClass::of('~'), None);
    }
}
