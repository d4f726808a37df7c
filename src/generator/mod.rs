//! Password generation and strength scoring.
//!
//! - `policy`: character classes and `PasswordPolicy`
//! - `password`: CSPRNG-backed `generate`
//! - `strength`: heuristic `check_strength`

pub mod password;
pub mod policy;
pub mod strength;

pub use password::{generate, generate_with_rng};
pub use policy::{CharClass, PasswordPolicy};
pub use strength::{check_strength, StrengthLabel, StrengthScore, MAX_SCORE as MAX_STRENGTH_SCORE};
