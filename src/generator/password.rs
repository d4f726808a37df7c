//! Random password generation.
//!
//! Characters are drawn one random byte at a time from a cryptographic
//! RNG.  A byte at or above the largest multiple of the pool size is
//! rejected and redrawn, so `byte % pool_len` stays uniform.
//!
//! After sampling, any selected class that did not come up is forced in
//! by overwriting a position whose class appears more than once.  That
//! costs a little entropy compared with pure sampling.

use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::policy::{CharClass, PasswordPolicy};
use crate::errors::Result;

/// Generate a password satisfying `policy` from the thread-local CSPRNG.
pub fn generate(policy: &PasswordPolicy) -> Result<Zeroizing<String>> {
    generate_with_rng(policy, &mut rand::rng())
}

/// Generate a password from an explicit cryptographic RNG.
pub fn generate_with_rng<R: CryptoRng + ?Sized>(
    policy: &PasswordPolicy,
    rng: &mut R,
) -> Result<Zeroizing<String>> {
    policy.validate()?;

    let pool = policy.pool();
    let mut chars: Vec<char> = (0..policy.length())
        .map(|_| pool[random_index(rng, pool.len())])
        .collect();

    ensure_class_coverage(&mut chars, policy, rng);

    let password = Zeroizing::new(chars.iter().collect::<String>());
    chars.fill('\0');
    Ok(password)
}

/// Overwrite positions until every selected class is present.
///
/// Only positions whose class occurs at least twice are eligible, so a
/// repair can never remove the last representative of another class.
/// `validate` guarantees `length >= classes`, which keeps the eligible
/// set non-empty whenever a class is missing.
fn ensure_class_coverage<R: CryptoRng + ?Sized>(
    chars: &mut [char],
    policy: &PasswordPolicy,
    rng: &mut R,
) {
    for &class in policy.classes() {
        if chars.iter().any(|&c| class.contains(c)) {
            continue;
        }

        let eligible: Vec<usize> = (0..chars.len())
            .filter(|&i| {
                CharClass::of(chars[i]).is_some_and(|owner| {
                    chars.iter().filter(|&&c| owner.contains(c)).count() > 1
                })
            })
            .collect();
        if eligible.is_empty() {
            continue;
        }

        let position = eligible[random_index(rng, eligible.len())];
        let charset: Vec<char> = class.charset().chars().collect();
        chars[position] = charset[random_index(rng, charset.len())];
    }
}

/// Uniform index in `0..len` from single random bytes.
///
/// Pools here never exceed 256 entries.  Larger ranges take a 64-bit
/// draw instead, where the modulo bias is negligible.
fn random_index<R: CryptoRng + ?Sized>(rng: &mut R, len: usize) -> usize {
    debug_assert!(len > 0);
    if len > 256 {
        return (rng.next_u64() % len as u64) as usize;
    }

    let limit = 256 - (256 % len);
    loop {
        let mut byte = [0u8; 1];
        rng.fill_bytes(&mut byte);
        let value = usize::from(byte[0]);
        if value < limit {
            return value % len;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_index_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [1usize, 3, 10, 26, 88, 255, 256] {
            for _ in 0..200 {
                assert!(random_index(&mut rng, len) < len);
            }
        }
    }

    #[test]
    fn random_index_is_roughly_uniform() {
        // 88 does not divide 256; without rejection the first 80 indices
        // would be hit 3/2 times as often as the rest.
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0u32; 88];
        for _ in 0..88_000 {
            counts[random_index(&mut rng, 88)] += 1;
        }
        let low: u32 = counts[..80].iter().sum::<u32>() / 80;
        let high: u32 = counts[80..].iter().sum::<u32>() / 8;
        assert!((low as i64 - high as i64).abs() < 150, "low={low} high={high}");
    }

    #[test]
    fn repair_inserts_missing_class_without_removing_others() {
        let policy = PasswordPolicy::new(4, [CharClass::Lowercase, CharClass::Digits]);
        let mut chars: Vec<char> = "abcd".chars().collect();
        let mut rng = StdRng::seed_from_u64(1);

        ensure_class_coverage(&mut chars, &policy, &mut rng);

        assert!(chars.iter().any(|c| c.is_ascii_digit()));
        assert!(chars.iter().any(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn repair_fills_tight_policy() {
        // Four slots, four classes, sampled entirely from one class.
        let policy = PasswordPolicy::with_all_classes(4);
        let mut chars: Vec<char> = "zzzz".chars().collect();
        let mut rng = StdRng::seed_from_u64(9);

        ensure_class_coverage(&mut chars, &policy, &mut rng);

        for class in CharClass::ALL {
            assert!(chars.iter().any(|&c| class.contains(c)), "missing {class}");
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let policy = PasswordPolicy::default();
        let a = generate_with_rng(&policy, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = generate_with_rng(&policy, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(*a, *b);
    }
}
