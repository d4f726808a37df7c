//! `securevault generate`: print a random password.

use crate::cli::output;
use crate::cli::{copy_to_clipboard, load_context, Cli};
use crate::config::Settings;
use crate::errors::Result;
use crate::generator::{self, CharClass, PasswordPolicy};

/// Execute the `generate` command.
///
/// Flags override the defaults from `.securevault.toml`.  No vault is
/// opened; only the project settings are read.
pub fn execute(
    cli: &Cli,
    length: Option<usize>,
    classes: &[CharClass],
    copy: bool,
) -> Result<()> {
    let (_, settings) = load_context(cli)?;
    let policy = build_policy(&settings, length, classes);

    let password = generator::generate(&policy)?;

    if copy {
        copy_to_clipboard(&password)?;
        let score = generator::check_strength(&password);
        output::success(&format!(
            "Password copied to clipboard ({})",
            output::styled_strength(&score)
        ));
    } else {
        println!("{}", password.as_str());
    }
    Ok(())
}

fn build_policy(
    settings: &Settings,
    length: Option<usize>,
    classes: &[CharClass],
) -> PasswordPolicy {
    let defaults = settings.password_policy();
    let length = length.unwrap_or(defaults.length());
    if classes.is_empty() {
        PasswordPolicy::new(length, defaults.classes().iter().copied())
    } else {
        PasswordPolicy::new(length, classes.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let policy = build_policy(&Settings::default(), Some(30), &[CharClass::Digits]);
        assert_eq!(policy.length(), 30);
        assert_eq!(policy.classes().len(), 1);
        assert!(policy.classes().contains(&CharClass::Digits));
    }

    #[test]
    fn settings_fill_in_missing_flags() {
        let policy = build_policy(&Settings::default(), None, &[]);
        assert_eq!(policy.length(), 16);
        assert_eq!(policy.classes().len(), 4);
    }
}
