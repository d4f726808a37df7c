//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::generator::{StrengthLabel, StrengthScore, MAX_STRENGTH_SCORE};
use crate::record::PasswordEntry;
use crate::vault::RecordSummary;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of record metadata (Id, Format, Created, Updated).
pub fn print_records_table(records: &[RecordSummary]) {
    if records.is_empty() {
        info("No records in this vault yet.");
        tip("Run `securevault add <WEBSITE>` to add your first password.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Format", "Created", "Updated"]);

    for r in records {
        table.add_row(vec![
            r.id.clone(),
            if r.legacy { "legacy" } else { "v2" }.to_string(),
            r.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            r.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a password entry as a two-column table.
pub fn print_password_entry(entry: &PasswordEntry, show_password: bool) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Website", entry.website.as_str()]);
    table.add_row(vec!["Username", entry.username.as_str()]);
    table.add_row(vec![
        "Password",
        if show_password {
            entry.password.as_str()
        } else {
            "(copied to clipboard)"
        },
    ]);
    if let Some(notes) = &entry.notes {
        table.add_row(vec!["Notes", notes.as_str()]);
    }
    println!("{table}");
}

/// Render a strength label in its traffic-light color.
pub fn styled_strength(score: &StrengthScore) -> String {
    let text = format!("{} ({}/{MAX_STRENGTH_SCORE})", score.label, score.score);
    match score.label {
        StrengthLabel::VeryWeak | StrengthLabel::Weak => style(text).red().to_string(),
        StrengthLabel::Medium => style(text).yellow().to_string(),
        StrengthLabel::Strong | StrengthLabel::VeryStrong => style(text).green().to_string(),
    }
}
