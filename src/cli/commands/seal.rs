//! `securevault seal` / `securevault open`: encrypt or decrypt raw text
//! with the vault key.  Useful for scripting and for checking blobs
//! written by other clients.

use crate::cli::{arg_or_stdin, load_context, open_vault, Cli};
use crate::crypto::envelope;
use crate::errors::Result;

/// Execute the `seal` command.
pub fn execute_seal(cli: &Cli, text: Option<&str>) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let plaintext = arg_or_stdin(text)?;
    let store = open_vault(&dir)?;

    println!("{}", envelope::seal_to_blob(&plaintext, store.key())?);
    Ok(())
}

/// Execute the `open` command.
pub fn execute_open(cli: &Cli, blob: Option<&str>) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let blob = arg_or_stdin(blob)?;
    let store = open_vault(&dir)?;

    let plaintext = zeroize::Zeroizing::new(envelope::open(&blob, store.key())?);
    println!("{}", plaintext.as_str());
    Ok(())
}
