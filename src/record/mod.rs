//! Plaintext records and their sealed form.
//!
//! A record is an explicit tagged structure, validated before it is
//! serialized and sealed.  Older clients wrote bare password JSON
//! (`{website, username, password, notes}`) without a `kind` tag;
//! `open_record` still reads those as password entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::crypto::{envelope, DerivedKey};
use crate::errors::{Result, VaultError};

/// Maximum length of any text field, in characters.
pub const MAX_FIELD_LEN: usize = 4096;

/// A stored website credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct PasswordEntry {
    pub website: String,
    #[serde(default)]
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A chat payload, sealed under the author's own vault key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

/// Everything a vault can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaintextRecord {
    Password(PasswordEntry),
    ChatMessage(ChatMessage),
}

/// What older clients left behind.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredShape {
    Tagged(PlaintextRecord),
    BarePassword(PasswordEntry),
}

impl PlaintextRecord {
    /// Short name of the record kind, for listings.
    pub fn kind(&self) -> &'static str {
        match self {
            PlaintextRecord::Password(_) => "password",
            PlaintextRecord::ChatMessage(_) => "chat_message",
        }
    }

    /// Check required fields and length caps.
    pub fn validate(&self) -> Result<()> {
        match self {
            PlaintextRecord::Password(entry) => {
                require("website", &entry.website)?;
                require("password", &entry.password)?;
                cap("website", &entry.website)?;
                cap("username", &entry.username)?;
                cap("password", &entry.password)?;
                if let Some(notes) = &entry.notes {
                    cap("notes", notes)?;
                }
            }
            PlaintextRecord::ChatMessage(msg) => {
                require("sender_id", &msg.sender_id)?;
                require("body", &msg.body)?;
                cap("sender_id", &msg.sender_id)?;
                cap("body", &msg.body)?;
            }
        }
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VaultError::InvalidRecord(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn cap(field: &str, value: &str) -> Result<()> {
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(VaultError::InvalidRecord(format!(
            "{field} cannot exceed {MAX_FIELD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate, serialize, and seal a record into a persisted blob.
pub fn seal_record(record: &PlaintextRecord, key: &DerivedKey) -> Result<String> {
    record.validate()?;

    let mut json = serde_json::to_vec(record)
        .map_err(|e| VaultError::SerializationError(format!("record: {e}")))?;
    let sealed = envelope::seal(&json, key);
    json.zeroize();

    sealed?.to_blob()
}

/// Open a persisted blob and parse it back into a record.
///
/// Plaintext that is not a recognisable record is the only sign of a
/// wrong key, so it is reported as `DecryptionFailed`.
pub fn open_record(blob: &str, key: &DerivedKey) -> Result<PlaintextRecord> {
    let mut text = envelope::open(blob, key)?;
    let parsed = serde_json::from_str::<StoredShape>(&text);
    text.zeroize();

    match parsed {
        Ok(StoredShape::Tagged(record)) => Ok(record),
        Ok(StoredShape::BarePassword(entry)) => Ok(PlaintextRecord::Password(entry)),
        Err(_) => Err(VaultError::decryption(
            "decrypted data is not a valid record (wrong key or corrupted data)",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    use crate::crypto::encryption::{self, ZERO_IV};

    fn key() -> DerivedKey {
        DerivedKey::from_bytes([0x5A; 32])
    }

    fn github() -> PlaintextRecord {
        PlaintextRecord::Password(PasswordEntry {
            website: "github.com".into(),
            username: "octocat".into(),
            password: "hunter2-but-longer".into(),
            notes: Some("work account".into()),
        })
    }

    #[test]
    fn seal_open_roundtrip() {
        let blob = seal_record(&github(), &key()).unwrap();
        assert_eq!(open_record(&blob, &key()).unwrap(), github());
    }

    #[test]
    fn chat_message_roundtrip() {
        let record = PlaintextRecord::ChatMessage(ChatMessage {
            sender_id: "user-1".into(),
            body: "see you at 6".into(),
            sent_at: Utc::now(),
        });
        let blob = seal_record(&record, &key()).unwrap();
        let opened = open_record(&blob, &key()).unwrap();
        assert_eq!(opened.kind(), "chat_message");
        assert_eq!(opened, record);
    }

    #[test]
    fn serialized_record_carries_kind_tag() {
        let json = serde_json::to_value(github()).unwrap();
        assert_eq!(json["kind"], "password");
        assert_eq!(json["website"], "github.com");
    }

    #[test]
    fn empty_website_is_rejected_before_sealing() {
        let record = PlaintextRecord::Password(PasswordEntry {
            website: "  ".into(),
            username: String::new(),
            password: "x".into(),
            notes: None,
        });
        assert!(matches!(
            seal_record(&record, &key()),
            Err(VaultError::InvalidRecord(_))
        ));
    }

    #[test]
    fn oversized_notes_are_rejected() {
        let record = PlaintextRecord::Password(PasswordEntry {
            website: "example.com".into(),
            username: String::new(),
            password: "pw".into(),
            notes: Some("n".repeat(MAX_FIELD_LEN + 1)),
        });
        assert!(record.validate().is_err());
    }

    #[test]
    fn untagged_legacy_password_json_is_read() {
        let legacy_json = br#"{"website":"mail.com","username":"me","password":"pw123456"}"#;
        let ct = encryption::encrypt(key().as_bytes(), &ZERO_IV, legacy_json).unwrap();
        let blob = BASE64.encode(ct);

        match open_record(&blob, &key()).unwrap() {
            PlaintextRecord::Password(entry) => {
                assert_eq!(entry.website, "mail.com");
                assert_eq!(entry.notes, None);
            }
            other => panic!("expected password entry, got {other:?}"),
        }
    }

    #[test]
    fn non_record_plaintext_is_decryption_failure() {
        let blob = envelope::seal_to_blob("just some text", &key()).unwrap();
        assert!(matches!(
            open_record(&blob, &key()),
            Err(VaultError::DecryptionFailed(_))
        ));
    }
}
