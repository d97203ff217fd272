//! Persisted admin session
//!
//! The session lives in a small JSON document on disk, under one named key,
//! next to whatever other keys share the document. Only administrator sessions
//! are ever restored.

use crate::{config::SessionConfig, types::User, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Logged-in administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Backend bearer token
    pub token: String,
    /// Account the token belongs to
    pub user: User,
    /// Token the console hands to the browser at login; requests must present it
    #[serde(default, rename = "consoleToken", skip_serializing_if = "Option::is_none")]
    pub console_token: Option<String>,
}

impl Session {
    /// Whether the session may use the console
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }

    /// Whether `presented` is this session's console token
    ///
    /// A session without a console token accepts nothing.
    #[must_use]
    pub fn accepts(&self, presented: &str) -> bool {
        self.is_admin()
            && self
                .console_token
                .as_deref()
                .is_some_and(|token| !token.is_empty() && token == presented)
    }
}

/// File-backed session storage with explicit load, save and clear
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    key: String,
}

impl SessionStore {
    /// Store at `path` using `key`
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    /// Store described by the session configuration section
    #[must_use]
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.storage_path.clone(), config.storage_key.clone())
    }

    /// Backing document path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the persisted session
    ///
    /// A stored entry that does not decode, or that belongs to a non-admin
    /// account, is removed and `None` is returned.
    ///
    /// # Errors
    ///
    /// Returns an error when the document exists but cannot be read or
    /// rewritten.
    pub fn load(&self) -> Result<Option<Session>> {
        let mut document = self.read_document()?;
        let Some(entry) = document.get(&self.key).cloned() else {
            return Ok(None);
        };

        match serde_json::from_value::<Session>(entry) {
            Ok(session) if session.is_admin() => {
                debug!(user = %session.user.email, "Restored admin session");
                Ok(Some(session))
            }
            Ok(session) => {
                warn!(
                    user = %session.user.email,
                    role = %session.user.role,
                    "Discarding persisted session for non-admin account"
                );
                document.remove(&self.key);
                self.write_document(&document)?;
                Ok(None)
            }
            Err(err) => {
                warn!(error = %err, "Discarding unreadable persisted session");
                document.remove(&self.key);
                self.write_document(&document)?;
                Ok(None)
            }
        }
    }

    /// Persist `session` under the store key
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn save(&self, session: &Session) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(self.key.clone(), serde_json::to_value(session)?);
        self.write_document(&document)?;
        info!(user = %session.user.email, "Session saved");
        Ok(())
    }

    /// Forget the persisted session; other keys are left alone
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn clear(&self) -> Result<()> {
        let mut document = self.read_document()?;
        if document.remove(&self.key).is_some() {
            self.write_document(&document)?;
            info!("Session cleared");
        }
        Ok(())
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Session document is not a JSON object, starting fresh");
                Ok(Map::new())
            }
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn session(role: Role) -> Session {
        Session {
            token: "tok-123".to_string(),
            user: User {
                id: "u1".to_string(),
                name: "Ada".to_string(),
                email: "ada@ecofind.test".to_string(),
                role,
                address: String::new(),
                country_code: None,
                phone_number: None,
                is_email_verified: true,
                is_document_verified: true,
                created_at: Utc::now(),
                business_desc: None,
                business_type: None,
                verification_doc_url: None,
            },
            console_token: Some("console-abc".to_string()),
        }
    }

    fn store(dir: &TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("nested").join("session.json"), "auth")
    }

    #[test]
    fn test_missing_document_loads_nothing() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load_admin() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let admin = session(Role::Admin);

        store.save(&admin).unwrap();

        assert_eq!(store.load().unwrap(), Some(admin));
    }

    #[test]
    fn test_non_admin_is_discarded_on_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.save(&session(Role::Seller)).unwrap();

        assert_eq!(store.load().unwrap(), None);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("tok-123"));
    }

    #[test]
    fn test_clear_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"theme": "dark"}"#).unwrap();

        store.save(&session(Role::Admin)).unwrap();
        store.clear().unwrap();

        let document: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(document["theme"], "dark");
        assert!(document.get("auth").is_none());
    }

    #[test]
    fn test_console_token_must_match() {
        let admin = session(Role::Admin);
        assert!(admin.accepts("console-abc"));
        assert!(!admin.accepts("tok-123"));
        assert!(!admin.accepts(""));

        let legacy = Session {
            console_token: None,
            ..admin
        };
        assert!(!legacy.accepts(""));
        assert!(!session(Role::Seller).accepts("console-abc"));
    }

    #[test]
    fn test_entry_without_console_token_still_decodes() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let mut entry = serde_json::to_value(session(Role::Admin)).unwrap();
        entry.as_object_mut().unwrap().remove("consoleToken");
        store.save(&serde_json::from_value(entry).unwrap()).unwrap();

        let restored = store.load().unwrap().unwrap();
        assert_eq!(restored.console_token, None);
    }

    #[test]
    fn test_garbage_entry_is_discarded() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{"auth": {"token": 7}}"#).unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(fs::read_to_string(store.path()).unwrap().trim(), "{}");
    }
}
