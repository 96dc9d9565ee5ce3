//! Process-wide holder of the access token.
//!
//! A [`Session`] is an explicit context object: create it once with
//! [`Session::init`], clone it into the [`crate::ApiClient`] and whatever
//! else needs it, and call [`Session::teardown`] on logout. The token is
//! persisted through a [`TokenStore`] under the fixed key [`TOKEN_KEY`].

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use libris_model::EntityId;
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::error::SessionError;

/// Key the token is stored under.
pub const TOKEN_KEY: &str = "noltoken";

/// Persistence for exactly one token string.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&self, token: &str) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// Keeps the token in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.token.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, token: &str) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Stores the token in a small TOML file: `noltoken = "..."`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        let entries: BTreeMap<String, String> =
            toml::from_str(&contents).map_err(|e| SessionError::Format(e.to_string()))?;
        Ok(entries.get(TOKEN_KEY).filter(|t| !t.is_empty()).cloned())
    }

    /// Replace the file atomically.
    ///
    /// The token is written to a temporary file in the same directory, which
    /// is created owner-only (`0600` on unix), then renamed over the old file.
    fn save(&self, token: &str) -> Result<(), SessionError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let entries = BTreeMap::from([(TOKEN_KEY, token)]);
        let contents =
            toml::to_string(&entries).map_err(|e| SessionError::Format(e.to_string()))?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(contents.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Identity decoded from the token payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub id: EntityId,
    pub expiry: DateTime<Utc>,
    pub username: String,
}

impl TokenClaims {
    /// Decode the payload segment of a JWT without verifying it.
    #[must_use]
    pub fn decode(token: &str) -> Option<Self> {
        #[derive(Deserialize)]
        struct Raw {
            id: EntityId,
            exp: i64,
            #[serde(default)]
            username: String,
        }

        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let raw: Raw = serde_json::from_slice(&bytes).ok()?;
        Some(Self {
            id: raw.id,
            expiry: DateTime::from_timestamp(raw.exp, 0)?,
            username: raw.username,
        })
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }
}

#[derive(Default)]
struct TokenState {
    token: Option<String>,
    generation: u64,
}

struct Inner {
    store: Box<dyn TokenStore>,
    state: RwLock<TokenState>,
}

/// Shared access-token context.
///
/// Cloning is cheap; every clone sees the same token. Each write bumps a
/// generation counter, which lets the 401 handler clear only the token the
/// failed request was sent with.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.token().is_some())
            .field("generation", &self.generation())
            .finish()
    }
}

impl Session {
    /// An empty session over `store`. Nothing is read yet.
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                state: RwLock::new(TokenState::default()),
            }),
        }
    }

    /// An empty session that persists nothing.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryTokenStore::default())
    }

    /// Create a session and load the persisted token, if any.
    pub fn init(store: impl TokenStore + 'static) -> Result<Self, SessionError> {
        let session = Self::new(store);
        let persisted = session.inner.store.load()?;
        {
            let mut state = session.write();
            state.token = persisted;
            state.generation += 1;
        }
        tracing::debug!(restored = session.token().is_some(), "session initialised");
        Ok(session)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, TokenState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, TokenState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a new token in memory and in persistence.
    pub fn set_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        let mut state = self.write();
        self.inner.store.save(&token)?;
        state.token = Some(token);
        state.generation += 1;
        Ok(())
    }

    /// The current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    /// The current token together with the generation it belongs to.
    #[must_use]
    pub fn token_with_generation(&self) -> (Option<String>, u64) {
        let state = self.read();
        (state.token.clone(), state.generation)
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    /// Forget the token in memory and in persistence.
    pub fn delete_token(&self) -> Result<(), SessionError> {
        let mut state = self.write();
        self.inner.store.clear()?;
        state.token = None;
        state.generation += 1;
        Ok(())
    }

    /// Clear the token only if nobody replaced it since `generation`.
    ///
    /// Returns whether the token was cleared.
    pub fn expire(&self, generation: u64) -> Result<bool, SessionError> {
        let mut state = self.write();
        if state.generation != generation {
            return Ok(false);
        }
        self.inner.store.clear()?;
        state.token = None;
        state.generation += 1;
        Ok(true)
    }

    /// A token is present and, when it carries readable claims, not expired.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        match TokenClaims::decode(&token) {
            Some(claims) => !claims.is_expired_at(Utc::now()),
            None => !token.is_empty(),
        }
    }

    /// Claims of the current token, decoded locally.
    #[must_use]
    pub fn claims(&self) -> Option<TokenClaims> {
        self.token().as_deref().and_then(TokenClaims::decode)
    }

    /// Logout: clear memory and persistence.
    pub fn teardown(&self) -> Result<(), SessionError> {
        self.delete_token()?;
        tracing::debug!("session torn down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(id: i64, exp: i64, username: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD
            .encode(format!(r#"{{"id":{id},"exp":{exp},"username":"{username}"}}"#));
        format!("{header}.{payload}.signature")
    }

    #[test]
    fn claims_are_decoded_locally() {
        let token = jwt(42, 4_102_444_800, "reader");
        let claims = TokenClaims::decode(&token).expect("claims");
        assert_eq!(claims.id, 42);
        assert_eq!(claims.username, "reader");
        assert_eq!(claims.expiry.timestamp(), 4_102_444_800);
        assert!(TokenClaims::decode("not-a-jwt").is_none());
    }

    #[test]
    fn expired_token_is_not_logged_in() {
        let session = Session::in_memory();
        assert!(!session.is_logged_in());

        session.set_token(jwt(1, 1_000, "old")).expect("set");
        assert!(session.claims().is_some());
        assert!(!session.is_logged_in());

        session.set_token(jwt(1, 4_102_444_800, "new")).expect("set");
        assert!(session.is_logged_in());
    }

    #[test]
    fn opaque_token_counts_as_logged_in() {
        let session = Session::in_memory();
        session.set_token("opaque").expect("set");
        assert!(session.is_logged_in());
        assert!(session.claims().is_none());
    }

    #[test]
    fn expire_skips_replaced_tokens() {
        let session = Session::in_memory();
        session.set_token("first").expect("set");
        let (_, seen) = session.token_with_generation();

        session.set_token("second").expect("set");
        assert!(!session.expire(seen).expect("expire"));
        assert_eq!(session.token().as_deref(), Some("second"));

        let current = session.generation();
        assert!(session.expire(current).expect("expire"));
        assert!(session.token().is_none());
    }

    #[test]
    fn file_store_round_trips_and_clears() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("session.toml");
        let store = FileTokenStore::new(&path);
        assert_eq!(store.load().expect("load"), None);

        let session = Session::init(store.clone()).expect("init");
        session.set_token("abc").expect("set");
        let contents = fs::read_to_string(&path).expect("read");
        assert!(contents.contains(TOKEN_KEY));

        let restored = Session::init(FileTokenStore::new(&path)).expect("init");
        assert_eq!(restored.token().as_deref(), Some("abc"));

        restored.teardown().expect("teardown");
        assert!(!path.exists());
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn saving_replaces_the_file_in_one_step() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.toml");
        fs::write(&path, "noltoken = \"old\"\n").expect("write");

        let store = FileTokenStore::new(&path);
        store.save("new").expect("save");
        assert_eq!(store.load().expect("load").as_deref(), Some("new"));

        let names: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(names, ["session.toml"]);
    }

    #[cfg(unix)]
    #[test]
    fn saved_token_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.toml");
        fs::write(&path, "").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        FileTokenStore::new(&path).save("abc").expect("save");
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.toml");
        fs::write(&path, "noltoken = [").expect("write");
        assert!(matches!(
            FileTokenStore::new(&path).load(),
            Err(SessionError::Format(_))
        ));
    }
}
