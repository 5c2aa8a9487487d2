use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

const SESSION_FILE: &str = "session.json";

/// Saved between runs so later commands reuse the sign-in
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFile {
    pub carrier: Option<String>,
    pub user_id: Option<String>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SessionFile {
    pub fn new(carrier: Option<String>, user_id: Option<String>) -> Self {
        Self {
            carrier,
            user_id,
            saved_at: Some(Utc::now()),
        }
    }
}

pub fn get_state_dir(config: &AppConfig) -> anyhow::Result<PathBuf> {
    let state_dir = config.state.resolve_dir()?;

    if !state_dir.exists() {
        fs::create_dir_all(&state_dir)?;
    }

    Ok(state_dir)
}

pub fn load_session_file(state_dir: &Path) -> anyhow::Result<SessionFile> {
    let session_file = state_dir.join(SESSION_FILE);

    if !session_file.exists() {
        return Ok(SessionFile::default());
    }

    let content = fs::read_to_string(session_file)?;
    let session: SessionFile = serde_json::from_str(&content)?;
    Ok(session)
}

pub fn save_session_file(state_dir: &Path, session: &SessionFile) -> anyhow::Result<()> {
    let session_file = state_dir.join(SESSION_FILE);

    let content = serde_json::to_string_pretty(session)?;
    fs::write(session_file, content)?;
    Ok(())
}

pub fn clear_session_file(state_dir: &Path) -> anyhow::Result<()> {
    let session_file = state_dir.join(SESSION_FILE);
    if session_file.exists() {
        fs::remove_file(session_file)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_session_file(dir.path()).unwrap(), SessionFile::default());

        let saved = SessionFile::new(Some("{\"a_session\":\"xyz\"}".into()), Some("u1".into()));
        save_session_file(dir.path(), &saved).unwrap();
        assert_eq!(load_session_file(dir.path()).unwrap(), saved);

        clear_session_file(dir.path()).unwrap();
        assert_eq!(load_session_file(dir.path()).unwrap().carrier, None);
        clear_session_file(dir.path()).unwrap();
    }

    #[test]
    fn state_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.state.dir = Some(dir.path().join("nested"));
        let resolved = get_state_dir(&config).unwrap();
        assert!(resolved.is_dir());
    }
}
