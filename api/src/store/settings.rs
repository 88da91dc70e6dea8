use std::{
    io,
    path::PathBuf,
    sync::Arc,
};

use crate::{errors::ApiError, models::SiteSettings};

/// Site settings persisted as one JSON document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Arc<PathBuf>,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
        }
    }

    /// A missing file yields the built-in defaults.
    pub async fn load(&self) -> Result<SiteSettings, ApiError> {
        match tokio::fs::read(self.path.as_path()).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ApiError::InternalError(format!(
                    "Malformed settings file {}: {}",
                    self.path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SiteSettings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the document. Writes go through a temp file and a rename.
    pub async fn save(&self, settings: &SiteSettings) -> Result<(), ApiError> {
        let json = serde_json::to_vec_pretty(settings)
            .map_err(|e| ApiError::InternalError(format!("Settings serialization failed: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        tokio::fs::write(&tmp, json).await?;
        if let Err(e) = tokio::fs::rename(&tmp, self.path.as_path()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        assert_eq!(store.load().await.unwrap(), SiteSettings::default());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("nested/settings.json"));

        let mut settings = SiteSettings::default();
        settings.site_title = "Changed".into();
        settings.features.rss_enabled = false;
        settings.social_links.github = "https://github.com/someone".into();
        store.save(&settings).await.unwrap();

        assert_eq!(store.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn partial_file_is_completed_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"site_title": "Mine", "features": {"rss_enabled": false}}"#)
            .unwrap();

        let settings = SettingsStore::new(&path).load().await.unwrap();
        assert_eq!(settings.site_title, "Mine");
        assert!(!settings.features.rss_enabled);
        assert!(settings.features.comments_enabled);
        assert_eq!(settings.site_author, SiteSettings::default().site_author);
    }
}
