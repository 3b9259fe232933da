use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::{IncomingPhoto, PhotoVariant};
use crate::services::{CalorieEstimator, ChatService, MediaSource};

pub const DEFAULT_CAPTION: &str = "No description provided";
pub const APOLOGY_MESSAGE: &str =
    "Sorry, something went wrong while processing your request. Please try again.";

pub fn format_reply(handle: &str, estimate: &str) -> String {
    format!("🍽️ Estimate for @{}:\n\n{}", handle, estimate)
}

pub struct PhotoHandler {
    chat: Arc<dyn ChatService>,
    media: Arc<dyn MediaSource>,
    estimator: Arc<dyn CalorieEstimator>,
    temp_dir: PathBuf,
}

impl PhotoHandler {
    pub fn new(
        chat: Arc<dyn ChatService>,
        media: Arc<dyn MediaSource>,
        estimator: Arc<dyn CalorieEstimator>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            chat,
            media,
            estimator,
            temp_dir,
        }
    }

    /// Runs one photo through fetch → estimate → reply. Any failure on the way
    /// is logged and answered with a single generic apology.
    pub async fn handle_photo(&self, photo: &IncomingPhoto) -> Result<()> {
        let Some(variant) = photo.select_largest() else {
            log::debug!(
                "Message {} in chat {} has no photo sizes, ignoring",
                photo.message_id,
                photo.chat_id
            );
            return Ok(());
        };

        log::info!(
            "📸 Photo from @{} in chat {} (message {}): {}x{} {}",
            photo.sender.handle(),
            photo.chat_id,
            photo.message_id,
            variant.width,
            variant.height,
            variant.file_unique_id
        );

        match self.process(photo, variant).await {
            Ok(()) => {
                log::info!("✅ Estimate sent to chat {}", photo.chat_id);
                Ok(())
            }
            Err(e) => {
                log::error!(
                    "❌ Photo message {} in chat {} from @{} failed: {:#}",
                    photo.message_id,
                    photo.chat_id,
                    photo.sender.handle(),
                    e
                );
                self.chat.send_message(photo.chat_id, APOLOGY_MESSAGE).await
            }
        }
    }

    async fn process(&self, photo: &IncomingPhoto, variant: &PhotoVariant) -> Result<()> {
        let bytes = self.media.fetch(&variant.file_id).await?;
        log::debug!("📥 Downloaded {} bytes", bytes.len());

        let caption = photo
            .caption
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CAPTION);

        let path = self.temp_path(photo, variant);
        let estimate = self.estimate_with_temp_file(&path, &bytes, caption).await?;

        let reply = format_reply(photo.sender.handle(), &estimate);
        self.chat.send_message(photo.chat_id, &reply).await
    }

    /// Writes the image to disk for the estimator and removes it again on every path.
    async fn estimate_with_temp_file(
        &self,
        path: &Path,
        bytes: &[u8],
        caption: &str,
    ) -> Result<String> {
        let result = match tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))
        {
            Ok(()) => self.estimator.estimate(path, caption).await,
            Err(e) => Err(e),
        };

        remove_temp_file(path).await;
        result
    }

    fn temp_path(&self, photo: &IncomingPhoto, variant: &PhotoVariant) -> PathBuf {
        // file_unique_id alone repeats for forwarded pictures
        self.temp_dir.join(format!(
            "temp_{}_{}_{}.jpg",
            photo.chat_id, photo.message_id, variant.file_unique_id
        ))
    }
}

async fn remove_temp_file(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => log::debug!("🗑️ Removed {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("⚠️ Could not remove temp file {}: {}", path.display(), e),
    }
}
