pub mod gemini; // Google Gemini calorie estimation
pub mod telegram; // Telegram Bot API transport

pub use gemini::GeminiService;
pub use telegram::TelegramClient;

use anyhow::Result;
use std::path::Path;

/// Outbound replies to the chat platform.
#[async_trait::async_trait]
pub trait ChatService: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;
}

/// Resolves a platform file id and downloads the file contents.
#[async_trait::async_trait]
pub trait MediaSource: Send + Sync {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>>;
}

/// Trait for AI services that turn a food photo into a plain-text estimate
#[async_trait::async_trait]
pub trait CalorieEstimator: Send + Sync {
    async fn estimate(&self, image_path: &Path, caption: &str) -> Result<String>;
}
