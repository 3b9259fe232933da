use anyhow::{Context, Result};
use teloxide::prelude::*;

use super::{ChatService, MediaSource};
use crate::models::{IncomingPhoto, PhotoVariant, Sender};

const FILE_API_BASE: &str = "https://api.telegram.org/file";

/// Telegram Bot API client: replies through teloxide, downloads files over plain HTTPS.
pub struct TelegramClient {
    bot: Bot,
    token: String,
    file_api_base: String,
    client: reqwest::Client,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self {
            bot: Bot::new(token.clone()),
            token,
            file_api_base: FILE_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    #[cfg(test)]
    fn with_file_api_base(mut self, file_api_base: &str) -> Self {
        self.file_api_base = file_api_base.to_string();
        self
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/bot{}/{}", self.file_api_base, self.token, file_path)
    }
}

#[async_trait::async_trait]
impl ChatService for TelegramClient {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .send()
            .await
            .with_context(|| format!("failed to send message to chat {}", chat_id))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MediaSource for TelegramClient {
    async fn fetch(&self, file_id: &str) -> Result<Vec<u8>> {
        let file = self
            .bot
            .get_file(file_id)
            .send()
            .await
            .context("failed to resolve Telegram file")?;
        log::debug!("📎 Resolved file {} -> {}", file_id, file.path);

        self.download(&file.path).await
    }
}

impl TelegramClient {
    /// The file URL embeds the bot token, so it is stripped from every error.
    async fn download(&self, file_path: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(self.file_url(file_path))
            .send()
            .await
            .map_err(|e| e.without_url())
            .context("failed to download Telegram file")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Failed to download image from Telegram: HTTP {}", status);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| e.without_url())
            .context("failed to read Telegram file")?;
        Ok(bytes.to_vec())
    }
}

/// Maps a Telegram update to the photo pipeline's input; `None` when no photo is attached.
pub fn incoming_photo(msg: &Message) -> Option<IncomingPhoto> {
    let sizes = msg.photo()?;
    if sizes.is_empty() {
        return None;
    }

    let variants = sizes
        .iter()
        .map(|size| PhotoVariant {
            file_id: size.file.id.clone(),
            file_unique_id: size.file.unique_id.clone(),
            width: size.width,
            height: size.height,
            file_size: size.file.size,
        })
        .collect();

    let sender = msg
        .from()
        .map(|user| Sender {
            username: user.username.clone(),
            first_name: Some(user.first_name.clone()),
        })
        .unwrap_or_default();

    Some(IncomingPhoto {
        chat_id: msg.chat.id.0,
        message_id: msg.id.0,
        variants,
        caption: msg.caption().map(str::to_string),
        sender,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: serde_json::Value) -> Message {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_file_url() {
        let client = TelegramClient::new("123:abc".to_string());
        assert_eq!(
            client.file_url("photos/file_7.jpg"),
            "https://api.telegram.org/file/bot123:abc/photos/file_7.jpg"
        );
    }

    #[tokio::test]
    async fn test_download_error_does_not_contain_token() {
        let client = TelegramClient::new("123:SECRETTOKEN".to_string())
            .with_file_api_base("http://127.0.0.1:1/file");

        let err = client.download("photos/x.jpg").await.unwrap_err();
        let message = format!("{:#}", err);

        assert!(message.starts_with("failed to download Telegram file"));
        assert!(!message.contains("SECRETTOKEN"));
    }

    #[test]
    fn test_incoming_photo_from_message() {
        let msg = message(serde_json::json!({
            "message_id": 12,
            "date": 1700000000,
            "chat": {"id": 42, "type": "private", "first_name": "Ana", "username": "chef"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ana", "username": "chef"},
            "photo": [
                {"file_id": "small", "file_unique_id": "us", "width": 90, "height": 60, "file_size": 1200},
                {"file_id": "big", "file_unique_id": "ub", "width": 1280, "height": 853, "file_size": 98000}
            ],
            "caption": "grilled chicken breast"
        }));

        let photo = incoming_photo(&msg).unwrap();
        assert_eq!(photo.chat_id, 42);
        assert_eq!(photo.message_id, 12);
        assert_eq!(photo.variants.len(), 2);
        assert_eq!(photo.caption.as_deref(), Some("grilled chicken breast"));
        assert_eq!(photo.sender.handle(), "chef");
        assert_eq!(photo.select_largest().unwrap().file_unique_id, "ub");
    }

    #[test]
    fn test_text_message_has_no_photo() {
        let msg = message(serde_json::json!({
            "message_id": 13,
            "date": 1700000000,
            "chat": {"id": 42, "type": "private", "first_name": "Ana"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ana"},
            "text": "hello"
        }));

        assert!(incoming_photo(&msg).is_none());
    }
}
