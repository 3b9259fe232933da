mod config;
mod handlers;
mod models;
mod services;

#[cfg(feature = "health-server")]
mod health; // liveness endpoint for uptime monitors

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;

use config::Config;
use handlers::PhotoHandler;
use services::telegram::incoming_photo;
use services::{GeminiService, TelegramClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG from it applies
    dotenv().ok();
    env_logger::init();

    log::info!("🚀 Starting Food Calorie Bot...");

    let config = Config::from_env()?;
    log::info!("✅ Configuration loaded: {:?}", config);

    let telegram = Arc::new(TelegramClient::new(config.bot_token));
    let gemini = Arc::new(GeminiService::new(config.google_api_key, config.gemini_model));
    log::info!("✅ Gemini service initialized with model: {}", gemini.model());

    let photo_handler = Arc::new(PhotoHandler::new(
        telegram.clone(),
        telegram.clone(),
        gemini,
        config.temp_dir,
    ));
    log::info!("✅ Photo handler initialized");

    #[cfg(feature = "health-server")]
    {
        let port = config.port;
        tokio::spawn(async move {
            if let Err(e) = health::serve(port).await {
                log::error!("❌ Health server stopped: {:#}", e);
            }
        });
    }

    let bot = telegram.bot();
    let me = bot.get_me().send().await?;
    log::info!(
        "🎉 Bot is ready: @{}",
        me.user.username.as_deref().unwrap_or("unknown")
    );

    teloxide::repl(bot, move |msg: Message| {
        let photo_handler = photo_handler.clone();
        async move {
            // Non-photo messages get no reply
            if let Some(photo) = incoming_photo(&msg) {
                if let Err(e) = photo_handler.handle_photo(&photo).await {
                    log::error!("❌ Could not reply to chat {}: {:#}", msg.chat.id.0, e);
                }
            }
            respond(())
        }
    })
    .await;

    log::info!("🛑 Shutting down...");

    Ok(())
}
