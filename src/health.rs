use axum::{routing::get, Router};

pub const RUNNING_MESSAGE: &str = "Bot is running!";

/// Liveness routes for uptime monitors. Shares nothing with the bot.
pub fn create_health_router() -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    RUNNING_MESSAGE
}

/// Binds `0.0.0.0:<port>` and serves until the process exits.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🌐 Health server listening on {}", addr);
    axum::serve(listener, create_health_router()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_path(path: &str) -> (StatusCode, String) {
        let response = create_health_router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_root_and_health_report_running() {
        for path in ["/", "/health"] {
            let (status, body) = get_path(path).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, "Bot is running!");
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (status, _) = get_path("/webhook").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
