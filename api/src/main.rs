// ============================================================================
// PERSONAL BLOG API
// ============================================================================

// - Markdown posts with YAML front-matter, indexed from disk
// - Tags, archive, RSS feed and pagination
// - JWT authentication with user/admin roles
// - Themes, categories and site settings for administrators

use blog_api::{AppState, config::Config, errors::expose_internal_errors, router};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    if let Err(e) = run().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    expose_internal_errors(config.is_development());

    let addr = config.bind_addr;
    let state = AppState::from_config(config).await?;
    let app = router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server running on http://{}", addr);
    info!("API Endpoints:");
    info!("  GET    /health                      - Health check");
    info!("  GET    /feed.xml                    - RSS feed");
    info!("  POST   /api/auth/register           - Create account");
    info!("  POST   /api/auth/login              - Login");
    info!("  POST   /api/auth/logout             - Logout");
    info!("  GET    /api/auth/me                 - Current user (auth)");
    info!("  GET    /api/auth/check              - Authentication status");
    info!("  GET    /api/posts                   - List posts (paginated, ?q=)");
    info!("  POST   /api/posts                   - Create post (auth)");
    info!("  GET    /api/posts/{{slug}}            - Get post");
    info!("  PUT    /api/posts/{{slug}}            - Update post (author or admin)");
    info!("  DELETE /api/posts/{{slug}}            - Delete post (author or admin)");
    info!("  GET    /api/tags                    - Tag counts");
    info!("  GET    /api/tags/{{tag}}              - Posts with a tag");
    info!("  GET    /api/archive                 - Posts by year");
    info!("  GET    /api/about                   - About page");
    info!("  GET    /api/stats                   - Site statistics");
    info!("  GET    /api/themes                  - List themes");
    info!("  GET    /api/themes/active           - Active theme");
    info!("  POST   /api/themes/activate         - Activate theme (admin)");
    info!("  *      /api/admin/...               - Users, categories, tags, settings (admin)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
