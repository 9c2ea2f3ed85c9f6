//! 主应用程序入口
//!
//! 加载配置，连接数据库并启动 Axum Web API 服务。

use std::future::Future;

use config::AppConfig;
use infrastructure::{Infrastructure, InfrastructureConfig};
use tracing_subscriber::EnvFilter;
use web_api::{router, AppAdapters, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志，未设置 RUST_LOG 时默认 info
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    tracing::info!(config = ?config.sanitized(), "配置加载完成");

    let infrastructure = Infrastructure::connect(InfrastructureConfig::from(&config)).await?;
    let storage = &infrastructure.storage;
    let adapters = AppAdapters {
        user_repository: storage.user_repository.clone(),
        game_repository: storage.game_repository.clone(),
        catalog_repository: storage.catalog_repository.clone(),
        library_repository: storage.library_repository.clone(),
        review_repository: storage.review_repository.clone(),
        password_hasher: infrastructure.password_hasher_trait(),
        token_generator: infrastructure.token_generator_trait(),
        image_store: infrastructure.image_store_trait(),
    };
    let state = AppState::from_adapters(adapters).with_max_body_bytes(config.server.max_body_bytes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("游戏商城服务启动在 http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => tracing::info!("收到退出信号，开始优雅关闭"),
        Err(err) => {
            // 监听失败时保持运行，不能把错误当成退出信号
            tracing::error!(error = %err, "无法监听退出信号");
            std::future::pending::<()>().await;
        }
    }
}
