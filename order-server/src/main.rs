use order_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 环境与日志
    dotenv::dotenv().ok();
    let config = Config::from_env();
    init_logger(&config.log_level, config.log_dir.as_deref());

    tracing::info!("📦 Order server starting...");

    // 2. 初始化状态 (数据库、缓存、服务)
    let state = ServerState::initialize(&config).await?;

    // 3. 启动服务器 (Server::run 负责预热缓存并启动摄取循环)
    let server = Server::with_state(config, state);

    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
