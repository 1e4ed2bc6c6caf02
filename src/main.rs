use anyhow::Result;
use qa_redactor::utils::logging;
use qa_redactor::{App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载 .env（可选）
    let _ = dotenvy::dotenv();

    // 加载配置，日志级别由配置决定（失败时用默认级别输出错误后退出）
    let config = match Config::from_env() {
        Ok(config) => {
            logging::init(config.verbose_logging);
            config
        }
        Err(e) => {
            logging::init(false);
            error!("❌ 配置错误: {}", e);
            return Err(e.into());
        }
    };

    // 初始化并运行应用
    App::initialize(config).run().await.map_err(|e| {
        error!("❌ 运行失败: {}", e);
        e
    })?;

    Ok(())
}
