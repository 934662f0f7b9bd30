// ==========================================
// 公司运营分析系统 - 程序入口
// ==========================================
// 职责: 加载环境与命令行配置，初始化日志和应用状态，启动服务
// ==========================================

use clap::Parser;
use company_analytics::app::server::run_stdio_server;
use company_analytics::app::state::AppState;
use company_analytics::app::tools::tool_catalog;
use company_analytics::config::AppConfig;
use company_analytics::logging;
use std::path::PathBuf;

/// 公司部门/员工/支出/绩效跟踪服务
#[derive(Debug, Parser)]
#[command(name = "company-analytics", version, about)]
struct Cli {
    /// SQLite 数据库文件路径（默认取 COMPANY_DB_PATH 或平台数据目录）
    #[arg(long)]
    db: Option<String>,

    /// 部门种子文件路径（JSON 数组，仅在空库时生效）
    #[arg(long)]
    seed: Option<PathBuf>,

    /// 打印工具目录后退出
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 缺失不是错误
    dotenvy::dotenv().ok();
    logging::init();

    let cli = Cli::parse();

    if cli.list_tools {
        println!("{}", serde_json::to_string_pretty(&tool_catalog())?);
        return Ok(());
    }

    let mut config = AppConfig::from_env();
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(seed) = cli.seed {
        config.seed_path = Some(seed);
    }

    tracing::info!(
        "starting company-analytics v{} (db: {})",
        company_analytics::VERSION,
        config.db_path
    );

    let state = AppState::new(&config)?;
    run_stdio_server(state).await
}
