// ==========================================
// 公司运营分析系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和 API 实例
// 约束: 连接句柄在此装配并显式注入各组件，不使用全局连接
// ==========================================

use std::sync::{Arc, Mutex};

use crate::ai::{AnalysisGateway, GeminiClient, TextGenerator};
use crate::api::{
    AnalyticsApi, DepartmentApi, EmployeeApi, ExpenseApi, NumberPolicy, PerformanceApi,
};
use crate::config::AppConfig;
use crate::db::{database_file_exists, open_sqlite_connection};
use crate::engine::AnalyticsEngine;
use crate::repository::{
    DepartmentRepository, EmployeeRepository, ExpenseRepository, PerformanceRepository,
};
use crate::schema;

/// 应用状态
///
/// 包含所有 API 实例和共享资源，工具调度器据此分发调用
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 部门 API
    pub department_api: Arc<DepartmentApi>,

    /// 员工 API
    pub employee_api: Arc<EmployeeApi>,

    /// 费用 API
    pub expense_api: Arc<ExpenseApi>,

    /// 绩效 API
    pub performance_api: Arc<PerformanceApi>,

    /// 聚合报表 API
    pub analytics_api: Arc<AnalyticsApi>,

    /// AI 分析网关
    pub analysis_gateway: Arc<AnalysisGateway>,
}

impl AppState {
    /// 创建新的 AppState 实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开（必要时创建）数据库并统一 PRAGMA
    /// 2. 建表/索引，表为空时加载部门种子
    /// 3. 装配 Repository / Engine / API / 网关
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_path = config.db_path.clone();

        // 首次建库与打开既有库是两种用户可见状态，启动时点名区分
        if database_file_exists(&db_path) {
            tracing::info!("opening existing database: {}", db_path);
        } else {
            tracing::info!("database file not found, creating new database: {}", db_path);
        }

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| anyhow::anyhow!("cannot open database {}: {}", db_path, e))?;

        schema::init_database(&conn)?;

        let seeds = match &config.seed_path {
            Some(path) => schema::load_seed_file(path)?,
            None => schema::default_seeds(),
        };
        schema::seed_departments(&conn, &seeds)?;

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化 Repository 层
        // ==========================================
        let department_repo = Arc::new(DepartmentRepository::new(conn.clone()));
        let employee_repo = Arc::new(EmployeeRepository::new(conn.clone()));
        let expense_repo = Arc::new(ExpenseRepository::new(conn.clone()));
        let performance_repo = Arc::new(PerformanceRepository::new(conn.clone()));

        // ==========================================
        // 初始化 Engine 层
        // ==========================================
        let engine = Arc::new(AnalyticsEngine::new(conn.clone()));

        // ==========================================
        // 初始化 API 层
        // ==========================================
        let number_policy = if config.atomic_employee_numbers {
            NumberPolicy::Atomic
        } else {
            NumberPolicy::BestEffort
        };

        let department_api = Arc::new(DepartmentApi::new(
            department_repo.clone(),
            employee_repo.clone(),
            expense_repo.clone(),
        ));
        let employee_api = Arc::new(EmployeeApi::new(
            employee_repo.clone(),
            department_repo.clone(),
            number_policy,
        ));
        let expense_api = Arc::new(ExpenseApi::new(expense_repo, department_repo));
        let performance_api = Arc::new(PerformanceApi::new(performance_repo, employee_repo));
        let analytics_api = Arc::new(AnalyticsApi::new(engine.clone()));

        // AI 网关: 凭据缺失时装配为未配置网关（调用时报 ConfigurationError）
        let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
            Some(api_key) => {
                let client = GeminiClient::new(api_key.clone(), config.gemini_model.clone())?;
                Some(Arc::new(client))
            }
            None => {
                tracing::warn!("GEMINI_API_KEY not configured, AI analysis disabled");
                None
            }
        };
        let analysis_gateway = Arc::new(AnalysisGateway::new(engine, generator));

        tracing::info!("AppState initialized: db={}", db_path);

        Ok(Self {
            db_path,
            department_api,
            employee_api,
            expense_api,
            performance_api,
            analytics_api,
            analysis_gateway,
        })
    }
}
