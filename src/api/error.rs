// ==========================================
// 公司运营分析系统 - API层错误类型
// ==========================================
// 职责: 定义 API 层错误分类，转换仓储错误为用户可读的错误消息
// 约束: 任何底层存储错误不得原样穿透到工具面
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
///
/// 六类业务分类 + 两类兜底分类，工具面据此生成稳定的错误码。
#[derive(Error, Debug)]
pub enum ApiError {
    /// 引用的实体不存在
    #[error("{0}")]
    NotFound(String),

    /// 唯一性约束冲突（部门名/员工编号）
    #[error("{0}")]
    DuplicateKey(String),

    /// 输入越界（如评分超出 [1,5]、负薪资）
    #[error("{0}")]
    ValidationError(String),

    /// 删除被依赖记录阻止（未加 force）
    #[error("{message}")]
    Conflict {
        message: String,
        employees_count: i64,
        expenses_count: i64,
    },

    /// 外部服务凭据未配置
    #[error("{0}")]
    ConfigurationError(String),

    /// 外部服务调用失败
    #[error("{0}")]
    UpstreamError(String),

    // ===== 兜底分类 =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, key } => {
                ApiError::NotFound(format!("{} '{}' not found", entity, key))
            }
            RepositoryError::UniqueConstraintViolation(msg) => ApiError::DuplicateKey(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::ForeignKeyViolation(msg)
            | RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::Other(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
