use thiserror::Error;

use crate::utils::AppError;

/// 服务器启动/运行期错误 (非 HTTP 响应错误)
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("startup failed: {0}")]
    Startup(#[from] AppError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Server 运行结果类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
