use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 操作前校验失败（未发起任何网络请求）
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// API 调用错误
    #[error("{0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 流程状态错误
    #[error("流程错误: {0}")]
    Flow(#[from] FlowError),
}

/// 提交前的校验错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 没有选择任何订单
    #[error("请至少选择一个订单")]
    EmptySelection,
    /// 没有选择包装
    #[error("请选择一个包装")]
    MissingPackage,
    /// 所选包装不存在或已停用
    #[error("包装 #{package_id} 不存在或已停用")]
    InactivePackage { package_id: i64 },
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("连接错误 ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 服务端返回非 2xx 响应
    #[error("{message} (HTTP {status})")]
    Server {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// 响应体无法解析
    #[error("响应解析失败 ({endpoint}): {message}")]
    Decode { endpoint: String, message: String },
    /// 整批标签全部创建失败
    #[error("{0}")]
    EmptyBatch(String),
}

impl ApiError {
    /// 创建网络请求失败错误
    pub fn transport(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        ApiError::Transport {
            endpoint: endpoint.into(),
            source,
        }
    }

    /// 创建响应解析错误
    pub fn decode(endpoint: impl Into<String>, message: impl std::fmt::Display) -> Self {
        ApiError::Decode {
            endpoint: endpoint.into(),
            message: message.to_string(),
        }
    }

    /// HTTP 状态码（仅服务端错误有）
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 目录不存在
    #[error("目录不存在: {path}")]
    DirectoryNotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 必填配置缺失
    #[error("缺少必填配置 {var_name}")]
    Missing { var_name: String },
}

/// 流程状态错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// 上一次操作仍在进行中
    #[error("正在处理上一批次，请稍候")]
    Busy,
    /// 当前状态下不允许该操作
    #[error("状态 {from} 不允许事件 {event}")]
    InvalidTransition { from: String, event: String },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
