use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 托管后端地址（如 https://xxx.supabase.co）
    pub backend_url: String,
    /// 后端匿名 API Key，每个请求都会携带
    pub anon_key: String,
    /// 已有的会话 token（优先于账号密码登录）
    pub access_token: Option<String>,
    // --- 管理员账号（没有 token 时用于登录） ---
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// 批次 TOML 文件存放目录
    pub batch_folder: String,
    /// PDF 输出目录
    pub pdf_output_dir: String,
    /// 面单生成失败记录文件
    pub failed_labels_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// "全选未发货"时一页订单数
    pub order_page_size: usize,
    /// HTTP 超时（秒），None 表示不设超时
    pub http_timeout_secs: Option<u64>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: String::new(),
            anon_key: String::new(),
            access_token: None,
            admin_email: None,
            admin_password: None,
            batch_folder: "batches".to_string(),
            pdf_output_dir: "labels".to_string(),
            failed_labels_file: "failed_labels.txt".to_string(),
            output_log_file: "output.txt".to_string(),
            order_page_size: 20,
            http_timeout_secs: None,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            backend_url: std::env::var("SUPABASE_URL").unwrap_or(default.backend_url),
            anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or(default.anon_key),
            access_token: non_empty_var("SUPABASE_ACCESS_TOKEN").or(default.access_token),
            admin_email: non_empty_var("ADMIN_EMAIL").or(default.admin_email),
            admin_password: non_empty_var("ADMIN_PASSWORD").or(default.admin_password),
            batch_folder: std::env::var("BATCH_FOLDER").unwrap_or(default.batch_folder),
            pdf_output_dir: std::env::var("PDF_OUTPUT_DIR").unwrap_or(default.pdf_output_dir),
            failed_labels_file: std::env::var("FAILED_LABELS_FILE").unwrap_or(default.failed_labels_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            order_page_size: std::env::var("ORDER_PAGE_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.order_page_size),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).or(default.http_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 检查必填项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "SUPABASE_URL".to_string(),
            });
        }
        if self.anon_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                var_name: "SUPABASE_ANON_KEY".to_string(),
            });
        }
        if self.order_page_size == 0 {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "ORDER_PAGE_SIZE".to_string(),
                value: "0".to_string(),
                expected_type: "正整数".to_string(),
            });
        }
        Ok(())
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
