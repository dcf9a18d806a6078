//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载条码链路中的所有错误来源，避免字符串拼接式错误处理。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 面向用户的提示文案与内部错误分开：`user_notice()` 产出最终展示给用户的
//! 英文提示（与云端 API 文档口径一致），`Display` 产出日志用描述。

/// 条码处理统一错误类型。
///
/// 该类型会在命令层被折叠进操作结果（`OperationOutcome`），不会以
/// 拒绝的 IPC Promise 形式透传给前端。
#[derive(Debug, thiserror::Error)]
pub enum BarcodeError {
    /// 传输层未建立连接（无 HTTP 状态码）或凭据缺失。
    #[error("认证配置错误：{0}")]
    AuthConfiguration(String),

    /// 远端返回了结构化失败（状态码 + 详情）。
    #[error("远端接口错误（HTTP {status}）：{message}: {details}")]
    RemoteApi {
        status: u16,
        message: String,
        details: String,
    },

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 同一界面的上一次操作仍在进行中，本次调度被拒绝。
    #[error("操作进行中：{0}")]
    Busy(String),
}

impl BarcodeError {
    /// 稳定错误码，供前端按类别处理。
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthConfiguration(_) => "E_AUTH_CONFIG",
            Self::RemoteApi { .. } => "E_REMOTE_API",
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::FileSystem(_) => "E_FILESYSTEM",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::Busy(_) => "E_BUSY",
        }
    }

    /// 错误发生阶段，用于日志与诊断。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::AuthConfiguration(_) => "auth",
            Self::RemoteApi { .. } => "remote",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::FileSystem(_) => "load",
            Self::InvalidFormat(_) => "validate",
            Self::ResourceLimit(_) => "validate",
            Self::Busy(_) => "dispatch",
        }
    }

    /// 最终展示给用户的提示文案。
    ///
    /// 三类口径：
    /// - 认证配置类带修复提示前缀
    /// - 远端结构化失败按 `message: details` 原样拼接
    /// - 其余一律 `Exception: <message>`
    pub fn user_notice(&self) -> String {
        match self {
            Self::AuthConfiguration(message) => {
                format!("Check ClientId and ClientSecret in ApiClient {message}")
            }
            Self::RemoteApi {
                message, details, ..
            } => format!("{message}: {details}"),
            Self::Decode(message)
            | Self::Encode(message)
            | Self::FileSystem(message)
            | Self::InvalidFormat(message)
            | Self::ResourceLimit(message)
            | Self::Busy(message) => format!("Exception: {message}"),
        }
    }
}

impl From<BarcodeError> for String {
    /// 兼容部分仍使用字符串错误的调用点。
    fn from(error: BarcodeError) -> Self {
        error.to_string()
    }
}
