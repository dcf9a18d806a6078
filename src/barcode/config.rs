//! # 配置模块
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `ClientConfig`，保证运行时行为可观测、可调整、可测试。
//! 凭据（ClientId / ClientSecret）作为配置的一部分，由设置层在运行时注入，
//! 校验逻辑集中在 `apply_credentials` 调用链上。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的端点与超时组合（读超时固定 60 秒，对齐远端约定）。
//! - `is_configured` 识别“尚未填写凭据”的状态，提前失败避免无意义网络请求。
//! - 上传降采样边界（默认 384）与滤镜策略也收敛在这里。

use image::imageops::FilterType;

/// 上传降采样的默认边界（受约束轴的最大像素数）。
pub const DEFAULT_MAX_UPLOAD_DIMENSION: u32 = 384;

/// 云端条码服务客户端配置。
///
/// 字段覆盖了凭据、端点、超时与上传准备三个阶段。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 控制台申请的 Client Id。
    pub client_id: String,
    /// 控制台申请的 Client Secret。
    pub client_secret: String,
    /// OAuth2 client-credentials 令牌端点。
    pub token_url: String,
    /// 条码接口基础地址（含版本前缀）。
    pub api_base_url: String,
    /// 网络读超时时间（秒）。远端约定为 60 秒，不做用户级超时。
    pub read_timeout: u64,
    /// 建立连接（TCP/TLS）超时时间（秒）。
    pub connect_timeout: u64,
    /// 加载原始图片字节时允许的最大文件体积（字节）。
    pub max_file_size: u64,
    /// 上传前降采样边界（受约束轴单边最大值）。
    pub max_upload_dimension: u32,
    /// 降采样滤镜策略（双线性档）。
    pub resize_filter: FilterType,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: "https://id.aspose.cloud/connect/token".to_string(),
            api_base_url: "https://api.aspose-barcode.cloud/v4.0".to_string(),
            read_timeout: 60,
            connect_timeout: 8,
            max_file_size: 50 * 1024 * 1024,
            max_upload_dimension: DEFAULT_MAX_UPLOAD_DIMENSION,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl ClientConfig {
    /// 凭据是否已配置。
    ///
    /// 空字符串视为未配置；这类请求直接按认证配置错误处理，
    /// 与“传输层未建立连接”归入同一用户提示口径。
    pub fn is_configured(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    /// 注入运行时凭据（来自设置层）。
    pub fn apply_credentials(&mut self, client_id: &str, client_secret: &str) {
        self.client_id = client_id.trim().to_string();
        self.client_secret = client_secret.trim().to_string();
    }
}
