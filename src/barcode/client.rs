//! # 远端客户端模块
//!
//! ## 设计思路
//!
//! 远端识别/生成两个操作收敛到 `BarcodeApi` trait 后面，编排层只依赖
//! trait，测试侧可注入假实现验证调度与结果折叠逻辑。
//!
//! ## 实现思路
//!
//! - `CloudClient` 基于 reqwest：先用 client-credentials 换取令牌（带过期
//!   缓存），再携带 Bearer 调用识别（multipart POST）与生成（GET）接口。
//! - 超时取配置快照（读超时固定 60 秒），不做传输层重试。
//! - 无 HTTP 状态码的传输失败统一映射为认证配置错误（“code 0”口径），
//!   有状态码的失败解析响应体后映射为远端接口错误。
//! - 日志不输出凭据与令牌。

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::config::ClientConfig;
use super::error::BarcodeError;
use super::types::{GenerateRequest, RecognizedBarcode};

/// 令牌过期前的提前刷新余量（秒）。
const TOKEN_EXPIRY_SLACK_SECS: u64 = 60;

/// 远端条码操作接口（识别 / 生成）。
///
/// 编排层唯一的出网依赖，测试通过假实现注入。
pub trait BarcodeApi: Send + Sync + 'static {
    /// 将 PNG 图片提交远端识别，返回识别记录列表（可能为空）。
    fn scan_png(
        &self,
        png_bytes: Vec<u8>,
        config: &ClientConfig,
    ) -> impl Future<Output = Result<Vec<RecognizedBarcode>, BarcodeError>> + Send;

    /// 请求远端按给定类型/文本/尺寸生成 PNG 条码图片。
    fn generate_png(
        &self,
        request: &GenerateRequest,
        config: &ClientConfig,
    ) -> impl Future<Output = Result<Vec<u8>, BarcodeError>> + Send;
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// 云端条码服务客户端。
pub struct CloudClient {
    token_cache: Mutex<Option<CachedToken>>,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(serde::Deserialize)]
struct ScanResponseBody {
    #[serde(default)]
    barcodes: Vec<RecognizedBarcode>,
}

#[derive(serde::Deserialize)]
struct RemoteErrorBody {
    error: Option<RemoteErrorDetail>,
}

#[derive(serde::Deserialize)]
struct RemoteErrorDetail {
    message: Option<String>,
    description: Option<String>,
}

impl CloudClient {
    pub fn new() -> Self {
        Self {
            token_cache: Mutex::new(None),
        }
    }

    fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, BarcodeError> {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .timeout(Duration::from_secs(config.read_timeout))
            .build()
            .map_err(|e| BarcodeError::AuthConfiguration(format!("HTTP client init failed: {e}")))
    }

    /// 传输层失败（无 HTTP 状态码）按认证配置错误处理。
    fn map_transport_error(err: reqwest::Error) -> BarcodeError {
        match err.status() {
            Some(status) => BarcodeError::RemoteApi {
                status: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
                details: err.to_string(),
            },
            None => BarcodeError::AuthConfiguration(err.to_string()),
        }
    }

    /// 将非 2xx 响应折叠为结构化远端错误。
    async fn remote_failure(response: reqwest::Response) -> BarcodeError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        let parsed = serde_json::from_str::<RemoteErrorBody>(&body)
            .ok()
            .and_then(|b| b.error);

        let message = parsed
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        let details = parsed
            .and_then(|e| e.description)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body
                }
            });

        BarcodeError::RemoteApi {
            status: status.as_u16(),
            message,
            details,
        }
    }

    fn cached_token(&self) -> Result<Option<String>, BarcodeError> {
        let guard = self
            .token_cache
            .lock()
            .map_err(|_| BarcodeError::ResourceLimit("令牌缓存锁已中毒".to_string()))?;

        Ok(guard.as_ref().and_then(|cached| {
            (cached.expires_at > Instant::now()).then(|| cached.access_token.clone())
        }))
    }

    fn store_token(&self, token: &str, expires_in: Option<u64>) -> Result<(), BarcodeError> {
        let lifetime = expires_in
            .unwrap_or(TOKEN_EXPIRY_SLACK_SECS)
            .saturating_sub(TOKEN_EXPIRY_SLACK_SECS)
            .max(1);

        let mut guard = self
            .token_cache
            .lock()
            .map_err(|_| BarcodeError::ResourceLimit("令牌缓存锁已中毒".to_string()))?;

        *guard = Some(CachedToken {
            access_token: token.to_string(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(())
    }

    /// 获取有效的 Bearer 令牌（命中缓存则跳过网络交换）。
    async fn bearer_token(&self, config: &ClientConfig) -> Result<String, BarcodeError> {
        if !config.is_configured() {
            return Err(BarcodeError::AuthConfiguration(
                "ClientId / ClientSecret is empty".to_string(),
            ));
        }

        if let Some(token) = self.cached_token()? {
            return Ok(token);
        }

        log::info!("🔑 交换访问令牌 - 端点: {}", config.token_url);

        let client = Self::build_http_client(config)?;
        let response = client
            .post(&config.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", config.client_id.as_str()),
                ("client_secret", config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            // 令牌端点拒绝即凭据问题，归入认证配置口径
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BarcodeError::AuthConfiguration(format!(
                "token endpoint returned HTTP {status}: {body}"
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BarcodeError::AuthConfiguration(format!("token response invalid: {e}")))?;

        self.store_token(&token.access_token, token.expires_in)?;
        Ok(token.access_token)
    }
}

impl Default for CloudClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BarcodeApi for CloudClient {
    async fn scan_png(
        &self,
        png_bytes: Vec<u8>,
        config: &ClientConfig,
    ) -> Result<Vec<RecognizedBarcode>, BarcodeError> {
        let token = self.bearer_token(config).await?;
        let client = Self::build_http_client(config)?;
        let url = format!("{}/barcode/scan/multipart", config.api_base_url);

        log::info!("📡 提交识别请求 - {} ({} bytes)", url, png_bytes.len());

        let part = reqwest::multipart::Part::bytes(png_bytes)
            .file_name("barcode.png")
            .mime_str("image/png")
            .map_err(|e| BarcodeError::Encode(format!("multipart 构建失败：{}", e)))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = client
            .post(url)
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::remote_failure(response).await);
        }

        let body: ScanResponseBody = response.json().await.map_err(|e| {
            BarcodeError::Decode(format!("识别响应解析失败：{}", e))
        })?;

        log::info!("✅ 识别完成 - {} 条记录", body.barcodes.len());
        Ok(body.barcodes)
    }

    async fn generate_png(
        &self,
        request: &GenerateRequest,
        config: &ClientConfig,
    ) -> Result<Vec<u8>, BarcodeError> {
        let token = self.bearer_token(config).await?;
        let client = Self::build_http_client(config)?;
        let url = format!(
            "{}/barcode/generate/{}",
            config.api_base_url,
            request.barcode_type.label()
        );

        log::info!(
            "📡 提交生成请求 - {} ({}x{})",
            url,
            request.width,
            request.height
        );

        let query = [
            ("data", request.text.clone()),
            ("imageFormat", "png".to_string()),
            ("imageWidth", request.width.to_string()),
            ("imageHeight", request.height.to_string()),
        ];

        let response = client
            .get(url)
            .bearer_auth(token)
            .query(&query)
            .send()
            .await
            .map_err(Self::map_transport_error)?;

        if !response.status().is_success() {
            return Err(Self::remote_failure(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(Self::map_transport_error)?;

        log::info!("✅ 生成完成 - {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
