//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `BarcodeHandler` 只负责流程编排与配置管理，不直接与 Tauri 绑定。
//! 识别链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节
//! 3. 降采样并编码 PNG
//! 4. 提交远端识别
//!
//! 生成链路为：参数校验 → 提交远端生成 → 校验返回图片可解码。
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<ClientConfig>>` 支持运行时注入凭据。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `load/prepare/remote/total` 阶段耗时，便于性能诊断。
//! - 对远端客户端只依赖 `BarcodeApi` trait，测试可注入假实现。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use image::GenericImageView;

use super::client::BarcodeApi;
use super::config::ClientConfig;
use super::error::BarcodeError;
use super::pipeline;
use super::source::{PreparedUploadImage, ScanSource};
use super::types::{GenerateRequest, RecognizedBarcode};

/// 识别链路的成功产物：识别记录与实际上传的降采样载荷。
pub(super) struct ScanSuccess {
    pub(super) barcodes: Vec<RecognizedBarcode>,
    pub(super) upload: PreparedUploadImage,
}

/// 生成链路的成功产物：已校验可解码的 PNG 与其实际尺寸。
pub(super) struct GeneratedImage {
    pub(super) png_bytes: Vec<u8>,
    pub(super) width: u32,
    pub(super) height: u32,
}

/// 条码编排器。
///
/// 封装配置状态与远端客户端，编排各子模块实现完整流程。
pub struct BarcodeHandler<C> {
    pub(super) config: Arc<RwLock<ClientConfig>>,
    pub(super) client: C,
}

impl<C: BarcodeApi> BarcodeHandler<C> {
    /// 根据初始配置与远端客户端创建编排器。
    pub fn with_client(config: ClientConfig, client: C) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            client,
        }
    }

    /// 获取配置快照。
    ///
    /// 作用：保证单次请求链路使用一致参数。
    pub(super) fn config_snapshot(&self) -> Result<ClientConfig, BarcodeError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| BarcodeError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 注入运行时凭据（来自设置层）。
    pub fn apply_credentials(&self, client_id: &str, client_secret: &str) -> Result<(), BarcodeError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| BarcodeError::ResourceLimit("配置写入锁已中毒".to_string()))?;

        config.apply_credentials(client_id, client_secret);

        log::info!("⚙️ 已更新云端凭据（configured={}）", config.is_configured());
        Ok(())
    }

    /// 当前凭据是否已配置。
    pub fn credentials_configured(&self) -> Result<bool, BarcodeError> {
        Ok(self.config_snapshot()?.is_configured())
    }

    /// 识别主入口：加载 → 降采样 → 上传识别。
    pub(super) async fn scan(&self, source: ScanSource) -> Result<ScanSuccess, BarcodeError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = pipeline::load_scan_source(source, &config)?;
        let load_elapsed = load_start.elapsed();

        let prepare_start = Instant::now();
        let upload = pipeline::decode_and_prepare_upload(raw, &config)?;
        let prepare_elapsed = prepare_start.elapsed();

        let remote_start = Instant::now();
        let barcodes = self
            .client
            .scan_png(upload.png_bytes.clone(), &config)
            .await?;
        let remote_elapsed = remote_start.elapsed();

        log::info!(
            "✅ 识别链路完成 - load={}ms prepare={}ms remote={}ms total={}ms records={}",
            load_elapsed.as_millis(),
            prepare_elapsed.as_millis(),
            remote_elapsed.as_millis(),
            total_start.elapsed().as_millis(),
            barcodes.len()
        );

        Ok(ScanSuccess { barcodes, upload })
    }

    /// 生成主入口：提交远端生成并校验返回图片。
    pub(super) async fn generate(
        &self,
        request: GenerateRequest,
    ) -> Result<GeneratedImage, BarcodeError> {
        if request.width == 0 || request.height == 0 {
            return Err(BarcodeError::InvalidFormat(
                "生成目标尺寸必须为正".to_string(),
            ));
        }

        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let bytes = self.client.generate_png(&request, &config).await?;

        // 返回字节必须是可解码图片，坏载荷在这里拦截而不是交给前端
        let decoded = image::load_from_memory(&bytes)
            .map_err(|e| BarcodeError::Decode(format!("生成图片解码失败：{}", e)))?;
        let (width, height) = decoded.dimensions();

        log::info!(
            "✅ 生成链路完成 - type={} {}x{} total={}ms",
            request.barcode_type.label(),
            width,
            height,
            total_start.elapsed().as_millis()
        );

        Ok(GeneratedImage {
            png_bytes: bytes,
            width,
            height,
        })
    }
}
