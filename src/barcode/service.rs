//! # 服务层（可注入状态）
//!
//! ## 设计思路
//!
//! 使用 `BarcodeServiceState` 作为 Tauri 注入状态，承载两类职责：
//! 1. 每个界面（scan / generate）的调度闸门：上一次操作仍在进行时，
//!    新调度立即以 Busy 结果拒绝，杜绝并发覆盖共享 UI 状态的竞态。
//! 2. 终态折叠：远端失败不以拒绝的 IPC Promise 透传，而是折叠进
//!    `OperationOutcome` 值，保证每次被接受的调度恰好产生一次终态交付。
//!
//! ## 实现思路
//!
//! - 闸门用 `AtomicBool` + RAII 守卫实现，任何退出路径（含 panic 展开）
//!   都会释放闸门。
//! - 状态事件通过调用侧传入的闭包发出（`dispatched` → 终态），忙碌动画
//!   的开启与清除由同一条事件流驱动；被拒绝的调度不曾开启动画，
//!   因此不发事件，只返回 Busy 结果。

use std::sync::atomic::{AtomicBool, Ordering};

use base64::{Engine as _, engine::general_purpose};

use super::client::{BarcodeApi, CloudClient};
use super::config::ClientConfig;
use super::error::BarcodeError;
use super::handler::{BarcodeHandler, ScanSuccess};
use super::source::ScanSource;
use super::types::{
    EncodeBarcodeType, GenerateOutcome, GenerateRequest, OperationStatusPayload, ScanOutcome,
};

/// 操作状态事件名（前端据此开启/清除忙碌动画）。
pub const BARCODE_OPERATION_STATUS_EVENT: &str = "barcode-operation-status";

/// 调度闸门的 RAII 守卫。
///
/// `try_acquire` 失败表示同界面已有操作在途；成功后闸门在守卫
/// 析构时释放，panic 展开同样生效。
struct DispatchGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> DispatchGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// 条码服务状态。
///
/// 作为 Tauri `State` 注入到命令层，内部持有 `BarcodeHandler`。
/// 默认使用 `CloudClient`；测试通过 `with_client` 注入假实现。
pub struct BarcodeServiceState<C: BarcodeApi = CloudClient> {
    handler: BarcodeHandler<C>,
    scan_in_flight: AtomicBool,
    generate_in_flight: AtomicBool,
}

impl BarcodeServiceState<CloudClient> {
    /// 使用默认配置创建服务状态。
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// 使用自定义配置创建服务状态。
    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_client(config, CloudClient::new())
    }
}

impl Default for BarcodeServiceState<CloudClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BarcodeApi> BarcodeServiceState<C> {
    /// 注入自定义远端客户端（测试入口）。
    pub fn with_client(config: ClientConfig, client: C) -> Self {
        Self {
            handler: BarcodeHandler::with_client(config, client),
            scan_in_flight: AtomicBool::new(false),
            generate_in_flight: AtomicBool::new(false),
        }
    }

    /// 注入运行时凭据。
    pub fn apply_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(), BarcodeError> {
        self.handler.apply_credentials(client_id, client_secret)
    }

    /// 当前凭据是否已配置。
    pub fn credentials_configured(&self) -> Result<bool, BarcodeError> {
        self.handler.credentials_configured()
    }

    /// 识别调度入口：闸门 → 识别链路 → 终态折叠。
    ///
    /// `emit_status` 在调度被接受时收到一次 `dispatched` 与一次终态，
    /// 其余情况不被调用。返回值是唯一的终态交付。
    pub async fn scan_with_status<F>(
        &self,
        request_id: &str,
        source: ScanSource,
        emit_status: F,
    ) -> ScanOutcome
    where
        F: Fn(OperationStatusPayload),
    {
        let Some(_guard) = DispatchGuard::try_acquire(&self.scan_in_flight) else {
            log::warn!("⚠️ 识别调度被拒绝（仍有识别操作在途）- request_id={}", request_id);
            let err = BarcodeError::Busy("scan is already in progress".to_string());
            return Self::scan_outcome_from_error(&err);
        };

        emit_status(Self::status_payload("scan", request_id, "dispatched", None, None));

        let outcome = match self.handler.scan(source).await {
            Ok(success) => Self::scan_outcome_from_success(success),
            Err(err) => {
                log::warn!("⚠️ 识别失败 [{}:{}] {}", err.stage(), err.code(), err);
                Self::scan_outcome_from_error(&err)
            }
        };

        emit_status(Self::status_payload(
            "scan",
            request_id,
            outcome.status,
            outcome.error_code,
            outcome.notice.clone(),
        ));

        outcome
    }

    /// 生成调度入口：参数解析 → 闸门 → 生成链路 → 终态折叠。
    pub async fn generate_with_status<F>(
        &self,
        request_id: &str,
        barcode_type: &str,
        text: String,
        width: u32,
        height: u32,
        emit_status: F,
    ) -> GenerateOutcome
    where
        F: Fn(OperationStatusPayload),
    {
        // 类型解析失败属于本地输入问题，不占用闸门也不发事件
        let barcode_type = match EncodeBarcodeType::parse(barcode_type) {
            Ok(parsed) => parsed,
            Err(err) => return Self::generate_outcome_from_error(&err),
        };

        let Some(_guard) = DispatchGuard::try_acquire(&self.generate_in_flight) else {
            log::warn!("⚠️ 生成调度被拒绝（仍有生成操作在途）- request_id={}", request_id);
            let err = BarcodeError::Busy("generate is already in progress".to_string());
            return Self::generate_outcome_from_error(&err);
        };

        emit_status(Self::status_payload("generate", request_id, "dispatched", None, None));

        let request = GenerateRequest {
            barcode_type,
            text,
            width,
            height,
        };

        let outcome = match self.handler.generate(request).await {
            Ok(generated) => GenerateOutcome {
                status: "succeeded",
                image_png_base64: Some(general_purpose::STANDARD.encode(&generated.png_bytes)),
                width: Some(generated.width),
                height: Some(generated.height),
                error_code: None,
                notice: None,
            },
            Err(err) => {
                log::warn!("⚠️ 生成失败 [{}:{}] {}", err.stage(), err.code(), err);
                Self::generate_outcome_from_error(&err)
            }
        };

        emit_status(Self::status_payload(
            "generate",
            request_id,
            outcome.status,
            outcome.error_code,
            outcome.notice.clone(),
        ));

        outcome
    }

    /// 将识别成功折叠为终态结果。
    ///
    /// 空记录不是失败：status 为 `empty`，提示用户且不改变类型选择。
    /// 首条记录的符号标签在本地枚举中查不到时，`selected_type` 保持
    /// `None`，前端据此不改动当前选择。
    fn scan_outcome_from_success(success: ScanSuccess) -> ScanOutcome {
        let preview = general_purpose::STANDARD.encode(&success.upload.png_bytes);

        if success.barcodes.is_empty() {
            return ScanOutcome {
                status: "empty",
                barcode_text: None,
                selected_type: None,
                barcodes: Vec::new(),
                preview_png_base64: Some(preview),
                error_code: None,
                notice: Some("No barcode detected".to_string()),
            };
        }

        let first = &success.barcodes[0];
        let selected_type = EncodeBarcodeType::from_label(&first.barcode_type).map(|t| t.label());

        ScanOutcome {
            status: "succeeded",
            barcode_text: Some(first.barcode_value.clone()),
            selected_type,
            barcodes: success.barcodes.clone(),
            preview_png_base64: Some(preview),
            error_code: None,
            notice: None,
        }
    }

    fn scan_outcome_from_error(err: &BarcodeError) -> ScanOutcome {
        ScanOutcome {
            status: "failed",
            barcode_text: None,
            selected_type: None,
            barcodes: Vec::new(),
            preview_png_base64: None,
            error_code: Some(err.code()),
            notice: Some(err.user_notice()),
        }
    }

    fn generate_outcome_from_error(err: &BarcodeError) -> GenerateOutcome {
        GenerateOutcome {
            status: "failed",
            image_png_base64: None,
            width: None,
            height: None,
            error_code: Some(err.code()),
            notice: Some(err.user_notice()),
        }
    }

    fn status_payload(
        surface: &'static str,
        request_id: &str,
        status: &'static str,
        error_code: Option<&'static str>,
        notice: Option<String>,
    ) -> OperationStatusPayload {
        OperationStatusPayload {
            surface,
            request_id: request_id.to_string(),
            status,
            error_code,
            notice,
        }
    }
}
