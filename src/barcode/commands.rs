//! # Tauri 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做 IPC 参数接收与结果返回，不承载业务逻辑。
//! 所有实际处理交由 `BarcodeServiceState`，保持命令函数薄、稳定、易测试。
//!
//! 异步命令的返回值就是“终态交付”：Tauri IPC 在 UI 上下文里恰好 resolve
//! 一次，远端失败已在服务层折叠进结果值，前端只需处理一种形状。

use tauri::{AppHandle, Emitter, State, Wry};

use super::service::{BARCODE_OPERATION_STATUS_EVENT, BarcodeServiceState};
use super::source::ScanSource;
use super::types::{EncodeBarcodeType, GenerateOutcome, ScanOutcome};
use crate::error::AppError;

/// 识别本地图片文件中的条码。
#[tauri::command]
pub async fn recognize_barcode_file(
    state: State<'_, BarcodeServiceState>,
    app: AppHandle<Wry>,
    path: String,
    request_id: String,
) -> Result<ScanOutcome, AppError> {
    let outcome = state
        .scan_with_status(&request_id, ScanSource::FilePath(path), |payload| {
            let _ = app.emit(BARCODE_OPERATION_STATUS_EVENT, payload);
        })
        .await;
    Ok(outcome)
}

/// 识别 Base64 图片（拍摄/粘贴场景）中的条码。
#[tauri::command]
pub async fn recognize_barcode_base64(
    state: State<'_, BarcodeServiceState>,
    app: AppHandle<Wry>,
    data: String,
    request_id: String,
) -> Result<ScanOutcome, AppError> {
    let outcome = state
        .scan_with_status(&request_id, ScanSource::Base64(data), |payload| {
            let _ = app.emit(BARCODE_OPERATION_STATUS_EVENT, payload);
        })
        .await;
    Ok(outcome)
}

/// 按类型/文本/目标尺寸生成条码图片。
#[tauri::command]
pub async fn generate_barcode(
    state: State<'_, BarcodeServiceState>,
    app: AppHandle<Wry>,
    barcode_type: String,
    text: String,
    width: u32,
    height: u32,
    request_id: String,
) -> Result<GenerateOutcome, AppError> {
    let outcome = state
        .generate_with_status(&request_id, &barcode_type, text, width, height, |payload| {
            let _ = app.emit(BARCODE_OPERATION_STATUS_EVENT, payload);
        })
        .await;
    Ok(outcome)
}

/// 全部条码类型标签（字典序，用于类型选择器）。
#[tauri::command]
pub fn list_barcode_types() -> Vec<&'static str> {
    EncodeBarcodeType::sorted_labels()
}

/// 默认预选的条码类型标签。
#[tauri::command]
pub fn default_barcode_type() -> &'static str {
    EncodeBarcodeType::default_label()
}
