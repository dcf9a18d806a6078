//! # 条码处理模块（barcode）
//!
//! ## 设计思路
//!
//! 该模块将“来源加载 → 降采样编码 → 远端识别/生成 → 终态交付 → Tauri 命令暴露”
//! 按职责拆分为多个子模块，避免单文件膨胀与耦合。
//!
//! - `commands`：仅做 IPC 入参/出参适配（薄封装）
//! - `service`：承载可注入状态与调度闸门（`BarcodeServiceState`）
//! - `handler`：编排识别/生成两条链路
//! - `pipeline`：负责来源加载、降采样计算（`fit_within`）、重采样与 PNG 编码
//! - `client`：`BarcodeApi` trait 与 reqwest 云端实现
//! - `config/error/types/source`：配置、错误、结果模型、中间数据模型
//!
//! ## 新同事快速上手
//!
//! 可以按下面顺序理解调用链：
//!
//! ```text
//! 前端 invoke
//!    ↓
//! commands.rs（参数适配 + 状态事件发射）
//!    ↓
//! service.rs（调度闸门、终态折叠，恰好一次交付）
//!    ↓
//! handler.rs（链路编排 + 阶段耗时日志）
//!    ├─ pipeline.rs（加载 + fit_within 降采样 + PNG 编码）
//!    └─ client.rs（令牌交换 + 识别/生成请求）
//!    ↓
//! OperationOutcome 返回前端（失败已折叠为值）
//! ```
//!
//! ## 分层职责建议
//!
//! - 调用入口变更（命令名/参数）优先改 `commands.rs`
//! - 端点与凭据策略变更优先改 `config.rs` 与 `settings`
//! - 调度/交付语义变更优先改 `service.rs`
//! - 单阶段行为优化分别改 `pipeline/client`

pub mod commands;
mod client;
mod config;
mod error;
mod handler;
mod pipeline;
mod service;
mod source;
mod types;

pub use client::{BarcodeApi, CloudClient};
pub use commands::{
    default_barcode_type,
    generate_barcode,
    list_barcode_types,
    recognize_barcode_base64,
    recognize_barcode_file,
};
pub use config::{ClientConfig, DEFAULT_MAX_UPLOAD_DIMENSION};
pub use error::BarcodeError;
pub use pipeline::fit_within;
pub use service::{BARCODE_OPERATION_STATUS_EVENT, BarcodeServiceState};
pub use source::ScanSource;
pub use types::{
    EncodeBarcodeType, GenerateOutcome, GenerateRequest, OperationStatusPayload,
    RecognizedBarcode, ScanOutcome,
};
