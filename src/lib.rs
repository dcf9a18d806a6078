//! # 云端条码演示应用 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    前端 (WebView)                         │
//! │                                                          │
//! │  类型选择器 ── 文本框 ── 图片区 ── 凭据设置               │
//! │       ↕ invoke / listen（统一错误处理 + 类型安全）        │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ Tauri IPC (Result<T, AppError> / OperationOutcome)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            后端 (Rust)                           │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ barcode ──── 识别/生成编排                            │
//! │  │   ├─ service   调度闸门 + 恰好一次终态交付              │
//! │  │   ├─ pipeline  fit_within 降采样 + PNG 编码            │
//! │  │   └─ client    令牌交换 + 云端识别/生成请求             │
//! │  │                                                       │
//! │  └─ settings ─── 凭据持久化 (settings.json)               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有 Tauri command 的返回类型 |
//! | [`barcode`] | 上传降采样、远端识别/生成、调度闸门与终态折叠 |
//! | [`settings`] | 云端凭据的持久化与运行时注入 |

pub mod error;
pub mod barcode;
pub mod settings;
