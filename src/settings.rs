//! 凭据设置模块
//!
//! 将云端 ClientId / ClientSecret 持久化到应用数据目录的 `settings.json`，
//! `set_app_settings` 在落盘前先应用到运行中的服务，保证设置页保存后
//! 立即生效。凭据不写入日志。

use std::fs;
use std::path::PathBuf;

use tauri::{AppHandle, Manager, State};

use crate::barcode::BarcodeServiceState;
use crate::error::AppError;

/// 持久化的应用设置（当前仅云端凭据）。
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AppSettings {
    pub client_id: String,
    pub client_secret: String,
}

fn settings_file_path(app: &AppHandle) -> Result<PathBuf, AppError> {
    let app_data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| AppError::Storage(format!("获取应用数据目录失败: {}", e)))?;

    fs::create_dir_all(&app_data_dir)
        .map_err(|e| AppError::Storage(format!("创建应用数据目录失败: {}", e)))?;

    Ok(app_data_dir.join("settings.json"))
}

/// 启动阶段读取已保存的设置（不存在或解析失败时返回 `None`）。
pub fn load_startup_settings(app: &AppHandle) -> Option<AppSettings> {
    let settings_path = settings_file_path(app).ok()?;
    if !settings_path.exists() {
        return None;
    }

    let content = fs::read_to_string(&settings_path).ok()?;
    match serde_json::from_str::<AppSettings>(&content) {
        Ok(settings) => Some(settings),
        Err(err) => {
            log::warn!("⚠️ 设置文件解析失败，忽略已保存设置: {}", err);
            None
        }
    }
}

#[tauri::command]
pub fn get_app_settings(app: AppHandle) -> Result<Option<AppSettings>, AppError> {
    let settings_path = settings_file_path(&app)?;
    if !settings_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&settings_path)?;
    let parsed = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Storage(format!("解析设置文件失败: {}", e)))?;

    Ok(Some(parsed))
}

#[tauri::command]
pub fn set_app_settings(
    app: AppHandle,
    state: State<'_, BarcodeServiceState>,
    settings: AppSettings,
) -> Result<(), AppError> {
    let settings_path = settings_file_path(&app)?;

    state.apply_credentials(&settings.client_id, &settings.client_secret)?;

    let content = serde_json::to_string_pretty(&settings)
        .map_err(|e| AppError::Storage(format!("序列化设置失败: {}", e)))?;

    fs::write(settings_path, content)?;
    log::info!("⚙️ 凭据设置已保存并应用");
    Ok(())
}
