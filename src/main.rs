// 防止在 Windows 发布版本中显示额外的控制台窗口，不要删除！
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! # 云端条码演示应用 — 应用入口
//!
//! 本文件仅负责应用初始化与插件/命令注册。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use barcode_cloud::{barcode, settings};
use barcode_cloud::barcode::BarcodeServiceState;
use tauri::Manager;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        // 插件初始化
        .plugin(tauri_plugin_dialog::init())
        // 应用设置
        .setup(|app| {
            log::info!("setup: begin");

            let service = BarcodeServiceState::new();

            // 启动时恢复已保存的云端凭据
            if let Some(saved) = settings::load_startup_settings(app.handle()) {
                match service.apply_credentials(&saved.client_id, &saved.client_secret) {
                    Ok(()) => log::info!("setup: saved credentials applied"),
                    Err(err) => {
                        log::error!("setup: 应用已保存凭据失败，应用将以未配置状态运行: {err}")
                    }
                }
            } else {
                log::info!("setup: no saved credentials, waiting for user configuration");
            }

            app.manage(service);
            log::info!("setup: barcode service managed");

            log::info!("setup: complete");
            Ok(())
        })
        // 注册所有 Tauri 命令
        .invoke_handler(tauri::generate_handler![
            // 条码识别与生成
            barcode::commands::recognize_barcode_file,
            barcode::commands::recognize_barcode_base64,
            barcode::commands::generate_barcode,
            barcode::commands::list_barcode_types,
            barcode::commands::default_barcode_type,
            // 应用设置存储
            settings::get_app_settings,
            settings::set_app_settings,
        ])
        .run(tauri::generate_context!())
        .expect("运行 Tauri 应用时出错");
}
