//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入类型”和“上传准备链路的中间结果”解耦：
//! - `ScanSource` 表示外部来源语义（文件选择 / 拍摄后的 Base64）
//! - `RawImageData` 表示已加载但未解码的字节
//! - `PreparedUploadImage` 表示已降采样并编码为 PNG 的上传载荷

/// 待识别图片的输入来源。
pub enum ScanSource {
    /// 本地文件路径来源（文件选择器）。
    FilePath(String),
    /// Base64（支持 Data URL 与纯 Base64 字符串，对应拍摄/粘贴场景）。
    Base64(String),
}

/// 加载阶段输出：原始字节与来源标识。
pub(crate) struct RawImageData {
    /// 原始图片字节。
    pub(crate) bytes: Vec<u8>,
    /// 来源提示（用于日志与诊断）。
    pub(crate) source_hint: &'static str,
}

/// 上传准备阶段输出：降采样后的 PNG 载荷。
pub(crate) struct PreparedUploadImage {
    /// 降采样后宽度（像素）。
    pub(crate) width: u32,
    /// 降采样后高度（像素）。
    pub(crate) height: u32,
    /// 无损 PNG 编码字节。
    pub(crate) png_bytes: Vec<u8>,
}
