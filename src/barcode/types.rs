//! # 条码类型与结果模型
//!
//! ## 设计思路
//!
//! 条码符号体系（symbology）使用真正的枚举而非裸字符串，标签映射是全量、
//! 编译期可检查的：`label()` 总函数保证每个变体都有展示标签，
//! `from_label()` 负责从远端返回的符号标签反查变体（查不到返回 `None`，
//! 由调用侧决定保持选择不变）。

use super::error::BarcodeError;

/// 可生成/可识别的条码符号类型。
///
/// 标签与云端生成接口的类型参数一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeBarcodeType {
    Aztec,
    Codabar,
    Code11,
    Code128,
    Code39,
    Code93,
    DataMatrix,
    DotCode,
    Ean13,
    Ean8,
    Gs1Code128,
    Gs1DataMatrix,
    Gs1Qr,
    Itf14,
    MaxiCode,
    MicroPdf417,
    MicroQr,
    Pdf417,
    Planet,
    Postnet,
    Qr,
    Upca,
    Upce,
}

impl EncodeBarcodeType {
    /// 全部变体（用于列表展示与全量映射测试）。
    pub const ALL: &'static [Self] = &[
        Self::Aztec,
        Self::Codabar,
        Self::Code11,
        Self::Code128,
        Self::Code39,
        Self::Code93,
        Self::DataMatrix,
        Self::DotCode,
        Self::Ean13,
        Self::Ean8,
        Self::Gs1Code128,
        Self::Gs1DataMatrix,
        Self::Gs1Qr,
        Self::Itf14,
        Self::MaxiCode,
        Self::MicroPdf417,
        Self::MicroQr,
        Self::Pdf417,
        Self::Planet,
        Self::Postnet,
        Self::Qr,
        Self::Upca,
        Self::Upce,
    ];

    /// 展示标签（同时也是生成接口的类型参数）。
    pub fn label(self) -> &'static str {
        match self {
            Self::Aztec => "Aztec",
            Self::Codabar => "Codabar",
            Self::Code11 => "Code11",
            Self::Code128 => "Code128",
            Self::Code39 => "Code39",
            Self::Code93 => "Code93",
            Self::DataMatrix => "DataMatrix",
            Self::DotCode => "DotCode",
            Self::Ean13 => "EAN13",
            Self::Ean8 => "EAN8",
            Self::Gs1Code128 => "GS1Code128",
            Self::Gs1DataMatrix => "GS1DataMatrix",
            Self::Gs1Qr => "GS1QR",
            Self::Itf14 => "ITF14",
            Self::MaxiCode => "MaxiCode",
            Self::MicroPdf417 => "MicroPdf417",
            Self::MicroQr => "MicroQR",
            Self::Pdf417 => "Pdf417",
            Self::Planet => "Planet",
            Self::Postnet => "Postnet",
            Self::Qr => "QR",
            Self::Upca => "UPCA",
            Self::Upce => "UPCE",
        }
    }

    /// 从符号标签反查变体。识别结果中的未知标签返回 `None`。
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.label() == label)
    }

    /// 从外部字符串解析类型，解析失败返回格式错误。
    pub fn parse(label: &str) -> Result<Self, BarcodeError> {
        Self::from_label(label.trim()).ok_or_else(|| {
            BarcodeError::InvalidFormat(format!("未知条码类型：{label}"))
        })
    }

    /// 按字典序排序的全部标签（用于前端类型选择器）。
    pub fn sorted_labels() -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Self::ALL.iter().map(|t| t.label()).collect();
        labels.sort_unstable();
        labels
    }

    /// 默认预选类型。
    pub fn default_label() -> &'static str {
        Self::Qr.label()
    }
}

/// 远端识别接口返回的单条识别记录。
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RecognizedBarcode {
    /// 解码出的文本值。
    #[serde(rename = "barcodeValue")]
    pub barcode_value: String,
    /// 符号体系标签（远端口径，可能不在本地枚举中）。
    #[serde(rename = "type")]
    pub barcode_type: String,
}

/// 生成请求参数。
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub barcode_type: EncodeBarcodeType,
    pub text: String,
    /// 目标输出宽度（像素，取自当前展示区域）。
    pub width: u32,
    /// 目标输出高度（像素）。
    pub height: u32,
}

/// 识别操作的终态结果（单次交付给前端）。
#[derive(Debug, Clone, serde::Serialize)]
pub struct ScanOutcome {
    /// `succeeded` / `empty` / `failed`。
    pub status: &'static str,
    /// 首条识别记录的解码文本（原样透传）。
    pub barcode_text: Option<String>,
    /// 标签匹配成功时的本地类型（标签形式）；未匹配保持 `None`。
    pub selected_type: Option<&'static str>,
    /// 全部识别记录。
    pub barcodes: Vec<RecognizedBarcode>,
    /// 实际上传的降采样图片（Base64 PNG），供前端回显。
    pub preview_png_base64: Option<String>,
    pub error_code: Option<&'static str>,
    /// 面向用户的提示（空结果提示或失败提示）。
    pub notice: Option<String>,
}

/// 生成操作的终态结果。
#[derive(Debug, Clone, serde::Serialize)]
pub struct GenerateOutcome {
    /// `succeeded` / `failed`。
    pub status: &'static str,
    /// 生成的条码图片（Base64 PNG）。
    pub image_png_base64: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub error_code: Option<&'static str>,
    pub notice: Option<String>,
}

/// 操作状态事件载荷（控制前端忙碌动画的开启与清除）。
#[derive(Debug, Clone, serde::Serialize)]
pub struct OperationStatusPayload {
    /// 触发操作的界面（`scan` / `generate`）。
    pub surface: &'static str,
    pub request_id: String,
    /// `dispatched` 或终态（`succeeded` / `empty` / `failed`）。
    pub status: &'static str,
    pub error_code: Option<&'static str>,
    pub notice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_label_roundtrips() {
        for t in EncodeBarcodeType::ALL {
            assert_eq!(EncodeBarcodeType::from_label(t.label()), Some(*t));
        }
    }

    #[test]
    fn unknown_label_yields_none() {
        assert_eq!(EncodeBarcodeType::from_label("NotABarcode"), None);
    }

    #[test]
    fn sorted_labels_contain_default() {
        let labels = EncodeBarcodeType::sorted_labels();
        assert!(labels.contains(&EncodeBarcodeType::default_label()));
        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let result = EncodeBarcodeType::parse("ultra-code");
        assert!(matches!(result, Err(super::BarcodeError::InvalidFormat(_))));
    }

    #[test]
    fn recognized_barcode_deserializes_remote_shape() {
        let record: RecognizedBarcode =
            serde_json::from_str(r#"{"barcodeValue":"12345","type":"QR"}"#).unwrap();
        assert_eq!(record.barcode_value, "12345");
        assert_eq!(record.barcode_type, "QR");
    }
}
