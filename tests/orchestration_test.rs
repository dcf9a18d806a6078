// 识别/生成编排的终态交付测试（注入假远端客户端）
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use base64::{Engine as _, engine::general_purpose};
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;
use tokio::sync::Notify;

use barcode_cloud::barcode::{
    BarcodeApi, BarcodeError, BarcodeServiceState, ClientConfig, GenerateRequest,
    OperationStatusPayload, RecognizedBarcode, ScanSource,
};

/// 可编排的假远端客户端：按队列回放结果，可选地在网关上阻塞。
struct FakeApi {
    scan_results: Mutex<VecDeque<Result<Vec<RecognizedBarcode>, BarcodeError>>>,
    generate_results: Mutex<VecDeque<Result<Vec<u8>, BarcodeError>>>,
    scan_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    gate: Option<Arc<Notify>>,
}

impl FakeApi {
    fn new() -> Self {
        Self {
            scan_results: Mutex::new(VecDeque::new()),
            generate_results: Mutex::new(VecDeque::new()),
            scan_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn with_scan(result: Result<Vec<RecognizedBarcode>, BarcodeError>) -> Self {
        let fake = Self::new();
        fake.scan_results.lock().unwrap().push_back(result);
        fake
    }

    fn with_generate(result: Result<Vec<u8>, BarcodeError>) -> Self {
        let fake = Self::new();
        fake.generate_results.lock().unwrap().push_back(result);
        fake
    }
}

impl BarcodeApi for FakeApi {
    async fn scan_png(
        &self,
        _png_bytes: Vec<u8>,
        _config: &ClientConfig,
    ) -> Result<Vec<RecognizedBarcode>, BarcodeError> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.scan_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected scan call")
    }

    async fn generate_png(
        &self,
        _request: &GenerateRequest,
        _config: &ClientConfig,
    ) -> Result<Vec<u8>, BarcodeError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.generate_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected generate call")
    }
}

fn create_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let v = ((x * 7 + y * 13) % 255) as u8;
        Rgba([v, v, v, 255])
    });

    let dyn_img = DynamicImage::ImageRgba8(img);
    let mut cursor = Cursor::new(Vec::new());
    dyn_img
        .write_to(&mut cursor, ImageFormat::Png)
        .expect("failed to encode test image");
    cursor.into_inner()
}

fn base64_scan_source(width: u32, height: u32) -> ScanSource {
    ScanSource::Base64(general_purpose::STANDARD.encode(create_png_bytes(width, height)))
}

fn event_collector() -> (Arc<Mutex<Vec<OperationStatusPayload>>>, impl Fn(OperationStatusPayload)) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    (events, move |payload| sink.lock().unwrap().push(payload))
}

fn record(value: &str, symbology: &str) -> RecognizedBarcode {
    RecognizedBarcode {
        barcode_value: value.to_string(),
        barcode_type: symbology.to_string(),
    }
}

#[tokio::test]
async fn empty_scan_reports_notice_without_selection() {
    let service =
        BarcodeServiceState::with_client(ClientConfig::default(), FakeApi::with_scan(Ok(vec![])));
    let (events, emit) = event_collector();

    let outcome = service
        .scan_with_status("req-1", base64_scan_source(800, 400), emit)
        .await;

    assert_eq!(outcome.status, "empty");
    assert_eq!(outcome.notice.as_deref(), Some("No barcode detected"));
    assert_eq!(outcome.barcode_text, None);
    assert_eq!(outcome.selected_type, None);
    assert!(outcome.barcodes.is_empty());

    // 上传回显仍然存在，且已降采样到边界内
    let preview = general_purpose::STANDARD
        .decode(outcome.preview_png_base64.expect("preview expected"))
        .unwrap();
    let decoded = image::load_from_memory(&preview).unwrap();
    assert_eq!(decoded.dimensions(), (384, 192));

    let events = events.lock().unwrap();
    let statuses: Vec<&str> = events.iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec!["dispatched", "empty"]);
}

#[tokio::test]
async fn scan_selects_matching_symbology_and_surfaces_text() {
    let service = BarcodeServiceState::with_client(
        ClientConfig::default(),
        FakeApi::with_scan(Ok(vec![record("4006381333931", "QR")])),
    );
    let (events, emit) = event_collector();

    let outcome = service
        .scan_with_status("req-2", base64_scan_source(400, 400), emit)
        .await;

    assert_eq!(outcome.status, "succeeded");
    assert_eq!(outcome.barcode_text.as_deref(), Some("4006381333931"));
    assert_eq!(outcome.selected_type, Some("QR"));
    assert_eq!(outcome.barcodes.len(), 1);

    let statuses: Vec<&str> = events.lock().unwrap().iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec!["dispatched", "succeeded"]);
}

#[tokio::test]
async fn unknown_symbology_tag_leaves_selection_unchanged() {
    let service = BarcodeServiceState::with_client(
        ClientConfig::default(),
        FakeApi::with_scan(Ok(vec![record("hello", "FrankenCode9000")])),
    );
    let (_events, emit) = event_collector();

    let outcome = service
        .scan_with_status("req-3", base64_scan_source(100, 100), emit)
        .await;

    assert_eq!(outcome.status, "succeeded");
    assert_eq!(outcome.barcode_text.as_deref(), Some("hello"));
    assert_eq!(outcome.selected_type, None);
}

#[tokio::test]
async fn generate_success_delivers_image_exactly_once() {
    let png = create_png_bytes(200, 100);
    let fake = FakeApi::with_generate(Ok(png.clone()));
    let service = BarcodeServiceState::with_client(ClientConfig::default(), fake);
    let (events, emit) = event_collector();

    let outcome = service
        .generate_with_status("req-4", "Code128", "12345".to_string(), 200, 100, emit)
        .await;

    assert_eq!(outcome.status, "succeeded");
    assert_eq!(outcome.width, Some(200));
    assert_eq!(outcome.height, Some(100));

    let delivered = general_purpose::STANDARD
        .decode(outcome.image_png_base64.expect("image expected"))
        .unwrap();
    assert_eq!(delivered, png);

    let statuses: Vec<&str> = events.lock().unwrap().iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec!["dispatched", "succeeded"]);
}

#[tokio::test]
async fn transport_failure_surfaces_configuration_hint() {
    let service = BarcodeServiceState::with_client(
        ClientConfig::default(),
        FakeApi::with_scan(Err(BarcodeError::AuthConfiguration(
            "connection refused".to_string(),
        ))),
    );
    let (_events, emit) = event_collector();

    let outcome = service
        .scan_with_status("req-5", base64_scan_source(64, 64), emit)
        .await;

    assert_eq!(outcome.status, "failed");
    assert_eq!(outcome.error_code, Some("E_AUTH_CONFIG"));
    let notice = outcome.notice.unwrap();
    assert!(notice.starts_with("Check ClientId and ClientSecret in ApiClient"));
    assert!(notice.contains("connection refused"));
}

#[tokio::test]
async fn structured_remote_failure_keeps_message_details_form() {
    let service = BarcodeServiceState::with_client(
        ClientConfig::default(),
        FakeApi::with_generate(Err(BarcodeError::RemoteApi {
            status: 400,
            message: "HTTP 400".to_string(),
            details: "Invalid barcode data".to_string(),
        })),
    );
    let (_events, emit) = event_collector();

    let outcome = service
        .generate_with_status("req-6", "QR", "text".to_string(), 100, 100, emit)
        .await;

    assert_eq!(outcome.status, "failed");
    assert_eq!(outcome.error_code, Some("E_REMOTE_API"));
    assert_eq!(outcome.notice.as_deref(), Some("HTTP 400: Invalid barcode data"));
}

#[tokio::test]
async fn unknown_generate_type_fails_locally_without_dispatch() {
    let fake = FakeApi::new();
    let service = BarcodeServiceState::with_client(ClientConfig::default(), fake);
    let (events, emit) = event_collector();

    let outcome = service
        .generate_with_status("req-7", "NotABarcode", "x".to_string(), 100, 100, emit)
        .await;

    assert_eq!(outcome.status, "failed");
    assert_eq!(outcome.error_code, Some("E_INVALID_FORMAT"));
    // 本地输入问题：未曾调度，不发状态事件
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn second_scan_while_in_flight_is_rejected_then_gate_reopens() {
    let gate = Arc::new(Notify::new());
    let mut fake = FakeApi::with_scan(Ok(vec![record("first", "QR")]));
    fake.gate = Some(Arc::clone(&gate));
    fake.scan_results
        .lock()
        .unwrap()
        .push_back(Ok(vec![record("third", "QR")]));

    let service = Arc::new(BarcodeServiceState::with_client(
        ClientConfig::default(),
        fake,
    ));

    let first = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            service
                .scan_with_status("req-a", base64_scan_source(64, 64), |_| {})
                .await
        })
    };

    // 让第一次调度进入远端等待
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    let rejected = service
        .scan_with_status("req-b", base64_scan_source(64, 64), |_| {})
        .await;
    assert_eq!(rejected.status, "failed");
    assert_eq!(rejected.error_code, Some("E_BUSY"));

    gate.notify_one();
    let first = first.await.expect("first scan task should not panic");
    assert_eq!(first.status, "succeeded");
    assert_eq!(first.barcode_text.as_deref(), Some("first"));

    // 终态之后闸门释放，后续调度恢复正常
    gate.notify_one();
    let third = service
        .scan_with_status("req-c", base64_scan_source(64, 64), |_| {})
        .await;
    assert_eq!(third.status, "succeeded");
    assert_eq!(third.barcode_text.as_deref(), Some("third"));
}
