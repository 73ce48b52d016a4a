//! End-to-end integration tests for pdf2report.
//!
//! Offline tests build small PDFs in memory and exercise extraction, the
//! session state machine, formatting, and report export without any network
//! access. The live test at the bottom makes a real Gemini API call through
//! a locally spawned proxy; it is gated behind the `E2E_ENABLED` environment
//! variable (and needs `GEMINI_API_KEY`) so it never runs in CI by accident.
//!
//! Run the live test with:
//!   E2E_ENABLED=1 GEMINI_API_KEY=AIza... cargo test --test e2e -- --nocapture

use lopdf::{dictionary, Document as PdfDocument, Object, Stream};
use pdf2report::pipeline::format;
use pdf2report::pipeline::report;
use pdf2report::server::{self, ProxyState};
use pdf2report::{analyze, inspect, AnalysisConfig, AnalysisSession, AnalysisType, Document, SessionState};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Build a single-page PDF carrying the given text, entirely in memory.
fn pdf_with_text(text: &str) -> Vec<u8> {
    let mut doc = PdfDocument::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    });
    let content = format!("BT\n/F1 12 Tf\n50 700 Td\n({text}) Tj\nET");
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        "Resources" => Object::Reference(resources_id),
        "Contents" => Object::Reference(content_id),
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("test PDF must serialise");
    buffer
}

/// A PDF with a page but no text at all, like a scanned document.
fn pdf_without_text() -> Vec<u8> {
    let mut doc = PdfDocument::with_version("1.5");
    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("test PDF must serialise");
    buffer
}

// ── Offline pipeline tests ───────────────────────────────────────────────────

#[test]
fn test_extraction_roundtrip() {
    let bytes = pdf_with_text("El acuerdo entra en vigor el primer dia del mes");
    let doc = Document::from_bytes("acuerdo.pdf", bytes).unwrap();
    let extracted = pdf2report::pipeline::extract::extract_text(&doc.bytes).unwrap();
    assert_eq!(extracted.page_count, 1);
    assert!(extracted.text.contains("entra en vigor"));
}

#[test]
fn test_inspect_reports_pages_and_version() {
    let bytes = pdf_with_text("hola");
    let info = inspect(&bytes).unwrap();
    assert_eq!(info.page_count, 1);
    assert!(!info.encrypted);
    assert!(info.pdf_version.starts_with("1."));
}

#[tokio::test]
async fn test_scanned_document_fails_before_any_request() {
    let mut session = AnalysisSession::new();
    // Unroutable endpoint: if the pipeline tried the network, this test
    // would hang instead of failing fast.
    session.set_endpoint("http://192.0.2.1:1/api/gemini");
    session.set_api_key("test-key");
    session
        .set_document_bytes("escaneado.pdf", pdf_without_text())
        .unwrap();

    let err = session.analyze().await.unwrap_err();
    assert!(matches!(err, pdf2report::AnalyzeError::EmptyExtraction));
    assert_eq!(session.state(), SessionState::Error);
    assert!(session.error_message().is_some());
}

#[test]
fn test_report_export_from_formatted_analysis() {
    let analysis = "RESUMEN EJECUTIVO\n\
                    El documento regula el arrendamiento de un local.\n\
                    PUNTOS PRINCIPALES\n\
                    - duración de cinco años\n\
                    - renta anual revisable";

    // Screen side: sections with headings.
    let sections = format::format_sections(analysis);
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].heading.as_deref(), Some("RESUMEN EJECUTIVO"));

    // Print side: a real PDF the extractor can read back.
    let output = pdf2report::AnalysisOutput {
        analysis: analysis.to_string(),
        model: "gemini-2.0-flash".into(),
        analysis_type: AnalysisType::Summary,
        source_name: "contrato.pdf".into(),
        stats: Default::default(),
    };
    let bytes = report::render_report(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    let text = pdf2report::pipeline::extract::extract_text(&bytes).unwrap();
    assert!(text.text.contains("RESUMEN EJECUTIVO"));
    assert!(text.text.contains("arrendamiento"));
    assert_eq!(
        report::report_filename(&output),
        "analisis-summary-contrato.pdf"
    );
}

// ── Live test (requires E2E_ENABLED and GEMINI_API_KEY) ──────────────────────

#[tokio::test]
async fn test_live_analysis_through_local_proxy() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let Ok(api_key) = std::env::var("GEMINI_API_KEY") else {
        println!("SKIP — GEMINI_API_KEY not set");
        return;
    };

    // Spawn the proxy on an ephemeral port.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(ProxyState::new()))
            .await
            .unwrap();
    });

    let bytes = pdf_with_text(
        "La empresa registro ventas de 1200 unidades en el primer trimestre \
         y proyecta un crecimiento anual del quince por ciento.",
    );
    let doc = Document::from_bytes("ventas.pdf", bytes).unwrap();
    let config = AnalysisConfig::builder()
        .api_key(api_key)
        .analysis_type(AnalysisType::Summary)
        .endpoint(format!("http://{addr}/api/gemini"))
        .build()
        .unwrap();

    let output = analyze(&doc, &config).await.expect("live analysis failed");
    assert!(!output.analysis.trim().is_empty());
    assert_eq!(output.analysis_type, AnalysisType::Summary);
    assert!(output.stats.llm_duration_ms > 0);

    let report_bytes = report::render_report(&output).unwrap();
    assert!(report_bytes.starts_with(b"%PDF"));
}
