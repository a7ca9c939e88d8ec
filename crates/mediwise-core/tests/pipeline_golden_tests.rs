//! Golden tests for the clinical report pipeline.
//!
//! These tests run report text through field extraction and the fixture
//! model in `tests/fixtures/ml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use mediwise_core::{
    AnalysisService, ArtifactPaths, DiseaseClassifier, ErrorKind, FixedExtractor,
};
use mediwise_ocr::{MockOcrEngine, OcrEngine, OcrResult};
use tempfile::TempDir;

const HEALTHY_REPORT: &str = "\
City Diagnostics - Complete Blood Count
Patient: A. Rao
WBC: 7.2 x10^3/uL
RBC: 4.9 x10^6/uL
HGB: 14.1 g/dL
HCT: 42.0 %
MCV: 88 fL
MCH: 29.1 pg
MCHC: 33.5 g/dL
PLT: 260 x10^3/uL
NEUT%: 58
LYMPH%: 32
RDW: 13.0 %
RETIC%: 1.0
EOS%: 2
BASO%: 0.5
PLT_mean_volume: 9.6 fL
";

const ANEMIA_REPORT: &str = "\
HEMATOLOGY
wbc count ........ 6.5
Hemoglobin (HGB) ..... 9.1 g/dL
mcv = 72 fL
RDW-CV 17.5 %
Platelets (PLT) 410
";

const LEUKEMIA_REPORT: &str = "\
WBC 48.0
HGB 9.8
MCV 90
RDW 16.2
PLT 85
";

/// Test case from golden file.
struct GoldenCase {
    id: &'static str,
    report: &'static str,
    expected_label: &'static str,
    expected_confidence: &'static str,
    expected_workout: &'static str,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "healthy-full-panel",
            report: HEALTHY_REPORT,
            expected_label: "Healthy",
            expected_confidence: "85.17",
            expected_workout: "Regular moderate exercise",
        },
        GoldenCase {
            id: "anemia-noisy-layout",
            report: ANEMIA_REPORT,
            expected_label: "Iron Deficiency Anemia",
            expected_confidence: "82.74",
            expected_workout: "Light walking and yoga",
        },
        GoldenCase {
            id: "leukemia-minimal-panel",
            report: LEUKEMIA_REPORT,
            expected_label: "Leukemia",
            expected_confidence: "49.75",
            expected_workout: "Gentle stretching as tolerated",
        },
    ]
}

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ml")
}

fn classifier() -> DiseaseClassifier {
    DiseaseClassifier::load(&ArtifactPaths::in_dir(fixture_dir()))
}

fn service_reading(text: &str) -> AnalysisService {
    AnalysisService::new(
        Box::new(MockOcrEngine::new(text)),
        classifier(),
        Box::new(FixedExtractor::default()),
    )
    .unwrap()
}

/// Copy the fixture artifacts so a test can break one of them.
fn copy_fixtures() -> (TempDir, ArtifactPaths) {
    let dir = TempDir::new().unwrap();
    for name in [
        "medical_model.json",
        "label_encoder.json",
        "cbc_disease_recommendations.csv",
    ] {
        fs::copy(fixture_dir().join(name), dir.path().join(name)).unwrap();
    }
    let paths = ArtifactPaths::in_dir(dir.path());
    (dir, paths)
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let service = service_reading(case.report);
        let result = service
            .analyze_clinical_report(b"image bytes")
            .unwrap_or_else(|e| panic!("Case {}: {}", case.id, e));

        assert_eq!(
            result.disease_label, case.expected_label,
            "Case {}: label mismatch",
            case.id
        );
        assert_eq!(
            result.confidence_display(),
            case.expected_confidence,
            "Case {}: confidence mismatch",
            case.id
        );
        assert_eq!(
            result.workout_advice, case.expected_workout,
            "Case {}: recommendation mismatch",
            case.id
        );
    }
}

#[test]
fn test_extracted_values_for_healthy_report() {
    let service = service_reading("");
    let vector = service.extract_biomarkers(HEALTHY_REPORT);

    assert_eq!(vector.get("WBC"), Some(7.2));
    assert_eq!(vector.get("MCH"), Some(29.1));
    assert_eq!(vector.get("MCHC"), Some(33.5));
    assert_eq!(vector.get("PLT"), Some(260.0));
    assert_eq!(vector.get("PLT_mean_volume"), Some(9.6));
    assert_eq!(vector.extracted_count(), 15);
}

#[test]
fn test_artifact_version_is_stable() {
    let a = classifier();
    let b = classifier();

    let version = a.artifact_version().unwrap();
    assert_eq!(version.len(), 64);
    assert!(version.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(a.artifact_version(), b.artifact_version());

    let result = service_reading(LEUKEMIA_REPORT)
        .analyze_clinical_report(b"x")
        .unwrap();
    assert_eq!(result.artifact_version, version);
}

#[test]
fn test_determinism() {
    let service = service_reading(ANEMIA_REPORT);
    let first = service.analyze_clinical_report(b"x").unwrap();
    for _ in 0..10 {
        assert_eq!(service.analyze_clinical_report(b"x").unwrap(), first);
    }
}

#[test]
fn test_unreadable_report() {
    let service = service_reading("Thank you for choosing City Diagnostics");
    let err = service.analyze_clinical_report(b"x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnreadableDocument);
    assert_eq!(err.kind().code(), "UNREADABLE_DOCUMENT");
}

#[test]
fn test_missing_artifact_is_model_unavailable() {
    let (_dir, paths) = copy_fixtures();
    fs::remove_file(&paths.model).unwrap();

    let service = AnalysisService::new(
        Box::new(MockOcrEngine::new(HEALTHY_REPORT)),
        DiseaseClassifier::load(&paths),
        Box::new(FixedExtractor::default()),
    )
    .unwrap();

    for _ in 0..3 {
        let err = service.analyze_clinical_report(b"x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ModelUnavailable);
    }
}

#[test]
fn test_label_without_recommendation() {
    let (_dir, paths) = copy_fixtures();
    fs::write(
        &paths.recommendations,
        "Disease,Diet_Recommendation,Workout_Recommendation,Precautions\n\
         Healthy,Balanced,Walk,Check-ups\n",
    )
    .unwrap();

    let service = AnalysisService::new(
        Box::new(MockOcrEngine::new(LEUKEMIA_REPORT)),
        DiseaseClassifier::load(&paths),
        Box::new(FixedExtractor::default()),
    )
    .unwrap();

    let err = service.analyze_clinical_report(b"x").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoRecommendation);
    assert!(err.kind().is_operational());
}

#[test]
fn test_feature_order_mismatch_is_unavailable() {
    let (_dir, paths) = copy_fixtures();
    let model = fs::read_to_string(&paths.model)
        .unwrap()
        .replacen("\"WBC\", \"RBC\"", "\"RBC\", \"WBC\"", 1);
    fs::write(&paths.model, model).unwrap();

    let classifier = DiseaseClassifier::load(&paths);
    assert!(!classifier.is_available());
    assert!(classifier.unavailable_reason().unwrap().contains("schema"));
}

/// Treats the image bytes as the recognized text.
struct EchoEngine;

impl OcrEngine for EchoEngine {
    fn recognize(&self, image: &[u8]) -> OcrResult<String> {
        Ok(String::from_utf8_lossy(image).into_owned())
    }
}

#[test]
fn test_concurrent_reports_do_not_interfere() {
    let service = Arc::new(
        AnalysisService::new(
            Box::new(EchoEngine),
            classifier(),
            Box::new(FixedExtractor::default()),
        )
        .unwrap(),
    );

    let cases = get_golden_cases();
    let handles: Vec<_> = (0..12)
        .map(|i| {
            let service = Arc::clone(&service);
            let case = &cases[i % cases.len()];
            let report = case.report.as_bytes().to_vec();
            let expected = case.expected_label;
            thread::spawn(move || {
                for _ in 0..20 {
                    let result = service.analyze_clinical_report(&report).unwrap();
                    assert_eq!(result.disease_label, expected);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
