//! End-to-end tests: train on the built-in corpus, then detect

use lurescan_classifiers::corpus::{message_corpus, url_corpus};
use lurescan_classifiers::reasons::MALFORMED_URL_REASON;
use lurescan_classifiers::{Detector, DetectorConfig};
use lurescan_core::{Domain, Error, Label};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tempfile::TempDir;

fn config(dir: &Path) -> DetectorConfig {
    DetectorConfig::default().with_models_dir(dir)
}

/// Models trained once and shared by the read-only tests
fn trained_dir() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = tempfile::tempdir().unwrap();
        let detector = Detector::new(config(dir.path())).unwrap();
        detector.train_corpus(Domain::Url, &url_corpus()).unwrap();
        detector.train_corpus(Domain::Message, &message_corpus()).unwrap();
        dir
    })
    .path()
}

fn trained() -> Detector {
    Detector::new(config(trained_dir())).unwrap()
}

fn copy_models(to: &Path) {
    for entry in fs::read_dir(trained_dir()).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), to.join(entry.file_name())).unwrap();
    }
}

#[test]
fn test_training_reports_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let detector = Detector::new(config(dir.path())).unwrap();
    let report = detector.train_corpus(Domain::Url, &url_corpus()).unwrap();

    assert_eq!(report.domain, Domain::Url);
    assert_eq!(report.train_size + report.test_size, 67);
    assert_eq!(report.test_size, 13);
    assert!((0.0..=1.0).contains(&report.accuracy));
    assert!(report.report.to_string().contains("Legitimate"));

    assert!(detector.is_trained(Domain::Url));
    assert!(!detector.is_trained(Domain::Message));
    assert!(detector.store().exists(Domain::Url));
}

#[test]
fn test_known_legitimate_url() {
    let result = trained().detect_url("https://www.google.com");
    assert_eq!(result.label, Label::Legitimate);
    assert!(result.reasons[0].starts_with("Detected as LEGITIMATE with"));
    assert!(result
        .reasons
        .iter()
        .any(|r| r == "[OK] Domain is from a known legitimate source."));
}

#[test]
fn test_search_url_is_legitimate() {
    let result = trained().detect_url("https://www.google.com/search?q=python");
    assert!(!result.is_fake());
    assert_eq!(result.input, "https://www.google.com/search?q=python");
    assert!(result
        .reasons
        .iter()
        .any(|r| r == "[OK] Domain is from a known legitimate source."));
}

#[test]
fn test_shortened_phishing_url() {
    let result = trained().detect_url("http://bit.ly/verify-now");
    assert!(result.is_fake());
    assert!(result.confidence >= 0.5);
    assert!(result.reasons.iter().any(|r| r.contains("shortener")));
}

#[test]
fn test_scam_message() {
    let result = trained().detect_message("URGENT! Click here NOW to verify!");
    assert!(result.is_fake());
    assert!(result.reasons[0].starts_with("Detected as FAKE with"));
    assert!(result.reasons[0].contains('%'));
}

#[test]
fn test_friendly_message() {
    let result = trained().detect_message("Hello, how are you?");
    assert_eq!(result.label, Label::Legitimate);
    assert_eq!(result.input, "Hello, how are you?");
}

#[test]
fn test_malformed_url_has_single_error_reason() {
    let detector = trained();
    for input in ["https/example.com", "http:///", ""] {
        let result = detector.detect_url(input);
        assert_eq!(result.reasons, vec![MALFORMED_URL_REASON.to_string()], "{input:?}");
    }
}

#[test]
fn test_confidence_is_a_probability() {
    let detector = trained();
    let inputs = [
        "https://github.com/user/repo",
        "http://192.168.1.100/login",
        "not a url at all",
        "ftp://files.example.com",
    ];
    for input in inputs {
        let r = detector.detect_url(input);
        assert!((0.0..=1.0).contains(&r.confidence), "{input}: {}", r.confidence);
        assert!(!r.reasons.is_empty());
    }
    for input in ["", "hi", "FREE MONEY!!!", "Your invoice is attached."] {
        let r = detector.detect_message(input);
        assert!((0.0..=1.0).contains(&r.confidence), "{input}: {}", r.confidence);
        assert!(r.reasons[0].starts_with("Detected as"));
    }
}

#[test]
fn test_detection_is_deterministic() {
    let detector = trained();
    let a = detector.detect_message("Your tax refund is ready! Claim now");
    let b = detector.detect_message("Your tax refund is ready! Claim now");
    assert_eq!(a.label, b.label);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.reasons, b.reasons);
}

#[test]
fn test_untrained_domain() {
    let dir = tempfile::tempdir().unwrap();
    let detector = Detector::new(config(dir.path())).unwrap();
    let result = detector.detect_message("Claim your prize now!");
    assert!(!result.is_fake());
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.reasons.len(), 1);
}

#[test]
fn test_models_appear_after_first_miss() {
    let dir = tempfile::tempdir().unwrap();
    let detector = Detector::new(config(dir.path())).unwrap();
    assert!(!detector.is_trained(Domain::Url));

    copy_models(dir.path());
    assert!(detector.is_trained(Domain::Url));
    assert_eq!(
        detector.detect_url("http://bit.ly/verify-now").label,
        Label::Fake
    );
}

#[test]
fn test_corrupt_artifact_is_untrained() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    let detector = Detector::new(config(dir.path())).unwrap();
    fs::write(detector.store().model_path(Domain::Message), "{\"unit_id\": 3").unwrap();

    assert!(!detector.is_trained(Domain::Message));
    let result = detector.detect_message("Claim your prize now!");
    assert_eq!(result.confidence, 0.0);
    assert!(detector.is_trained(Domain::Url));
}

#[test]
fn test_repaired_artifacts_are_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let detector = Detector::new(config(dir.path())).unwrap();
    fs::write(detector.store().model_path(Domain::Url), "corrupt").unwrap();
    fs::write(detector.store().scaler_path(Domain::Url), "corrupt").unwrap();
    assert!(!detector.is_trained(Domain::Url));
    assert!(!detector.is_trained(Domain::Url));

    copy_models(dir.path());
    assert!(detector.is_trained(Domain::Url));
    assert!(detector.detect_url("http://bit.ly/verify-now").is_fake());
}

#[test]
fn test_mixed_artifacts_are_untrained() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    let detector = Detector::new(config(dir.path())).unwrap();

    // scaler from a different training run
    let other = tempfile::tempdir().unwrap();
    let retrain = Detector::new(config(other.path())).unwrap();
    retrain.train_corpus(Domain::Url, &url_corpus()).unwrap();
    fs::copy(
        retrain.store().scaler_path(Domain::Url),
        detector.store().scaler_path(Domain::Url),
    )
    .unwrap();

    assert!(!detector.is_trained(Domain::Url));
    assert_eq!(detector.detect_url("https://www.google.com").confidence, 0.0);
}

#[test]
fn test_missing_scaler_is_untrained() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    let detector = Detector::new(config(dir.path())).unwrap();
    fs::remove_file(detector.store().scaler_path(Domain::Url)).unwrap();
    assert!(!detector.is_trained(Domain::Url));
}

#[test]
fn test_reset_removes_models() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    let detector = Detector::new(config(dir.path())).unwrap();
    assert!(detector.is_trained(Domain::Url));

    assert!(detector.reset(Domain::Url).unwrap());
    assert!(!detector.is_trained(Domain::Url));
    assert!(detector.is_trained(Domain::Message));
}

#[test]
fn test_unknown_domain_is_an_error() {
    assert!(matches!(
        "sms".parse::<Domain>(),
        Err(Error::UnknownDomain(_))
    ));
}

#[test]
fn test_training_contract_violations() {
    let dir = tempfile::tempdir().unwrap();
    let detector = Detector::new(config(dir.path())).unwrap();

    let err = detector
        .train(Domain::Message, &["a", "b", "c"], &[Label::Fake, Label::Legitimate])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));

    let empty: [&str; 0] = [];
    assert!(detector.train(Domain::Message, &empty, &[]).is_err());

    let single_class = ["a", "b", "c", "d"];
    assert!(detector
        .train(Domain::Message, &single_class, &[Label::Fake; 4])
        .is_err());
    assert!(!detector.store().exists(Domain::Message));
}

#[test]
fn test_concurrent_first_use() {
    let dir = tempfile::tempdir().unwrap();
    copy_models(dir.path());
    let detector = Detector::new(config(dir.path())).unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let detector = &detector;
                s.spawn(move || {
                    if i % 2 == 0 {
                        detector.detect_url("http://bit.ly/verify-now").label
                    } else {
                        detector.detect_message("Hello, how are you?").label
                    }
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let label = handle.join().unwrap();
            let expected = if i % 2 == 0 { Label::Fake } else { Label::Legitimate };
            assert_eq!(label, expected);
        }
    });
}
