//! Latency benchmarks for feature extraction and detection
//!
//! Run with: cargo bench -p lurescan-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lurescan_classifiers::corpus::{message_corpus, url_corpus};
use lurescan_classifiers::{Detector, DetectorConfig, MessageFeatureExtractor, UrlFeatureExtractor};
use lurescan_core::Domain;

fn benchmark_url_extraction(c: &mut Criterion) {
    let extractor = UrlFeatureExtractor::new().expect("Failed to create URL extractor");

    let test_cases = vec![
        ("known_legitimate", "https://www.google.com/search?q=python"),
        ("shortener", "http://bit.ly/verify-account-now"),
        ("ip_with_port", "http://192.168.0.1:8080/login"),
        ("bare_domain", "example.com/page"),
        ("malformed", "https/example.com"),
    ];

    let mut group = c.benchmark_group("URL_Extraction");
    for (name, url) in test_cases {
        group.bench_with_input(BenchmarkId::new("extract", name), &url, |b, url| {
            b.iter(|| extractor.extract(black_box(url)))
        });
    }
    group.finish();
}

fn benchmark_message_extraction(c: &mut Criterion) {
    let extractor = MessageFeatureExtractor::new().expect("Failed to create message extractor");

    let test_cases = vec![
        ("short_clean", "Hello, how are you?"),
        ("short_scam", "URGENT! Click here NOW to verify!"),
        (
            "long_scam",
            "CONGRATULATIONS! You won $1,000,000! Claim your prize NOW at: https://claim-prize.tk \
             Call 555-123-4567 or email prizes@claim-prize.tk before the deadline expires today!!!",
        ),
    ];

    let mut group = c.benchmark_group("Message_Extraction");
    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("extract", name), &text, |b, text| {
            b.iter(|| extractor.extract(black_box(text)))
        });
    }
    group.finish();
}

fn benchmark_detection(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create models dir");
    let detector = Detector::new(DetectorConfig::default().with_models_dir(dir.path()))
        .expect("Failed to create detector");
    detector
        .train_corpus(Domain::Url, &url_corpus())
        .expect("Failed to train URL model");
    detector
        .train_corpus(Domain::Message, &message_corpus())
        .expect("Failed to train message model");

    let mut group = c.benchmark_group("Detection");
    group.sample_size(50);
    group.bench_function("detect_url", |b| {
        b.iter(|| detector.detect_url(black_box("http://bit.ly/verify-now")))
    });
    group.bench_function("detect_message", |b| {
        b.iter(|| detector.detect_message(black_box("Your tax refund is ready! Claim $2,500 now")))
    });
    group.finish();
}

criterion_group!(
    benches,
    benchmark_url_extraction,
    benchmark_message_extraction,
    benchmark_detection
);
criterion_main!(benches);
