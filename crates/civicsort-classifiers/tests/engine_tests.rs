//! End-to-end tests for the classification engine

use civicsort_classifiers::prelude::*;
use civicsort_classifiers::{ModelStore, TrainingCorpus};
use civicsort_core::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> ClassifierConfig {
    ClassifierConfig::default().with_model_path(dir.path().join("models/classifier.bin"))
}

#[test]
fn test_learn_then_classify_uses_model() {
    let dir = TempDir::new().unwrap();
    let engine = ClassificationEngine::new(config_in(&dir)).unwrap();

    let text = "zebra crossing paint completely faded";
    assert!(engine.learn(text, "traffic"));
    assert_eq!(engine.corpus_len(), 17);

    let result = engine.classify(text, "");
    assert_eq!(result.category, Category::Traffic);
    assert_eq!(result.method, PredictionMethod::Model);

    let metadata = engine.metadata().unwrap();
    assert_eq!(metadata.training_samples, 17);
}

#[test]
fn test_retrained_model_survives_restart() {
    let dir = TempDir::new().unwrap();
    {
        let engine = ClassificationEngine::new(config_in(&dir)).unwrap();
        engine
            .ingest_feedback("zebra crossing paint completely faded", "traffic")
            .unwrap();
    }

    let store = ModelStore::new(config_in(&dir));
    let stored = store.load().unwrap();
    assert_eq!(stored.model.training_samples(), 17);
    assert_eq!(stored.corpus.len(), 17);
    assert_eq!(store.load_metadata().unwrap().training_samples, 17);

    let engine = ClassificationEngine::new(config_in(&dir)).unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.corpus().len(), 17);
    assert_eq!(snapshot.model().unwrap().training_samples(), 17);
    assert_eq!(engine.confidence_stats().unwrap().training_samples, 17);

    // Feedback from the previous run is kept by the next retrain
    let report = engine
        .ingest_feedback("overgrown hedge hides junction", "traffic")
        .unwrap();
    assert_eq!(report.training_samples, 18);
}

#[test]
fn test_failed_sidecar_write_keeps_disk_and_memory_in_step() {
    let dir = TempDir::new().unwrap();
    let engine = ClassificationEngine::new(config_in(&dir)).unwrap();
    let before = engine.snapshot();

    // Only the sidecar rename can fail: its target is a non-empty directory
    let sidecar = dir.path().join("models/classifier_meta.json");
    std::fs::remove_file(&sidecar).unwrap();
    std::fs::create_dir_all(sidecar.join("occupied")).unwrap();

    let err = engine
        .ingest_feedback("zebra crossing paint completely faded", "traffic")
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(Arc::ptr_eq(&before, &engine.snapshot()));
    assert_eq!(engine.corpus_len(), 16);

    let stored = ModelStore::new(config_in(&dir)).load().unwrap();
    assert_eq!(stored.model.training_samples(), engine.corpus_len());
    assert_eq!(stored.corpus.len(), 16);

    let restarted = ClassificationEngine::new(config_in(&dir)).unwrap();
    assert_eq!(restarted.corpus_len(), 16);
}

#[test]
fn test_failed_retrain_keeps_previous_state() {
    let dir = TempDir::new().unwrap();
    let engine = ClassificationEngine::new(config_in(&dir)).unwrap();
    let before = engine.snapshot();

    // Replace the model directory with a file so persistence fails
    let models = dir.path().join("models");
    std::fs::remove_dir_all(&models).unwrap();
    std::fs::write(&models, b"in the way").unwrap();

    let err = engine
        .ingest_feedback("zebra crossing paint completely faded", "traffic")
        .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(!err.is_client_error());

    let after = engine.snapshot();
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(engine.corpus_len(), 16);
    assert!(engine.model_available());
}

#[test]
fn test_unavailable_model_uses_fallback() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"file").unwrap();
    let config = ClassifierConfig::default().with_model_path(blocker.join("classifier.bin"));

    let engine = ClassificationEngine::new(config).unwrap();
    assert!(!engine.model_available());

    let result = engine.classify("pothole on road", "large crack causing damage");
    assert_eq!(result.category, Category::Potholes);
    assert_eq!(result.method, PredictionMethod::KeywordFallback);

    let result = engine.classify("", "");
    assert_eq!(result.category, Category::Other);
    assert_eq!(result.method, PredictionMethod::Default);
    assert_eq!(result.confidence, 0.5);
}

#[test]
fn test_unknown_vocabulary_falls_back_to_keywords() {
    let dir = TempDir::new().unwrap();
    let engine = ClassificationEngine::new(config_in(&dir)).unwrap();
    assert!(engine.model_available());

    let result = engine.classify("darkness", "");
    assert_eq!(result.category, Category::Streetlight);
    assert_eq!(result.method, PredictionMethod::KeywordFallback);
    assert_eq!(result.confidence, 0.7);

    let result = engine.classify("zzzz", "qqqq");
    assert_eq!(result.category, Category::Other);
    assert_eq!(result.method, PredictionMethod::Default);
}

#[test]
fn test_degenerate_corpus_means_fallback_mode() {
    let dir = TempDir::new().unwrap();
    let mut corpus = TrainingCorpus::new();
    corpus.push("the and of", Category::Other);

    let engine = ClassificationEngine::with_corpus(config_in(&dir), corpus).unwrap();
    assert!(!engine.model_available());
    assert_eq!(
        engine.classify("Water", "no supply").method,
        PredictionMethod::KeywordFallback
    );
}

#[test]
fn test_prioritize_examples() {
    let engine = ClassificationEngine::fallback_only(ClassifierConfig::default()).unwrap();
    assert_eq!(engine.prioritize("garbage", "emergency fire near dump"), Priority::Critical);
    assert_eq!(engine.prioritize("traffic", "signal broken at intersection"), Priority::High);
    assert_eq!(engine.prioritize("water", "pipe replaced successfully"), Priority::High);
}

#[test]
fn test_concurrent_readers_see_whole_snapshots() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ClassificationEngine::new(config_in(&dir)).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observed = 0usize;
                while !done.load(Ordering::Acquire) || observed == 0 {
                    let snapshot = engine.snapshot();
                    let model = snapshot.model().expect("model stays available");
                    assert_eq!(model.training_samples(), snapshot.corpus().len());
                    assert_eq!(snapshot.corpus().texts().len(), snapshot.corpus().labels().len());

                    let result = engine.classify("street light", "not working on avenue");
                    assert!((0.0..=1.0).contains(&result.confidence));
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    let texts = [
        ("zebra crossing paint completely faded", "traffic"),
        ("overgrown hedge hides junction", "traffic"),
        ("stray cattle roaming market", "other"),
    ];
    for (text, category) in texts {
        engine.ingest_feedback(text, category).unwrap();
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        assert!(reader.join().unwrap() > 0);
    }
    assert_eq!(engine.corpus_len(), 19);
}

#[test]
fn test_concurrent_feedback_is_serialized() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ClassificationEngine::new(config_in(&dir)).unwrap());

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                engine
                    .ingest_feedback(&format!("unique complaint number {}", i), "other")
                    .unwrap()
            })
        })
        .collect();

    let mut sizes: Vec<usize> = writers
        .into_iter()
        .map(|w| w.join().unwrap().training_samples)
        .collect();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![17, 18, 19, 20]);
    assert_eq!(engine.corpus_len(), 20);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn shared_engine() -> &'static ClassificationEngine {
        use std::sync::OnceLock;
        static ENGINE: OnceLock<(TempDir, ClassificationEngine)> = OnceLock::new();
        &ENGINE
            .get_or_init(|| {
                let dir = TempDir::new().unwrap();
                let engine = ClassificationEngine::new(config_in(&dir)).unwrap();
                (dir, engine)
            })
            .1
    }

    proptest! {
        #[test]
        fn classify_is_total(title in ".{0,60}", description in ".{0,200}") {
            let result = shared_engine().classify(&title, &description);
            prop_assert!(Category::ALL.contains(&result.category));
            prop_assert!((0.0..=1.0).contains(&result.confidence));
        }

        #[test]
        fn prioritize_is_deterministic(category in "[a-z]{0,12}", description in ".{0,200}") {
            let engine = shared_engine();
            let first = engine.prioritize(&category, &description);
            prop_assert_eq!(first, engine.prioritize(&category, &description));
        }

        #[test]
        fn urgent_words_always_critical(
            category in prop::sample::select(Category::labels()),
            prefix in "[a-z ]{0,30}",
        ) {
            let description = format!("{} emergency", prefix);
            prop_assert_eq!(shared_engine().prioritize(&category, &description), Priority::Critical);
        }
    }
}
