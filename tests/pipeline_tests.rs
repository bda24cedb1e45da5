use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use voxname::audio::{AudioClip, write_wav};
use voxname::error::NormalizeError;
use voxname::normalize::Normalizer;
use voxname::pipeline::{Manifest, handoff};
use voxname::recognize::{RecognitionError, Recognizer, ScriptedRecognizer};
use voxname::{Converter, ConverterConfig, RunSummary};

/// Data root with `SPEECH/` holding one short WAV per name.
fn data_root(names: &[&str]) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    let speech = root.path().join("SPEECH");
    fs::create_dir(&speech).unwrap();
    for (i, name) in names.iter().enumerate() {
        let samples: Vec<i16> = (0..400).map(|s| ((s * (i + 1)) % 512) as i16).collect();
        write_wav(&speech.join(name), 16000, 1, &samples).unwrap();
    }
    root
}

fn config(root: &Path, normalize: bool) -> ConverterConfig {
    let mut config = ConverterConfig::for_root(root);
    config.normalize = normalize;
    config.normalize_window = 2;
    config.recognize_window = 2;
    config.channel_cap = 2;
    config
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Copies input to output, except for the files it was told to fail.
struct CopyNormalizer {
    fail: Vec<String>,
}

impl Normalizer for CopyNormalizer {
    fn normalize(&self, input: &Path, output: &Path) -> Result<(), NormalizeError> {
        let name = input.file_name().unwrap().to_string_lossy().into_owned();
        if self.fail.contains(&name) {
            return Err(NormalizeError::MissingOutput {
                program: "copy".to_string(),
                output: output.to_path_buf(),
            });
        }
        fs::copy(input, output)
            .map(|_| ())
            .map_err(|source| NormalizeError::Spawn {
                program: "copy".to_string(),
                source,
            })
    }
}

/// Echoes the stem, but deletes the source of `victim` while recognizing it so its rename fails.
/// Counts calls that started and calls that returned.
struct DeletingRecognizer {
    source_dir: PathBuf,
    victim: String,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl DeletingRecognizer {
    fn new(source_dir: PathBuf, victim: &str) -> Self {
        Self {
            source_dir,
            victim: victim.to_string(),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }
}

impl Recognizer for DeletingRecognizer {
    fn recognize(&self, audio: &AudioClip, _language: &str) -> Result<String, RecognitionError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        if audio.name == self.victim {
            fs::remove_file(self.source_dir.join(&audio.name)).unwrap();
        }
        let stem = Path::new(&audio.name).file_stem().unwrap().to_string_lossy().into_owned();
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(stem)
    }

    fn name(&self) -> &str {
        "deleting"
    }
}

// --- end-to-end runs ---

#[tokio::test]
async fn test_five_files_without_normalization() {
    let names = ["a.wav", "b.wav", "c.wav", "d.wav", "e.wav"];
    let root = data_root(&names);
    let recognizer = ScriptedRecognizer::new()
        .with_text("a.wav", "jeden")
        .with_text("b.wav", "dwa")
        .with_text("c.wav", "trzy")
        .with_text("d.wav", "cztery")
        .with_text("e.wav", "pięć");
    let recognizer = Arc::new(recognizer);
    let converter = Converter::new(config(root.path(), false), recognizer.clone());

    let summary = converter.run().await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            listed: 5,
            dropped: 0,
            fallbacks: 0,
            renamed: 5
        }
    );
    assert_eq!(
        listing(&root.path().join("converted")),
        vec!["cztery.wav", "dwa.wav", "jeden.wav", "pięć.wav", "trzy.wav"]
    );
    assert!(!root.path().join("tmp").exists());
    assert!(listing(&root.path().join("SPEECH")).is_empty());
    assert_eq!(recognizer.calls(), 5);
}

#[tokio::test]
async fn test_duplicate_labels_get_suffixes() {
    let root = data_root(&["a.wav", "b.wav", "c.wav"]);
    let recognizer = ScriptedRecognizer::new()
        .with_text("a.wav", "dog")
        .with_text("b.wav", "dog")
        .with_text("c.wav", "cat");
    let converter = Converter::new(config(root.path(), false), Arc::new(recognizer));

    let summary = converter.run().await.unwrap();

    assert_eq!(summary.renamed, 3);
    assert_eq!(
        listing(&root.path().join("converted")),
        vec!["cat.wav", "dog.wav", "dog_1.wav"]
    );
}

#[tokio::test]
async fn test_ambiguous_audio_keeps_original_name() {
    let root = data_root(&["A_01.WAV", "A_02.WAV", "A_03.WAV", "A_04.WAV"]);
    let recognizer = ScriptedRecognizer::new()
        .with_text("A_01.WAV", "kot")
        .with_failure("A_02.WAV", RecognitionError::AmbiguousAudio)
        .with_text("A_03.WAV", "pies")
        .with_failure(
            "A_04.WAV",
            RecognitionError::ServiceUnavailable("quota".to_string()),
        );
    let converter = Converter::new(config(root.path(), false), Arc::new(recognizer));

    let summary = converter.run().await.unwrap();

    assert_eq!(summary.renamed, 4);
    assert_eq!(summary.fallbacks, 2);
    // The upper-case extension is kept rather than doubled.
    assert_eq!(
        listing(&root.path().join("converted")),
        vec!["A_02.WAV", "A_04.WAV", "kot.wav", "pies.wav"]
    );
}

#[tokio::test]
async fn test_failed_normalization_drops_file() {
    let root = data_root(&["a.wav", "b.wav", "c.wav", "d.wav"]);
    let recognizer = ScriptedRecognizer::new();
    let converter = Converter::new(config(root.path(), true), Arc::new(recognizer))
        .with_normalizer(Arc::new(CopyNormalizer {
            fail: vec!["c.wav".to_string()],
        }));

    let summary = converter.run().await.unwrap();

    assert_eq!(summary.listed, 4);
    assert_eq!(summary.dropped, 1);
    assert_eq!(summary.renamed, 3);
    assert_eq!(
        listing(&root.path().join("converted")),
        vec!["a.wav", "b.wav", "d.wav"]
    );
    // Normalized copies were moved, so the staging directory was empty and removed.
    assert!(!root.path().join("tmp").exists());
    // Sources stay in place when a normalized copy is what gets renamed.
    assert_eq!(listing(&root.path().join("SPEECH")).len(), 4);
}

#[tokio::test]
async fn test_empty_source_directory() {
    let root = data_root(&[]);
    let converter = Converter::new(config(root.path(), false), Arc::new(ScriptedRecognizer::new()));
    let summary = converter.run().await.unwrap();
    assert_eq!(summary, RunSummary::default());
    assert!(root.path().join("converted").is_dir());
}

#[tokio::test]
async fn test_overlong_transcript_does_not_abort_batch() {
    let root = data_root(&["a.wav", "b.wav", "c.wav"]);
    let long = "słowo ".repeat(60);
    let recognizer = ScriptedRecognizer::new().with_text("b.wav", &long);
    let converter = Converter::new(config(root.path(), false), Arc::new(recognizer));

    let summary = converter.run().await.unwrap();

    assert_eq!(summary.renamed, 3);
    let converted = listing(&root.path().join("converted"));
    assert_eq!(converted.len(), 3);
    assert!(converted.contains(&"a.wav".to_string()));
    assert!(converted.contains(&"c.wav".to_string()));
    assert!(converted.iter().any(|n| n.starts_with("słowo słowo") && n.len() <= 255));
}

// --- supplemented behavior ---

#[tokio::test]
async fn test_include_list_and_manifest() {
    let root = data_root(&["a.wav", "b.wav", "c.wav"]);
    let include = root.path().join("wanted.txt");
    fs::write(&include, "# second pass\nc.wav\na.wav\n").unwrap();
    let manifest_path = root.path().join("index.json");

    let mut config = config(root.path(), false);
    config.include_list = Some(include);
    config.manifest_path = Some(manifest_path.clone());
    let recognizer = ScriptedRecognizer::new()
        .with_text("a.wav", "dom")
        .with_failure("c.wav", RecognitionError::AmbiguousAudio);
    let summary = Converter::new(config, Arc::new(recognizer)).run().await.unwrap();

    assert_eq!(summary.listed, 2);
    assert_eq!(listing(&root.path().join("SPEECH")), vec!["b.wav"]);

    let manifest = Manifest::read(&manifest_path).unwrap();
    assert_eq!(manifest.len(), 2);
    let a = manifest.get("a.wav").unwrap();
    assert_eq!(a.converted, "dom.wav");
    assert!(a.recognized);
    let c = manifest.get("c.wav").unwrap();
    assert_eq!(c.converted, "c.wav");
    assert!(!c.recognized);
}

#[tokio::test]
async fn test_existing_target_files_are_not_overwritten() {
    let root = data_root(&["a.wav"]);
    let converted = root.path().join("converted");
    fs::create_dir(&converted).unwrap();
    fs::write(converted.join("dog.wav"), b"keep").unwrap();

    let recognizer = ScriptedRecognizer::new().with_text("a.wav", "dog");
    Converter::new(config(root.path(), false), Arc::new(recognizer))
        .run()
        .await
        .unwrap();

    assert_eq!(fs::read(converted.join("dog.wav")).unwrap(), b"keep");
    assert!(converted.join("dog_1.wav").is_file());
}

// --- fatal errors ---

#[tokio::test]
async fn test_uncreatable_target_is_fatal() {
    let root = data_root(&["a.wav", "b.wav"]);
    let blocker = root.path().join("not_a_dir");
    fs::write(&blocker, b"x").unwrap();

    let mut config = config(root.path(), false);
    config.target_dir = blocker.join("converted");
    let err = Converter::new(config, Arc::new(ScriptedRecognizer::new()))
        .run()
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("target directory"));
    // Nothing was moved.
    assert_eq!(listing(&root.path().join("SPEECH")).len(), 2);
}

#[tokio::test]
async fn test_failed_rename_mid_batch_is_fatal_after_workers_drain() {
    let names: Vec<String> = (0..12).map(|i| format!("f{i:02}.wav")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let root = data_root(&refs);
    let recognizer = Arc::new(DeletingRecognizer::new(root.path().join("SPEECH"), "f01.wav"));

    let err = Converter::new(config(root.path(), false), recognizer.clone())
        .run()
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("rename"));
    // Every recognition handed to a worker finished before the error came back.
    let started = recognizer.started.load(Ordering::SeqCst);
    assert_eq!(recognizer.finished.load(Ordering::SeqCst), started);
    assert!(started >= 2);
    assert!(started < names.len());
    // Only the record ahead of the failure was renamed; the rest stay in place.
    assert_eq!(listing(&root.path().join("converted")), vec!["f00.wav"]);
    assert_eq!(listing(&root.path().join("SPEECH")).len(), names.len() - 2);
}

#[tokio::test]
async fn test_missing_source_directory_is_fatal() {
    let root = tempfile::tempdir().unwrap();
    let err = Converter::new(config(root.path(), false), Arc::new(ScriptedRecognizer::new()))
        .run()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("source directory"));
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let root = data_root(&["a.wav"]);
    let mut config = config(root.path(), false);
    config.recognize_window = 0;
    assert!(
        Converter::new(config, Arc::new(ScriptedRecognizer::new()))
            .run()
            .await
            .is_err()
    );
    assert_eq!(listing(&root.path().join("SPEECH")), vec!["a.wav"]);
}

// --- handoff protocol ---

#[tokio::test]
async fn test_consumer_sees_every_record_then_marker_once() {
    let (tx, mut rx) = handoff::<PathBuf>(4);
    let k = 50;
    let producer = tokio::spawn(async move {
        for i in 0..k {
            tx.send(PathBuf::from(format!("{i}.wav"))).await.unwrap();
        }
        tx.finish().await.unwrap();
    });

    let mut received = Vec::new();
    while let Some(path) = rx.recv().await.unwrap() {
        received.push(path);
    }
    producer.await.unwrap();

    assert_eq!(received.len(), k);
    assert_eq!(received[0], PathBuf::from("0.wav"));
    assert_eq!(received[k - 1], PathBuf::from(format!("{}.wav", k - 1)));
    // The marker is reported once; later calls keep returning end-of-batch.
    assert!(rx.is_done());
    assert_eq!(rx.recv().await.unwrap(), None);
}
