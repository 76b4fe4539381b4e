mod support;

use std::collections::BTreeSet;

use tempfile::tempdir;
use tracknet::analysis::Preprocessor;
use tracknet::analysis::mel::MelConfig;
use tracknet::dataset::{ClassSizing, build_dataset, plan_labels};

use support::mp3::write_silent_mp3;
use support::wav::{SAMPLE_RATE, tone, write_garbage, write_tone, write_wav};

fn wav_only() -> Vec<String> {
    vec!["wav".to_string()]
}

#[test]
fn every_decodable_track_gets_its_sorted_index() {
    let dir = tempdir().unwrap();
    for (name, freq) in [("d.wav", 880.0), ("a.wav", 220.0), ("c.wav", 660.0), ("b.wav", 440.0)] {
        write_tone(&dir.path().join(name), freq, 1.0);
    }
    let mut preprocessor = Preprocessor::new(&MelConfig::default()).unwrap();
    let dataset = build_dataset(dir.path(), &wav_only(), &mut preprocessor).unwrap();

    assert_eq!(dataset.file_names, vec!["a.wav", "b.wav", "c.wav", "d.wav"]);
    assert_eq!(dataset.labels, vec![0, 1, 2, 3]);
    assert_eq!(dataset.features.shape(), &[4, 128, 216, 1]);
    assert!(dataset.skipped.is_empty());
    assert!(
        dataset
            .features
            .iter()
            .all(|v| (0.0..=1.0).contains(v))
    );
}

#[test]
fn mp3_tracks_decode_into_the_dataset() {
    let dir = tempdir().unwrap();
    for name in ["c.mp3", "a.mp3", "b.mp3"] {
        write_silent_mp3(&dir.path().join(name), 5.5);
    }
    let extensions = vec!["mp3".to_string()];
    let mut preprocessor = Preprocessor::new(&MelConfig::default()).unwrap();
    let dataset = build_dataset(dir.path(), &extensions, &mut preprocessor).unwrap();

    assert!(dataset.skipped.is_empty(), "{:?}", dataset.skipped);
    assert_eq!(dataset.file_names, vec!["a.mp3", "b.mp3", "c.mp3"]);
    assert_eq!(dataset.labels, vec![0, 1, 2]);
    assert_eq!(dataset.features.shape(), &[3, 128, 216, 1]);
    assert!(dataset.features.iter().all(|v| *v == 0.0));
}

#[test]
fn undecodable_track_leaves_one_label_missing() {
    let dir = tempdir().unwrap();
    write_tone(&dir.path().join("a.wav"), 220.0, 1.0);
    write_garbage(&dir.path().join("b.wav"));
    write_tone(&dir.path().join("c.wav"), 660.0, 1.0);
    let mut preprocessor = Preprocessor::new(&MelConfig::default()).unwrap();
    let dataset = build_dataset(dir.path(), &wav_only(), &mut preprocessor).unwrap();

    assert_eq!(dataset.len(), 2);
    let labels: BTreeSet<usize> = dataset.labels.iter().copied().collect();
    assert_eq!(labels, BTreeSet::from([0, 2]));
    assert_eq!(dataset.skipped.len(), 1);
    assert_eq!(dataset.skipped[0].file_name, "b.wav");

    let compatible = plan_labels(&dataset, ClassSizing::FileCount);
    assert_eq!(compatible.num_classes, 3);
    let compact = plan_labels(&dataset, ClassSizing::Processed);
    assert_eq!(compact.num_classes, 2);
    assert_eq!(compact.labels, vec![0, 1]);
}

#[test]
fn long_track_matches_its_first_five_seconds() {
    let dir = tempdir().unwrap();
    let full = tone(330.0, 7.0);
    let prefix = &full[..(5 * SAMPLE_RATE) as usize];
    write_wav(&dir.path().join("long.wav"), &full);
    write_wav(&dir.path().join("prefix.wav"), prefix);

    let mut preprocessor = Preprocessor::new(&MelConfig::default()).unwrap();
    let long = preprocessor
        .spectrogram_from_file(&dir.path().join("long.wav"))
        .unwrap();
    let short = preprocessor
        .spectrogram_from_file(&dir.path().join("prefix.wav"))
        .unwrap();
    assert_eq!(long.values().dim(), (128, 216));
    for (a, b) in long.values().iter().zip(short.values().iter()) {
        assert!((a - b).abs() < 1e-5);
    }
}

#[test]
fn other_extensions_are_ignored() {
    let dir = tempdir().unwrap();
    write_tone(&dir.path().join("a.wav"), 220.0, 1.0);
    write_tone(&dir.path().join("b.WAV"), 440.0, 1.0);
    std::fs::write(dir.path().join("cover.jpg"), b"jpeg").unwrap();
    let mut preprocessor = Preprocessor::new(&MelConfig::default()).unwrap();
    let dataset = build_dataset(dir.path(), &wav_only(), &mut preprocessor).unwrap();
    assert_eq!(dataset.file_names, vec!["a.wav", "b.WAV"]);
}
