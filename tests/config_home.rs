mod support;

use tempfile::tempdir;
use tracknet::config::{config_path, load_or_default, save_to_path};
use tracknet::ml::cnn::TrainingBackend;

use support::env::ConfigHomeGuard;

#[test]
fn default_config_lives_under_config_home() {
    let home = tempdir().unwrap();
    let _guard = ConfigHomeGuard::set(home.path().to_path_buf());

    let path = config_path().unwrap();
    assert_eq!(path, home.path().join(".tracknet").join("config.toml"));

    let defaults = load_or_default().unwrap();
    assert_eq!(defaults.training.epochs, 50);
    assert_eq!(defaults.training.batch_size, 8);
    assert_eq!(defaults.dataset.extensions, vec!["mp3"]);

    let mut custom = defaults.clone();
    custom.dataset.audio_dir = home.path().join("tracks");
    custom.training.epochs = 5;
    custom.training.backend = TrainingBackend::Wgpu;
    save_to_path(&custom, &path).unwrap();

    let loaded = load_or_default().unwrap();
    assert_eq!(loaded.training.epochs, 5);
    assert_eq!(loaded.training.backend, TrainingBackend::Wgpu);
    assert_eq!(loaded.dataset.audio_dir, home.path().join("tracks"));
}
