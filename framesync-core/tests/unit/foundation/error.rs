use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SyncError::out_of_range("x")
            .to_string()
            .contains("out of range:")
    );
    assert!(
        SyncError::audio_unavailable("x")
            .to_string()
            .contains("audio sync unavailable:")
    );
    assert!(
        SyncError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        SyncError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        SyncError::EmptyScene { scene: 3 }
            .to_string()
            .contains("scene 3")
    );
}

#[test]
fn only_audio_sync_is_recoverable() {
    assert!(SyncError::audio_unavailable("underrun").is_recoverable());
    assert!(!SyncError::out_of_range("9:9").is_recoverable());
    assert!(!SyncError::EmptyMovie.is_recoverable());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SyncError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
