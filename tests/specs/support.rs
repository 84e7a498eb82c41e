use hive::{FakeMuxDriver, Hive, MuxDriver, QualityAssessor, StubAssessor};
use std::sync::Arc;

/// A `Hive` rooted in a fresh temp directory, backed by a [`FakeMuxDriver`]
/// so these specs never shell out to a real `tmux` binary. Returns the
/// fake driver too, so a spec can seed pane output or assert on what was
/// sent.
pub fn test_hive() -> (tempfile::TempDir, Hive, Arc<FakeMuxDriver>) {
    test_hive_with_scores(vec![100.0])
}

pub fn test_hive_with_scores(scores: Vec<f64>) -> (tempfile::TempDir, Hive, Arc<FakeMuxDriver>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let fake = Arc::new(FakeMuxDriver::new());
    let mux: Arc<dyn MuxDriver> = fake.clone();
    let assessor: Arc<dyn QualityAssessor> = Arc::new(StubAssessor::new(scores));
    let hive = Hive::with_mux(dir.path(), mux, "hive-specs", assessor).expect("construct Hive");
    (dir, hive, fake)
}
