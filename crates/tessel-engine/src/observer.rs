//! Hooks invoked by the step loop for layout recording and snapshots.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tessel_grid::{Decomposition, RankLayout, Tile};
use tessel_io::{LayoutLog, SnapshotWriter};

/// Failure reported by an [`Observer`]; carried intact in
/// [`StepError::Observer`](tessel_core::StepError::Observer).
pub type ObserverError = Box<dyn Error + Send + Sync>;

/// Receives a rank's layout once and its state every `out_every` steps.
///
/// Any error aborts the run.
pub trait Observer: Send {
    /// Called once before the first step.
    fn on_layout(&mut self, layout: &RankLayout) -> Result<(), ObserverError>;

    /// Called before step `step` executes, including step 0, with the
    /// active tile.
    fn on_snapshot(
        &mut self,
        step: usize,
        tile: &Tile,
        decomp: &Decomposition,
    ) -> Result<(), ObserverError>;
}

/// Observer that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_layout(&mut self, _layout: &RankLayout) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_snapshot(&mut self, _: usize, _: &Tile, _: &Decomposition) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Writes per-rank CSV snapshots and appends to the shared layout log.
#[derive(Debug)]
pub struct FileObserver {
    snapshots: SnapshotWriter,
    layout: Arc<LayoutLog>,
    written: Vec<PathBuf>,
}

impl FileObserver {
    /// Snapshots go to `snapshots`; layout rows to the shared `layout` log.
    pub fn new(snapshots: SnapshotWriter, layout: Arc<LayoutLog>) -> Self {
        Self {
            snapshots,
            layout,
            written: Vec::new(),
        }
    }

    /// Snapshot files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Observer for FileObserver {
    fn on_layout(&mut self, layout: &RankLayout) -> Result<(), ObserverError> {
        self.layout.append(layout)?;
        Ok(())
    }

    fn on_snapshot(
        &mut self,
        step: usize,
        tile: &Tile,
        decomp: &Decomposition,
    ) -> Result<(), ObserverError> {
        let path = self.snapshots.write(step, decomp.rank(), tile)?;
        tracing::debug!(rank = %decomp.rank(), step, path = %path.display(), "snapshot written");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::RankId;
    use tessel_grid::Periodicity;
    use tessel_core::StepError;
    use tessel_io::{read_layout_csv, IoError};

    #[test]
    fn file_observer_writes_layout_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let snaps = SnapshotWriter::create(dir.path().join("snapshots")).unwrap();
        let log = Arc::new(LayoutLog::create(dir.path().join("rank_layout.csv")).unwrap());
        let mut obs = FileObserver::new(snaps.clone(), Arc::clone(&log));

        let d = Decomposition::init(RankId(0), 1, 3, 2, Periodicity::NONE).unwrap();
        let mut t = Tile::new(3, 2, 1, 1.0, 1.0);
        t.fill_interior(1.5);
        obs.on_layout(&d.layout(1)).unwrap();
        obs.on_snapshot(0, &t, &d).unwrap();

        assert_eq!(read_layout_csv(log.path()).unwrap(), vec![d.layout(1)]);
        assert_eq!(obs.written(), &[snaps.path_for(0, RankId(0))]);
        assert_eq!(snaps.read(0, RankId(0)).unwrap(), vec![vec![1.5; 3]; 2]);
    }

    #[test]
    fn write_failure_keeps_the_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let snaps = SnapshotWriter::create(dir.path().join("snapshots")).unwrap();
        let log = Arc::new(LayoutLog::create(dir.path().join("rank_layout.csv")).unwrap());
        let mut obs = FileObserver::new(snaps, log);
        std::fs::remove_dir_all(dir.path().join("snapshots")).unwrap();

        let d = Decomposition::init(RankId(0), 1, 2, 2, Periodicity::NONE).unwrap();
        let err = obs.on_snapshot(0, &Tile::new(2, 2, 1, 1.0, 1.0), &d).unwrap_err();
        assert!(matches!(err.downcast_ref::<IoError>(), Some(IoError::Io(_))));

        let step = StepError::Observer(err);
        let source = std::error::Error::source(&step).unwrap();
        assert!(source.downcast_ref::<IoError>().is_some());
    }
}
