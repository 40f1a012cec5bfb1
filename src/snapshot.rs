use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{
    error::EngineError,
    world::{World, WorldSnapshot},
};

#[derive(Serialize)]
struct TickSnapshot {
    tick: u64,
    #[serde(flatten)]
    world: WorldSnapshot,
}

/// Writes `<dir>/<scenario>/tick_NNNNNN.json` every `interval_ticks` steps.
/// An interval of zero disables output.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(&self, world: &World, scenario_name: &str, tick: u64) -> Result<Option<PathBuf>, EngineError> {
        if self.interval_ticks == 0 || tick % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.output_dir.join(scenario_name);
        fs::create_dir_all(&dir).map_err(|source| EngineError::Snapshot {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(format!("tick_{tick:06}.json"));
        let snapshot = TickSnapshot {
            tick,
            world: world.snapshot(scenario_name),
        };
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json).map_err(|source| EngineError::Snapshot {
            path: path.clone(),
            source,
        })?;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn writes_only_on_interval() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 3);
        let world = test_support::tiny_world();
        assert!(writer.maybe_write(&world, "tiny", 1).unwrap().is_none());
        let path = writer.maybe_write(&world, "tiny", 3).unwrap().unwrap();
        assert!(path.ends_with("tiny/tick_000003.json"));
        let body: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(body["tick"], 3);
        assert_eq!(body["aircraft"][0]["id"], "PL-1");
    }

    #[test]
    fn zero_interval_disables_output() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path(), 0);
        let world = test_support::tiny_world();
        assert!(writer.maybe_write(&world, "tiny", 0).unwrap().is_none());
    }
}
