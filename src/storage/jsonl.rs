//! JSONL storage for roster, fleet and mission records
//!
//! Each record kind lives in its own file under `.fleet/` with one JSON
//! object per line, sorted by id. Uses file locking for concurrent access
//! safety.

use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Drone, DroneId, Mission, MissionId, Pilot, PilotId};

/// A record kind stored in its own JSONL file
pub trait Record: Serialize + DeserializeOwned {
    type Id: Ord + Display;

    /// Singular name used in error messages
    const KIND: &'static str;

    /// File name under `.fleet/`
    const FILE: &'static str;

    fn id(&self) -> Self::Id;
}

impl Record for Pilot {
    type Id = PilotId;
    const KIND: &'static str = "pilot";
    const FILE: &'static str = "pilots.jsonl";

    fn id(&self) -> PilotId {
        self.id
    }
}

impl Record for Drone {
    type Id = DroneId;
    const KIND: &'static str = "drone";
    const FILE: &'static str = "drones.jsonl";

    fn id(&self) -> DroneId {
        self.id
    }
}

impl Record for Mission {
    type Id = MissionId;
    const KIND: &'static str = "mission";
    const FILE: &'static str = "missions.jsonl";

    fn id(&self) -> MissionId {
        self.id
    }
}

/// Store for one record kind in JSONL format
pub struct JsonlStore<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: Record> JsonlStore<T> {
    /// Creates a new store at the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Creates the default store for a project
    pub fn for_project(project_root: &Path) -> Self {
        Self::new(project_root.join(".fleet").join(T::FILE))
    }

    /// Returns the path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records in file order
    ///
    /// Duplicate ids are returned as-is; snapshot validation reports them.
    pub fn read_all(&self) -> Result<Vec<T>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", T::KIND, self.path.display()))?;

        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {} store", T::KIND))?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;

            if line.trim().is_empty() {
                continue;
            }

            let record: T = serde_json::from_str(&line).with_context(|| {
                format!(
                    "Failed to parse {} at {}:{}",
                    T::KIND,
                    self.path.display(),
                    line_num + 1
                )
            })?;

            records.push(record);
        }

        Ok(records)
    }

    /// Writes all records to the store (full rewrite, sorted by id)
    pub fn write_all(&self, records: &[T]) -> Result<()> {
        self.stage(records)?.commit()
    }

    /// Writes the records to a temp file next to the store
    ///
    /// Nothing visible changes until [`Staged::commit`]. Dropping the
    /// staged write removes the temp file.
    pub fn stage(&self, records: &[T]) -> Result<Staged> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let staged = Staged {
            temp_path: self.path.with_extension("jsonl.tmp"),
            path: self.path.clone(),
            committed: false,
        };

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&staged.temp_path)
            .with_context(|| format!("Failed to create temp file: {}", staged.temp_path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to acquire write lock on {} store", T::KIND))?;

        let mut writer = BufWriter::new(&file);

        let mut sorted: Vec<&T> = records.iter().collect();
        sorted.sort_by_key(|r| r.id());

        for record in sorted {
            let line = serde_json::to_string(record)
                .with_context(|| format!("Failed to serialize {} {}", T::KIND, record.id()))?;
            writeln!(writer, "{}", line).with_context(|| format!("Failed to write {}", T::KIND))?;
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush {} store", T::KIND))?;
        file.sync_all()
            .with_context(|| format!("Failed to sync {} store", T::KIND))?;

        Ok(staged)
    }

    /// Feeds the raw file contents into a version digest
    pub fn digest_into(&self, hasher: &mut blake3::Hasher) -> Result<()> {
        hasher.update(T::FILE.as_bytes());
        hasher.update(&[0]);

        if !self.path.exists() {
            return Ok(());
        }

        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open {} store: {}", T::KIND, self.path.display()))?;
        file.lock_shared()
            .with_context(|| format!("Failed to acquire read lock on {} store", T::KIND))?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {} store", T::KIND))?;
        hasher.update(&bytes);
        Ok(())
    }
}

/// A complete temp file waiting to replace its store
#[must_use]
pub struct Staged {
    temp_path: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl Staged {
    /// Moves the temp file into place
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                self.temp_path.display(),
                self.path.display()
            )
        })?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.temp_path);
        }
    }
}
