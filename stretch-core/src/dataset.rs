//! Muscle dataset filtering.
//!
//! Input shape:
//!
//! ```json
//! {
//!   "metadata": { ... },
//!   "muscles": {
//!     "Hamstrings": {
//!       "info": { ... },
//!       "exercises": [
//!         { "title": "...", "abstract": "...", "protocol": { "steps": ["..."] } }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Each exercise is turned into one candidate text, checked, and kept when
//! relevant. Muscles without kept exercises are dropped. The partial result
//! is checkpointed after every muscle so an interrupted run leaves usable
//! output behind. Exercise objects are carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::batch::BatchCoordinator;
use crate::error::{Error, Result};
use crate::stats::StatsSnapshot;
use crate::types::CandidateText;

/// File name of the per-muscle checkpoint, next to the output file.
pub const CHECKPOINT_FILE_NAME: &str = "stretching_filtered_data_temp.json";

/// Top-level dataset document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuscleDataset {
    #[serde(default)]
    pub metadata: Value,
    /// Muscle name to entry, in document order
    pub muscles: Map<String, Value>,
}

/// One muscle with its exercises.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MuscleEntry {
    #[serde(default)]
    pub info: Value,
    #[serde(default)]
    pub exercises: Vec<Value>,
}

/// Fields of an exercise that feed the candidate text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExerciseText {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "abstract")]
    pub summary: Option<String>,
    #[serde(default)]
    pub protocol: Option<Protocol>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Protocol {
    #[serde(default)]
    pub steps: Option<Vec<String>>,
}

impl ExerciseText {
    pub fn from_value(value: &Value) -> Result<Self> {
        Self::deserialize(value).map_err(|e| Error::dataset(format!("malformed exercise: {}", e)))
    }

    /// `"<title>. <abstract>"`, followed by the protocol steps when present.
    pub fn candidate_text(&self) -> String {
        let mut text = format!(
            "{}. {}",
            self.title.as_deref().unwrap_or_default(),
            self.summary.as_deref().unwrap_or_default()
        );
        if let Some(steps) = self.protocol.as_ref().and_then(|p| p.steps.as_ref()) {
            text.push(' ');
            text.push_str(&steps.join(" "));
        }
        text
    }
}

/// How a checked exercise is judged relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Keep when the relevance policy says so
    #[default]
    Policy,
    /// Keep when the endpoint supports the claim, ignoring the policy
    Verdict,
}

/// Knobs for [`run_filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    /// Only the first N muscles, in document order
    pub limit_muscles: Option<usize>,
    /// Only the first N exercises of each muscle
    pub exercises_per_muscle: Option<usize>,
    pub selection: Selection,
    /// Override for the checkpoint location
    pub checkpoint_path: Option<PathBuf>,
}

impl FilterOptions {
    pub fn with_limit_muscles(mut self, limit: Option<usize>) -> Self {
        self.limit_muscles = limit;
        self
    }

    pub fn with_exercises_per_muscle(mut self, limit: Option<usize>) -> Self {
        self.exercises_per_muscle = limit;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_checkpoint_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.checkpoint_path = Some(path.into());
        self
    }
}

/// What a filter run did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSummary {
    pub muscles_processed: usize,
    pub muscles_kept: usize,
    pub exercises_checked: usize,
    pub exercises_kept: usize,
    pub output_path: PathBuf,
    pub checkpoint_path: PathBuf,
    pub stats: StatsSnapshot,
}

impl std::fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== filter summary ===")?;
        writeln!(
            f,
            "muscles kept:      {}/{}",
            self.muscles_kept, self.muscles_processed
        )?;
        writeln!(
            f,
            "exercises kept:    {}/{}",
            self.exercises_kept, self.exercises_checked
        )?;
        write!(f, "output:            {}", self.output_path.display())
    }
}

impl MuscleDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::dataset(format!("malformed dataset {}: {}", path.display(), e))
        })
    }

    /// Muscles in document order, decoded.
    pub fn entries(&self) -> Result<Vec<(String, MuscleEntry)>> {
        self.muscles
            .iter()
            .map(|(name, value)| {
                MuscleEntry::deserialize(value)
                    .map(|entry| (name.clone(), entry))
                    .map_err(|e| Error::dataset(format!("malformed muscle `{}`: {}", name, e)))
            })
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: MuscleEntry) -> Result<()> {
        self.muscles.insert(name.into(), serde_json::to_value(entry)?);
        Ok(())
    }

    pub fn exercise_count(&self) -> usize {
        self.muscles
            .values()
            .filter_map(|m| m.get("exercises").and_then(Value::as_array))
            .map(Vec::len)
            .sum()
    }

    /// Pretty-printed, non-ASCII characters kept verbatim.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush().map_err(|e| Error::io(path, e))
    }
}

/// Default checkpoint path for `output`.
pub fn checkpoint_path_for(output: &Path) -> PathBuf {
    output
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(CHECKPOINT_FILE_NAME)
}

/// Filter `dataset` through `coordinator` and write the result to `output`.
pub async fn filter_dataset(
    coordinator: &BatchCoordinator,
    dataset: &MuscleDataset,
    output: &Path,
    options: &FilterOptions,
) -> Result<FilterSummary> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let checkpoint = options
        .checkpoint_path
        .clone()
        .unwrap_or_else(|| checkpoint_path_for(output));

    let mut muscles = dataset.entries()?;
    if let Some(limit) = options.limit_muscles {
        muscles.truncate(limit);
    }

    let mut filtered = MuscleDataset {
        metadata: dataset.metadata.clone(),
        muscles: Map::new(),
    };
    let mut exercises_checked = 0;
    let total_muscles = muscles.len();

    for (index, (name, mut entry)) in muscles.into_iter().enumerate() {
        if let Some(limit) = options.exercises_per_muscle {
            entry.exercises.truncate(limit);
        }
        info!(
            muscle = %name,
            index = index + 1,
            of = total_muscles,
            exercises = entry.exercises.len(),
            "filtering muscle"
        );

        let candidates = entry
            .exercises
            .iter()
            .enumerate()
            .map(|(i, exercise)| {
                ExerciseText::from_value(exercise).map(|text| {
                    (
                        text.title.clone().unwrap_or_default(),
                        CandidateText::new(text.candidate_text(), format!("{}/{}", name, i)),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;
        exercises_checked += candidates.len();

        let verdicts = judge(coordinator, &candidates, options.selection).await?;

        let mut kept = Vec::new();
        for ((exercise, (title, candidate)), (relevant, confidence)) in
            entry.exercises.into_iter().zip(candidates).zip(verdicts)
        {
            if relevant {
                info!(%title, confidence, source = %candidate.source, "keeping exercise");
                kept.push(exercise);
            } else {
                info!(%title, confidence, source = %candidate.source, "dropping exercise");
            }
        }

        if !kept.is_empty() {
            filtered.insert(
                name,
                MuscleEntry {
                    info: entry.info,
                    exercises: kept,
                },
            )?;
        }

        filtered.save(&checkpoint)?;
        debug!(path = %checkpoint.display(), "checkpoint written");
    }

    filtered.save(output)?;

    let summary = FilterSummary {
        muscles_processed: total_muscles,
        muscles_kept: filtered.muscles.len(),
        exercises_checked,
        exercises_kept: filtered.exercise_count(),
        output_path: output.to_path_buf(),
        checkpoint_path: checkpoint,
        stats: coordinator.stats().snapshot(),
    };
    info!(
        muscles_kept = summary.muscles_kept,
        exercises_kept = summary.exercises_kept,
        output = %output.display(),
        "filtering complete"
    );
    Ok(summary)
}

/// Load `input`, filter it, and write `output`.
pub async fn run_filter(
    coordinator: &BatchCoordinator,
    input: &Path,
    output: &Path,
    options: &FilterOptions,
) -> Result<FilterSummary> {
    let dataset = MuscleDataset::load(input)?;
    info!(
        input = %input.display(),
        muscles = dataset.muscles.len(),
        "loaded dataset"
    );
    filter_dataset(coordinator, &dataset, output, options).await
}

/// `(relevant, confidence)` per candidate.
async fn judge(
    coordinator: &BatchCoordinator,
    candidates: &[(String, CandidateText)],
    selection: Selection,
) -> Result<Vec<(bool, f64)>> {
    let texts: Vec<&str> = candidates.iter().map(|(_, c)| c.text.as_str()).collect();
    Ok(match selection {
        Selection::Verdict => coordinator
            .check_batch(&texts)
            .await?
            .into_iter()
            .map(|r| (!r.is_failure() && r.supported, r.confidence))
            .collect(),
        Selection::Policy => coordinator
            .classify_batch(&texts)
            .await?
            .into_iter()
            .map(|o| (o.is_relevant, o.confidence))
            .collect(),
    })
}
