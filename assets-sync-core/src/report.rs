//! Per-file outcomes and the run summary.

use std::fmt;

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Imported { record_id: i64 },
    Skipped { existing_id: i64 },
    Errored { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file_name: String,
    pub target_folder_path: String,
    pub outcome: FileOutcome,
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            FileOutcome::Imported { record_id } => write!(
                f,
                "✓ IMPORTED: {}/{} (ID: {})",
                self.target_folder_path, self.file_name, record_id
            ),
            FileOutcome::Skipped { existing_id } => write!(
                f,
                "⚠ SKIPPED: {} (already exists in {} with ID: {})",
                self.file_name, self.target_folder_path, existing_id
            ),
            FileOutcome::Errored { message } => {
                write!(f, "✗ ERROR importing {}: {}", self.file_name, message)
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub files: Vec<FileReport>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Imported { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Skipped { .. }))
    }

    pub fn errors(&self) -> usize {
        self.count(|o| matches!(o, FileOutcome::Errored { .. }))
    }

    fn count(&self, pred: impl Fn(&FileOutcome) -> bool) -> usize {
        self.files.iter().filter(|r| pred(&r.outcome)).count()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Import Complete ===")?;
        writeln!(f, "Successfully imported: {}", self.imported())?;
        writeln!(f, "Errors: {}", self.errors())?;
        write!(f, "Skipped (already exists): {}", self.skipped())
    }
}
