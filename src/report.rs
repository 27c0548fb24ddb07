//! Dump report ingestion and message formatting.
//!
//! A report is classified by content alone: it succeeded when it is non-empty
//! and does not mention [`ERROR_MARKER`]. Every report lands in exactly one of
//! the two [`Digest`] bodies, in the order the files were given.

use std::fmt::{self, Display};
use std::path::Path;

use tracing::debug;

use crate::Result;
use crate::error::IngestError;

/// Case-sensitive marker that flags a report as failed.
pub const ERROR_MARKER: &str = "error";

/// Label used when a report has no usable file name.
pub const MISSING_NAME: &str = "Invalid args file name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub file_name: String,
    pub content: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl Outcome {
    #[must_use]
    pub fn classify(content: &str) -> Self {
        if !content.is_empty() && !content.contains(ERROR_MARKER) {
            Self::Succeeded
        } else {
            Self::Failed
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "success",
            Self::Failed => "failure",
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FileRecord {
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        Outcome::classify(&self.content)
    }

    fn label(&self) -> &str {
        if self.file_name.is_empty() {
            MISSING_NAME
        } else {
            &self.file_name
        }
    }

    fn write_block(&self, title: &str, out: &mut String) {
        let heading = match self.outcome() {
            Outcome::Succeeded => format!(":white_check_mark: ## {title} ran successfully!"),
            Outcome::Failed => format!(":x: ## {title} ran failed!"),
        };
        out.push_str(&heading);
        out.push_str("\n**Filename:** ");
        out.push_str(self.label());
        out.push_str("\n**Content:** \n```");
        out.push_str(&self.content);
        out.push_str("```\n");
    }
}

/// Read every report under `dump_dir`, or none of them.
///
/// Names are kept exactly as given so they can label the message; paths are
/// resolved with [`Path::join`], so absolute names bypass `dump_dir`.
///
/// # Errors
///
/// Returns [`IngestError::Read`] for the first file that cannot be read as
/// UTF-8 text. Records read before it are dropped.
pub fn ingest<I, S>(dump_dir: &Path, names: I) -> Result<Vec<FileRecord>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|name| -> Result<FileRecord> {
            let file_name = name.into();
            let path = dump_dir.join(&file_name);
            let content = std::fs::read_to_string(&path)
                .map_err(|source| IngestError::Read { path: path.clone(), source })?;
            debug!(path = %path.display(), bytes = content.len(), "report read");
            Ok(FileRecord { file_name, content })
        })
        .collect()
}

/// The two outbound message bodies. An empty body means nothing to send.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Digest {
    pub success: String,
    pub failure: String,
}

impl Digest {
    #[must_use]
    pub fn build(records: &[FileRecord], title: &str) -> Self {
        let mut digest = Self::default();
        for record in records {
            let target = match record.outcome() {
                Outcome::Succeeded => &mut digest.success,
                Outcome::Failed => &mut digest.failure,
            };
            record.write_block(title, target);
        }
        digest
    }

    #[must_use]
    pub fn body(&self, outcome: Outcome) -> &str {
        match outcome {
            Outcome::Succeeded => &self.success,
            Outcome::Failed => &self.failure,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failure.is_empty()
    }
}
