use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::ExtractError;
use crate::extractor::{CompanyRecord, Extractor};
use crate::table;

/// Environment variable carrying the full path the child should write to.
pub const OUTPUT_PATH_ENV: &str = "SCRAPER_OUTPUT_PATH";

pub const DEFAULT_OUTPUT_FILE: &str = "portfolio_companies.csv";

/// Where the child process leaves its CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    Stdout,
    /// A fixed file name inside the per-invocation scratch directory.
    File(String),
}

/// Out-of-process extractor: runs an external program with the page URL as
/// its final argument and reads `Company,URL` CSV back from it.
///
/// Every invocation gets its own scratch directory, which is the child's
/// working directory and is removed once the call returns or is dropped.
#[derive(Debug, Clone)]
pub struct SubprocessExtractor {
    program: PathBuf,
    args: Vec<String>,
    output: OutputMode,
}

impl SubprocessExtractor {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, output: OutputMode) -> Self {
        Self {
            program: program.into(),
            args,
            output,
        }
    }

    async fn run(&self, url: &str, scratch: &Path) -> Result<Vec<CompanyRecord>, ExtractError> {
        let output_file = match &self.output {
            OutputMode::File(name) => Some(scratch.join(name)),
            OutputMode::Stdout => None,
        };

        tracing::debug!(
            program = %self.program.display(),
            scratch = %scratch.display(),
            "spawning extractor process"
        );

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(url)
            .current_dir(scratch)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        if let Some(path) = &output_file {
            command.env(OUTPUT_PATH_ENV, path);
        }

        let output = command.output().await.map_err(ExtractError::Spawn)?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(ExtractError::ProcessFailed {
                status: output.status,
                stderr,
            });
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim(), "extractor process wrote to stderr");
        }

        let Some(path) = output_file else {
            return Ok(table::read_csv(output.stdout.as_slice())?);
        };

        let exists = tokio::fs::try_exists(&path).await?;
        tracing::info!(path = %path.display(), exists, "checked extractor output file");
        if !exists {
            return Err(ExtractError::OutputMissing { path });
        }
        let contents = tokio::fs::read(&path).await?;
        Ok(table::read_csv(contents.as_slice())?)
    }
}

#[async_trait]
impl Extractor for SubprocessExtractor {
    async fn extract(&self, url: &str) -> Result<Vec<CompanyRecord>, ExtractError> {
        let scratch = tempfile::Builder::new()
            .prefix("vc-scrape-")
            .tempdir()?;

        // `scratch` is dropped, and the directory removed, on every path out
        // of here, including cancellation by a timeout.
        self.run(url, scratch.path()).await
    }
}
