//! grid::runner
//!
//! The external simulation launcher.
//!
//! # Design
//!
//! Running a combination is a single blocking call whose outcome is not
//! inspected. A launcher that cannot be spawned or exits non-zero is logged
//! and the grid moves on; nothing is retried and nothing propagates.
//!
//! # Example
//!
//! ```no_run
//! use inlist_grid::grid::{ProcessRunner, Runner};
//! use std::path::Path;
//!
//! // `./rn` in the MESA work directory, no arguments
//! let runner = ProcessRunner::default();
//! runner.run(Path::new("/work/1M_pre_ms_to_wd"));
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

/// Something that runs the simulation for the inlist currently on disk.
///
/// Closures taking the work directory implement this, which keeps tests
/// free of real processes.
pub trait Runner {
    /// Run to completion in `work_dir`. Must not fail the grid.
    fn run(&self, work_dir: &Path);
}

impl<F> Runner for F
where
    F: Fn(&Path),
{
    fn run(&self, work_dir: &Path) {
        self(work_dir)
    }
}

/// Runs a program as a child process and waits for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunner {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessRunner {
    /// The MESA work directory launcher.
    pub const DEFAULT_PROGRAM: &'static str = "./rn";

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Program path as spawned from `work_dir`.
    ///
    /// Relative paths with a directory part (`./rn`, `bin/run`) are taken
    /// relative to `work_dir`; bare names go through `PATH`.
    fn resolve(&self, work_dir: &Path) -> PathBuf {
        if self.program.is_relative() && self.program.components().count() > 1 {
            work_dir.join(&self.program)
        } else {
            self.program.clone()
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

impl Runner for ProcessRunner {
    fn run(&self, work_dir: &Path) {
        let program = self.resolve(work_dir);
        tracing::debug!(program = %program.display(), work_dir = %work_dir.display(), "running");

        match Command::new(&program)
            .args(&self.args)
            .current_dir(work_dir)
            .status()
        {
            Ok(status) if status.success() => {}
            Ok(status) => {
                tracing::warn!(program = %program.display(), %status, "runner exited unsuccessfully");
            }
            Err(e) => {
                tracing::warn!(program = %program.display(), error = %e, "failed to start runner");
            }
        }
    }
}
