//! grid
//!
//! Parameter grid expansion.
//!
//! # Modules
//!
//! - [`sets`] - Explicit parameter sets and their cartesian product
//! - [`table`] - Tabular grid files, one configuration per row
//! - [`runner`] - The external simulation launcher seam
//!
//! # Lifecycle
//!
//! Every combination starts from the source inlist as it was on disk when
//! the grid began, never from the previous combination.
//!
//! - [`InlistStore::expand_grid`] writes `inlist_<i>.txt` into the work
//!   directory for each combination and leaves the source file untouched.
//! - [`InlistStore::run_grid`] writes each combination over the *source*
//!   file and then runs the launcher. The numbered files belong to
//!   generation only; the launcher reads the source inlist, so execution
//!   must overwrite it.
//!
//! Combinations run strictly one after another.

pub mod runner;
pub mod sets;
pub mod table;

pub use runner::{ProcessRunner, Runner};
pub use sets::{Combinations, ParameterChoice, ParameterSets};
pub use table::{GridTable, TableError};

pub use crate::core::document::Assignment;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::document::{Document, InlistError};
use crate::core::store::InlistStore;
use crate::ui::output;

/// Errors from grid expansion.
#[derive(Debug, Error)]
pub enum GridError {
    #[error(transparent)]
    Inlist(#[from] InlistError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Where the combinations come from. The two inputs are exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridSource {
    /// Cartesian product of candidate lists
    Sets(ParameterSets),
    /// One configuration per table row
    Table(GridTable),
}

impl GridSource {
    /// Load a tabular grid file.
    pub fn table_file(path: impl AsRef<Path>) -> Result<Self, TableError> {
        GridTable::load(path).map(GridSource::Table)
    }

    /// Number of configurations this source produces.
    pub fn len(&self) -> usize {
        match self {
            GridSource::Sets(sets) => sets.combination_count(),
            GridSource::Table(table) => table.rows().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, in enumeration order.
    pub fn combinations(&self) -> Box<dyn Iterator<Item = Vec<Assignment>> + '_> {
        match self {
            GridSource::Sets(sets) => Box::new(sets.combinations()),
            GridSource::Table(table) => Box::new(table.combinations()),
        }
    }
}

impl From<ParameterSets> for GridSource {
    fn from(sets: ParameterSets) -> Self {
        GridSource::Sets(sets)
    }
}

impl From<GridTable> for GridSource {
    fn from(table: GridTable) -> Self {
        GridSource::Table(table)
    }
}

/// File name of the `index`-th generated inlist (1-based).
pub fn generated_name(index: usize) -> String {
    format!("inlist_{}.txt", index)
}

impl InlistStore {
    /// Write one inlist per combination into `work_dir`.
    ///
    /// Files are named `inlist_1.txt`, `inlist_2.txt`, ... in enumeration
    /// order and any existing file of that name is overwritten. The source
    /// inlist is not modified. `None` is a no-op.
    ///
    /// Returns the written paths in order.
    pub fn expand_grid(
        &self,
        source: Option<&GridSource>,
        work_dir: &Path,
    ) -> Result<Vec<PathBuf>, GridError> {
        let Some(source) = source else {
            return Ok(Vec::new());
        };

        let base = Document::load(self.path())?;
        tracing::debug!(
            source = %self.path().display(),
            combinations = source.len(),
            "expanding grid"
        );

        let mut written = Vec::new();
        for (i, combination) in source.combinations().enumerate() {
            let name = generated_name(i + 1);
            let path = work_dir.join(&name);

            let mut doc = base.clone();
            doc.apply(&combination);
            doc.save(&path)?;

            output::print(format!("Generated {}", name), self.verbosity());
            written.push(path);
        }

        Ok(written)
    }

    /// Write each combination over the source inlist and run `runner`.
    ///
    /// The launcher is called once per combination with `work_dir` and its
    /// outcome is ignored. Afterwards the source file, and this store, hold
    /// the last combination. `None` is a no-op.
    ///
    /// Returns the number of combinations run.
    pub fn run_grid(
        &mut self,
        source: Option<&GridSource>,
        work_dir: &Path,
        runner: &dyn Runner,
    ) -> Result<usize, GridError> {
        let Some(source) = source else {
            return Ok(0);
        };

        let base = Document::load(self.path())?;
        tracing::debug!(
            source = %self.path().display(),
            combinations = source.len(),
            "running grid"
        );

        let mut count = 0;
        for (i, combination) in source.combinations().enumerate() {
            let mut doc = base.clone();
            doc.apply(&combination);
            doc.save(self.path())?;
            self.replace_document(doc);

            output::print(
                format!("Running the combination no. {}", i + 1),
                self.verbosity(),
            );
            for a in &combination {
                output::debug(
                    format!("&{} {} = {}", a.block, a.param, a.value),
                    self.verbosity(),
                );
            }

            runner.run(work_dir);
            count += 1;
        }

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::output::Verbosity;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    const BASE: &str = "&star_job\n  mass = 1.0\n/\n\n&controls\n  x = 0\n  z = keep\n/\n\n";

    fn setup() -> (TempDir, InlistStore) {
        crate::logging::init_test();
        let temp = TempDir::new().expect("create temp dir");
        let path = temp.path().join("inlist");
        fs::write(&path, BASE).expect("write inlist");
        let store = InlistStore::open(path)
            .expect("open store")
            .with_verbosity(Verbosity::Quiet);
        (temp, store)
    }

    fn xy_sets() -> GridSource {
        ParameterSets::new()
            .with("x", "controls", ["1", "2"])
            .with("y", "controls", ["a", "b", "c"])
            .into()
    }

    #[test]
    fn expand_sets_writes_numbered_files() {
        let (temp, store) = setup();
        let written = store.expand_grid(Some(&xy_sets()), temp.path()).unwrap();

        assert_eq!(written.len(), 6);
        let expected = [("1", "a"), ("1", "b"), ("1", "c"), ("2", "a"), ("2", "b"), ("2", "c")];
        for (i, (path, (x, y))) in written.iter().zip(expected).enumerate() {
            assert_eq!(path, &temp.path().join(format!("inlist_{}.txt", i + 1)));
            let doc = Document::load(path).unwrap();
            assert_eq!(doc.get("controls", "x"), Some(x));
            assert_eq!(doc.get("controls", "y"), Some(y));
            assert_eq!(doc.get("controls", "z"), Some("keep"));
        }
    }

    #[test]
    fn expand_leaves_source_untouched() {
        let (temp, store) = setup();
        store.expand_grid(Some(&xy_sets()), temp.path()).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), BASE);
    }

    #[test]
    fn expand_none_is_noop() {
        let (temp, store) = setup();
        let written = store.expand_grid(None, temp.path()).unwrap();
        assert!(written.is_empty());
        assert!(!temp.path().join("inlist_1.txt").exists());
    }

    #[test]
    fn expand_table() {
        let (temp, store) = setup();
        let table = GridTable::parse("x y\ncontrols star_job\n1 a\n2 b\n").unwrap();
        let written = store
            .expand_grid(Some(&GridSource::Table(table)), temp.path())
            .unwrap();

        assert_eq!(written.len(), 2);
        let second = Document::load(&written[1]).unwrap();
        assert_eq!(second.get("controls", "x"), Some("2"));
        assert_eq!(second.get("star_job", "y"), Some("b"));
        assert_eq!(second.get("star_job", "mass"), Some("1.0"));
    }

    #[test]
    fn expand_new_block_appended() {
        let (temp, store) = setup();
        let source: GridSource = ParameterSets::new().with("pause", "pgstar", [".true."]).into();
        let written = store.expand_grid(Some(&source), temp.path()).unwrap();
        let text = fs::read_to_string(&written[0]).unwrap();
        assert!(text.ends_with("&pgstar\n  pause = .true.\n/\n\n"));
    }

    #[test]
    fn run_overwrites_source_and_calls_runner() {
        let (temp, mut store) = setup();
        let seen = RefCell::new(Vec::new());
        let source_path = store.path().to_path_buf();
        let runner = |dir: &Path| {
            let doc = Document::load(&source_path).unwrap();
            let x = doc.get("controls", "x").unwrap_or_default().to_string();
            let y = doc.get("controls", "y").unwrap_or_default().to_string();
            seen.borrow_mut().push((dir.to_path_buf(), x, y));
        };

        let count = store.run_grid(Some(&xy_sets()), temp.path(), &runner).unwrap();
        assert_eq!(count, 6);

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 6);
        assert!(seen.iter().all(|(dir, _, _)| dir == temp.path()));
        let pairs: Vec<_> = seen.iter().map(|(_, x, y)| format!("{x}{y}")).collect();
        assert_eq!(pairs, vec!["1a", "1b", "1c", "2a", "2b", "2c"]);

        // No numbered files in execution mode.
        assert!(!temp.path().join("inlist_1.txt").exists());
        // Store and disk end on the last combination.
        assert_eq!(store.get_parameter("controls", "y"), Some("c"));
        assert_eq!(Document::load(store.path()).unwrap(), *store.document());
    }

    #[test]
    fn run_none_is_noop() {
        let (temp, mut store) = setup();
        let calls = RefCell::new(0);
        let runner = |_: &Path| *calls.borrow_mut() += 1;
        assert_eq!(store.run_grid(None, temp.path(), &runner).unwrap(), 0);
        assert_eq!(calls.into_inner(), 0);
        assert_eq!(fs::read_to_string(store.path()).unwrap(), BASE);
    }

    #[test]
    fn source_len() {
        assert_eq!(xy_sets().len(), 6);
        let table = GridTable::parse("x\ncontrols\n").unwrap();
        assert!(GridSource::from(table).is_empty());
    }

    #[test]
    fn generated_names() {
        assert_eq!(generated_name(1), "inlist_1.txt");
        assert_eq!(generated_name(12), "inlist_12.txt");
    }
}
