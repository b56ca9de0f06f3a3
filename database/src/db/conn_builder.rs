use crate::db::DB;
use std::path::PathBuf;
use std::sync::Arc;

/// Builds a [`DB`] with the tuning knobs the ledger actually cares about: how many
/// background threads rocksdb may use, how much memory to budget for compaction, and
/// whether to create the store if it doesn't exist yet.
#[derive(Debug, Clone)]
pub struct ConnBuilder {
    db_path: Option<PathBuf>,
    create_if_missing: bool,
    parallelism: usize,
    mem_budget: usize,
}

impl Default for ConnBuilder {
    fn default() -> Self {
        Self { db_path: None, create_if_missing: true, parallelism: 1, mem_budget: 64 * 1024 * 1024 }
    }
}

impl ConnBuilder {
    pub fn with_db_path(mut self, db_path: PathBuf) -> Self {
        self.db_path = Some(db_path);
        self
    }

    pub fn with_create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_mem_budget(mut self, mem_budget: usize) -> Self {
        self.mem_budget = mem_budget;
        self
    }

    pub fn build(self) -> Result<Arc<DB>, rocksdb::Error> {
        let db_path = self.db_path.expect("a db path must be set before building");
        let mut opts = rocksdb::Options::default();
        if self.parallelism > 1 {
            opts.increase_parallelism(self.parallelism as i32);
        }
        opts.optimize_level_style_compaction(self.mem_budget);
        opts.create_if_missing(self.create_if_missing);
        let inner = rocksdb::DBWithThreadMode::open(&opts, db_path.to_str().expect("db path must be valid UTF-8"))?;
        Ok(Arc::new(DB::new(inner)))
    }
}
