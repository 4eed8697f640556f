//! Reports of what each stage of a run did.

/// Result of the dry-run pre-check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreCheckReport {
    /// Declared indices validated through a probe index.
    pub probed: Vec<String>,
    /// Declared indices skipped because they already exist.
    pub skipped: Vec<String>,
    /// Number of aliases whose members were confirmed.
    pub aliases_checked: usize,
}

/// What convergence did to one declared index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOutcome {
    pub name: String,
    pub created: bool,
    pub mapping_updated: bool,
    pub settings_updated: bool,
    pub reindexed: bool,
    pub opened: bool,
}

impl IndexOutcome {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Number of state-changing operations (create, put mapping, put
    /// settings, reindex). Opening is not counted; it is a no-op on an open
    /// index.
    pub fn mutations(&self) -> usize {
        [
            self.created,
            self.mapping_updated,
            self.settings_updated,
            self.reindexed,
        ]
        .into_iter()
        .filter(|changed| *changed)
        .count()
    }
}

/// Result of the alias cutover.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CutoverReport {
    /// Aliases repointed, in order.
    pub aliases: Vec<String>,
}

/// Result of the post-check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostCheckReport {
    pub indices: usize,
    pub aliases: usize,
}

/// Everything a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub pre_check: PreCheckReport,
    pub indices: Vec<IndexOutcome>,
    pub cutover: CutoverReport,
    /// Indices closed after cutover.
    pub closed: Vec<String>,
    pub post_check: PostCheckReport,
}

impl RunReport {
    /// Total state-changing operations across all indices.
    pub fn mutations(&self) -> usize {
        self.indices.iter().map(IndexOutcome::mutations).sum()
    }

    pub fn created(&self) -> impl Iterator<Item = &str> {
        self.indices
            .iter()
            .filter(|outcome| outcome.created)
            .map(|outcome| outcome.name.as_str())
    }

    /// One-line summary for operators.
    pub fn summary(&self) -> String {
        format!(
            "{} indices ({} created, {} mutations), {} aliases, {} closed",
            self.indices.len(),
            self.created().count(),
            self.mutations(),
            self.cutover.aliases.len(),
            self.closed.len()
        )
    }
}
