//! Offset/limit parameters for listing entities.

use serde::{Deserialize, Serialize};

/// Number of entities returned by a listing when no limit is given.
pub const DEFAULT_LIMIT: u64 = 60;

/// Parameters for listing a slice of a collection.
///
/// # Example
///
/// ```ignore
/// use docmodel::page::ListOptions;
///
/// let options = ListOptions::builder().with_skip(120).build();
/// assert_eq!(options.limit, 60);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Number of documents to skip.
    #[serde(default)]
    pub skip: u64,
    /// Maximum number of documents to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

impl ListOptions {
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    pub fn builder() -> ListOptionsBuilder {
        ListOptionsBuilder::new()
    }

    /// Options for the page following this one.
    pub fn next(&self) -> Self {
        Self { skip: self.skip.saturating_add(self.limit), limit: self.limit }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_LIMIT }
    }
}

/// Builder for [`ListOptions`].
///
/// Unset values fall back to skip = 0 and limit = [`DEFAULT_LIMIT`].
#[derive(Debug, Default)]
pub struct ListOptionsBuilder {
    skip: Option<u64>,
    limit: Option<u64>,
}

impl ListOptionsBuilder {
    pub fn new() -> Self {
        Self { skip: None, limit: None }
    }

    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> ListOptions {
        ListOptions {
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}
