//! Work stack for one application's walk
//!
//! The walk is a depth-first pre-order traversal driven by an explicit LIFO
//! stack instead of recursion. Siblings are pushed in reverse so they pop in
//! the order the source listed them. The visited set is keyed by
//! (https URL, relation name) and lives only as long as one application's
//! frontier.

use crate::crawler::classifier::Link;
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use url::Url;

/// One unit of pending work
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Fetch a link and mirror what it returns under `parent_dir/{rel}`
    Follow {
        link: Link,
        parent_dir: PathBuf,
        /// Snapshot stem of the resource the link came from; `None` for an application
        parent_stem: Option<String>,
        depth: u32,
    },

    /// Persist a fetched resource and classify it
    Expand {
        node: Value,
        dir: PathBuf,
        stem: String,
        rel: String,
        depth: u32,
    },
}

#[derive(Debug, Default)]
pub struct Frontier {
    stack: Vec<Task>,
    visited: HashSet<(String, String)>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.stack.push(task);
    }

    /// Pushes `tasks` so that they pop in the order given
    pub fn push_in_order<I>(&mut self, tasks: I)
    where
        I: IntoIterator<Item = Task>,
        I::IntoIter: DoubleEndedIterator,
    {
        self.stack.extend(tasks.into_iter().rev());
    }

    pub fn pop(&mut self) -> Option<Task> {
        self.stack.pop()
    }

    /// Records a (URL, relation) visit; returns false if it was already seen
    pub fn mark_visited(&mut self, url: &Url, rel: &str) -> bool {
        self.visited.insert((url.as_str().to_string(), rel.to_string()))
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
