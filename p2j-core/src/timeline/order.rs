//! Row order of the timeline. View state only, never written to the store.

use crate::task::Task;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayOrder {
    ids: Vec<String>,
}

impl DisplayOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self {
            ids: tasks.iter().map(|t| t.id.clone()).collect(),
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|x| x == id)
    }

    /// Keep the current order for known tasks, drop deleted ones, append new
    /// ones in store order.
    pub fn sync(&mut self, tasks: &[Task]) {
        self.ids.retain(|id| tasks.iter().any(|t| &t.id == id));
        for t in tasks {
            if !self.ids.contains(&t.id) {
                self.ids.push(t.id.clone());
            }
        }
    }

    /// Splice the id at `from` into position `to`.
    pub fn move_to(&mut self, from: usize, to: usize) -> bool {
        if from >= self.ids.len() || to >= self.ids.len() || from == to {
            return false;
        }
        let id = self.ids.remove(from);
        self.ids.insert(to, id);
        true
    }

    pub fn ordered<'a>(&self, tasks: &'a [Task]) -> Vec<&'a Task> {
        self.ids
            .iter()
            .filter_map(|id| tasks.iter().find(|t| &t.id == id))
            .collect()
    }
}
