use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Urgent & Important")]
    UrgentImportant,
    #[serde(rename = "Urgent & Not Important")]
    UrgentNotImportant,
    #[serde(rename = "Not Urgent & Important")]
    NotUrgentImportant,
    #[serde(rename = "Not Urgent & Not Important")]
    NotUrgentNotImportant,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::UrgentImportant,
        Category::UrgentNotImportant,
        Category::NotUrgentImportant,
        Category::NotUrgentNotImportant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::UrgentImportant => "Urgent & Important",
            Category::UrgentNotImportant => "Urgent & Not Important",
            Category::NotUrgentImportant => "Not Urgent & Important",
            Category::NotUrgentNotImportant => "Not Urgent & Not Important",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Category::UrgentImportant => "urgent-important",
            Category::UrgentNotImportant => "urgent-not-important",
            Category::NotUrgentImportant => "not-urgent-important",
            Category::NotUrgentNotImportant => "not-urgent-not-important",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("unknown category: {0} (expected one of urgent-important, urgent-not-important, not-urgent-important, not-urgent-not-important)")]
pub struct ParseCategoryError(String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseCategoryError(needle.to_string()))
    }
}

/// A task label placed on the matrix. Stored on disk as `[text, x, y, completed]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskTuple", into = "TaskTuple")]
pub struct Task {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub completed: bool,
}

type TaskTuple = (String, i32, i32, bool);

impl From<TaskTuple> for Task {
    fn from((text, x, y, completed): TaskTuple) -> Self {
        Task {
            text,
            x,
            y,
            completed,
        }
    }
}

impl From<Task> for TaskTuple {
    fn from(task: Task) -> Self {
        (task.text, task.x, task.y, task.completed)
    }
}

impl Task {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Address of a task: its category and its index within that category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskRef {
    pub category: Category,
    pub index: usize,
}

impl TaskRef {
    pub fn new(category: Category, index: usize) -> Self {
        TaskRef { category, index }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StoreError {
    #[error("no task #{index} in {category}")]
    TaskNotFound { category: Category, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Category, Vec<Task>>", into = "BTreeMap<Category, Vec<Task>>")]
pub struct TaskStore {
    lists: BTreeMap<Category, Vec<Task>>,
}

impl Default for TaskStore {
    fn default() -> Self {
        TaskStore::from(BTreeMap::new())
    }
}

impl From<BTreeMap<Category, Vec<Task>>> for TaskStore {
    fn from(mut lists: BTreeMap<Category, Vec<Task>>) -> Self {
        for category in Category::ALL {
            lists.entry(category).or_default();
        }
        TaskStore { lists }
    }
}

impl From<TaskStore> for BTreeMap<Category, Vec<Task>> {
    fn from(store: TaskStore) -> Self {
        store.lists
    }
}

impl TaskStore {
    pub fn new() -> Self {
        TaskStore::default()
    }

    pub fn add(&mut self, category: Category, text: &str, at: Point) -> Option<TaskRef> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let list = self.lists.entry(category).or_default();
        list.push(Task {
            text: text.to_string(),
            x: at.x,
            y: at.y,
            completed: false,
        });
        Some(TaskRef::new(category, list.len() - 1))
    }

    pub fn toggle(&mut self, task: TaskRef) -> Result<bool, StoreError> {
        let entry = self
            .lists
            .get_mut(&task.category)
            .and_then(|list| list.get_mut(task.index))
            .ok_or(StoreError::TaskNotFound {
                category: task.category,
                index: task.index,
            })?;
        entry.completed = !entry.completed;
        Ok(entry.completed)
    }

    pub fn clear(&mut self) {
        for list in self.lists.values_mut() {
            list.clear();
        }
    }

    pub fn get(&self, task: TaskRef) -> Option<&Task> {
        self.lists
            .get(&task.category)
            .and_then(|list| list.get(task.index))
    }

    pub fn tasks(&self, category: Category) -> &[Task] {
        self.lists
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every task in category order, then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (TaskRef, &Task)> {
        self.lists.iter().flat_map(|(category, list)| {
            list.iter()
                .enumerate()
                .map(move |(idx, task)| (TaskRef::new(*category, idx), task))
        })
    }

    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn completed_count(&self) -> usize {
        self.iter().filter(|(_, task)| task.completed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_has_all_four_categories_empty() {
        let store = TaskStore::new();
        for category in Category::ALL {
            assert!(store.tasks(category).is_empty());
        }
        assert!(store.is_empty());
    }

    #[test]
    fn add_appends_uncompleted_record() {
        let mut store = TaskStore::new();
        let added = store.add(Category::UrgentImportant, "Finish report", Point::new(120, 140));
        assert_eq!(added, Some(TaskRef::new(Category::UrgentImportant, 0)));
        let tasks = store.tasks(Category::UrgentImportant);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "Finish report");
        assert!(!tasks[0].completed);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn add_trims_and_ignores_blank_text() {
        let mut store = TaskStore::new();
        assert_eq!(store.add(Category::UrgentImportant, "   \t ", Point::new(0, 0)), None);
        assert_eq!(store.add(Category::UrgentImportant, "", Point::new(0, 0)), None);
        assert!(store.is_empty());

        store.add(Category::NotUrgentImportant, "  Plan week  ", Point::new(1, 2));
        assert_eq!(store.tasks(Category::NotUrgentImportant)[0].text, "Plan week");
    }

    #[test]
    fn double_toggle_restores_state() {
        let mut store = TaskStore::new();
        let task = store
            .add(Category::UrgentNotImportant, "Reply to email", Point::new(5, 5))
            .unwrap();
        assert_eq!(store.toggle(task), Ok(true));
        assert_eq!(store.toggle(task), Ok(false));
        assert!(!store.get(task).unwrap().completed);
    }

    #[test]
    fn toggle_unknown_task_is_an_error() {
        let mut store = TaskStore::new();
        let missing = TaskRef::new(Category::NotUrgentNotImportant, 3);
        assert_eq!(
            store.toggle(missing),
            Err(StoreError::TaskNotFound {
                category: Category::NotUrgentNotImportant,
                index: 3
            })
        );
    }

    #[test]
    fn clear_empties_every_category() {
        let mut store = TaskStore::new();
        for category in Category::ALL {
            store.add(category, "x", Point::new(0, 0));
        }
        assert_eq!(store.len(), 4);
        store.clear();
        assert!(store.is_empty());
        for category in Category::ALL {
            assert!(store.tasks(category).is_empty());
        }
    }

    #[test]
    fn iter_walks_categories_in_order() {
        let mut store = TaskStore::new();
        store.add(Category::NotUrgentNotImportant, "d", Point::new(0, 0));
        store.add(Category::UrgentImportant, "a", Point::new(0, 0));
        store.add(Category::UrgentImportant, "b", Point::new(0, 0));
        let texts: Vec<_> = store.iter().map(|(_, t)| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "d"]);
    }

    #[test]
    fn serializes_as_label_keyed_tuples() {
        let mut store = TaskStore::new();
        store.add(Category::UrgentImportant, "Finish report", Point::new(90, 110));
        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(
            value["Urgent & Important"],
            serde_json::json!([["Finish report", 90, 110, false]])
        );
        assert_eq!(value["Not Urgent & Not Important"], serde_json::json!([]));
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn deserializing_fills_missing_categories() {
        let raw = r#"{"Not Urgent & Important": [["Read book", 10, 20, true]]}"#;
        let store: TaskStore = serde_json::from_str(raw).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.tasks(Category::NotUrgentImportant)[0].completed);
        assert!(store.tasks(Category::UrgentImportant).is_empty());
    }

    #[test]
    fn category_parses_from_slug_or_label() {
        assert_eq!("urgent-important".parse(), Ok(Category::UrgentImportant));
        assert_eq!(
            "Not Urgent & Not Important".parse(),
            Ok(Category::NotUrgentNotImportant)
        );
        assert!("someday".parse::<Category>().is_err());
    }
}
