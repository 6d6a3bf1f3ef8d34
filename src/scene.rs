//! Toolkit-agnostic display list for the matrix canvas.
//!
//! A [`Scene`] is rebuilt from the store after every change. It doubles as the
//! render index: each task item remembers which record it was drawn from, so a
//! click can be routed back to the store without the front end knowing
//! anything about categories.

use crate::classify::QuadrantMapping;
use crate::geometry::{MatrixLayout, Point, Rect};
use crate::model::{Category, TaskRef, TaskStore};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Size of one character cell in virtual pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    pub char_width: i32,
    pub line_height: i32,
}

impl Default for TextMetrics {
    fn default() -> Self {
        TextMetrics {
            char_width: 8,
            line_height: 16,
        }
    }
}

impl TextMetrics {
    /// Snaps a point to the top-left corner of the cell that contains it.
    pub fn snap(&self, p: Point) -> Point {
        Point::new(
            p.x.div_euclid(self.char_width) * self.char_width,
            p.y.div_euclid(self.line_height) * self.line_height,
        )
    }

    /// Extent of a single line of text anchored on its left edge at `anchor`,
    /// `columns` cells wide.
    pub fn line_box(&self, anchor: Point, columns: usize) -> Rect {
        let origin = self.snap(anchor);
        let width = self.char_width * columns.max(1) as i32;
        Rect::new(
            origin.x,
            origin.y,
            origin.x + width - 1,
            origin.y + self.line_height - 1,
        )
    }

    /// Extent of a `columns` by `rows` block of cells centred on `anchor`.
    pub fn centered_box(&self, anchor: Point, columns: usize, rows: usize) -> Rect {
        let w = self.char_width * columns.max(1) as i32;
        let h = self.line_height * rows.max(1) as i32;
        let origin = self.snap(Point::new(anchor.x - w / 2, anchor.y - h / 2));
        Rect::new(origin.x, origin.y, origin.x + w - 1, origin.y + h - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Frame,
    Inner,
    Panel,
    Grid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Rect {
        rect: Rect,
        fill: Fill,
    },
    AxisLabel {
        text: &'static str,
        bounds: Rect,
        vertical: bool,
    },
    Task {
        text: String,
        anchor: Point,
        bounds: Rect,
        completed: bool,
        target: TaskRef,
    },
}

impl Shape {
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect { rect, .. } => *rect,
            Shape::AxisLabel { bounds, .. } | Shape::Task { bounds, .. } => *bounds,
        }
    }

    pub fn task_ref(&self) -> Option<TaskRef> {
        match self {
            Shape::Task { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    items: Vec<Shape>,
}

impl Scene {
    pub fn empty() -> Self {
        Scene::default()
    }

    pub fn build(
        layout: &MatrixLayout,
        store: &TaskStore,
        mapping: QuadrantMapping,
        metrics: TextMetrics,
    ) -> Self {
        let mut items = Vec::with_capacity(12 + store.len());
        items.push(Shape::Rect {
            rect: layout.frame,
            fill: Fill::Frame,
        });
        items.push(Shape::Rect {
            rect: layout.inner,
            fill: Fill::Inner,
        });
        for category in Category::ALL {
            items.push(Shape::Rect {
                rect: layout.panel(category),
                fill: Fill::Panel,
            });
        }
        items.push(Shape::Rect {
            rect: layout.vertical_line,
            fill: Fill::Grid,
        });
        items.push(Shape::Rect {
            rect: layout.horizontal_line,
            fill: Fill::Grid,
        });

        let labels = mapping.axis_labels();
        for (text, anchor) in labels.columns.into_iter().zip(layout.column_label_anchors) {
            items.push(Shape::AxisLabel {
                text,
                bounds: metrics.centered_box(anchor, text.width(), 1),
                vertical: false,
            });
        }
        for (text, anchor) in labels.rows.into_iter().zip(layout.row_label_anchors) {
            items.push(Shape::AxisLabel {
                text,
                bounds: metrics.centered_box(anchor, column_width(text), text.chars().count()),
                vertical: true,
            });
        }

        for (target, task) in store.iter() {
            let anchor = task.position();
            items.push(Shape::Task {
                text: task.text.clone(),
                anchor,
                bounds: metrics.line_box(anchor, task.text.width()),
                completed: task.completed,
                target,
            });
        }
        Scene { items }
    }

    /// Builds a scene holding only the given task labels, without decorations.
    pub fn tasks_only(store: &TaskStore, metrics: TextMetrics) -> Self {
        let items = store
            .iter()
            .map(|(target, task)| Shape::Task {
                text: task.text.clone(),
                anchor: task.position(),
                bounds: metrics.line_box(task.position(), task.text.width()),
                completed: task.completed,
                target,
            })
            .collect();
        Scene { items }
    }

    pub fn items(&self) -> &[Shape] {
        &self.items
    }

    #[cfg(test)]
    pub fn task_count(&self) -> usize {
        self.items.iter().filter(|s| s.task_ref().is_some()).count()
    }

    /// Index of the item nearest to `p`. Items the point falls inside are at
    /// distance zero; ties go to the item drawn last. There is no cutoff, so
    /// any click resolves to something when the scene is not empty.
    pub fn hit_test(&self, p: Point) -> Option<usize> {
        let mut best: Option<(usize, i64)> = None;
        for (idx, item) in self.items.iter().enumerate() {
            let d = item.bounds().distance_sq(p);
            match best {
                Some((_, best_d)) if d > best_d => {}
                _ => best = Some((idx, d)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    /// The task under `p`, if the nearest item is a task label.
    pub fn task_at(&self, p: Point) -> Option<TaskRef> {
        self.hit_test(p)
            .and_then(|idx| self.items.get(idx))
            .and_then(Shape::task_ref)
    }
}

/// Width of text drawn one character per row: the widest glyph.
fn column_width(text: &str) -> usize {
    text.chars().filter_map(UnicodeWidthChar::width).max().unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(tasks: &[(Category, &str, i32, i32)]) -> TaskStore {
        let mut store = TaskStore::new();
        for (category, text, x, y) in tasks {
            store.add(*category, text, Point::new(*x, *y));
        }
        store
    }

    #[test]
    fn build_orders_decorations_before_tasks() {
        let layout = MatrixLayout::compute(800, 600);
        let store = store_with(&[(Category::UrgentImportant, "Pay rent", 120, 160)]);
        let scene = Scene::build(&layout, &store, QuadrantMapping::Standard, TextMetrics::default());
        assert_eq!(scene.items().len(), 13);
        assert_eq!(scene.task_count(), 1);
        assert!(matches!(
            scene.items().last(),
            Some(Shape::Task { text, .. }) if text == "Pay rent"
        ));
        assert!(matches!(
            scene.items()[0],
            Shape::Rect {
                fill: Fill::Frame,
                ..
            }
        ));
    }

    #[test]
    fn axis_labels_follow_mapping() {
        let layout = MatrixLayout::compute(800, 600);
        let store = TaskStore::new();
        let scene = Scene::build(&layout, &store, QuadrantMapping::Transposed, TextMetrics::default());
        let labels: Vec<_> = scene
            .items()
            .iter()
            .filter_map(|s| match s {
                Shape::AxisLabel { text, vertical, .. } => Some((*text, *vertical)),
                _ => None,
            })
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Urgent", false),
                ("Not Urgent", false),
                ("Important", true),
                ("Not Important", true)
            ]
        );
    }

    #[test]
    fn line_box_is_snapped_to_cells() {
        let metrics = TextMetrics::default();
        let b = metrics.line_box(Point::new(123, 170), 4);
        assert_eq!(b, Rect::new(120, 160, 151, 175));
    }

    #[test]
    fn boxes_are_sized_by_display_width() {
        let metrics = TextMetrics::default();
        let store = store_with(&[
            (Category::UrgentImportant, "買い物", 96, 112),
            (Category::UrgentImportant, "abc", 96, 160),
        ]);
        let scene = Scene::tasks_only(&store, metrics);
        assert_eq!(scene.items()[0].bounds(), Rect::new(96, 112, 143, 127));
        assert_eq!(scene.items()[1].bounds(), Rect::new(96, 160, 119, 175));
    }

    #[test]
    fn wide_glyph_label_is_clickable_across_its_width() {
        let layout = MatrixLayout::compute(640, 480);
        let store = store_with(&[(Category::UrgentImportant, "買い物", 96, 112)]);
        let scene = Scene::build(&layout, &store, QuadrantMapping::Standard, TextMetrics::default());
        // Centre of cell (16, 7), the right half of the last glyph.
        assert_eq!(
            scene.task_at(Point::new(132, 120)),
            Some(TaskRef::new(Category::UrgentImportant, 0))
        );
    }

    #[test]
    fn click_on_empty_scene_resolves_nothing() {
        let scene = Scene::empty();
        assert_eq!(scene.hit_test(Point::new(10, 10)), None);
        assert_eq!(scene.task_at(Point::new(10, 10)), None);
    }

    #[test]
    fn click_with_only_decorations_is_not_a_task() {
        let layout = MatrixLayout::compute(800, 600);
        let scene = Scene::build(
            &layout,
            &TaskStore::new(),
            QuadrantMapping::Standard,
            TextMetrics::default(),
        );
        assert!(scene.hit_test(Point::new(200, 200)).is_some());
        assert_eq!(scene.task_at(Point::new(200, 200)), None);
    }

    #[test]
    fn click_on_label_beats_the_panel_beneath_it() {
        let layout = MatrixLayout::compute(800, 600);
        let store = store_with(&[(Category::UrgentImportant, "Pay rent", 120, 160)]);
        let scene = Scene::build(&layout, &store, QuadrantMapping::Standard, TextMetrics::default());
        assert_eq!(
            scene.task_at(Point::new(140, 168)),
            Some(TaskRef::new(Category::UrgentImportant, 0))
        );
    }

    #[test]
    fn far_click_resolves_to_nearest_label() {
        let store = store_with(&[
            (Category::UrgentImportant, "Near", 100, 100),
            (Category::NotUrgentNotImportant, "Far", 600, 500),
        ]);
        let scene = Scene::tasks_only(&store, TextMetrics::default());
        assert_eq!(
            scene.task_at(Point::new(0, 0)),
            Some(TaskRef::new(Category::UrgentImportant, 0))
        );
        assert_eq!(
            scene.task_at(Point::new(2000, 2000)),
            Some(TaskRef::new(Category::NotUrgentNotImportant, 0))
        );
    }

    #[test]
    fn overlapping_labels_resolve_to_the_topmost() {
        let store = store_with(&[
            (Category::UrgentImportant, "Under", 100, 100),
            (Category::UrgentImportant, "Over", 100, 100),
        ]);
        let scene = Scene::tasks_only(&store, TextMetrics::default());
        assert_eq!(
            scene.task_at(Point::new(104, 104)),
            Some(TaskRef::new(Category::UrgentImportant, 1))
        );
    }
}
