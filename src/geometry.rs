use crate::model::Category;
use rand::Rng;

/// A point on the matrix canvas, in virtual pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle with inclusive corners `(x1, y1)` and `(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Rect { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Squared distance from `p` to the nearest point of the rectangle; zero inside.
    pub fn distance_sq(&self, p: Point) -> i64 {
        let dx = (self.x1 - p.x).max(0).max(p.x - self.x2) as i64;
        let dy = (self.y1 - p.y).max(0).max(p.y - self.y2) as i64;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    /// Keeps a left-anchored label from spilling out of its quadrant.
    pub const TEXT_LABEL: Margins = Margins {
        left: 20,
        top: 20,
        right: 80,
        bottom: 30,
    };
}

/// Picks a uniformly random point inside `rect` shrunk by `margins`.
///
/// An axis whose shrunk range is empty collapses to the rectangle's midpoint
/// on that axis, so undersized quadrants still get a placement.
pub fn scatter_point<R: Rng>(rng: &mut R, rect: Rect, margins: Margins) -> Point {
    let x = sample_axis(rng, rect.x1 + margins.left, rect.x2 - margins.right, rect.x1, rect.x2);
    let y = sample_axis(rng, rect.y1 + margins.top, rect.y2 - margins.bottom, rect.y1, rect.y2);
    Point::new(x, y)
}

fn sample_axis<R: Rng>(rng: &mut R, lo: i32, hi: i32, start: i32, end: i32) -> i32 {
    if lo <= hi {
        rng.gen_range(lo..=hi)
    } else {
        start + (end - start) / 2
    }
}

/// Scatter bounds used when a task arrives before the canvas has been measured.
pub const FALLBACK_BOUNDS: Rect = Rect {
    x1: 100,
    y1: 100,
    x2: 300,
    y2: 300,
};

const FRAME_INSET: i32 = 30;
const FRAME_THICKNESS: i32 = 30;
const HEADER_SPACE: i32 = 20;
const PANEL_GAP: i32 = 2;
const BOUNDS_OUTER_INSET: i32 = 15;
const BOUNDS_INNER_INSET: i32 = 8;
const LABEL_OFFSET: i32 = 15;

/// Where everything on the matrix canvas goes for a given canvas size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixLayout {
    pub width: i32,
    pub height: i32,
    pub frame: Rect,
    pub inner: Rect,
    pub center: Point,
    /// Quadrant panels in `Category::ALL` order.
    pub panels: [Rect; 4],
    pub vertical_line: Rect,
    pub horizontal_line: Rect,
    /// Anchors for the column headers (left, right).
    pub column_label_anchors: [Point; 2],
    /// Anchors for the row headers (top, bottom).
    pub row_label_anchors: [Point; 2],
    bounds: [Rect; 4],
}

impl MatrixLayout {
    pub fn compute(width: i32, height: i32) -> Self {
        let frame = Rect::new(
            FRAME_INSET,
            FRAME_INSET,
            width - FRAME_INSET,
            height - FRAME_INSET,
        );
        let inner = Rect::new(
            frame.x1 + FRAME_THICKNESS,
            frame.y1 + FRAME_THICKNESS + HEADER_SPACE,
            frame.x2 - FRAME_THICKNESS,
            frame.y2 - FRAME_THICKNESS,
        );
        let center = inner.center();
        let (cx, cy) = (center.x, center.y);

        let panels = [
            Rect::new(inner.x1, inner.y1, cx - PANEL_GAP, cy - PANEL_GAP),
            Rect::new(cx + PANEL_GAP, inner.y1, inner.x2, cy - PANEL_GAP),
            Rect::new(inner.x1, cy + PANEL_GAP, cx - PANEL_GAP, inner.y2),
            Rect::new(cx + PANEL_GAP, cy + PANEL_GAP, inner.x2, inner.y2),
        ];
        let bounds = [
            Rect::new(
                inner.x1 + BOUNDS_OUTER_INSET,
                inner.y1 + BOUNDS_OUTER_INSET,
                cx - BOUNDS_INNER_INSET,
                cy - BOUNDS_INNER_INSET,
            ),
            Rect::new(
                cx + BOUNDS_INNER_INSET,
                inner.y1 + BOUNDS_OUTER_INSET,
                inner.x2 - BOUNDS_OUTER_INSET,
                cy - BOUNDS_INNER_INSET,
            ),
            Rect::new(
                inner.x1 + BOUNDS_OUTER_INSET,
                cy + BOUNDS_INNER_INSET,
                cx - BOUNDS_INNER_INSET,
                inner.y2 - BOUNDS_OUTER_INSET,
            ),
            Rect::new(
                cx + BOUNDS_INNER_INSET,
                cy + BOUNDS_INNER_INSET,
                inner.x2 - BOUNDS_OUTER_INSET,
                inner.y2 - BOUNDS_OUTER_INSET,
            ),
        ];

        MatrixLayout {
            width,
            height,
            frame,
            inner,
            center,
            panels,
            vertical_line: Rect::new(cx - 1, inner.y1, cx + 1, inner.y2),
            horizontal_line: Rect::new(inner.x1, cy - 1, inner.x2, cy + 1),
            column_label_anchors: [
                Point::new((inner.x1 + cx) / 2, frame.y1 + LABEL_OFFSET),
                Point::new((cx + inner.x2) / 2, frame.y1 + LABEL_OFFSET),
            ],
            row_label_anchors: [
                Point::new(frame.x1 + LABEL_OFFSET, (inner.y1 + cy) / 2),
                Point::new(frame.x1 + LABEL_OFFSET, (cy + inner.y2) / 2),
            ],
            bounds,
        }
    }

    pub fn quadrant_bounds(&self, category: Category) -> Rect {
        self.bounds[quadrant_slot(category)]
    }

    pub fn panel(&self, category: Category) -> Rect {
        self.panels[quadrant_slot(category)]
    }
}

fn quadrant_slot(category: Category) -> usize {
    match category {
        Category::UrgentImportant => 0,
        Category::UrgentNotImportant => 1,
        Category::NotUrgentImportant => 2,
        Category::NotUrgentNotImportant => 3,
    }
}
