/// Minimum horizontal travel, in pixels, for a gesture to count as a swipe.
pub const SWIPE_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Finger moved right to left: advance.
    Left,
    /// Finger moved left to right: go back.
    Right,
}

/// Classify a gesture from its start and end points. Mostly-vertical or
/// short gestures are not swipes.
pub fn classify(start: Point, end: Point) -> Option<Swipe> {
    let dx = start.x - end.x;
    let dy = start.y - end.y;
    if dx.abs() > dy.abs() && dx.abs() > SWIPE_THRESHOLD {
        Some(if dx > 0.0 { Swipe::Left } else { Swipe::Right })
    } else {
        None
    }
}

/// Remembers where the current touch gesture began.
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    start: Option<Point>,
}

impl SwipeTracker {
    pub fn start(&mut self, at: Point) {
        self.start = Some(at);
    }

    /// Finish the gesture. A touch end with no recorded start yields nothing.
    pub fn end(&mut self, at: Point) -> Option<Swipe> {
        self.start.take().and_then(|start| classify(start, at))
    }
}
