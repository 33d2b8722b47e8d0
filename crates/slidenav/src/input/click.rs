/// Element kinds along a click target's ancestry, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Link,
    Button,
    Input,
    TextArea,
    Select,
    Other,
}

impl ElementKind {
    pub fn is_interactive(self) -> bool {
        !matches!(self, ElementKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickZone {
    Previous,
    Dead,
    Next,
}

/// Split the viewport into a left 40% (back), a middle 20% dead zone and a
/// right 40% (forward).
pub fn zone(x: f32, viewport_width: f32) -> ClickZone {
    if x > viewport_width * 0.6 {
        ClickZone::Next
    } else if x < viewport_width * 0.4 {
        ClickZone::Previous
    } else {
        ClickZone::Dead
    }
}

/// A click on an interactive control, or anything nested in one, belongs to
/// that control.
pub fn hits_interactive(target_path: &[ElementKind]) -> bool {
    target_path.iter().any(|kind| kind.is_interactive())
}
