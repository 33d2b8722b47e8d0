/// The visual capability the controller drives.
///
/// Implementations own the slide elements; the controller only ever toggles
/// the two state marks and pushes the progress ratio. Slide content is never
/// touched.
pub trait SlideView {
    /// Number of slides. Read once when the controller is built.
    fn slide_count(&self) -> usize;

    /// Remove both the active and the exiting mark from every slide.
    fn clear_all(&mut self);

    fn set_active(&mut self, index: usize);

    fn set_exiting(&mut self, index: usize);

    fn clear_exiting(&mut self, index: usize);

    /// Progress as a ratio in `(0, 1]`.
    fn set_progress(&mut self, ratio: f32);

    /// Create the progress indicator if the view does not have one yet.
    fn ensure_progress_indicator(&mut self) {}

    /// Offer a control that toggles fullscreen.
    fn show_fullscreen_control(&mut self) {}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Marks {
    pub active: bool,
    pub exiting: bool,
}

/// Plain in-memory view state: one set of marks per slide plus the chrome
/// the controller asks for. Hosts render from it each frame.
#[derive(Debug, Clone)]
pub struct SlideMarks {
    marks: Vec<Marks>,
    progress: Option<f32>,
    has_progress_indicator: bool,
    has_fullscreen_control: bool,
}

impl SlideMarks {
    pub fn new(slide_count: usize) -> Self {
        Self {
            marks: vec![Marks::default(); slide_count],
            progress: None,
            has_progress_indicator: false,
            has_fullscreen_control: false,
        }
    }

    pub fn marks(&self, index: usize) -> Marks {
        self.marks.get(index).copied().unwrap_or_default()
    }

    pub fn active(&self) -> impl Iterator<Item = usize> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, m)| m.active)
            .map(|(i, _)| i)
    }

    pub fn exiting(&self) -> impl Iterator<Item = usize> + '_ {
        self.marks
            .iter()
            .enumerate()
            .filter(|(_, m)| m.exiting)
            .map(|(i, _)| i)
    }

    /// Progress ratio, present only once an indicator exists and a slide
    /// has been shown.
    pub fn progress(&self) -> Option<f32> {
        if self.has_progress_indicator {
            self.progress
        } else {
            None
        }
    }

    pub fn has_fullscreen_control(&self) -> bool {
        self.has_fullscreen_control
    }
}

impl SlideView for SlideMarks {
    fn slide_count(&self) -> usize {
        self.marks.len()
    }

    fn clear_all(&mut self) {
        self.marks.fill(Marks::default());
    }

    fn set_active(&mut self, index: usize) {
        if let Some(m) = self.marks.get_mut(index) {
            m.active = true;
        }
    }

    fn set_exiting(&mut self, index: usize) {
        if let Some(m) = self.marks.get_mut(index) {
            m.exiting = true;
        }
    }

    fn clear_exiting(&mut self, index: usize) {
        if let Some(m) = self.marks.get_mut(index) {
            m.exiting = false;
        }
    }

    fn set_progress(&mut self, ratio: f32) {
        self.progress = Some(ratio);
    }

    fn ensure_progress_indicator(&mut self) {
        self.has_progress_indicator = true;
    }

    fn show_fullscreen_control(&mut self) {
        self.has_fullscreen_control = true;
    }
}
