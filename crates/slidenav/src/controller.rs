use std::time::Duration;

use crate::fragment::{Location, SlideFragment};
use crate::fullscreen::Fullscreen;
use crate::input::click::{self, ClickZone, ElementKind};
use crate::input::keyboard::{self, Command, KeyEvent};
use crate::input::touch::{Point, Swipe, SwipeTracker};
use crate::timer::{Clock, SystemClock, Timer};
use crate::view::SlideView;

/// How long a transition holds the navigation lock.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(300);

/// Deferred end of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Settle {
    exiting: Option<usize>,
}

/// Owns the active slide index and the transition lock, and funnels every
/// input source through [`PresentationController::show_slide`].
///
/// The lock is the pending settle timer: a transition is in flight exactly
/// while the timer is armed.
pub struct PresentationController<V, L, F, C = SystemClock> {
    view: V,
    location: L,
    fullscreen: F,
    clock: C,
    slide_count: usize,
    current: usize,
    settle: Timer<Settle>,
    /// A fragment change arrived while locked; re-read it once settled.
    fragment_pending: bool,
    swipe: SwipeTracker,
}

impl<V, L, F, C> PresentationController<V, L, F, C>
where
    V: SlideView,
    L: Location,
    F: Fullscreen,
    C: Clock,
{
    /// Capture the slide set and show the first slide, or the one named by
    /// the location's fragment when it resolves.
    pub fn new(mut view: V, location: L, fullscreen: F, clock: C) -> Self {
        let slide_count = view.slide_count();
        view.ensure_progress_indicator();
        if fullscreen.is_available() {
            view.show_fullscreen_control();
        }

        let mut controller = Self {
            view,
            location,
            fullscreen,
            clock,
            slide_count,
            current: 0,
            settle: Timer::new(),
            fragment_pending: false,
            swipe: SwipeTracker::default(),
        };

        let initial = controller.fragment_target().unwrap_or(0);
        tracing::debug!(slide_count, initial, "presentation initialised");
        controller.show_slide(initial);
        controller
    }

    pub fn active_index(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.slide_count
    }

    pub fn is_transitioning(&self) -> bool {
        self.settle.is_pending()
    }

    /// Progress ratio for the active slide, `(active + 1) / count`.
    pub fn progress(&self) -> f32 {
        if self.slide_count == 0 {
            return 0.0;
        }
        (self.current + 1) as f32 / self.slide_count as f32
    }

    /// How far the in-flight transition has run, `0..=1`.
    pub fn transition_progress(&self) -> Option<f32> {
        self.settle.elapsed_fraction(self.clock.now())
    }

    /// Time until the in-flight transition settles.
    pub fn time_until_settle(&self) -> Option<Duration> {
        self.settle.remaining(self.clock.now())
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn fullscreen(&self) -> &F {
        &self.fullscreen
    }

    pub fn fullscreen_mut(&mut self) -> &mut F {
        &mut self.fullscreen
    }

    /// Fire the settle timer if it is due. Hosts call this every frame.
    pub fn tick(&mut self) {
        if let Some(settle) = self.settle.poll(self.clock.now()) {
            if let Some(index) = settle.exiting {
                self.view.clear_exiting(index);
            }
            tracing::trace!(active = self.current, "transition settled");
            if std::mem::take(&mut self.fragment_pending) {
                self.resync_fragment();
            }
        }
    }

    pub fn show_slide(&mut self, index: usize) {
        if index >= self.slide_count {
            tracing::trace!(index, count = self.slide_count, "slide out of range");
            return;
        }
        self.tick();
        if self.is_transitioning() {
            tracing::trace!(index, "navigation dropped during transition");
            return;
        }

        let previous = self.current;
        self.view.clear_all();
        let exiting = (previous != index).then_some(previous);
        if let Some(prev) = exiting {
            self.view.set_exiting(prev);
        }
        self.view.set_active(index);
        self.current = index;

        self.view.set_progress(self.progress());
        self.location
            .set_fragment(&SlideFragment::from_index(index).to_string());

        self.settle
            .schedule(self.clock.now(), TRANSITION_DURATION, Settle { exiting });
        tracing::debug!(from = previous, to = index, "showing slide");
    }

    pub fn next_slide(&mut self) {
        if self.current + 1 < self.slide_count {
            self.show_slide(self.current + 1);
        }
    }

    pub fn previous_slide(&mut self) {
        if self.current > 0 {
            self.show_slide(self.current - 1);
        }
    }

    pub fn first_slide(&mut self) {
        self.show_slide(0);
    }

    pub fn last_slide(&mut self) {
        if let Some(last) = self.slide_count.checked_sub(1) {
            self.show_slide(last);
        }
    }

    /// Show the slide named by the location's fragment. Malformed or
    /// out-of-range fragments are ignored.
    ///
    /// A change that lands mid-transition is applied once the transition
    /// settles, so the fragment and the active slide end up agreeing.
    pub fn go_to_slide_from_fragment(&mut self) {
        let Some(index) = self.fragment_target() else {
            return;
        };
        self.tick();
        if self.is_transitioning() {
            tracing::trace!(index, "fragment change deferred until transition settles");
            self.fragment_pending = true;
            return;
        }
        self.show_slide(index);
    }

    /// The location's fragment changed from outside (history, address bar).
    pub fn fragment_changed(&mut self) {
        self.go_to_slide_from_fragment();
    }

    pub fn toggle_fullscreen(&mut self) {
        if self.fullscreen.is_active() {
            self.fullscreen.exit();
        } else if let Err(err) = self.fullscreen.request() {
            tracing::error!("Error attempting to enable fullscreen: {err}");
        }
    }

    /// Apply a key press. Returns whether the host should suppress the
    /// key's default action.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if event.from_text_input {
            return false;
        }
        let Some(command) = keyboard::binding(event.key) else {
            return false;
        };
        match command {
            Command::Next => self.next_slide(),
            Command::Previous => self.previous_slide(),
            Command::First => self.first_slide(),
            Command::Last => self.last_slide(),
            Command::ToggleFullscreen => self.toggle_fullscreen(),
            Command::ExitFullscreen => {
                if self.fullscreen.is_active() {
                    self.fullscreen.exit();
                }
            }
            Command::Jump(number) => {
                if let Some(index) = SlideFragment(number).to_index(self.slide_count) {
                    self.show_slide(index);
                }
            }
        }
        command.prevents_default()
    }

    pub fn touch_start(&mut self, at: Point) {
        self.swipe.start(at);
    }

    pub fn touch_end(&mut self, at: Point) {
        match self.swipe.end(at) {
            Some(Swipe::Left) => self.next_slide(),
            Some(Swipe::Right) => self.previous_slide(),
            None => {}
        }
    }

    /// Apply a click at horizontal position `x`. `target_path` lists the
    /// clicked element and its ancestors, innermost first.
    pub fn click(&mut self, x: f32, viewport_width: f32, target_path: &[ElementKind]) {
        if click::hits_interactive(target_path) {
            return;
        }
        match click::zone(x, viewport_width) {
            ClickZone::Next => self.next_slide(),
            ClickZone::Previous => self.previous_slide(),
            ClickZone::Dead => {}
        }
    }

    fn resync_fragment(&mut self) {
        match self.fragment_target() {
            Some(index) if index != self.current => self.show_slide(index),
            _ => {}
        }
    }

    fn fragment_target(&self) -> Option<usize> {
        let fragment = self.location.fragment();
        if fragment.is_empty() {
            return None;
        }
        match fragment.parse::<SlideFragment>() {
            Ok(parsed) => {
                let index = parsed.to_index(self.slide_count);
                if index.is_none() {
                    tracing::debug!(fragment, "fragment names a slide that does not exist");
                }
                index
            }
            Err(err) => {
                tracing::debug!("ignoring fragment: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::HistoryLocation;
    use crate::fullscreen::{FullscreenError, NoFullscreen};
    use crate::input::keyboard::Key;
    use crate::timer::ManualClock;
    use crate::view::SlideMarks;

    #[derive(Debug, Default)]
    struct FakeFullscreen {
        available: bool,
        active: bool,
        reject: bool,
        requests: usize,
        exits: usize,
    }

    impl Fullscreen for FakeFullscreen {
        fn is_available(&self) -> bool {
            self.available
        }

        fn is_active(&self) -> bool {
            self.active
        }

        fn request(&mut self) -> Result<(), FullscreenError> {
            self.requests += 1;
            if self.reject {
                return Err(FullscreenError::Rejected("denied by user agent".to_string()));
            }
            self.active = true;
            Ok(())
        }

        fn exit(&mut self) {
            self.exits += 1;
            self.active = false;
        }
    }

    type TestController =
        PresentationController<SlideMarks, HistoryLocation, FakeFullscreen, ManualClock>;

    fn controller_with(count: usize, fragment: &str) -> (TestController, ManualClock) {
        let clock = ManualClock::new();
        let fullscreen = FakeFullscreen {
            available: true,
            ..Default::default()
        };
        let controller = PresentationController::new(
            SlideMarks::new(count),
            HistoryLocation::new(fragment),
            fullscreen,
            clock.clone(),
        );
        (controller, clock)
    }

    /// A settled controller on slide 0 of `count`.
    fn settled(count: usize) -> (TestController, ManualClock) {
        let (mut controller, clock) = controller_with(count, "");
        settle(&mut controller, &clock);
        (controller, clock)
    }

    fn settle(controller: &mut TestController, clock: &ManualClock) {
        clock.advance(TRANSITION_DURATION);
        controller.tick();
    }

    fn active(controller: &TestController) -> Vec<usize> {
        controller.view().active().collect()
    }

    #[test]
    fn test_starts_on_first_slide() {
        let (controller, _) = controller_with(5, "");
        assert_eq!(controller.active_index(), 0);
        assert_eq!(active(&controller), vec![0]);
        assert_eq!(controller.location().fragment(), "slide-1");
        assert_eq!(controller.view().progress(), Some(0.2));
    }

    #[test]
    fn test_starts_from_initial_fragment() {
        let (controller, _) = controller_with(5, "#slide-3");
        assert_eq!(controller.active_index(), 2);
        assert_eq!(active(&controller), vec![2]);
        assert_eq!(controller.view().exiting().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_invalid_initial_fragment_falls_back_to_first() {
        for fragment in ["#slide-0", "#slide-9", "#slide-abc", "#intro"] {
            let (controller, _) = controller_with(5, fragment);
            assert_eq!(controller.active_index(), 0, "{fragment}");
            assert_eq!(active(&controller), vec![0]);
        }
    }

    #[test]
    fn test_offers_fullscreen_control_only_when_available() {
        let (controller, _) = controller_with(2, "");
        assert!(controller.view().has_fullscreen_control());

        let mut plain = PresentationController::new(
            SlideMarks::new(2),
            HistoryLocation::default(),
            NoFullscreen,
            ManualClock::new(),
        );
        assert!(!plain.view().has_fullscreen_control());

        // Toggling anyway is reported, not fatal.
        plain.toggle_fullscreen();
        assert!(!plain.fullscreen().is_active());
        plain.next_slide();
        assert_eq!(plain.active_index(), 0);
    }

    #[test]
    fn test_show_slide_every_valid_index() {
        for target in 0..5 {
            let (mut controller, clock) = settled(5);
            controller.show_slide(target);
            settle(&mut controller, &clock);
            assert_eq!(controller.active_index(), target);
            assert_eq!(active(&controller), vec![target]);
            assert_eq!(controller.view().exiting().count(), 0);
            assert!(!controller.is_transitioning());
        }
    }

    #[test]
    fn test_show_slide_out_of_range_is_noop() {
        let (mut controller, _) = settled(3);
        controller.show_slide(3);
        controller.show_slide(usize::MAX);
        assert_eq!(controller.active_index(), 0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_show_slide_while_locked_is_noop() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(1);
        assert!(controller.is_transitioning());

        clock.advance(Duration::from_millis(100));
        controller.show_slide(4);
        assert_eq!(controller.active_index(), 1);
        assert_eq!(active(&controller), vec![1]);
        assert_eq!(controller.location().fragment(), "slide-2");
    }

    #[test]
    fn test_lock_released_exactly_after_transition() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(1);

        clock.advance(TRANSITION_DURATION - Duration::from_millis(1));
        controller.tick();
        assert!(controller.is_transitioning());
        assert_eq!(controller.view().exiting().collect::<Vec<_>>(), vec![0]);

        clock.advance(Duration::from_millis(1));
        controller.tick();
        assert!(!controller.is_transitioning());
        assert_eq!(controller.view().exiting().count(), 0);
    }

    #[test]
    fn test_request_after_deadline_is_admitted_without_tick() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(1);
        clock.advance(TRANSITION_DURATION);
        controller.show_slide(2);
        assert_eq!(controller.active_index(), 2);
        assert_eq!(controller.view().exiting().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_reshowing_active_slide_marks_nothing_exiting() {
        let (mut controller, clock) = settled(3);
        controller.show_slide(0);
        assert_eq!(controller.view().exiting().count(), 0);
        assert!(controller.is_transitioning());
        settle(&mut controller, &clock);
        assert_eq!(active(&controller), vec![0]);
    }

    #[test]
    fn test_next_at_last_slide_does_not_wrap() {
        let (mut controller, clock) = settled(3);
        controller.last_slide();
        settle(&mut controller, &clock);
        controller.next_slide();
        assert_eq!(controller.active_index(), 2);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_previous_at_first_slide_does_not_wrap() {
        let (mut controller, _) = settled(3);
        controller.previous_slide();
        assert_eq!(controller.active_index(), 0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_fragment_round_trip() {
        let (mut controller, _) = settled(5);
        controller.show_slide(3);
        assert_eq!(controller.location().fragment(), "slide-4");

        controller.go_to_slide_from_fragment();
        assert_eq!(controller.active_index(), 3);
        assert_eq!(active(&controller), vec![3]);
    }

    #[test]
    fn test_bad_fragments_leave_index_unchanged() {
        let (mut controller, _) = settled(5);
        for fragment in ["#slide-0", "#slide-6", "#slide-abc"] {
            controller.location_mut().set_fragment(fragment);
            controller.fragment_changed();
            assert_eq!(controller.active_index(), 0, "{fragment}");
            assert!(!controller.is_transitioning());
        }
    }

    #[test]
    fn test_history_navigation_restores_slide() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(2);
        settle(&mut controller, &clock);

        assert!(controller.location_mut().back());
        controller.fragment_changed();
        assert_eq!(controller.active_index(), 0);
        settle(&mut controller, &clock);

        assert!(controller.location_mut().forward());
        controller.fragment_changed();
        assert_eq!(controller.active_index(), 2);
    }

    #[test]
    fn test_history_during_transition_applies_after_settle() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(2);
        clock.advance(Duration::from_millis(50));

        assert!(controller.location_mut().back());
        controller.fragment_changed();
        assert_eq!(controller.active_index(), 2);
        assert_eq!(controller.location().fragment(), "slide-1");

        clock.advance(TRANSITION_DURATION);
        controller.tick();
        assert_eq!(controller.active_index(), 0);
        assert_eq!(active(&controller), vec![0]);
        assert_eq!(controller.location().fragment(), "slide-1");

        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_deferred_fragment_matching_active_slide_is_dropped() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(2);
        controller.location_mut().set_fragment("slide-3");
        controller.fragment_changed();

        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 2);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_progress_after_settling() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(2);
        settle(&mut controller, &clock);
        assert_eq!(controller.progress(), 0.6);
        assert_eq!(controller.view().progress(), Some(0.6));
    }

    #[test]
    fn test_transition_progress_tracks_lock_window() {
        let (mut controller, clock) = settled(4);
        assert_eq!(controller.transition_progress(), None);
        controller.next_slide();
        assert_eq!(controller.transition_progress(), Some(0.0));
        clock.advance(Duration::from_millis(150));
        let halfway = controller.transition_progress().unwrap();
        assert!((halfway - 0.5).abs() < 1e-3);
        assert_eq!(
            controller.time_until_settle(),
            Some(Duration::from_millis(150))
        );
    }

    #[test]
    fn test_swipe_past_threshold_navigates_once() {
        let (mut controller, _) = settled(5);
        controller.touch_start(Point::new(300.0, 200.0));
        controller.touch_end(Point::new(240.0, 190.0));
        assert_eq!(controller.active_index(), 1);
    }

    #[test]
    fn test_short_swipe_is_ignored() {
        let (mut controller, _) = settled(5);
        controller.touch_start(Point::new(300.0, 200.0));
        controller.touch_end(Point::new(260.0, 200.0));
        assert_eq!(controller.active_index(), 0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_swipe_right_goes_back() {
        let (mut controller, clock) = settled(5);
        controller.show_slide(3);
        settle(&mut controller, &clock);
        controller.touch_start(Point::new(100.0, 200.0));
        controller.touch_end(Point::new(200.0, 200.0));
        assert_eq!(controller.active_index(), 2);
    }

    #[test]
    fn test_click_zones() {
        let width = 1280.0;

        let (mut controller, _) = settled(5);
        controller.click(0.9 * width, width, &[ElementKind::Other]);
        assert_eq!(controller.active_index(), 1);

        let (mut controller, clock) = settled(5);
        controller.show_slide(2);
        settle(&mut controller, &clock);
        controller.click(0.1 * width, width, &[ElementKind::Other]);
        assert_eq!(controller.active_index(), 1);

        let (mut controller, _) = settled(5);
        controller.click(0.5 * width, width, &[ElementKind::Other]);
        assert_eq!(controller.active_index(), 0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_click_on_interactive_target_is_ignored() {
        let (mut controller, _) = settled(5);
        controller.click(1200.0, 1280.0, &[ElementKind::Other, ElementKind::Button]);
        controller.click(1200.0, 1280.0, &[ElementKind::Link]);
        assert_eq!(controller.active_index(), 0);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_keyboard_navigation() {
        let (mut controller, clock) = settled(5);
        assert!(controller.handle_key(KeyEvent::new(Key::ArrowRight)));
        settle(&mut controller, &clock);
        assert!(controller.handle_key(KeyEvent::new(Key::Space)));
        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 2);

        assert!(controller.handle_key(KeyEvent::new(Key::PageUp)));
        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 1);

        assert!(controller.handle_key(KeyEvent::new(Key::End)));
        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 4);

        assert!(controller.handle_key(KeyEvent::new(Key::Home)));
        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 0);
    }

    #[test]
    fn test_digit_keys_jump_when_in_range() {
        let (mut controller, clock) = settled(5);
        assert!(!controller.handle_key(KeyEvent::new(Key::Char('4'))));
        settle(&mut controller, &clock);
        assert_eq!(controller.active_index(), 3);

        controller.handle_key(KeyEvent::new(Key::Char('9')));
        assert_eq!(controller.active_index(), 3);
        assert!(!controller.is_transitioning());
    }

    #[test]
    fn test_keys_from_text_input_are_ignored() {
        let (mut controller, _) = settled(5);
        assert!(!controller.handle_key(KeyEvent::in_text_input(Key::ArrowRight)));
        assert!(!controller.handle_key(KeyEvent::in_text_input(Key::Char('f'))));
        assert_eq!(controller.active_index(), 0);
        assert_eq!(controller.fullscreen().requests, 0);
    }

    #[test]
    fn test_fullscreen_toggle_and_escape() {
        let (mut controller, _) = settled(2);
        assert!(controller.handle_key(KeyEvent::new(Key::Char('f'))));
        assert!(controller.fullscreen().is_active());

        assert!(!controller.handle_key(KeyEvent::new(Key::Escape)));
        assert!(!controller.fullscreen().is_active());
        assert_eq!(controller.fullscreen().exits, 1);

        // Escape outside fullscreen does nothing.
        controller.handle_key(KeyEvent::new(Key::Escape));
        assert_eq!(controller.fullscreen().exits, 1);

        controller.toggle_fullscreen();
        controller.toggle_fullscreen();
        assert!(!controller.fullscreen().is_active());
        assert_eq!(controller.fullscreen().requests, 2);
    }

    #[test]
    fn test_rejected_fullscreen_is_not_fatal() {
        let (mut controller, _) = settled(3);
        controller.fullscreen_mut().reject = true;
        controller.toggle_fullscreen();
        assert!(!controller.fullscreen().is_active());
        assert_eq!(controller.fullscreen().requests, 1);

        controller.next_slide();
        assert_eq!(controller.active_index(), 1);
    }
}
