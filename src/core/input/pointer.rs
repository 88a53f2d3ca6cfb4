//=========================================================================
// Pointer Subscriptions
//=========================================================================
//
// On-screen virtual buttons for pointer and touch input.
//
// Each subscription binds a screen rectangle to an action and records
// which owner registered it. Owners (scenes, HUD widgets) remove their
// subscriptions explicitly, so leaving a scene never leaks handlers.
//
//   subscribe(owner, rect, action) → SubscriptionId
//   resolve(&StateTracker)         → ActionEvent<A>*
//   unsubscribe_owner(owner)       → teardown
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::action::{Action, ActionEvent};
use super::event::PointerButton;
use super::state_tracker::StateTracker;

//=== ScreenRect ==========================================================

/// Axis-aligned rectangle in window pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, (px, py): (f32, f32)) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

//=== Identifiers =========================================================

/// Identifies who registered a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionOwner(pub u32);

/// Handle returned by [`PointerSubscriptions::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone)]
struct Subscription<A: Action> {
    id: SubscriptionId,
    owner: SubscriptionOwner,
    region: ScreenRect,
    action: A,
    held: bool,
}

//=== PointerSubscriptions ================================================

/// Explicit list of pointer regions mapped to actions.
pub struct PointerSubscriptions<A: Action> {
    subscriptions: Vec<Subscription<A>>,
    next_id: u64,
}

impl<A: Action> PointerSubscriptions<A> {
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            next_id: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    pub fn subscribe(
        &mut self,
        owner: SubscriptionOwner,
        region: ScreenRect,
        action: A,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            owner,
            region,
            action,
            held: false,
        });
        id
    }

    /// Removes one subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        before != self.subscriptions.len()
    }

    /// Removes every subscription registered by `owner`.
    pub fn unsubscribe_owner(&mut self, owner: SubscriptionOwner) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.owner != owner);
        let removed = before - self.subscriptions.len();
        trace!(target: "input", "Removed {} pointer subscriptions for {:?}", removed, owner);
        removed
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    //--- Resolution -------------------------------------------------------

    /// Resolves the current pointer state into action events.
    ///
    /// A region is pressed when the primary pointer goes down inside it,
    /// held while the pointer stays down inside it, and released when the
    /// pointer lifts or slides out.
    pub fn resolve(&mut self, state: &StateTracker, out: &mut Vec<ActionEvent<A>>) {
        let position = state.pointer_position();
        let down = state.is_button_down(PointerButton::Primary);
        let pressed = state.is_button_pressed(PointerButton::Primary);

        for sub in &mut self.subscriptions {
            let inside = sub.region.contains(position);

            if pressed && inside {
                out.push(ActionEvent::pressed(sub.action));
            }

            if down && inside {
                sub.held = true;
                out.push(ActionEvent::held(sub.action));
            } else if sub.held {
                sub.held = false;
                out.push(ActionEvent::released(sub.action));
            }
        }
    }
}

impl<A: Action> Default for PointerSubscriptions<A> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::action::ActionQuery;
    use crate::core::input::event::InputEvent;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum TestAction {
        Fire,
        Left,
    }

    impl Action for TestAction {}

    const HUD: SubscriptionOwner = SubscriptionOwner(1);
    const OTHER: SubscriptionOwner = SubscriptionOwner(2);

    fn step(
        subs: &mut PointerSubscriptions<TestAction>,
        tracker: &mut StateTracker,
        events: &[InputEvent],
    ) -> Vec<ActionEvent<TestAction>> {
        tracker.begin_frame();
        tracker.process_events(events);
        tracker.finalize_frame();
        let mut out = Vec::new();
        subs.resolve(tracker, &mut out);
        out
    }

    #[test]
    fn tap_inside_region_presses_and_holds() {
        let mut subs = PointerSubscriptions::new();
        let mut tracker = StateTracker::new();
        subs.subscribe(HUD, ScreenRect::new(0.0, 0.0, 50.0, 50.0), TestAction::Fire);

        let events = step(
            &mut subs,
            &mut tracker,
            &[InputEvent::PointerMoved { x: 10.0, y: 10.0 }, InputEvent::tap_down()],
        );

        assert!(events.was_pressed(TestAction::Fire));
        assert!(events.is_held(TestAction::Fire));
    }

    #[test]
    fn tap_outside_region_is_ignored() {
        let mut subs = PointerSubscriptions::new();
        let mut tracker = StateTracker::new();
        subs.subscribe(HUD, ScreenRect::new(0.0, 0.0, 50.0, 50.0), TestAction::Fire);

        let events = step(
            &mut subs,
            &mut tracker,
            &[InputEvent::PointerMoved { x: 100.0, y: 10.0 }, InputEvent::tap_down()],
        );

        assert!(events.is_empty());
    }

    #[test]
    fn sliding_out_releases() {
        let mut subs = PointerSubscriptions::new();
        let mut tracker = StateTracker::new();
        subs.subscribe(HUD, ScreenRect::new(0.0, 0.0, 50.0, 50.0), TestAction::Left);

        step(
            &mut subs,
            &mut tracker,
            &[InputEvent::PointerMoved { x: 5.0, y: 5.0 }, InputEvent::tap_down()],
        );
        let events = step(&mut subs, &mut tracker, &[InputEvent::PointerMoved { x: 80.0, y: 5.0 }]);

        assert_eq!(events, vec![ActionEvent::released(TestAction::Left)]);
    }

    #[test]
    fn owner_teardown_is_deterministic() {
        let mut subs = PointerSubscriptions::new();
        subs.subscribe(HUD, ScreenRect::new(0.0, 0.0, 10.0, 10.0), TestAction::Fire);
        subs.subscribe(HUD, ScreenRect::new(10.0, 0.0, 10.0, 10.0), TestAction::Left);
        let keep = subs.subscribe(OTHER, ScreenRect::new(20.0, 0.0, 10.0, 10.0), TestAction::Fire);

        assert_eq!(subs.unsubscribe_owner(HUD), 2);
        assert_eq!(subs.len(), 1);
        assert!(subs.unsubscribe(keep));
        assert!(!subs.unsubscribe(keep));
        assert!(subs.is_empty());
    }

    #[test]
    fn rect_edges_are_half_open() {
        let rect = ScreenRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains((0.0, 0.0)));
        assert!(!rect.contains((10.0, 5.0)));
    }
}
