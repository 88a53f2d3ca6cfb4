//=========================================================================
// Tank Battle Actions & Bindings
//=========================================================================
//
// Contexts:
//   GAMEPLAY (Primary)  P1 WASD + Space, P2 arrows + Enter, Esc/P pause
//   MENU                menu, pause and game-over screens
//
// P1 also gets on-screen virtual buttons (d-pad + fire) for pointer and
// touch input; the Game scene subscribes them on enter and removes them
// on exit.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::Vec2;

//=== Internal Dependencies ===============================================

use crate::core::input::{
    Action, ActionEvent, ActionQuery, InputContext, InputSystem, KeyCode, ScreenRect,
};

use super::battle::PlayerInput;

//=== TankAction ==========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankAction {
    //--- Gameplay ---------------------------------------------------------
    P1Up,
    P1Down,
    P1Left,
    P1Right,
    P1Fire,
    P2Up,
    P2Down,
    P2Left,
    P2Right,
    P2Fire,
    Pause,

    //--- Menus ------------------------------------------------------------
    Confirm,
    Back,
    Continue,
    ToggleSound,
    ToggleMusic,
    ToggleVibration,
    CycleDifficulty,
    TogglePlayers,
    ToMenu,
}

impl Action for TankAction {}

//=== Contexts ============================================================

pub const GAMEPLAY: InputContext = InputContext::Primary;
pub const MENU: InputContext = InputContext::custom(1);

//=== Bindings ============================================================

/// Installs the default keyboard bindings.
pub fn bind_defaults(input: &mut InputSystem<TankAction>) {
    use KeyCode::*;
    use TankAction::*;

    let gameplay = [
        (KeyW, P1Up),
        (KeyS, P1Down),
        (KeyA, P1Left),
        (KeyD, P1Right),
        (Space, P1Fire),
        (ArrowUp, P2Up),
        (ArrowDown, P2Down),
        (ArrowLeft, P2Left),
        (ArrowRight, P2Right),
        (Enter, P2Fire),
        (Escape, Pause),
        (KeyP, Pause),
    ];
    for (key, action) in gameplay {
        input.bind_key(key, action, GAMEPLAY);
    }

    let menu = [
        (Enter, Confirm),
        (Space, Confirm),
        (Escape, Back),
        (KeyP, Back),
        (KeyC, Continue),
        (KeyS, ToggleSound),
        (KeyU, ToggleMusic),
        (KeyV, ToggleVibration),
        (KeyD, CycleDifficulty),
        (KeyT, TogglePlayers),
        (KeyM, ToMenu),
    ];
    for (key, action) in menu {
        input.bind_key(key, action, MENU);
    }
}

/// On-screen controls for player one, in window pixels.
pub fn touch_layout() -> [(ScreenRect, TankAction); 5] {
    [
        (ScreenRect::new(80.0, 420.0, 60.0, 60.0), TankAction::P1Up),
        (ScreenRect::new(80.0, 530.0, 60.0, 60.0), TankAction::P1Down),
        (ScreenRect::new(20.0, 475.0, 60.0, 60.0), TankAction::P1Left),
        (ScreenRect::new(140.0, 475.0, 60.0, 60.0), TankAction::P1Right),
        (ScreenRect::new(680.0, 480.0, 100.0, 100.0), TankAction::P1Fire),
    ]
}

//=== Translation =========================================================

/// Folds this frame's held actions into per-player controls.
pub fn player_inputs(actions: &[ActionEvent<TankAction>]) -> [PlayerInput; 2] {
    use TankAction::*;

    let read = |up: TankAction, down: TankAction, left: TankAction, right: TankAction, fire: TankAction| {
        let axis = |neg: TankAction, pos: TankAction| {
            actions.is_held(pos) as i32 as f32 - actions.is_held(neg) as i32 as f32
        };
        PlayerInput {
            movement: Vec2::new(axis(left, right), axis(up, down)),
            fire: actions.is_held(fire),
        }
    };

    [
        read(P1Up, P1Down, P1Left, P1Right, P1Fire),
        read(P2Up, P2Down, P2Left, P2Right, P2Fire),
    ]
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{InputEvent, StateTracker};

    #[test]
    fn same_key_means_different_things_per_context() {
        let mut input = InputSystem::new();
        let mut state = StateTracker::new();
        bind_defaults(&mut input);

        input.process_frame(&mut state, &[vec![InputEvent::key_down(KeyCode::Enter)]]);
        assert!(input.actions().was_pressed(TankAction::P2Fire));

        input.set_context(MENU);
        input.process_frame(&mut state, &[vec![InputEvent::key_up(KeyCode::Enter)]]);
        input.process_frame(&mut state, &[vec![InputEvent::key_down(KeyCode::Enter)]]);
        assert!(input.actions().was_pressed(TankAction::Confirm));
        assert!(!input.actions().was_pressed(TankAction::P2Fire));
    }

    #[test]
    fn held_actions_become_player_inputs() {
        let actions = [
            ActionEvent::held(TankAction::P1Right),
            ActionEvent::held(TankAction::P1Up),
            ActionEvent::held(TankAction::P1Fire),
            ActionEvent::held(TankAction::P2Left),
            ActionEvent::held(TankAction::P2Right),
        ];

        let [p1, p2] = player_inputs(&actions);
        assert_eq!(p1.movement, Vec2::new(1.0, -1.0));
        assert!(p1.fire);
        assert_eq!(p2.movement, Vec2::ZERO);
        assert!(!p2.fire);
    }

    #[test]
    fn touch_buttons_do_not_overlap() {
        let layout = touch_layout();
        for (i, (a, _)) in layout.iter().enumerate() {
            for (b, _) in layout.iter().skip(i + 1) {
                let overlap = a.x < b.x + b.width
                    && b.x < a.x + a.width
                    && a.y < b.y + b.height
                    && b.y < a.y + a.height;
                assert!(!overlap, "{:?} overlaps {:?}", a, b);
            }
        }
    }
}
