//=========================================================================
// Pause Scene
//=========================================================================
//
// Opaque overlay pushed over Game. While it is on top the Game scene does
// not update, which freezes the battle.
//
//   Back (Esc / P)  → resume
//   ToMenu (M)      → drop the game (snapshot saved) and return to Menu
//
//=========================================================================

//=== External Dependencies ===============================================

use log::info;

//=== Internal Dependencies ===============================================

use super::{transition, TankScene, TankServices};
use crate::core::input::{ActionEvent, ActionQuery};
use crate::core::{GlobalContext, Scene, SceneTransition};
use crate::games::tank_battle::actions::{TankAction, GAMEPLAY, MENU};

//=== PauseScene ==========================================================

pub struct PauseScene {
    services: TankServices,
}

impl PauseScene {
    pub fn new(services: TankServices) -> Self {
        Self { services }
    }
}

impl Scene<TankScene> for PauseScene {
    fn on_enter(&mut self, _context: &GlobalContext) {
        info!(
            target: "tank_battle",
            "[pause] {} - {}",
            self.services.text("pause.title"),
            self.services.text("pause.resume")
        );
    }

    fn update(&mut self, context: &mut GlobalContext) {
        let actions = context.message_bus.read::<ActionEvent<TankAction>>();

        if actions.was_pressed(TankAction::Back) {
            transition(context, SceneTransition::Remove(TankScene::Pause), GAMEPLAY);
        } else if actions.was_pressed(TankAction::ToMenu) {
            context.message_bus.push(SceneTransition::Remove(TankScene::Pause));
            transition(
                context,
                SceneTransition::Replace(TankScene::Game, TankScene::Menu),
                MENU,
            );
        }
    }
}
