//=========================================================================
// Preload Scene
//=========================================================================
//
// First scene on the stack. Loads settings and strings, then hands over
// to the menu on its first update.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{info, warn};

//=== Internal Dependencies ===============================================

use super::{transition, TankScene, TankServices};
use crate::core::{GlobalContext, Scene, SceneTransition};
use crate::games::tank_battle::actions::MENU;
use crate::i18n::Catalog;

//=== PreloadScene ========================================================

pub struct PreloadScene {
    services: TankServices,
}

impl PreloadScene {
    pub fn new(services: TankServices) -> Self {
        Self { services }
    }

    fn load(&self) {
        self.services.settings.lock().reload();

        match Catalog::builtin(self.services.locale.as_str()) {
            Ok(mut catalog) => {
                catalog.set_locale(self.services.locale.as_str());
                *self.services.catalog.write() = catalog;
            }
            Err(e) => warn!(target: "tank_battle", "Built-in strings unavailable: {}", e),
        }

        info!(
            target: "tank_battle",
            "Preload done (locale {}, storage {})",
            self.services.locale,
            self.services.data.backend_name()
        );
    }
}

impl Scene<TankScene> for PreloadScene {
    fn update(&mut self, context: &mut GlobalContext) {
        self.load();
        transition(context, SceneTransition::Replace(TankScene::Preload, TankScene::Menu), MENU);
    }
}
