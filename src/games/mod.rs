//=========================================================================
// Games
//
// Each game is a module that defines its scene keys, actions and scenes,
// and assembles an `Engine` around the shared arcade services.
//
//=========================================================================

pub mod tank_battle;
