//=========================================================================
// Feedback Cues
//=========================================================================
//
// Sound and vibration requests derived from battle events, gated by the
// player's settings, plus background music on/off. Cues travel on the
// message bus; an audio or haptics backend reads them there.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::battle::BattleEvent;
use super::entity::Side;
use crate::settings::SettingsConfig;

//=== Cue Types ===========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Fire,
    Hit,
    Explosion,
    LevelUp,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackCue {
    Sound(SoundCue),
    /// Vibration pulse in milliseconds.
    Vibrate(u32),
    /// Background music should be playing (`true`) or silent.
    Music(bool),
}

//=== Mapping =============================================================

pub fn music_cue(settings: &SettingsConfig) -> FeedbackCue {
    FeedbackCue::Music(settings.music)
}

/// Cues for one tick's events, respecting the sound and vibration toggles.
pub fn cues_for(events: &[BattleEvent], settings: &SettingsConfig) -> Vec<FeedbackCue> {
    let mut cues = Vec::new();

    for event in events {
        let (sound, vibration) = match event {
            BattleEvent::Fired { side: Side::Player } => (Some(SoundCue::Fire), None),
            BattleEvent::Fired { side: Side::Enemy } => (None, None),
            BattleEvent::Hit { side: Side::Player, .. } => (Some(SoundCue::Hit), Some(50)),
            BattleEvent::Hit { side: Side::Enemy, .. } => (Some(SoundCue::Hit), None),
            BattleEvent::TankDefeated { side: Side::Player, .. } => {
                (Some(SoundCue::Explosion), Some(200))
            }
            BattleEvent::TankDefeated { side: Side::Enemy, .. } => (Some(SoundCue::Explosion), None),
            BattleEvent::WaveCleared { .. } => (Some(SoundCue::LevelUp), None),
            BattleEvent::GameOver(_) => (Some(SoundCue::GameOver), Some(400)),
        };

        if let (true, Some(cue)) = (settings.sound, sound) {
            cues.push(FeedbackCue::Sound(cue));
        }
        if let (true, Some(ms)) = (settings.vibration, vibration) {
            cues.push(FeedbackCue::Vibrate(ms));
        }
    }

    cues
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn player_hit() -> BattleEvent {
        BattleEvent::Hit { side: Side::Player, position: Vec2::ZERO }
    }

    #[test]
    fn enabled_settings_emit_sound_and_vibration() {
        let cues = cues_for(&[player_hit()], &SettingsConfig::default());
        assert_eq!(cues, vec![FeedbackCue::Sound(SoundCue::Hit), FeedbackCue::Vibrate(50)]);
    }

    #[test]
    fn sound_off_silences_everything() {
        let settings = SettingsConfig { sound: false, vibration: false, ..SettingsConfig::default() };
        let events = [player_hit(), BattleEvent::Fired { side: Side::Player }];
        assert!(cues_for(&events, &settings).is_empty());
    }

    #[test]
    fn music_follows_its_toggle() {
        let settings = SettingsConfig { music: false, ..SettingsConfig::default() };
        assert_eq!(music_cue(&settings), FeedbackCue::Music(false));
        assert_eq!(music_cue(&SettingsConfig::default()), FeedbackCue::Music(true));
    }

    #[test]
    fn vibration_only() {
        let settings = SettingsConfig { sound: false, ..SettingsConfig::default() };
        assert_eq!(cues_for(&[player_hit()], &settings), vec![FeedbackCue::Vibrate(50)]);
    }
}
