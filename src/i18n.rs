//=========================================================================
// Internationalization
//=========================================================================
//
// Flat key → string catalogs per locale.
//
// Lookup order:
//   active locale → fallback locale ("en") → the key itself
//
// `{name}` placeholders are replaced from the argument list; unknown
// placeholders are left as written.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};
use thiserror::Error;

//=== I18nError ===========================================================

#[derive(Debug, Error)]
pub enum I18nError {
    #[error("catalog for {locale} is not a flat string map: {source}")]
    Parse {
        locale: String,
        #[source]
        source: serde_json::Error,
    },
}

//=== Built-in Catalogs ===================================================

const EN: &str = r#"{
    "menu.title": "Tank Battle",
    "menu.start": "Start",
    "menu.continue": "Continue (Level {level}, Score {score})",
    "menu.sound_on": "Sound: On",
    "menu.sound_off": "Sound: Off",
    "menu.music_on": "Music: On",
    "menu.music_off": "Music: Off",
    "menu.vibration_on": "Vibration: On",
    "menu.vibration_off": "Vibration: Off",
    "menu.difficulty": "Difficulty: {difficulty}",
    "menu.players": "Players: {count}",
    "difficulty.easy": "Easy",
    "difficulty.medium": "Medium",
    "difficulty.hard": "Hard",
    "hud.score": "Score: {score}",
    "hud.level": "Level: {level}",
    "hud.enemies": "Enemies: {count}",
    "hud.health": "P{player} HP: {health}",
    "pause.title": "Paused",
    "pause.resume": "Press Esc to resume",
    "gameover.title": "Game Over",
    "gameover.summary": "Score {score} - Level {level} - {defeated} tanks destroyed",
    "gameover.new_best": "New high score!",
    "gameover.restart": "Enter: play again, Esc: menu"
}"#;

const ZH: &str = r#"{
    "menu.title": "坦克大战",
    "menu.start": "开始游戏",
    "menu.continue": "继续游戏（第{level}关，得分{score}）",
    "menu.sound_on": "音效：开",
    "menu.sound_off": "音效：关",
    "menu.music_on": "音乐：开",
    "menu.music_off": "音乐：关",
    "menu.vibration_on": "振动：开",
    "menu.vibration_off": "振动：关",
    "menu.difficulty": "难度：{difficulty}",
    "menu.players": "玩家人数：{count}",
    "difficulty.easy": "简单",
    "difficulty.medium": "中等",
    "difficulty.hard": "困难",
    "hud.score": "得分：{score}",
    "hud.level": "关卡：{level}",
    "hud.enemies": "敌人：{count}",
    "hud.health": "玩家{player} 生命：{health}",
    "pause.title": "已暂停",
    "pause.resume": "按 Esc 继续",
    "gameover.title": "游戏结束",
    "gameover.summary": "得分 {score} - 第 {level} 关 - 击毁 {defeated} 辆坦克",
    "gameover.new_best": "新纪录！",
    "gameover.restart": "回车：再来一局，Esc：返回菜单"
}"#;

//=== Catalog =============================================================

pub struct Catalog {
    locale: String,
    fallback: String,
    tables: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    pub const FALLBACK_LOCALE: &'static str = "en";

    /// Empty catalog; every lookup returns its key.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback: Self::FALLBACK_LOCALE.to_string(),
            tables: HashMap::new(),
        }
    }

    /// Catalog with the bundled English and Chinese tables.
    pub fn builtin(locale: impl Into<String>) -> Result<Self, I18nError> {
        let mut catalog = Self::new(locale);
        catalog.load_json("en", EN)?;
        catalog.load_json("zh", ZH)?;
        Ok(catalog)
    }

    /// Merges a JSON object of strings into `locale`'s table.
    pub fn load_json(&mut self, locale: &str, json: &str) -> Result<usize, I18nError> {
        let entries: HashMap<String, String> =
            serde_json::from_str(json).map_err(|source| I18nError::Parse {
                locale: locale.to_string(),
                source,
            })?;

        let count = entries.len();
        self.tables
            .entry(locale.to_string())
            .or_default()
            .extend(entries);

        debug!(target: "i18n", "Loaded {} strings for locale {}", count, locale);
        Ok(count)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        let locale = locale.into();
        if !self.tables.contains_key(&locale) {
            warn!(target: "i18n", "No strings loaded for locale {}, falling back to {}", locale, self.fallback);
        }
        self.locale = locale;
    }

    pub fn available_locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }

    //--- Lookup -----------------------------------------------------------

    pub fn t(&self, key: &str) -> String {
        self.lookup(key).to_string()
    }

    /// Looks up `key` and fills `{name}` placeholders from `args`.
    pub fn t_with(&self, key: &str, args: &[(&str, String)]) -> String {
        interpolate(self.lookup(key), args)
    }

    fn lookup<'a>(&'a self, key: &'a str) -> &'a str {
        [self.locale.as_str(), self.fallback.as_str()]
            .iter()
            .find_map(|locale| self.tables.get(*locale).and_then(|table| table.get(key)))
            .map(String::as_str)
            .unwrap_or(key)
    }
}

fn interpolate(template: &str, args: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match args.iter().find(|(arg, _)| *arg == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

//=========================================================================
// Unit Tests
//=========================================================================
