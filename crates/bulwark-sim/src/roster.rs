//! Unit database: the roster of spawnable templates.

use std::collections::BTreeMap;
use std::path::Path;

use bulwark_core::components::{EntityTemplate, ProjectileSpec};
use bulwark_core::constants::*;
use bulwark_core::enums::*;
use bulwark_core::error::ConfigError;
use bulwark_core::stats::StatBlock;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::services::TemplateLookup;

/// One roster row as stored in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRecord {
    pub code: u32,
    pub name: String,
    #[serde(default)]
    pub grade: UnitGrade,
    /// Defaults from the code range when omitted.
    #[serde(default)]
    pub kind: Option<UnitKind>,
    pub hp: i32,
    #[serde(default)]
    pub def: i32,
    pub atk: i32,
    pub atk_spd: f32,
    pub atk_range: f32,
    pub mov_spd: f32,
    #[serde(default)]
    pub range_class: RangeClass,
    #[serde(default = "default_footprint")]
    pub footprint: Vec2,
    /// Present for ranged units.
    #[serde(default)]
    pub projectile: Option<ProjectileSpec>,
}

fn default_footprint() -> Vec2 {
    Vec2::ONE
}

impl UnitRecord {
    pub fn kind(&self) -> UnitKind {
        self.kind.unwrap_or(if self.code >= ENEMY_CODE_MIN {
            UnitKind::Enemy
        } else {
            UnitKind::Soldier
        })
    }

    /// Lookup name: `BossEnemy`, `Enemy{code}` or `Unit{code}`.
    pub fn template_name(&self) -> String {
        match self.kind() {
            UnitKind::Boss => BOSS_TEMPLATE_NAME.to_string(),
            UnitKind::Enemy => enemy_template_name(self.code),
            UnitKind::Soldier | UnitKind::Firedoor => player_template_name(self.code),
        }
    }

    pub fn to_template(&self) -> EntityTemplate {
        EntityTemplate {
            name: self.template_name(),
            code: self.code,
            kind: self.kind(),
            grade: self.grade,
            stats: StatBlock::new(
                self.hp,
                self.def,
                self.atk,
                self.atk_spd,
                self.atk_range,
                self.mov_spd,
            ),
            range_class: self.range_class,
            footprint: self.footprint,
            projectile: self.projectile,
        }
    }
}

/// Templates keyed by lookup name.
#[derive(Debug, Clone, Default)]
pub struct UnitDatabase {
    templates: BTreeMap<String, EntityTemplate>,
}

impl UnitDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: &[UnitRecord]) -> Self {
        let mut db = Self::new();
        for record in records {
            db.insert(record.to_template());
        }
        db
    }

    /// Parse a JSON array of `UnitRecord`s.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let records: Vec<UnitRecord> = serde_json::from_str(json)?;
        for record in &records {
            if record.hp <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "unit {} ({}) has non-positive hp",
                    record.code, record.name
                )));
            }
        }
        Ok(Self::from_records(&records))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Insert or replace a template under its own name.
    pub fn insert(&mut self, template: EntityTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn remove(&mut self, name: &str) -> Option<EntityTemplate> {
        self.templates.remove(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// The stock roster: five soldiers, three enemies and the boss.
    pub fn builtin() -> Self {
        Self::from_records(&builtin_records())
    }
}

impl TemplateLookup for UnitDatabase {
    fn lookup(&self, name: &str) -> Option<EntityTemplate> {
        self.templates.get(name).cloned()
    }
}

#[allow(clippy::too_many_arguments)]
fn record(
    code: u32,
    name: &str,
    grade: UnitGrade,
    hp: i32,
    def: i32,
    atk: i32,
    atk_spd: f32,
    atk_range: f32,
    mov_spd: f32,
    range_class: RangeClass,
    ranged: bool,
) -> UnitRecord {
    UnitRecord {
        code,
        name: name.to_string(),
        grade,
        kind: None,
        hp,
        def,
        atk,
        atk_spd,
        atk_range,
        mov_spd,
        range_class,
        footprint: Vec2::new(0.8, 0.8),
        projectile: ranged.then(ProjectileSpec::default),
    }
}

fn builtin_records() -> Vec<UnitRecord> {
    use RangeClass::*;
    use UnitGrade::*;

    let mut boss = record(0, "Warlord", Legendary, 400, 6, 25, 0.5, 1.5, 0.9, Near, false);
    boss.kind = Some(UnitKind::Boss);
    boss.footprint = Vec2::new(1.4, 1.4);

    vec![
        record(1001, "Swordsman", Common, 120, 4, 14, 1.0, 1.2, 2.5, Near, false),
        record(1002, "Spearman", Common, 100, 3, 12, 1.2, 1.6, 2.5, Near, false),
        record(1003, "Archer", Advanced, 70, 1, 10, 0.8, 8.0, 2.0, Mid, true),
        record(1004, "Crossbowman", Epic, 60, 1, 18, 0.5, 12.0, 2.0, Far, true),
        record(1005, "Mage", Unique, 55, 0, 24, 0.4, 12.0, 1.8, Far, true),
        record(2001, "Grunt", Common, 50, 1, 8, 1.0, 1.0, 1.5, Near, false),
        record(2002, "Brute", Advanced, 90, 3, 12, 0.7, 1.2, 1.2, Near, false),
        record(2003, "Slinger", Common, 40, 0, 6, 0.8, 5.0, 1.6, Near, true),
        boss,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_default_code_ranges() {
        let db = UnitDatabase::builtin();
        for code in PLAYER_CODE_MIN..=1005 {
            let template = db.lookup(&player_template_name(code)).unwrap();
            assert_eq!(template.kind, UnitKind::Soldier);
            assert_eq!(template.code, code);
        }
        for code in ENEMY_CODE_MIN..=2003 {
            assert_eq!(
                db.lookup(&enemy_template_name(code)).unwrap().kind,
                UnitKind::Enemy
            );
        }
        let boss = db.lookup(BOSS_TEMPLATE_NAME).unwrap();
        assert_eq!(boss.kind, UnitKind::Boss);
        assert_eq!(boss.grade, UnitGrade::Legendary);
        assert!(db.lookup("Unit9999").is_none());
    }

    #[test]
    fn ranged_units_carry_projectiles() {
        let db = UnitDatabase::builtin();
        assert!(db.lookup("Unit1004").unwrap().projectile.is_some());
        assert!(db.lookup("Unit1001").unwrap().projectile.is_none());
    }

    #[test]
    fn json_records_with_defaults() {
        let json = r#"[
            { "code": 1001, "name": "Pike", "hp": 80, "atk": 9, "atk_spd": 1.5, "atk_range": 1.0, "mov_spd": 2.0 },
            { "code": 2001, "name": "Rat", "grade": "Epic", "hp": 10, "atk": 2, "atk_spd": 2.0, "atk_range": 0.5, "mov_spd": 3.0,
              "projectile": { "speed": 4.0 } }
        ]"#;
        let db = UnitDatabase::from_json_str(json).unwrap();
        assert_eq!(db.len(), 2);

        let pike = db.lookup("Unit1001").unwrap();
        assert_eq!(pike.stats.defense(), 0);
        assert_eq!(pike.range_class, RangeClass::Near);
        assert_eq!(pike.footprint, Vec2::ONE);

        let rat = db.lookup("Enemy2001").unwrap();
        assert_eq!(rat.grade, UnitGrade::Epic);
        let spec = rat.projectile.unwrap();
        assert_eq!(spec.speed, 4.0);
        assert_eq!(spec.lifetime_secs, PROJECTILE_LIFETIME_SECS);
    }

    #[test]
    fn json_rejects_dead_templates() {
        let json = r#"[{ "code": 1001, "name": "Ghost", "hp": 0, "atk": 1, "atk_spd": 1.0, "atk_range": 1.0, "mov_spd": 1.0 }]"#;
        assert!(matches!(
            UnitDatabase::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }
}
