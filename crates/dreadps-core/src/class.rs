//! Skill to character class attribution.
//!
//! The log never states an actor's class, but most class skills have unique
//! names, so the first recognized skill pins the class. Exact match only;
//! unknown skills leave the class unset.

use phf::phf_map;
use serde::Serialize;
use strum::Display;

/// The seven playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum CharacterClass {
    #[strum(serialize = "Blade Master")]
    #[serde(rename = "Blade Master")]
    BladeMaster,
    #[strum(serialize = "Blade Dancer")]
    #[serde(rename = "Blade Dancer")]
    BladeDancer,
    Destroyer,
    #[strum(serialize = "Force Master")]
    #[serde(rename = "Force Master")]
    ForceMaster,
    #[strum(serialize = "Kung Fu Master")]
    #[serde(rename = "Kung Fu Master")]
    KungFuMaster,
    Assassin,
    Summoner,
}

static SKILL_CLASSES: phf::Map<&'static str, CharacterClass> = phf_map! {
    // Blade Master
    "Dragontongue" => CharacterClass::BladeMaster,
    "Flash Step" => CharacterClass::BladeMaster,
    "Soaring Falcon" => CharacterClass::BladeMaster,
    "Honed Slash" => CharacterClass::BladeMaster,
    "Searing Slash" => CharacterClass::BladeMaster,
    "Blade Call" => CharacterClass::BladeMaster,
    "Phoenix Slash" => CharacterClass::BladeMaster,
    "Burning Slash" => CharacterClass::BladeMaster,

    // Blade Dancer
    "Lightning Slash" => CharacterClass::BladeDancer,
    "Lightning Draw" => CharacterClass::BladeDancer,
    "Galeforce" => CharacterClass::BladeDancer,
    "Flicker" => CharacterClass::BladeDancer,
    "Lightning Flash" => CharacterClass::BladeDancer,
    "Thunder Slash" => CharacterClass::BladeDancer,

    // Destroyer
    "Whirling Scourge" => CharacterClass::Destroyer,
    "Seismic Strike" => CharacterClass::Destroyer,
    "Judgement" => CharacterClass::Destroyer,
    "Earthbreaker" => CharacterClass::Destroyer,
    "Typhoon" => CharacterClass::Destroyer,
    "Mighty Cleave" => CharacterClass::Destroyer,
    "Galestorm" => CharacterClass::Destroyer,
    "Wrath" => CharacterClass::Destroyer,
    "Ground Pound" => CharacterClass::Destroyer,

    // Force Master
    "Blaze Palm" => CharacterClass::ForceMaster,
    "Frost Palm" => CharacterClass::ForceMaster,
    "Dragonchar" => CharacterClass::ForceMaster,
    "Frost Fury" => CharacterClass::ForceMaster,
    "Inferno" => CharacterClass::ForceMaster,
    "Blazing Beam" => CharacterClass::ForceMaster,
    "Dual Dragons" => CharacterClass::ForceMaster,
    "Meteor Shower" => CharacterClass::ForceMaster,

    // Kung Fu Master
    "Flying Slam" => CharacterClass::KungFuMaster,
    "Tiger Strike" => CharacterClass::KungFuMaster,
    "Comet Strike" => CharacterClass::KungFuMaster,
    "Searing Palm" => CharacterClass::KungFuMaster,
    "Cyclone Kick" => CharacterClass::KungFuMaster,
    "Backstep" => CharacterClass::KungFuMaster,
    "Smite" => CharacterClass::KungFuMaster,

    // Assassin
    "Heart Stab" => CharacterClass::Assassin,
    "Shadow Slash" => CharacterClass::Assassin,
    "Lightning Pierce" => CharacterClass::Assassin,
    "Poison Breath" => CharacterClass::Assassin,
    "Decoy" => CharacterClass::Assassin,
    "Lotus Fury" => CharacterClass::Assassin,
    "Lotus Kick" => CharacterClass::Assassin,
    "Shadow Drain" => CharacterClass::Assassin,
    "Dew Slash" => CharacterClass::Assassin,
    "Lightning Crash: AoE" => CharacterClass::Assassin,
    "Shuriken" => CharacterClass::Assassin,

    // Summoner
    "Sunflower" => CharacterClass::Summoner,
    "Rosethorn" => CharacterClass::Summoner,
    "Flying Nettle" => CharacterClass::Summoner,
    "Seed Shroud" => CharacterClass::Summoner,
    "Thorn Strike" => CharacterClass::Summoner,
    "Wingstorm" => CharacterClass::Summoner,
    "Weed Whack" => CharacterClass::Summoner,
};

/// Look up the class a skill belongs to.
pub fn class_for_skill(skill: &str) -> Option<CharacterClass> {
    SKILL_CLASSES.get(skill).copied()
}
