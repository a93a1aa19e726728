//! Combat log sentence parsing.
//!
//! The game writes prose sentences, not structured records. Five fixed
//! patterns cover every damage phrasing; everything else in the log is
//! narrative and parses to `None`. Apostrophes arrive HTML-escaped
//! (`&apos;s`) in the raw log memory and the patterns match them as such.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Literal identity the log uses for the local player.
pub const SELF_IDENTITY: &str = "You";

/// One damage event extracted from a log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatEvent {
    pub actor: String,
    pub damage: u64,
    pub target: String,
    pub skill: String,
    pub critical: bool,
}

// "X received N damage from Y's Z" - any actor observed hitting any target
static OBSERVED_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<target>.+?) received (?P<damage>\d+(?:,\d+)*) (?P<critical>Critical Damage|damage)(?: and Daze)? from (?P<actor>.+?)&apos;s (?P<skill>.+?)\.?$",
    )
    .expect("observed-hit pattern")
});

// "Z hit|critically hit X for N damage" - own outgoing damage
static OWN_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<skill>.+?) (?P<critical>critically hit|hit) (?P<target>.+?) for (?P<damage>\d+(?:,\d+)*) damage\.?$",
    )
    .expect("own-hit pattern")
});

// "Received N damage from Y's Z" - incoming damage, subject elided
static RECEIVED_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Received (?P<damage>\d+(?:,\d+)*) damage from (?P<actor>.+?)&apos;s (?P<skill>.+?)\.?$",
    )
    .expect("received-hit pattern")
});

// "Y's Z inflicted N damage [and <debuff>]" - incoming, debuff clause ignored
static INFLICTED_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<actor>.+?)&apos;s (?P<skill>.+?) inflicted (?P<damage>\d+(?:,\d+)*) damage(?: and (?P<debuff>.+?))?\.?$",
    )
    .expect("inflicted-hit pattern")
});

// "Blocked Y's Z but received N damage" - partial block still counts
static BLOCKED_HIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^Blocked (?P<actor>.+?)&apos;s (?P<skill>.+?) but received (?P<damage>\d+(?:,\d+)*) damage\.?$",
    )
    .expect("blocked-hit pattern")
});

/// Classify a raw log line against the known damage sentence patterns.
///
/// Matchers are tried in precedence order and the first hit wins. `None` is
/// the common case: most log lines are narrative, not combat.
pub fn parse_combat_line(line: &str) -> Option<CombatEvent> {
    const MATCHERS: &[fn(&str) -> Option<CombatEvent>] = &[
        match_observed_hit,
        match_own_hit,
        match_received_hit,
        match_inflicted_hit,
        match_blocked_hit,
    ];

    MATCHERS.iter().find_map(|matcher| matcher(line))
}

fn match_observed_hit(line: &str) -> Option<CombatEvent> {
    let caps = OBSERVED_HIT.captures(line)?;
    Some(CombatEvent {
        actor: caps["actor"].to_string(),
        damage: parse_damage(&caps["damage"])?,
        target: caps["target"].to_string(),
        skill: caps["skill"].to_string(),
        critical: caps["critical"].to_ascii_lowercase().contains("critical"),
    })
}

fn match_own_hit(line: &str) -> Option<CombatEvent> {
    let caps = OWN_HIT.captures(line)?;
    Some(CombatEvent {
        actor: SELF_IDENTITY.to_string(),
        damage: parse_damage(&caps["damage"])?,
        target: caps["target"].to_string(),
        skill: caps["skill"].to_string(),
        critical: caps["critical"].starts_with("critically"),
    })
}

fn match_received_hit(line: &str) -> Option<CombatEvent> {
    let caps = RECEIVED_HIT.captures(line)?;
    Some(CombatEvent {
        actor: caps["actor"].to_string(),
        damage: parse_damage(&caps["damage"])?,
        target: SELF_IDENTITY.to_string(),
        skill: caps["skill"].to_string(),
        critical: false,
    })
}

fn match_inflicted_hit(line: &str) -> Option<CombatEvent> {
    let caps = INFLICTED_HIT.captures(line)?;
    Some(CombatEvent {
        actor: caps["actor"].to_string(),
        damage: parse_damage(&caps["damage"])?,
        target: SELF_IDENTITY.to_string(),
        skill: caps["skill"].to_string(),
        critical: false,
    })
}

fn match_blocked_hit(line: &str) -> Option<CombatEvent> {
    let caps = BLOCKED_HIT.captures(line)?;
    Some(CombatEvent {
        actor: caps["actor"].to_string(),
        damage: parse_damage(&caps["damage"])?,
        target: SELF_IDENTITY.to_string(),
        skill: caps["skill"].to_string(),
        critical: false,
    })
}

fn parse_damage(raw: &str) -> Option<u64> {
    raw.replace(',', "").parse().ok()
}
