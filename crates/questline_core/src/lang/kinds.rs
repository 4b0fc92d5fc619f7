//! Define the builtin instruction kinds and their argument patterns.
//!
//! This module is the single source of truth for the builtin kinds: one table per list kind ([`EVENTS`],
//! [`CONDITIONS`], [`OBJECTIVES`]) recording the canonical spelling, aliases, a description and the
//! [`ArgumentPattern`] the binder applies. Tables are built once on first use.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**; aliases are explicit.
//! - Kind names are namespaced by list kind: `tag` is both an event and a condition, with different patterns.
//!
//! ## Examples
//! ```rust
//! use questline_core::lang::kinds;
//! use questline_core::lang::lists::ListKind;
//!
//! assert!(kinds::from_str(ListKind::Conditions, "tag").is_some());
//! assert_eq!(kinds::from_str(ListKind::Events, "tp").unwrap().canonical, "teleport");
//! ```

use std::sync::LazyLock;

use super::lists::ListKind;
use super::patterns::{ArgumentPattern, MandatorySlot, OptionalPosition, OptionalSlot, key, slot};
use super::values::ValueType;

/// Metadata for a builtin kind.
#[derive(Debug, Clone)]
pub struct KindInfo {
    pub list: ListKind,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    pub pattern: ArgumentPattern,
}

const EVENT_REFS: ValueType = ValueType::ReferenceList(ListKind::Events);
const CONDITION_REFS: ValueType = ValueType::ReferenceList(ListKind::Conditions);
const OBJECTIVE_REFS: ValueType = ValueType::ReferenceList(ListKind::Objectives);

/// Every event accepts a `conditions:` gate.
fn event_optionals() -> Vec<OptionalSlot> {
    vec![key("conditions", CONDITION_REFS, "has_started")]
}

/// Every objective accepts `events:` fired on completion and `conditions:` gating progress.
fn objective_optionals() -> Vec<OptionalSlot> {
    vec![
        key("events", EVENT_REFS, "reward"),
        key("conditions", CONDITION_REFS, "has_started"),
        key("notify", ValueType::Boolean, "true"),
    ]
}

/// Registry of builtin events.
pub static EVENTS: LazyLock<Vec<KindInfo>> = LazyLock::new(|| {
    vec![
        info(
            ListKind::Events,
            "give",
            &[],
            "Give items to the player.",
            pattern(
                vec![slot("item", ValueType::Item, "emerald")],
                vec![
                    key("amount", ValueType::Integer, "1"),
                    key("notify", ValueType::Boolean, "true"),
                    key("conditions", CONDITION_REFS, "has_started"),
                ],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "teleport",
            &["tp"],
            "Teleport the player to a location.",
            pattern(
                vec![slot("location", ValueType::Location, "100;64;100;world")],
                event_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "spawn",
            &[],
            "Spawn mobs next to the player.",
            pattern(
                vec![slot("entity", ValueType::Text, "ZOMBIE"), slot("count", ValueType::Integer, "1")],
                vec![
                    key("name", ValueType::Text, "\"Grim Reaper\""),
                    key("conditions", CONDITION_REFS, "has_started"),
                ],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "notify",
            &["message"],
            "Send a message to the player.",
            pattern(
                vec![slot("message", ValueType::Text, "Hello there!")],
                vec![key("io", ValueType::Text, "chat"), key("conditions", CONDITION_REFS, "has_started")],
                OptionalPosition::Tail,
                true,
            ),
        ),
        info(
            ListKind::Events,
            "command",
            &[],
            "Run a console command.",
            pattern(
                vec![slot("command", ValueType::Text, "say hello")],
                event_optionals(),
                OptionalPosition::Tail,
                true,
            ),
        ),
        info(
            ListKind::Events,
            "sudo",
            &[],
            "Run a command as the player; options come before the command text.",
            pattern(
                vec![slot("command", ValueType::Text, "spawn")],
                vec![key("op", ValueType::Boolean, "false"), key("conditions", CONDITION_REFS, "has_started")],
                OptionalPosition::Head,
                true,
            ),
        ),
        info(
            ListKind::Events,
            "tag",
            &[],
            "Add or remove player tags.",
            pattern(
                vec![slot("action", ValueType::Text, "add"), slot("tags", ValueType::Text, "quest_started")],
                event_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "journal",
            &[],
            "Add, remove or update journal entries.",
            pattern(
                vec![slot("action", ValueType::Text, "add"), slot("entry", ValueType::Text, "quest_started")],
                event_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "point",
            &[],
            "Change a point category.",
            pattern(
                vec![slot("category", ValueType::Text, "reputation"), slot("amount", ValueType::Integer, "1")],
                event_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "objective",
            &[],
            "Start, complete or cancel objectives.",
            pattern(
                vec![slot("action", ValueType::Text, "start"), slot("objectives", OBJECTIVE_REFS, "kill_zombies")],
                event_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "folder",
            &[],
            "Run several events, optionally delayed.",
            pattern(
                vec![slot("events", EVENT_REFS, "first,second")],
                vec![
                    key("delay", ValueType::Number, "5"),
                    key("period", ValueType::Number, "1"),
                    key("conditions", CONDITION_REFS, "has_started"),
                ],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Events,
            "kill",
            &[],
            "Kill the player.",
            pattern(vec![], event_optionals(), OptionalPosition::Tail, false),
        ),
    ]
});

/// Registry of builtin conditions.
pub static CONDITIONS: LazyLock<Vec<KindInfo>> = LazyLock::new(|| {
    vec![
        info(
            ListKind::Conditions,
            "tag",
            &[],
            "The player has a tag.",
            pattern(vec![slot("tag", ValueType::Text, "quest_started")], vec![], OptionalPosition::Tail, false),
        ),
        info(
            ListKind::Conditions,
            "item",
            &[],
            "The player carries an item.",
            pattern(
                vec![slot("item", ValueType::Item, "emerald")],
                vec![key("amount", ValueType::Integer, "1")],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Conditions,
            "point",
            &[],
            "The player has at least an amount of points in a category.",
            pattern(
                vec![slot("category", ValueType::Text, "reputation"), slot("amount", ValueType::Integer, "10")],
                vec![key("equal", ValueType::Boolean, "false")],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Conditions,
            "location",
            &[],
            "The player is within a radius of a location.",
            pattern(
                vec![
                    slot("location", ValueType::Location, "100;64;100;world"),
                    slot("radius", ValueType::Number, "5"),
                ],
                vec![],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Conditions,
            "and",
            &["all"],
            "Every listed condition is met.",
            pattern(vec![slot("conditions", CONDITION_REFS, "first,second")], vec![], OptionalPosition::Tail, false),
        ),
        info(
            ListKind::Conditions,
            "or",
            &["alternative"],
            "At least one listed condition is met.",
            pattern(vec![slot("conditions", CONDITION_REFS, "first,second")], vec![], OptionalPosition::Tail, false),
        ),
        info(
            ListKind::Conditions,
            "objective",
            &[],
            "The player has an active objective.",
            pattern(
                vec![slot("objective", ValueType::Reference(ListKind::Objectives), "kill_zombies")],
                vec![],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Conditions,
            "time",
            &[],
            "The world time is within a range.",
            pattern(vec![slot("range", ValueType::Text, "6-18")], vec![], OptionalPosition::Tail, false),
        ),
    ]
});

/// Registry of builtin objectives.
pub static OBJECTIVES: LazyLock<Vec<KindInfo>> = LazyLock::new(|| {
    vec![
        info(
            ListKind::Objectives,
            "location",
            &[],
            "Reach a location.",
            pattern(
                vec![
                    slot("location", ValueType::Location, "100;64;100;world"),
                    slot("radius", ValueType::Number, "5"),
                ],
                objective_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Objectives,
            "kill",
            &["mobkill"],
            "Kill an amount of mobs.",
            pattern(
                vec![slot("entity", ValueType::Text, "ZOMBIE"), slot("amount", ValueType::Integer, "5")],
                vec![
                    key("name", ValueType::Text, "\"Grim Reaper\""),
                    key("events", EVENT_REFS, "reward"),
                    key("conditions", CONDITION_REFS, "has_started"),
                    key("notify", ValueType::Boolean, "true"),
                ],
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Objectives,
            "delay",
            &[],
            "Wait for an amount of minutes.",
            pattern(
                vec![slot("time", ValueType::Number, "10")],
                objective_optionals(),
                OptionalPosition::Tail,
                false,
            ),
        ),
        info(
            ListKind::Objectives,
            "die",
            &[],
            "Die.",
            pattern(vec![], objective_optionals(), OptionalPosition::Tail, false),
        ),
    ]
});

/// The registry table for a list kind.
pub fn kinds(list: ListKind) -> &'static [KindInfo] {
    match list {
        ListKind::Events => EVENTS.as_slice(),
        ListKind::Conditions => CONDITIONS.as_slice(),
        ListKind::Objectives => OBJECTIVES.as_slice(),
    }
}

/// Lookup by spelling (canonical or alias) within one list kind.
///
/// ## Returns
/// - `Some(&KindInfo)` if the spelling matches.
/// - `None` otherwise.
pub fn from_str(list: ListKind, s: &str) -> Option<&'static KindInfo> {
    let table = kinds(list);
    if let Some(k) = table.iter().find(|k| k.canonical == s) {
        return Some(k);
    }
    table.iter().find(|k| {
        let aliases: &[&str] = k.aliases;
        aliases.contains(&s)
    })
}

// --- helpers -----------------------------------------------------------------

fn pattern(
    mandatory: Vec<MandatorySlot>,
    optional: Vec<OptionalSlot>,
    optional_position: OptionalPosition,
    preserve_whitespace: bool,
) -> ArgumentPattern {
    let pattern = ArgumentPattern::new(mandatory, optional).with_optional_position(optional_position);
    if preserve_whitespace {
        pattern.preserving_whitespace()
    } else {
        pattern
    }
}

fn info(
    list: ListKind,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
    pattern: ArgumentPattern,
) -> KindInfo {
    KindInfo {
        list,
        canonical,
        aliases,
        description,
        pattern,
    }
}
