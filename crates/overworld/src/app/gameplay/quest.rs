use std::collections::BTreeMap;

use tracing::{info, warn};

use super::notifications::{NotificationKind, Notifications};
use super::player_record::PlayerRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum QuestStatus {
    #[default]
    NotStarted,
    InProgress,
    Complete,
}

struct QuestDef {
    id: &'static str,
    title: &'static str,
    description: &'static str,
}

struct ItemDef {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
}

const MAP_QUEST: QuestDef = QuestDef {
    id: "map",
    title: "The borrowed map",
    description: "Hibou lent you a map. Renard the cartographer may know what to make of it.",
};
const COMPASS_QUEST: QuestDef = QuestDef {
    id: "compass",
    title: "A true heading",
    description: "Renard traded the map for a compass.",
};
const CAVE_QUEST: QuestDef = QuestDef {
    id: "cave",
    title: "Below the hill",
    description: "Blaireau pointed you toward the cave to the west.",
};

const MAP_ITEM: ItemDef = ItemDef {
    name: "Map",
    description: "A hand-drawn map of the valley.",
    icon: "items/map",
};
const COMPASS_ITEM: ItemDef = ItemDef {
    name: "Compass",
    description: "Its needle never wavers.",
    icon: "items/compass",
};

pub(crate) const COMPASS_BADGE: &str = "compass";
pub(crate) const EXPLORER_BADGE: &str = "explorer";

/// Hint shown for each story step; later steps reuse the last entry.
pub(crate) const STORY_HINTS: &[&str] = &[
    "Hibou waits by the house. Say hello.",
    "Bring Hibou's map to Renard by the lake.",
    "Show your compass to Blaireau in the south-east woods.",
    "The cave to the west is yours to explore.",
];

/// One per session. Story step and quest statuses move independently.
#[derive(Debug, Default)]
pub(crate) struct QuestProgress {
    story_step: u32,
    quests: BTreeMap<String, QuestStatus>,
}

impl QuestProgress {
    pub(crate) fn status(&self, id: &str) -> QuestStatus {
        self.quests.get(id).copied().unwrap_or_default()
    }

    /// NotStarted -> InProgress; any other status is left alone. Returns
    /// whether the quest was started by this call.
    pub(crate) fn accept_quest(&mut self, id: &str) -> bool {
        let status = self.quests.entry(id.to_string()).or_default();
        if *status == QuestStatus::NotStarted {
            *status = QuestStatus::InProgress;
            true
        } else {
            false
        }
    }

    /// Returns whether the status changed.
    pub(crate) fn complete_quest(&mut self, id: &str) -> bool {
        let status = self.quests.entry(id.to_string()).or_default();
        let changed = *status != QuestStatus::Complete;
        *status = QuestStatus::Complete;
        changed
    }

    pub(crate) fn advance_story(&mut self) -> u32 {
        self.story_step = self.story_step.saturating_add(1);
        self.story_step
    }

    pub(crate) fn story_step(&self) -> u32 {
        self.story_step
    }

    pub(crate) fn story_hint(&self) -> &'static str {
        let index = (self.story_step as usize).min(STORY_HINTS.len() - 1);
        STORY_HINTS[index]
    }
}

/// Which acceptance rule an NPC runs, resolved from its name at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NpcRole {
    Elder,
    Cartographer,
    Hermit,
    Villager,
}

impl NpcRole {
    pub(crate) fn from_name(name: &str) -> Self {
        match name {
            "Hibou" => NpcRole::Elder,
            "Renard" => NpcRole::Cartographer,
            "Blaireau" => NpcRole::Hermit,
            _ => NpcRole::Villager,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            NpcRole::Elder => "elder",
            NpcRole::Cartographer => "cartographer",
            NpcRole::Hermit => "hermit",
            NpcRole::Villager => "villager",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
    Applied,
    /// A precondition failed; nothing was mutated.
    Rejected,
    NoEffect,
}

pub(crate) struct ResolutionContext<'a, R: PlayerRecord> {
    pub(crate) progress: &'a mut QuestProgress,
    pub(crate) record: &'a mut R,
    pub(crate) notifications: &'a mut Notifications,
}

impl<R: PlayerRecord> ResolutionContext<'_, R> {
    fn start_quest(&mut self, quest: &QuestDef) {
        if self.progress.accept_quest(quest.id) {
            self.record
                .add_quest(quest.id, quest.title, quest.description);
            self.notifications
                .push(NotificationKind::Quest, format!("New quest: {}", quest.title));
        }
    }

    fn finish_quest(&mut self, quest: &QuestDef) {
        self.record
            .add_quest(quest.id, quest.title, quest.description);
        if self.progress.complete_quest(quest.id) {
            self.record.complete_quest(quest.id);
            self.notifications.push(
                NotificationKind::Quest,
                format!("Quest complete: {}", quest.title),
            );
        }
    }

    fn unlock_badge(&mut self, id: &str) {
        self.record.unlock_badge(id);
        self.notifications
            .push(NotificationKind::Info, format!("Badge unlocked: {id}"));
    }

    fn reject(&mut self, role: NpcRole, text: &str) -> Resolution {
        warn!(role = role.as_str(), reason = text, "resolution_rejected");
        self.notifications.push(NotificationKind::Warning, text);
        Resolution::Rejected
    }
}

/// Runs the rule attached to `role` when the player accepts its offer.
pub(crate) fn resolve_acceptance<R: PlayerRecord>(
    role: NpcRole,
    ctx: &mut ResolutionContext<'_, R>,
) -> Resolution {
    let resolution = match role {
        NpcRole::Elder => resolve_elder(ctx),
        NpcRole::Cartographer => resolve_cartographer(ctx),
        NpcRole::Hermit => resolve_hermit(ctx),
        NpcRole::Villager => Resolution::NoEffect,
    };
    info!(
        role = role.as_str(),
        ?resolution,
        story_step = ctx.progress.story_step(),
        "quest_resolved"
    );
    resolution
}

fn resolve_elder<R: PlayerRecord>(ctx: &mut ResolutionContext<'_, R>) -> Resolution {
    if ctx.progress.status(MAP_QUEST.id) != QuestStatus::NotStarted {
        return Resolution::NoEffect;
    }
    if !ctx
        .record
        .add_item(MAP_ITEM.name, MAP_ITEM.description, MAP_ITEM.icon)
    {
        return ctx.reject(NpcRole::Elder, "Your bag is full. Make room for the map.");
    }
    ctx.notifications.push(
        NotificationKind::Info,
        format!("Received: {}", MAP_ITEM.name),
    );
    ctx.start_quest(&MAP_QUEST);
    ctx.progress.advance_story();
    Resolution::Applied
}

fn resolve_cartographer<R: PlayerRecord>(ctx: &mut ResolutionContext<'_, R>) -> Resolution {
    if ctx.progress.status(COMPASS_QUEST.id) == QuestStatus::Complete {
        return Resolution::NoEffect;
    }
    if !ctx.record.has_item(MAP_ITEM.name) {
        return ctx.reject(
            NpcRole::Cartographer,
            "Renard needs a map to work from. Hibou may have one.",
        );
    }

    ctx.record.remove_item(MAP_ITEM.name);
    if !ctx
        .record
        .add_item(COMPASS_ITEM.name, COMPASS_ITEM.description, COMPASS_ITEM.icon)
    {
        // Only reachable if the record refuses the freed slot.
        ctx.record
            .add_item(MAP_ITEM.name, MAP_ITEM.description, MAP_ITEM.icon);
        return ctx.reject(NpcRole::Cartographer, "Your bag is full.");
    }
    ctx.notifications.push(
        NotificationKind::Info,
        format!("Traded {} for {}", MAP_ITEM.name, COMPASS_ITEM.name),
    );

    if ctx.progress.status(MAP_QUEST.id) == QuestStatus::InProgress {
        ctx.finish_quest(&MAP_QUEST);
    }
    ctx.finish_quest(&COMPASS_QUEST);
    ctx.unlock_badge(COMPASS_BADGE);
    ctx.progress.advance_story();
    Resolution::Applied
}

fn resolve_hermit<R: PlayerRecord>(ctx: &mut ResolutionContext<'_, R>) -> Resolution {
    if ctx.progress.status(CAVE_QUEST.id) == QuestStatus::Complete {
        return Resolution::NoEffect;
    }
    if !ctx.record.has_item(COMPASS_ITEM.name) {
        return ctx.reject(
            NpcRole::Hermit,
            "Blaireau won't give directions to someone without a compass.",
        );
    }

    ctx.start_quest(&CAVE_QUEST);
    ctx.finish_quest(&CAVE_QUEST);
    ctx.unlock_badge(EXPLORER_BADGE);
    ctx.progress.advance_story();
    Resolution::Applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::gameplay::player_record::{Inventory, INVENTORY_SLOTS};

    struct Session {
        progress: QuestProgress,
        inventory: Inventory,
        notifications: Notifications,
    }

    impl Session {
        fn new() -> Self {
            Self {
                progress: QuestProgress::default(),
                inventory: Inventory::default(),
                notifications: Notifications::default(),
            }
        }

        fn accept(&mut self, role: NpcRole) -> Resolution {
            let mut ctx = ResolutionContext {
                progress: &mut self.progress,
                record: &mut self.inventory,
                notifications: &mut self.notifications,
            };
            resolve_acceptance(role, &mut ctx)
        }
    }

    #[test]
    fn accept_quest_is_idempotent() {
        let mut progress = QuestProgress::default();
        assert!(progress.accept_quest("map"));
        assert!(!progress.accept_quest("map"));
        assert_eq!(progress.status("map"), QuestStatus::InProgress);

        progress.complete_quest("map");
        assert!(!progress.accept_quest("map"));
        assert_eq!(progress.status("map"), QuestStatus::Complete);
    }

    #[test]
    fn story_hint_clamps_to_last_entry() {
        let mut progress = QuestProgress::default();
        assert_eq!(progress.story_hint(), STORY_HINTS[0]);
        for _ in 0..10 {
            progress.advance_story();
        }
        assert_eq!(progress.story_hint(), STORY_HINTS[STORY_HINTS.len() - 1]);
    }

    #[test]
    fn roles_resolve_from_names() {
        assert_eq!(NpcRole::from_name("Hibou"), NpcRole::Elder);
        assert_eq!(NpcRole::from_name("Renard"), NpcRole::Cartographer);
        assert_eq!(NpcRole::from_name("Blaireau"), NpcRole::Hermit);
        assert_eq!(NpcRole::from_name("Mulot"), NpcRole::Villager);
    }

    #[test]
    fn elder_gives_map_and_advances_story_once() {
        let mut session = Session::new();
        assert_eq!(session.accept(NpcRole::Elder), Resolution::Applied);
        assert_eq!(session.accept(NpcRole::Elder), Resolution::NoEffect);

        assert!(session.inventory.has_item("Map"));
        assert_eq!(session.inventory.items().len(), 1);
        assert_eq!(session.progress.status("map"), QuestStatus::InProgress);
        assert_eq!(session.progress.story_step(), 1);
    }

    #[test]
    fn elder_with_full_bag_warns_without_mutation() {
        let mut session = Session::new();
        for index in 0..INVENTORY_SLOTS {
            session.inventory.add_item(&format!("pebble-{index}"), "", "items/pebble");
        }

        assert_eq!(session.accept(NpcRole::Elder), Resolution::Rejected);
        assert_eq!(session.progress.status("map"), QuestStatus::NotStarted);
        assert_eq!(session.progress.story_step(), 0);
        assert!(session.inventory.quest_book().is_empty());
        let last = session.notifications.iter().last().expect("warning");
        assert_eq!(last.kind, NotificationKind::Warning);
    }

    #[test]
    fn cartographer_without_map_rejects() {
        let mut session = Session::new();
        assert_eq!(session.accept(NpcRole::Cartographer), Resolution::Rejected);
        assert_eq!(session.progress.status("compass"), QuestStatus::NotStarted);
        assert!(session.inventory.items().is_empty());
        assert!(!session.inventory.has_badge(COMPASS_BADGE));
        assert_eq!(session.notifications.len(), 1);
    }

    #[test]
    fn cartographer_trades_map_for_compass() {
        let mut session = Session::new();
        session.accept(NpcRole::Elder);
        assert_eq!(session.accept(NpcRole::Cartographer), Resolution::Applied);

        assert!(!session.inventory.has_item("Map"));
        assert!(session.inventory.has_item("Compass"));
        assert_eq!(session.progress.status("map"), QuestStatus::Complete);
        assert_eq!(session.progress.status("compass"), QuestStatus::Complete);
        assert!(session.inventory.has_badge(COMPASS_BADGE));
        assert_eq!(session.progress.story_step(), 2);
        assert!(session
            .inventory
            .quest_book()
            .iter()
            .all(|entry| entry.completed));
    }

    #[test]
    fn cartographer_with_map_from_elsewhere_skips_map_quest() {
        let mut session = Session::new();
        session.inventory.add_item("Map", "", "items/map");
        assert_eq!(session.accept(NpcRole::Cartographer), Resolution::Applied);
        assert_eq!(session.progress.status("map"), QuestStatus::NotStarted);
        assert_eq!(session.progress.status("compass"), QuestStatus::Complete);
    }

    #[test]
    fn hermit_requires_compass_then_completes_cave() {
        let mut session = Session::new();
        assert_eq!(session.accept(NpcRole::Hermit), Resolution::Rejected);
        assert_eq!(session.progress.status("cave"), QuestStatus::NotStarted);

        session.accept(NpcRole::Elder);
        session.accept(NpcRole::Cartographer);
        assert_eq!(session.accept(NpcRole::Hermit), Resolution::Applied);
        assert_eq!(session.progress.status("cave"), QuestStatus::Complete);
        assert!(session.inventory.has_badge(EXPLORER_BADGE));
        assert!(session.inventory.has_item("Compass"));
        assert_eq!(session.progress.story_step(), 3);

        assert_eq!(session.accept(NpcRole::Hermit), Resolution::NoEffect);
        assert_eq!(session.progress.story_step(), 3);
    }

    #[test]
    fn villager_changes_nothing() {
        let mut session = Session::new();
        assert_eq!(session.accept(NpcRole::Villager), Resolution::NoEffect);
        assert_eq!(session.progress.story_step(), 0);
        assert!(session.notifications.is_empty());
    }
}
