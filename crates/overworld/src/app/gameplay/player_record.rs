use std::collections::BTreeSet;

use tracing::debug;

pub(crate) const INVENTORY_SLOTS: usize = 4;

/// Seam to whatever owns the player's items, quest book and badges.
pub(crate) trait PlayerRecord {
    /// Returns false when every slot is taken.
    fn add_item(&mut self, name: &str, description: &str, icon: &str) -> bool;
    fn remove_item(&mut self, name: &str) -> bool;
    fn has_item(&self, name: &str) -> bool;
    fn add_quest(&mut self, id: &str, title: &str, description: &str);
    fn complete_quest(&mut self, id: &str);
    fn unlock_badge(&mut self, id: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Item {
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct QuestEntry {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) completed: bool,
}

#[derive(Debug, Default)]
pub(crate) struct Inventory {
    items: Vec<Item>,
    quest_book: Vec<QuestEntry>,
    badges: BTreeSet<String>,
}

impl Inventory {
    pub(crate) fn items(&self) -> &[Item] {
        &self.items
    }

    #[cfg(test)]
    pub(crate) fn quest_book(&self) -> &[QuestEntry] {
        &self.quest_book
    }

    #[cfg(test)]
    pub(crate) fn has_badge(&self, id: &str) -> bool {
        self.badges.contains(id)
    }

    pub(crate) fn badge_count(&self) -> usize {
        self.badges.len()
    }

    /// Most recently accepted quest that is still open.
    pub(crate) fn open_quest(&self) -> Option<&QuestEntry> {
        self.quest_book.iter().rev().find(|entry| !entry.completed)
    }
}

impl PlayerRecord for Inventory {
    fn add_item(&mut self, name: &str, description: &str, icon: &str) -> bool {
        if self.items.len() >= INVENTORY_SLOTS {
            return false;
        }
        self.items.push(Item {
            name: name.to_string(),
        });
        debug!(
            item = name,
            description,
            icon,
            used_slots = self.items.len(),
            "item_added"
        );
        true
    }

    fn remove_item(&mut self, name: &str) -> bool {
        match self.items.iter().position(|item| item.name == name) {
            Some(index) => {
                self.items.remove(index);
                debug!(item = name, "item_removed");
                true
            }
            None => false,
        }
    }

    fn has_item(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    fn add_quest(&mut self, id: &str, title: &str, description: &str) {
        if self.quest_book.iter().any(|entry| entry.id == id) {
            return;
        }
        self.quest_book.push(QuestEntry {
            id: id.to_string(),
            title: title.to_string(),
            completed: false,
        });
        debug!(quest = id, title, description, "quest_entry_added");
    }

    fn complete_quest(&mut self, id: &str) {
        if let Some(entry) = self.quest_book.iter_mut().find(|entry| entry.id == id) {
            entry.completed = true;
        }
    }

    fn unlock_badge(&mut self, id: &str) {
        if self.badges.insert(id.to_string()) {
            debug!(badge = id, "badge_unlocked");
        }
    }
}
