use engine::Vec2;
use tracing::info;

use super::quest::NpcRole;

pub(crate) const DEFAULT_INTERACTION_RADIUS: f32 = 2.0;

#[derive(Debug, Clone)]
pub(crate) struct Npc {
    pub(crate) name: String,
    pub(crate) position: Vec2,
    pub(crate) portrait: String,
    /// Spoken lines; never empty for validated content.
    pub(crate) lines: Vec<String>,
    pub(crate) role: NpcRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InteractionState {
    Free,
    InDialogue { npc: usize, line: usize },
    AwaitingChoice { npc: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DialogueChoice {
    Accept,
    Close,
}

/// First NPC in registry order within `radius`, not the nearest one.
pub(crate) fn npc_in_reach(npcs: &[Npc], position: Vec2, radius: f32) -> Option<usize> {
    npcs.iter()
        .position(|npc| npc.position.distance(position) <= radius)
}

/// Dialogue state machine. Movement is paused whenever it is not `Free`.
#[derive(Debug)]
pub(crate) struct DialogueSession {
    state: InteractionState,
    radius: f32,
}

impl DialogueSession {
    pub(crate) fn new(radius: f32) -> Self {
        Self {
            state: InteractionState::Free,
            radius,
        }
    }

    pub(crate) fn state(&self) -> InteractionState {
        self.state
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.state != InteractionState::Free
    }

    #[cfg(test)]
    pub(crate) fn current_npc(&self) -> Option<usize> {
        match self.state {
            InteractionState::Free => None,
            InteractionState::InDialogue { npc, .. } | InteractionState::AwaitingChoice { npc } => {
                Some(npc)
            }
        }
    }

    pub(crate) fn current_line<'a>(&self, npcs: &'a [Npc]) -> Option<&'a str> {
        match self.state {
            InteractionState::InDialogue { npc, line } => npcs
                .get(npc)
                .and_then(|npc| npc.lines.get(line))
                .map(String::as_str),
            _ => None,
        }
    }

    /// Opens a dialogue with the first NPC in reach. Only valid while free.
    pub(crate) fn try_open(&mut self, npcs: &[Npc], position: Vec2) -> Option<usize> {
        if self.state != InteractionState::Free {
            return None;
        }
        let index = npc_in_reach(npcs, position, self.radius)?;
        self.state = InteractionState::InDialogue {
            npc: index,
            line: 0,
        };
        info!(npc = npcs[index].name.as_str(), "dialogue_opened");
        Some(index)
    }

    /// Moves to the next line, or to the choice after the last one.
    pub(crate) fn advance(&mut self, npcs: &[Npc]) {
        let InteractionState::InDialogue { npc, line } = self.state else {
            return;
        };
        let line_count = npcs.get(npc).map_or(0, |npc| npc.lines.len());
        self.state = if line + 1 < line_count {
            InteractionState::InDialogue {
                npc,
                line: line + 1,
            }
        } else {
            InteractionState::AwaitingChoice { npc }
        };
    }

    /// Closes the dialogue. Returns the NPC when the choice was made while
    /// awaiting one; the caller runs the NPC's rule on `Accept`.
    pub(crate) fn choose(&mut self, choice: DialogueChoice) -> Option<usize> {
        let InteractionState::AwaitingChoice { npc } = self.state else {
            return None;
        };
        self.state = InteractionState::Free;
        info!(npc_index = npc, ?choice, "dialogue_closed");
        Some(npc)
    }
}
