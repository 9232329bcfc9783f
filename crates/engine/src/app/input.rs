#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Interact,
    Confirm,
    Quit,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Interact => 4,
            InputAction::Confirm => 5,
            InputAction::Quit => 6,
        }
    }
}

/// Press-edge detector for single-shot actions. Holding the key yields one
/// edge; a new edge needs a release first.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct PressEdge {
    is_down: bool,
    pressed: bool,
}

impl PressEdge {
    pub(crate) fn update(&mut self, is_down: bool) {
        if is_down && !self.is_down {
            self.pressed = true;
        }
        self.is_down = is_down;
    }

    pub(crate) fn take(&mut self) -> bool {
        std::mem::take(&mut self.pressed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_states_track_each_action_independently() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::Confirm, true);
        states.set(InputAction::Confirm, false);

        assert!(states.is_down(InputAction::MoveLeft));
        assert!(!states.is_down(InputAction::MoveRight));
        assert!(!states.is_down(InputAction::Confirm));
    }

    #[test]
    fn held_key_produces_single_edge() {
        let mut edge = PressEdge::default();
        edge.update(true);
        assert!(edge.take());
        edge.update(true);
        assert!(!edge.take());
        edge.update(false);
        edge.update(true);
        assert!(edge.take());
    }

    #[test]
    fn press_and_release_before_take_still_counts() {
        let mut edge = PressEdge::default();
        edge.update(true);
        edge.update(false);
        assert!(edge.take());
        assert!(!edge.take());
    }
}
