use super::super::{AgentSlot, Simulation};
use tracing::{debug, info};

impl Simulation {
    /// Apply one relative turn to slot `idx` and return its reward.
    pub(in crate::world) fn step_slot(&mut self, idx: usize, turn: i64) -> f32 {
        match self.slots[idx] {
            AgentSlot::Removed => return 0.0,
            AgentSlot::DeadPending(_) => {
                self.finalize_slot(idx);
                return 0.0;
            }
            AgentSlot::Live(_) => {}
        }

        let AgentSlot::Live(elegan) = &mut self.slots[idx] else {
            return 0.0;
        };
        let head = if self.field.is_food(elegan.next_head(turn)) {
            elegan.advance_and_grow(turn)
        } else {
            elegan.advance(turn)
        };

        if self.field.is_off_grid(head) {
            self.mark_dead(idx);
            -1.0
        } else if self.field.is_food(head) {
            self.consume_food(head);
            1.0
        } else {
            0.0
        }
    }

    fn mark_dead(&mut self, idx: usize) {
        let slot = std::mem::replace(&mut self.slots[idx], AgentSlot::Removed);
        if let AgentSlot::Live(elegan) = slot {
            info!(
                slot = idx,
                x = elegan.head()[0],
                y = elegan.head()[1],
                step = self.step_index,
                "elegan left the grid"
            );
            self.slots[idx] = AgentSlot::DeadPending(elegan);
            self.deaths += 1;
        } else {
            self.slots[idx] = slot;
        }
    }

    fn finalize_slot(&mut self, idx: usize) {
        self.slots[idx] = AgentSlot::Removed;
        self.elegans_remaining = self.elegans_remaining.saturating_sub(1);
        debug!(
            slot = idx,
            remaining = self.elegans_remaining,
            "removed dead elegan"
        );
    }
}
