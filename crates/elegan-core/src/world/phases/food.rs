use super::super::Simulation;
use crate::agent::Coord;

impl Simulation {
    /// Drop one food on a free cell. Live agents and existing food are avoided.
    pub(in crate::world) fn place_food(&mut self) -> Option<Coord> {
        let occupied = self.occupied_cells();
        let intensity = self.config.food_intensity;
        self.field
            .place_food_randomly(&mut self.rng, &occupied, intensity)
    }

    /// Eat the food under `head` and replace it straight away so later slots
    /// in the same tick already sense the new scent.
    pub(in crate::world) fn consume_food(&mut self, head: Coord) {
        if self.field.remove_food(head) {
            self.foods_eaten += 1;
            self.place_food();
        }
    }
}
