use crate::agent::{Coord, Elegan};
use crate::constants::SPACE_COLOR;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Scent readings to the agent's left and right.
pub type Observation = [f32; 2];

/// Pixel grid holding the food scent, plus the set of cells that currently hold food.
///
/// Each cell owns a `unit_size x unit_size` pixel square; only the top-left
/// `(unit_size - unit_gap)` square of it is painted by [`SpatialField::draw`].
#[derive(Clone, Debug)]
pub struct SpatialField {
    width: usize,
    height: usize,
    unit_size: usize,
    unit_gap: usize,
    pixels: Vec<f32>,
    foods: Vec<Coord>,
}

/// Owned snapshot of the pixel buffer, safe to hand to a renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub unit_size: usize,
    pub pixels: Vec<f32>,
}

impl Frame {
    pub fn pixel(&self, x: usize, y: usize) -> f32 {
        self.pixels[y * self.width + x]
    }

    /// Value painted for cell `(x, y)` (its top-left pixel).
    pub fn cell(&self, x: usize, y: usize) -> f32 {
        self.pixel(x * self.unit_size, y * self.unit_size)
    }

    pub fn cells_wide(&self) -> usize {
        self.width / self.unit_size
    }

    pub fn cells_high(&self) -> usize {
        self.height / self.unit_size
    }
}

impl SpatialField {
    pub fn new(width: usize, height: usize, unit_size: usize, unit_gap: usize) -> Self {
        assert!(unit_size > 0, "unit_size must be positive");
        assert!(unit_gap < unit_size, "unit_gap must be less than unit_size");
        let pixels = vec![SPACE_COLOR; width * unit_size * height * unit_size];
        Self {
            width,
            height,
            unit_size,
            unit_gap,
            pixels,
            foods: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    pub fn unit_gap(&self) -> usize {
        self.unit_gap
    }

    pub fn pixel_width(&self) -> usize {
        self.width * self.unit_size
    }

    pub fn pixel_height(&self) -> usize {
        self.height * self.unit_size
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    pub fn foods(&self) -> &[Coord] {
        &self.foods
    }

    pub fn is_off_grid(&self, coord: Coord) -> bool {
        coord[0] < 0
            || coord[1] < 0
            || coord[0] as usize >= self.width
            || coord[1] as usize >= self.height
    }

    /// Intensity of `coord`'s block. Off-grid cells read as background.
    pub fn color_at(&self, coord: Coord) -> f32 {
        if self.is_off_grid(coord) {
            return SPACE_COLOR;
        }
        let x = coord[0] as usize * self.unit_size;
        let y = coord[1] as usize * self.unit_size;
        self.pixels[y * self.pixel_width() + x]
    }

    /// Paint `coord`'s block. Returns false without writing when off-grid.
    pub fn draw(&mut self, coord: Coord, color: f32) -> bool {
        let (unit_size, unit_gap, pixel_width) = (self.unit_size, self.unit_gap, self.pixel_width());
        if self.is_off_grid(coord) {
            return false;
        }
        paint_block(&mut self.pixels, pixel_width, unit_size, unit_size - unit_gap, coord, color);
        true
    }

    /// Paint `coord`'s block into `buffer` (same layout as [`Self::pixels`]) instead of the field.
    pub fn draw_on_copy(&self, buffer: &mut [f32], coord: Coord, color: f32) -> bool {
        debug_assert_eq!(buffer.len(), self.pixels.len(), "buffer size mismatch");
        if self.is_off_grid(coord) {
            return false;
        }
        paint_block(
            buffer,
            self.pixel_width(),
            self.unit_size,
            self.unit_size - self.unit_gap,
            coord,
            color,
        );
        true
    }

    /// Reset `coord`'s whole block, gap included, to background.
    pub fn erase(&mut self, coord: Coord) -> bool {
        let (unit_size, pixel_width) = (self.unit_size, self.pixel_width());
        if self.is_off_grid(coord) {
            return false;
        }
        paint_block(&mut self.pixels, pixel_width, unit_size, unit_size, coord, SPACE_COLOR);
        true
    }

    /// Paint every cell with `intensity / (d + 1)^2`, `d` being its Euclidean
    /// distance to `source`. Replaces whatever the field held before.
    pub fn fill_gradient(&mut self, source: Coord, intensity: f32) {
        for i in 0..self.width as i32 {
            for j in 0..self.height as i32 {
                let dx = (source[0] - i) as f32;
                let dy = (source[1] - j) as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                let grad = intensity / (dist + 1.0).powi(2);
                self.draw([i, j], grad);
            }
        }
    }

    pub fn is_food(&self, coord: Coord) -> bool {
        self.foods.contains(&coord)
    }

    /// Put food on `coord` and radiate its scent. False if off-grid or already food.
    pub fn place_food_at(&mut self, coord: Coord, intensity: f32) -> bool {
        if self.is_off_grid(coord) || self.is_food(coord) {
            return false;
        }
        self.fill_gradient(coord, intensity);
        self.foods.push(coord);
        debug!(x = coord[0], y = coord[1], "placed food");
        true
    }

    /// Forget the food on `coord`. The scent stays until the next placement.
    pub fn remove_food(&mut self, coord: Coord) -> bool {
        match self.foods.iter().position(|&f| f == coord) {
            Some(idx) => {
                self.foods.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Place food on a cell chosen uniformly among those that hold no food and
    /// are not in `occupied`. Returns `None` when every cell is taken.
    pub fn place_food_randomly<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        occupied: &[Coord],
        intensity: f32,
    ) -> Option<Coord> {
        let candidates: Vec<Coord> = (0..self.height as i32)
            .flat_map(|y| (0..self.width as i32).map(move |x| [x, y]))
            .filter(|c| !self.is_food(*c) && !occupied.contains(c))
            .collect();
        if candidates.is_empty() {
            warn!(
                foods = self.foods.len(),
                occupied = occupied.len(),
                "no free cell left for food"
            );
            return None;
        }
        let coord = candidates[rng.random_range(0..candidates.len())];
        self.place_food_at(coord, intensity);
        Some(coord)
    }

    pub fn null_observation() -> Observation {
        [0.0, 0.0]
    }

    /// Scent one cell to the agent's relative left and right; null for an absent agent.
    pub fn observation_for(&self, elegan: Option<&Elegan>) -> Observation {
        let Some(elegan) = elegan else {
            return Self::null_observation();
        };
        let left = elegan.heading().left().step(elegan.head());
        let right = elegan.heading().right().step(elegan.head());
        [self.color_at(left), self.color_at(right)]
    }

    /// Copy of the field with each agent's head and body painted in its colour.
    pub fn render<'a>(&self, elegans: impl IntoIterator<Item = &'a Elegan>) -> Frame {
        let mut pixels = self.pixels.clone();
        for elegan in elegans {
            for cell in elegan.cells() {
                self.draw_on_copy(&mut pixels, cell, elegan.color());
            }
        }
        Frame {
            width: self.pixel_width(),
            height: self.pixel_height(),
            unit_size: self.unit_size,
            pixels,
        }
    }
}

fn paint_block(
    pixels: &mut [f32],
    pixel_width: usize,
    unit_size: usize,
    extent: usize,
    coord: Coord,
    color: f32,
) {
    let x0 = coord[0] as usize * unit_size;
    let y0 = coord[1] as usize * unit_size;
    for y in y0..y0 + extent {
        let row = y * pixel_width;
        pixels[row + x0..row + x0 + extent].fill(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::create_rng;
    use proptest::prelude::*;

    fn field() -> SpatialField {
        SpatialField::new(15, 15, 10, 1)
    }

    #[test]
    fn off_grid_checks_both_axes() {
        let field = field();
        assert!(!field.is_off_grid([0, 0]));
        assert!(!field.is_off_grid([14, 14]));
        assert!(field.is_off_grid([-1, 0]));
        assert!(field.is_off_grid([0, -1]));
        assert!(field.is_off_grid([15, 0]));
        assert!(field.is_off_grid([0, 15]));
    }

    #[test]
    fn draw_paints_block_and_leaves_gap() {
        let mut field = field();
        assert!(field.draw([2, 3], 0.5));
        let w = field.pixel_width();
        let px = |x: usize, y: usize| field.pixels()[y * w + x];
        assert_eq!(px(20, 30), 0.5);
        assert_eq!(px(28, 38), 0.5);
        // Gap column and row stay background.
        assert_eq!(px(29, 30), SPACE_COLOR);
        assert_eq!(px(20, 39), SPACE_COLOR);
        assert_eq!(field.color_at([2, 3]), 0.5);
        assert_eq!(field.color_at([3, 3]), SPACE_COLOR);
    }

    #[test]
    fn off_grid_draw_is_ignored() {
        let mut field = field();
        assert!(!field.draw([15, 0], 1.0));
        assert!(!field.draw([0, -1], 1.0));
        assert!(field.pixels().iter().all(|&p| p == SPACE_COLOR));
        assert_eq!(field.color_at([-3, 2]), SPACE_COLOR);
    }

    #[test]
    fn draw_on_copy_leaves_field_untouched() {
        let field = field();
        let mut buffer = field.pixels().to_vec();
        assert!(field.draw_on_copy(&mut buffer, [1, 1], -2.0));
        assert!(!field.draw_on_copy(&mut buffer, [99, 1], -2.0));
        assert_eq!(buffer[10 * field.pixel_width() + 10], -2.0);
        assert!(field.pixels().iter().all(|&p| p == SPACE_COLOR));
    }

    #[test]
    fn erase_clears_gap_pixels_too() {
        let mut field = field();
        field.fill_gradient([0, 0], 1.0);
        let w = field.pixel_width();
        field.pixels[9 * w + 9] = 0.25;
        assert!(field.erase([0, 0]));
        assert!(field.pixels()[..10].iter().all(|&p| p == SPACE_COLOR));
        assert_eq!(field.pixels()[9 * w + 9], SPACE_COLOR);
    }

    #[test]
    fn gradient_peaks_at_source_and_falls_off_inverse_square() {
        let mut field = field();
        field.fill_gradient([4, 4], 2.0);
        assert_eq!(field.color_at([4, 4]), 2.0);
        assert!((field.color_at([5, 4]) - 2.0 / 4.0).abs() < 1e-6);
        assert!((field.color_at([4, 7]) - 2.0 / 16.0).abs() < 1e-6);
        let diag = 2.0 / (2f32.sqrt() + 1.0).powi(2);
        assert!((field.color_at([5, 5]) - diag).abs() < 1e-6);
    }

    #[test]
    fn new_gradient_replaces_previous_one() {
        let mut field = field();
        field.fill_gradient([0, 0], 1.0);
        field.fill_gradient([14, 14], 1.0);
        assert_eq!(field.color_at([14, 14]), 1.0);
        assert!(field.color_at([0, 0]) < 0.01);
    }

    #[test]
    fn food_bookkeeping_tracks_cells() {
        let mut field = field();
        assert!(field.place_food_at([3, 3], 1.0));
        assert!(!field.place_food_at([3, 3], 1.0));
        assert!(!field.place_food_at([-1, 3], 1.0));
        assert!(field.is_food([3, 3]));
        assert_eq!(field.foods(), &[[3, 3]]);
        assert!(field.remove_food([3, 3]));
        assert!(!field.remove_food([3, 3]));
        assert!(field.foods().is_empty());
    }

    #[test]
    fn random_food_avoids_occupied_and_food_cells() {
        let mut field = SpatialField::new(10, 10, 2, 0);
        let mut rng = create_rng(3);
        let occupied: Vec<Coord> = (0..10)
            .flat_map(|y| (0..10).map(move |x| [x, y]))
            .filter(|c| *c != [4, 6] && *c != [7, 1])
            .collect();
        let first = field
            .place_food_randomly(&mut rng, &occupied, 1.0)
            .expect("two cells are free");
        let second = field
            .place_food_randomly(&mut rng, &occupied, 1.0)
            .expect("one cell is free");
        let mut placed = vec![first, second];
        placed.sort();
        assert_eq!(placed, vec![[4, 6], [7, 1]]);
        assert_eq!(field.place_food_randomly(&mut rng, &occupied, 1.0), None);
        assert_eq!(field.foods().len(), 2);
    }

    #[test]
    fn random_food_is_deterministic_per_seed() {
        let mut a = field();
        let mut b = field();
        let pa = a.place_food_randomly(&mut create_rng(11), &[], 1.0);
        let pb = b.place_food_randomly(&mut create_rng(11), &[], 1.0);
        assert_eq!(pa, pb);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn observation_reads_relative_left_and_right() {
        let mut field = field();
        // Agent at (7,4) facing south: left is east (8,4), right is west (6,4).
        field.draw([8, 4], 0.75);
        field.draw([6, 4], 0.25);
        let elegan = Elegan::new([7, 4], -1.0);
        assert_eq!(field.observation_for(Some(&elegan)), [0.75, 0.25]);
        assert_eq!(field.observation_for(None), SpatialField::null_observation());
    }

    #[test]
    fn observation_at_wall_reads_background() {
        let mut field = field();
        field.fill_gradient([0, 0], 1.0);
        let mut elegan = Elegan::new([0, 4], -1.0);
        elegan.advance(1);
        // Facing south at x = 0: the right-hand cell is off-grid.
        let obs = field.observation_for(Some(&elegan));
        assert_eq!(obs[1], SPACE_COLOR);
        assert!(obs[0] > 0.0);
    }

    #[test]
    fn render_paints_agents_on_a_copy() {
        let mut field = field();
        field.fill_gradient([10, 10], 1.0);
        let elegan = Elegan::new([7, 4], -1.0);
        let frame = field.render([&elegan]);
        assert_eq!(frame.cells_wide(), 15);
        assert_eq!(frame.cells_high(), 15);
        for y in 2..=4 {
            assert_eq!(frame.cell(7, y), -1.0);
        }
        assert_ne!(field.color_at([7, 4]), -1.0);
        assert_eq!(frame.cell(10, 10), 1.0);
    }

    proptest! {
        #[test]
        fn proptest_draw_stays_inside_its_block(
            x in -3i32..18,
            y in -3i32..18,
            unit_size in 1usize..6,
            gap_seed in 0usize..6,
        ) {
            let unit_gap = gap_seed % unit_size;
            let mut field = SpatialField::new(15, 15, unit_size, unit_gap);
            let drawn = field.draw([x, y], 1.0);
            prop_assert_eq!(drawn, !field.is_off_grid([x, y]));
            let w = field.pixel_width();
            let extent = unit_size - unit_gap;
            for (idx, &p) in field.pixels().iter().enumerate() {
                let (px, py) = (idx % w, idx / w);
                let inside = drawn
                    && px >= x as usize * unit_size
                    && px < x as usize * unit_size + extent
                    && py >= y as usize * unit_size
                    && py < y as usize * unit_size + extent;
                prop_assert_eq!(p == 1.0, inside);
            }
        }

        #[test]
        fn proptest_gradient_matches_closed_form(
            sx in 0i32..15,
            sy in 0i32..15,
            cx in 0i32..15,
            cy in 0i32..15,
            intensity in 0.1f32..10.0,
        ) {
            let mut field = field();
            field.fill_gradient([sx, sy], intensity);
            let d = (((sx - cx).pow(2) + (sy - cy).pow(2)) as f32).sqrt();
            let expected = intensity / (d + 1.0).powi(2);
            prop_assert!((field.color_at([cx, cy]) - expected).abs() <= 1e-5 * intensity);
        }
    }
}
