use std::collections::VecDeque;
use std::fmt;

/// Integer cell coordinate `[x, y]`; `[0, 0]` is the top-left cell.
pub type Coord = [i32; 2];

/// Absolute movement direction. Discriminants are the wire codes 0..4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Heading {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    pub fn from_code(code: i64) -> Result<Self, InvalidDirection> {
        match code {
            0 => Ok(Heading::North),
            1 => Ok(Heading::East),
            2 => Ok(Heading::South),
            3 => Ok(Heading::West),
            _ => Err(InvalidDirection(code)),
        }
    }

    pub fn code(self) -> i64 {
        self as i64
    }

    /// Rotate by `delta` quarter turns clockwise (negative turns left).
    pub fn rotated(self, delta: i64) -> Self {
        Self::ALL[(self.code() + delta).rem_euclid(4) as usize]
    }

    pub fn left(self) -> Self {
        self.rotated(-1)
    }

    pub fn right(self) -> Self {
        self.rotated(1)
    }

    fn offset(self) -> [i32; 2] {
        match self {
            Heading::North => [0, -1],
            Heading::East => [1, 0],
            Heading::South => [0, 1],
            Heading::West => [-1, 0],
        }
    }

    pub fn step(self, coord: Coord) -> Coord {
        let [dx, dy] = self.offset();
        [coord[0] + dx, coord[1] + dy]
    }
}

/// A direction code outside `0..4` was passed to [`step_coordinate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidDirection(pub i64);

impl fmt::Display for InvalidDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "direction code {} is outside 0..4", self.0)
    }
}

impl std::error::Error for InvalidDirection {}

/// Coordinate one unit from `coord` in absolute direction `direction`
/// (0 north, 1 east, 2 south, 3 west).
pub fn step_coordinate(coord: Coord, direction: i64) -> Result<Coord, InvalidDirection> {
    Heading::from_code(direction).map(|heading| heading.step(coord))
}

/// Collapse any integer action to a turn delta: 0 left (-1), 1 straight (0), 2 right (+1).
pub fn turn_delta(turn: i64) -> i64 {
    turn.rem_euclid(3) - 1
}

/// One organism: a head, a heading, and the trail of previous head positions.
#[derive(Clone, Debug, PartialEq)]
pub struct Elegan {
    head: Coord,
    heading: Heading,
    // Oldest segment at the front.
    body: VecDeque<Coord>,
    color: f32,
}

impl Elegan {
    /// Spawn facing south with the body stretched out north of `head`.
    pub fn new(head: Coord, color: f32) -> Self {
        let segments = crate::constants::START_BODY_LENGTH - 1;
        let body = (1..=segments as i32)
            .rev()
            .map(|i| [head[0], head[1] - i])
            .collect();
        Self {
            head,
            heading: Heading::South,
            body,
            color,
        }
    }

    pub fn head(&self) -> Coord {
        self.head
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn body(&self) -> &VecDeque<Coord> {
        &self.body
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    pub fn color(&self) -> f32 {
        self.color
    }

    /// Head plus every body segment.
    pub fn cells(&self) -> impl Iterator<Item = Coord> + '_ {
        std::iter::once(self.head).chain(self.body.iter().copied())
    }

    /// Head position `advance(turn)` would produce, without moving.
    pub fn next_head(&self, turn: i64) -> Coord {
        self.heading.rotated(turn_delta(turn)).step(self.head)
    }

    /// Turn, move one cell, and drop the oldest body segment.
    pub fn advance(&mut self, turn: i64) -> Coord {
        self.advance_inner(turn, true)
    }

    /// Turn and move one cell keeping every segment, so the body grows by one.
    pub fn advance_and_grow(&mut self, turn: i64) -> Coord {
        self.advance_inner(turn, false)
    }

    fn advance_inner(&mut self, turn: i64, trim_tail: bool) -> Coord {
        self.heading = self.heading.rotated(turn_delta(turn));
        self.body.push_back(self.head);
        if trim_tail {
            self.body.pop_front();
        }
        self.head = self.heading.step(self.head);
        self.head
    }
}
