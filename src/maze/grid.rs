use std::collections::VecDeque;

/// A single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Floor,
}

/// Cell coordinate, `x` is the column and `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// max(|dx|, |dy|)
    pub fn chebyshev(self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Step one cell in `dir`; `None` when that would leave the non-negative quadrant.
    pub fn step(self, dir: Direction) -> Option<Pos> {
        let (dx, dy) = dir.delta();
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Pos { x, y })
    }
}

/// The four orthogonal directions in the order the carver inspects them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Arrow-key `KeyboardEvent.code` to direction.
    pub fn from_key_code(code: &str) -> Option<Direction> {
        match code {
            "ArrowUp" => Some(Direction::Up),
            "ArrowRight" => Some(Direction::Right),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            _ => None,
        }
    }
}

/// Wall/floor grid. We use a flat vector row-major, like the level tiles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Grid with every cell set to `Wall`.
    pub fn walled(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Wall; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn get(&self, pos: Pos) -> Option<Cell> {
        if self.contains(pos) {
            Some(self.cells[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    /// Out-of-bounds positions count as walls.
    pub fn is_floor(&self, pos: Pos) -> bool {
        self.get(pos) == Some(Cell::Floor)
    }

    pub(crate) fn set(&mut self, pos: Pos, cell: Cell) {
        let idx = pos.y * self.width + pos.x;
        self.cells[idx] = cell;
    }

    pub fn is_border(&self, pos: Pos) -> bool {
        pos.x == 0 || pos.y == 0 || pos.x + 1 == self.width || pos.y + 1 == self.height
    }

    /// Number of `Floor` cells among the four orthogonal neighbours.
    pub fn floor_neighbors(&self, pos: Pos) -> usize {
        Direction::ALL
            .iter()
            .filter_map(|&d| pos.step(d))
            .filter(|&p| self.is_floor(p))
            .count()
    }

    pub fn floor_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Floor).count()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &c)| (Pos::new(i % self.width, i / self.width), c))
    }

    /// Count of floor cells 4-connected to `start` (including it). Zero when
    /// `start` is not a floor cell.
    pub fn reachable_from(&self, start: Pos) -> usize {
        if !self.is_floor(start) {
            return 0;
        }
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::from([start]);
        seen[start.y * self.width + start.x] = true;
        let mut count = 0;
        while let Some(p) = queue.pop_front() {
            count += 1;
            for d in Direction::ALL {
                let Some(n) = p.step(d) else { continue };
                if !self.is_floor(n) {
                    continue;
                }
                let idx = n.y * self.width + n.x;
                if !seen[idx] {
                    seen[idx] = true;
                    queue.push_back(n);
                }
            }
        }
        count
    }

    /// Render as text, `#` for walls and `.` for floor. Handy in test failures.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(match self.cells[y * self.width + x] {
                    Cell::Wall => '#',
                    Cell::Floor => '.',
                });
            }
            out.push('\n');
        }
        out
    }
}
