/// A single cell of a [`Grid`](crate::grid::Grid).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    alive: bool,
}

impl Cell {
    /// Return a dead cell. This is also what `Default` gives you.
    pub const fn dead() -> Self {
        Self { alive: false }
    }

    pub const fn alive() -> Self {
        Self { alive: true }
    }

    pub const fn new(alive: bool) -> Self {
        Self { alive }
    }

    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Flip the cell between alive and dead.
    pub fn toggle(&mut self) {
        self.alive = !self.alive;
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        Self::new(alive)
    }
}
