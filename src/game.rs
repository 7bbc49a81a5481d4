use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::Coord;
use crate::cell::Cell;
use crate::grid::Boundary;
use crate::grid::Bounds;
use crate::grid::Grid;
use crate::grid::GridError;
use crate::rule_set::RuleSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    /// How many generations [`Game::init`] advances by.
    pub max_generations: usize,

    pub boundary: Boundary,

    pub rules: RuleSet,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_generations: 1,
            boundary: Boundary::default(),
            rules: RuleSet::default(),
        }
    }
}

/// Drives a [`Grid`] through generations of a Life-like rule.
///
/// The game starts at generation 0 with whatever cells were toggled on. Each call to
/// [`Game::init`] then replaces the grid `max_generations` times with the next generation.
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    config: GameConfig,
    generation: u64,
}

impl Game {
    /// A game over a fresh `rows` by `columns` grid, with the default config.
    pub fn new(rows: Coord, columns: Coord) -> Result<Self, GridError> {
        Self::with_config(rows, columns, GameConfig::default())
    }

    pub fn with_config(rows: Coord, columns: Coord, config: GameConfig) -> Result<Self, GridError> {
        Ok(Self::from_grid(Grid::new(rows, columns)?, config))
    }

    pub fn from_grid(grid: Grid, config: GameConfig) -> Self {
        Self {
            grid,
            config,
            generation: 0,
        }
    }

    pub fn row_count(&self) -> Coord {
        self.grid.row_count()
    }

    pub fn column_count(&self) -> Coord {
        self.grid.column_count()
    }

    /// The current generation.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn max_generations(&self) -> usize {
        self.config.max_generations
    }

    pub fn set_max_generations(&mut self, max_generations: usize) {
        self.config.max_generations = max_generations;
    }

    pub fn set_boundary(&mut self, boundary: Boundary) {
        self.config.boundary = boundary;
    }

    pub fn set_rules(&mut self, rules: RuleSet) {
        self.config.rules = rules;
    }

    /// Number of generations applied since the game was created.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn toggle_grid_cell(&mut self, row: Coord, column: Coord) -> Result<(), GridError> {
        self.grid.toggle(row, column)
    }

    /// Advance by `max_generations` generations, returning how many were applied.
    ///
    /// Can be called again, in which case it continues from the current state.
    pub fn init(&mut self) -> usize {
        let n = self.config.max_generations;

        for i in 0..n {
            if !self.step() {
                // Still life, the remaining generations would all be identical
                let skipped = n - i - 1;
                self.generation += skipped as u64;

                debug!(skipped, "Grid settled");
                break;
            }
        }

        debug!(
            generations = n,
            generation = self.generation,
            population = self.grid.population(),
            "Evolved grid"
        );

        n
    }

    /// Advance by a single generation. Returns whether any cell changed.
    pub fn step(&mut self) -> bool {
        if self.config.boundary == Boundary::Unbounded {
            self.reframe();
        }

        let next = self.next_generation();
        let changed = next != self.grid;

        self.grid = next;
        self.generation += 1;

        changed
    }

    fn next_generation(&self) -> Grid {
        let GameConfig {
            boundary, rules, ..
        } = self.config;

        let mut next = self.grid.cleared();

        for ((row, column), cell) in self.grid.positions().zip(next.cells_mut()) {
            let alive = self.grid.is_alive(row, column);
            let neighbors = self.grid.live_neighbors(row, column, boundary);

            *cell = Cell::new(rules.next_state(alive, neighbors));
        }

        next
    }

    /// Reframe the grid around its live cells, leaving one dead row or column on every side so that
    /// births just past the pattern have somewhere to go. Empty grids are left alone.
    fn reframe(&mut self) {
        let Some(bounds) = self.grid.live_bounds() else {
            return;
        };

        let Some((rows, columns, origin)) = framed(bounds) else {
            warn!(?bounds, "Grid cannot grow any further");
            return;
        };

        if (rows, columns, origin)
            == (self.grid.row_count(), self.grid.column_count(), self.grid.origin())
        {
            return;
        }

        match self.grid.resized(rows, columns, origin) {
            Ok(grid) => {
                trace!(rows, columns, ?origin, "Reframed grid");
                self.grid = grid;
            }
            Err(e) => warn!("Grid cannot grow any further: {e}"),
        }
    }
}

/// `(rows, columns, origin)` of `bounds` with a one cell margin.
fn framed(bounds: Bounds) -> Option<(Coord, Coord, (Coord, Coord))> {
    let top = bounds.top.checked_sub(1)?;
    let left = bounds.left.checked_sub(1)?;
    let rows = bounds.bottom.checked_add(2)?.checked_sub(top)?;
    let columns = bounds.right.checked_add(2)?.checked_sub(left)?;

    Some((rows, columns, (top, left)))
}

#[cfg(test)]
mod test {
    use super::Game;
    use super::GameConfig;
    use crate::Coord;
    use crate::grid::Boundary;
    use crate::grid::Grid;

    const GLIDER: [(Coord, Coord); 5] = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];

    fn game_with(rows: Coord, columns: Coord, cells: &[(Coord, Coord)], config: GameConfig) -> Game {
        let mut game = Game::with_config(rows, columns, config).unwrap();

        for &(r, c) in cells {
            game.toggle_grid_cell(r, c).unwrap();
        }

        game
    }

    #[test]
    fn default_config() {
        let game = Game::new(3, 4).unwrap();

        assert_eq!(game.row_count(), 3);
        assert_eq!(game.column_count(), 4);
        assert_eq!(game.max_generations(), 1);
        assert_eq!(game.config().boundary, Boundary::Bounded);
        assert_eq!(game.generation(), 0);
    }

    #[test]
    fn invalid_dimensions() {
        assert!(Game::new(-1, 0).is_err());
    }

    #[test]
    fn zero_generations() {
        let mut game = game_with(3, 3, &[(0, 1), (1, 1), (2, 1)], GameConfig::default());
        let before = game.grid().clone();

        game.set_max_generations(0);
        assert_eq!(game.init(), 0);

        assert_eq!(game.grid(), &before);
        assert_eq!(game.generation(), 0);
    }

    #[test]
    fn still_life_counts_every_generation() {
        let config = GameConfig {
            max_generations: 10,
            ..GameConfig::default()
        };
        let mut game = game_with(4, 4, &[(1, 1), (1, 2), (2, 1), (2, 2)], config);

        assert_eq!(game.init(), 10);
        assert_eq!(game.generation(), 10);
        assert_eq!(game.grid().population(), 4);
    }

    #[test]
    fn init_continues() {
        let mut game = game_with(3, 3, &[(0, 1), (1, 1), (2, 1)], GameConfig::default());

        game.init();
        game.init();

        assert_eq!(game.generation(), 2);
        assert_eq!(
            game.grid().live_cells().collect::<Vec<_>>(),
            [(0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn toroidal_glider_comes_home() {
        let config = GameConfig {
            max_generations: 32,
            boundary: Boundary::Toroidal,
            ..GameConfig::default()
        };
        let mut game = game_with(8, 8, &GLIDER, config);
        let start = game.grid().clone();

        game.init();

        assert_eq!(game.grid(), &start);
    }

    #[test]
    fn bounded_glider_is_clipped() {
        let config = GameConfig {
            max_generations: 32,
            ..GameConfig::default()
        };
        let mut game = game_with(8, 8, &GLIDER, config);
        let start = game.grid().clone();

        game.init();

        assert_eq!(game.row_count(), 8);
        assert_eq!(game.column_count(), 8);
        assert_ne!(game.grid(), &start);
    }

    #[test]
    fn unbounded_glider_travels() {
        let config = GameConfig {
            max_generations: 4,
            boundary: Boundary::Unbounded,
            ..GameConfig::default()
        };
        let mut game = game_with(3, 3, &GLIDER, config);

        game.init();

        let moved: Vec<_> = GLIDER.iter().map(|&(r, c)| (r + 1, c + 1)).collect();
        assert_eq!(game.grid().live_cells().collect::<Vec<_>>(), moved);
        assert!(game.row_count() > 3);
        assert!(game.column_count() > 3);
    }

    #[test]
    fn unbounded_grows_up_and_left() {
        let config = GameConfig {
            boundary: Boundary::Unbounded,
            ..GameConfig::default()
        };
        // Horizontal blinker along the top row turns vertical through row -1
        let mut game = game_with(1, 3, &[(0, 0), (0, 1), (0, 2)], config);

        game.init();

        assert_eq!(game.grid().origin(), (-1, -1));
        assert_eq!(
            game.grid().live_cells().collect::<Vec<_>>(),
            [(-1, 1), (0, 1), (1, 1)]
        );
        assert!(game.grid()[(-1, 1)].is_alive());
    }

    #[test]
    fn unbounded_grid_follows_the_pattern() {
        let config = GameConfig {
            max_generations: 400,
            boundary: Boundary::Unbounded,
            ..GameConfig::default()
        };
        let mut game = game_with(3, 3, &GLIDER, config);

        game.init();

        // 100 periods of a glider, each moving it one cell down and right
        let moved: Vec<_> = GLIDER.iter().map(|&(r, c)| (r + 100, c + 100)).collect();
        assert_eq!(game.grid().live_cells().collect::<Vec<_>>(), moved);
        assert!(game.row_count() <= 6);
        assert!(game.column_count() <= 6);
    }

    #[test]
    fn unbounded_trims_dead_space() {
        let config = GameConfig {
            boundary: Boundary::Unbounded,
            ..GameConfig::default()
        };
        // Block in the middle of a wide empty grid
        let mut game = game_with(20, 20, &[(9, 9), (9, 10), (10, 9), (10, 10)], config);

        game.init();

        assert_eq!(game.grid().origin(), (8, 8));
        assert_eq!(game.row_count(), 4);
        assert_eq!(game.column_count(), 4);
        assert_eq!(game.grid().population(), 4);
    }

    #[test]
    fn from_grid_keeps_origin() {
        let mut grid = Grid::with_origin(3, 3, (10, 10)).unwrap();
        grid.set(11, 10, true).unwrap();
        grid.set(11, 11, true).unwrap();
        grid.set(11, 12, true).unwrap();

        let mut game = Game::from_grid(grid, GameConfig::default());
        game.init();

        assert_eq!(
            game.grid().live_cells().collect::<Vec<_>>(),
            [(10, 11), (11, 11), (12, 11)]
        );
    }
}
