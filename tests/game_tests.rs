use std::collections::BTreeSet;

use lifegrid::Coord;
use lifegrid::game::Game;
use lifegrid::game::GameConfig;
use lifegrid::grid::Boundary;
use lifegrid::grid::Grid;
use lifegrid::grid::GridError;

fn fill(game: &mut Game) -> anyhow::Result<()> {
    for row in 0..game.row_count() {
        for column in 0..game.column_count() {
            game.toggle_grid_cell(row, column)?;
        }
    }

    Ok(())
}

fn live(game: &Game) -> BTreeSet<(Coord, Coord)> {
    game.grid().live_cells().collect()
}

#[test]
fn dimensions() -> anyhow::Result<()> {
    for (rows, columns) in [(0, 0), (0, 5), (7, 0), (7, 4), (1, 10)] {
        let grid = Grid::new(rows, columns)?;
        assert_eq!((grid.row_count(), grid.column_count()), (rows, columns));

        let game = Game::new(rows, columns)?;
        assert_eq!((game.row_count(), game.column_count()), (rows, columns));
    }

    Ok(())
}

#[test]
fn negative_dimensions() {
    assert_eq!(
        Grid::new(-1, 0).err(),
        Some(GridError::InvalidDimensions {
            rows: -1,
            columns: 0
        })
    );
    assert!(Game::new(-1, 0).is_err());
}

#[test]
fn zero_sized_grids_reject_toggles() -> anyhow::Result<()> {
    let mut game = Game::new(0, 4)?;
    assert!(game.toggle_grid_cell(0, 0).is_err());

    let mut game = Game::new(4, 0)?;
    assert!(game.toggle_grid_cell(0, 0).is_err());
    assert!(game.toggle_grid_cell(3, 0).is_err());

    Ok(())
}

#[test]
fn toggle_flips() -> anyhow::Result<()> {
    let mut game = Game::new(7, 4)?;

    game.toggle_grid_cell(6, 3)?;
    assert!(game.grid()[(6, 3)].is_alive());

    game.toggle_grid_cell(6, 3)?;
    assert!(!game.grid()[(6, 3)].is_alive());

    assert_eq!(
        game.toggle_grid_cell(7, 3),
        Err(GridError::IndexOutOfBounds { row: 7, column: 3 })
    );

    Ok(())
}

#[test]
fn block_is_stable() -> anyhow::Result<()> {
    let mut game = Game::new(2, 2)?;
    fill(&mut game)?;

    game.set_max_generations(100);
    game.init();

    assert_eq!(game.generation(), 100);
    for row in 0..2 {
        for column in 0..2 {
            assert!(game.grid()[(row, column)].is_alive());
        }
    }

    Ok(())
}

#[test]
fn blinker_rotates() -> anyhow::Result<()> {
    let mut game = Game::new(3, 3)?;
    game.toggle_grid_cell(0, 1)?;
    game.toggle_grid_cell(1, 1)?;
    game.toggle_grid_cell(2, 1)?;

    game.init();

    insta::assert_snapshot!(game.grid().to_string(), @r"
    ...
    OOO
    ...
    ");

    Ok(())
}

#[test]
fn bounded_row_of_ten_dies_out() -> anyhow::Result<()> {
    let mut game = Game::new(1, 10)?;
    fill(&mut game)?;

    game.set_max_generations(50);
    game.init();

    assert_eq!(game.grid().population(), 0);
    assert_eq!(game.column_count(), 10);

    Ok(())
}

#[test]
fn unbounded_row_of_ten_becomes_pentadecathlon() -> anyhow::Result<()> {
    let config = GameConfig {
        max_generations: 50,
        boundary: Boundary::Unbounded,
        ..GameConfig::default()
    };
    let mut game = Game::with_config(1, 10, config)?;
    fill(&mut game)?;

    game.init();
    let settled = live(&game);
    assert!(!settled.is_empty());

    // Symmetric about row 0 and about the middle of columns 0..10
    for &(r, c) in &settled {
        assert!(settled.contains(&(-r, c)), "({r}, {c}) has no mirror across row 0");
        assert!(settled.contains(&(r, 9 - c)), "({r}, {c}) has no mirror across columns");
    }

    // Live cells show up outside of the constructed 1x10 extent
    assert!(settled.iter().any(|&(r, _)| r != 0));

    // Period 15
    game.set_max_generations(15);
    game.init();
    assert_eq!(live(&game), settled);

    Ok(())
}

#[test]
fn toroidal_blinker() -> anyhow::Result<()> {
    let config = GameConfig {
        max_generations: 2,
        boundary: Boundary::Toroidal,
        ..GameConfig::default()
    };
    let mut game = Game::with_config(5, 5, config)?;
    for row in 0..3 {
        game.toggle_grid_cell(row, 0)?;
    }
    let start = live(&game);

    game.set_max_generations(1);
    game.init();
    assert_eq!(live(&game), BTreeSet::from([(1, 4), (1, 0), (1, 1)]));

    game.init();
    assert_eq!(live(&game), start);

    Ok(())
}
