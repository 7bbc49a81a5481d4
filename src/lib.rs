pub mod camera;
pub mod cell;
pub mod game;
pub mod grid;
pub mod parse_rle;
pub mod rule_set;

mod parse_util;

/// Row or column coordinate of a cell. Signed, so that grids grown up or to the left keep stable
/// coordinates, and so that negative input can be reported instead of being unrepresentable.
pub type Coord = i64;
