pub mod coord;
pub mod grid;
pub mod pathfinding;

pub use coord::{Direction, HexCoord, HEX_DIRECTIONS};
pub use grid::HexGrid;
pub use pathfinding::find_path;
