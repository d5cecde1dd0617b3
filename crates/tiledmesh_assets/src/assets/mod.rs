pub mod map;
pub mod object;
pub mod tileset;
