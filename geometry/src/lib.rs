pub mod coordinates;
pub mod fractal;
pub mod location;
pub mod vector;

pub use coordinates::{absolute_coordinates, level1_cube_grid_position, local_face_position, local_face_z, Coordinates};
pub use fractal::{build_fractal_address, DescentStep, FractalAddress};
pub use location::Location;
pub use vector::Vector;
