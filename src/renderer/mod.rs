//! Drawable geometry
//!
//! Builds vertex lists from sim state. No GPU or window work happens here;
//! a presentation layer uploads the bytes and draws them as triangle lists.

pub mod shapes;
pub mod vertex;

pub use shapes::{ball_quad, flight_path, sector_mesh};
pub use vertex::{Vertex, as_bytes};
