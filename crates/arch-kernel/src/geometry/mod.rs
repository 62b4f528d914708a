pub mod point;
pub mod spline;
pub mod transform;
pub mod vector;
