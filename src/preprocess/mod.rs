pub mod eigen;
pub mod zca;

pub use zca::whiten;
