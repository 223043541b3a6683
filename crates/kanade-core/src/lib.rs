pub mod consts;
pub mod engine;
pub mod error;
pub mod filters;
pub mod frame;
pub mod io;
pub mod pyramid;
pub mod sample;
pub mod solver;
pub mod transform;
