pub mod extract;
pub mod fearandgreed;
pub mod model;
pub mod page;

pub use fearandgreed::{parse, FearAndGreed};
pub use model::{FearAndGreedResult, ValueText};
