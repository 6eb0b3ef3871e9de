use crate::*;
pub use random::*;

mod random;

pub trait MineLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout;
}

/// How much the first revealed cell is protected when planting mines.
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StartCell {
    Random,
    SimpleSafe,
    AlwaysZero,
}
