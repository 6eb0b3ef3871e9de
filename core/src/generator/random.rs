use alloc::vec::Vec;

use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Purely random layout, optionally keeping the start cell safe or even a zero.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomLayoutGenerator {
    seed: u64,
    start: Coord2,
    start_cell: StartCell,
}

impl RandomLayoutGenerator {
    pub fn new(seed: u64, start: Coord2, start_cell: StartCell) -> Self {
        Self {
            seed,
            start,
            start_cell,
        }
    }

    /// Cells that must stay mine-free for `start_cell`.
    fn reserved(&self, size: Coord2, start_cell: StartCell) -> Neighbors {
        let mut reserved = Neighbors::new();
        match start_cell {
            StartCell::Random => {}
            StartCell::SimpleSafe => reserved.push(self.start),
            StartCell::AlwaysZero => {
                reserved.push(self.start);
                reserved.extend(NeighborIter::new(self.start, size));
            }
        }
        reserved
    }
}

impl MineLayoutGenerator for RandomLayoutGenerator {
    fn generate(self, config: GameConfig) -> MineLayout {
        use StartCell::*;

        let total_cells = config.total_cells();

        // optimize for full boards
        if config.mines >= total_cells {
            if config.mines > total_cells {
                log::warn!(
                    "Layout already full, generated anyway, requested {} but only fits {}",
                    config.mines,
                    total_cells
                );
            }
            let mine_mask = Array2::from_elem(config.size.to_nd_index(), true);
            return MineLayout::from_mine_mask(mine_mask);
        }

        let zero_area = NeighborIter::new(self.start, config.size).count() as CellCount + 1;
        let actual_start_cell = match self.start_cell {
            Random => Random,
            SimpleSafe | AlwaysZero if config.mines + 1 > total_cells => {
                log::warn!("Cannot make start cell safe, fallback to random");
                Random
            }
            SimpleSafe => SimpleSafe,
            AlwaysZero if config.mines + zero_area > total_cells => {
                log::warn!("Cannot make start cell zero, fallback to simple safe");
                SimpleSafe
            }
            AlwaysZero => AlwaysZero,
        };

        let reserved = self.reserved(config.size, actual_start_cell);
        let mut candidates: Vec<Coord2> = (0..config.size.0)
            .flat_map(|row| (0..config.size.1).map(move |col| (row, col)))
            .filter(|coords| !reserved.contains(coords))
            .collect();

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mine_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut mines_placed: CellCount = 0;
        while mines_placed < config.mines && !candidates.is_empty() {
            let pick = rng.random_range(0..candidates.len());
            let coords = candidates.swap_remove(pick);
            mine_mask[coords.to_nd_index()] = true;
            mines_placed += 1;
        }

        let layout = MineLayout::from_mine_mask(mine_mask);
        // double check mine count
        if layout.mine_count() != config.mines {
            log::warn!(
                "Generated layout count mismatch, actual: {}, requested: {}",
                layout.mine_count(),
                config.mines
            );
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_gives_same_layout() {
        let config = GameConfig::beginner();
        let first = RandomLayoutGenerator::new(7, (4, 4), StartCell::Random).generate(config);
        let second = RandomLayoutGenerator::new(7, (4, 4), StartCell::Random).generate(config);

        assert_eq!(first, second);
        assert_eq!(first.mine_count(), 10);
    }

    #[test]
    fn always_zero_keeps_start_area_clear() {
        let config = GameConfig::intermediate();
        for seed in 0..20 {
            let layout =
                RandomLayoutGenerator::new(seed, (0, 0), StartCell::AlwaysZero).generate(config);

            assert_eq!(layout.mine_count(), 40);
            assert!(!layout.contains_mine((0, 0)));
            assert_eq!(layout.adjacent_mine_count((0, 0)), 0);
        }
    }

    #[test]
    fn dense_board_falls_back_to_simple_safe() {
        let config = GameConfig::new((3, 3), 8);
        let layout = RandomLayoutGenerator::new(1, (1, 1), StartCell::AlwaysZero).generate(config);

        assert_eq!(layout.mine_count(), 8);
        assert!(!layout.contains_mine((1, 1)));
    }

    #[test]
    fn full_board_is_all_mines() {
        let config = GameConfig::new((2, 2), 4);
        let layout = RandomLayoutGenerator::new(1, (0, 0), StartCell::SimpleSafe).generate(config);

        assert_eq!(layout.mine_count(), 4);
        assert_eq!(layout.safe_cell_count(), 0);
    }
}
