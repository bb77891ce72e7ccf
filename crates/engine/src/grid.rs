use thiserror::Error;
use types::{Slot, BLOCKS_PER_DAY, DAYS_PER_WEEK};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("slot {slot} is already occupied by subject #{subject}")]
    SlotOccupied { slot: Slot, subject: usize },
    #[error("slot day {} block {} is outside the week grid", .0.day, .0.block)]
    OutOfRange(Slot),
}

/// Occupant of one grid cell; both fields index into the request rosters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub subject: usize,
    pub teacher: usize,
}

#[derive(Clone, Debug)]
pub struct SlotGrid {
    cells: [[Option<Cell>; BLOCKS_PER_DAY]; DAYS_PER_WEEK],
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotGrid {
    pub fn new() -> Self {
        Self {
            cells: [[None; BLOCKS_PER_DAY]; DAYS_PER_WEEK],
        }
    }

    pub fn cell(&self, slot: Slot) -> Option<Cell> {
        self.cells
            .get(slot.day as usize)
            .and_then(|row| row.get(slot.block as usize))
            .copied()
            .flatten()
    }

    /// Out-of-range slots are never free.
    pub fn is_free(&self, slot: Slot) -> bool {
        slot.is_in_range() && self.cell(slot).is_none()
    }

    pub fn occupy(&mut self, slot: Slot, subject: usize, teacher: usize) -> Result<(), GridError> {
        let cell = self
            .cells
            .get_mut(slot.day as usize)
            .and_then(|row| row.get_mut(slot.block as usize))
            .ok_or(GridError::OutOfRange(slot))?;
        if let Some(existing) = *cell {
            return Err(GridError::SlotOccupied {
                slot,
                subject: existing.subject,
            });
        }
        *cell = Some(Cell { subject, teacher });
        Ok(())
    }

    pub fn subject_count_on(&self, day: u8, subject: usize) -> u32 {
        self.cells
            .get(day as usize)
            .map(|row| row.iter().flatten().filter(|c| c.subject == subject).count() as u32)
            .unwrap_or(0)
    }

    pub fn subject_on(&self, slot: Slot, subject: usize) -> bool {
        self.cell(slot).is_some_and(|c| c.subject == subject)
    }

    pub fn is_day_used_by(&self, day: u8, subject: usize) -> bool {
        self.subject_count_on(day, subject) > 0
    }

    /// Occupied cells in day-major, block-minor order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, Cell)> + '_ {
        Slot::all().filter_map(move |slot| self.cell(slot).map(|c| (slot, c)))
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occupy_marks_cell_taken() {
        let mut grid = SlotGrid::new();
        let slot = Slot::new(2, 5);
        assert!(grid.is_free(slot));
        grid.occupy(slot, 1, 0).unwrap();
        assert!(!grid.is_free(slot));
        assert_eq!(grid.cell(slot), Some(Cell { subject: 1, teacher: 0 }));
    }

    #[test]
    fn occupy_twice_is_an_error() {
        let mut grid = SlotGrid::new();
        let slot = Slot::new(0, 0);
        grid.occupy(slot, 3, 0).unwrap();
        assert_eq!(
            grid.occupy(slot, 4, 1),
            Err(GridError::SlotOccupied { slot, subject: 3 })
        );
        assert_eq!(grid.cell(slot).map(|c| c.subject), Some(3));
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut grid = SlotGrid::new();
        let slot = Slot::new(5, 0);
        assert!(!grid.is_free(slot));
        assert_eq!(grid.occupy(slot, 0, 0), Err(GridError::OutOfRange(slot)));
        assert!(!grid.is_free(Slot::new(0, 8)));
    }

    #[test]
    fn iter_is_day_major() {
        let mut grid = SlotGrid::new();
        grid.occupy(Slot::new(3, 0), 0, 0).unwrap();
        grid.occupy(Slot::new(0, 7), 1, 0).unwrap();
        grid.occupy(Slot::new(0, 2), 2, 1).unwrap();
        let order: Vec<Slot> = grid.iter().map(|(s, _)| s).collect();
        assert_eq!(order, vec![Slot::new(0, 2), Slot::new(0, 7), Slot::new(3, 0)]);
        assert_eq!(grid.len(), 3);
    }

    #[test]
    fn counts_subject_per_day() {
        let mut grid = SlotGrid::new();
        grid.occupy(Slot::new(1, 0), 4, 0).unwrap();
        grid.occupy(Slot::new(1, 3), 4, 1).unwrap();
        grid.occupy(Slot::new(1, 4), 5, 1).unwrap();
        assert_eq!(grid.subject_count_on(1, 4), 2);
        assert_eq!(grid.subject_count_on(0, 4), 0);
        assert!(grid.is_day_used_by(1, 5));
        assert_eq!(grid.cell(Slot::new(1, 3)).map(|c| c.teacher), Some(1));
        assert!(!grid.subject_on(Slot::new(1, 3), 5));
    }
}
