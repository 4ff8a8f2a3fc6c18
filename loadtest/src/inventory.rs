//! Seat inventory enumeration.
//!
//! The inventory of a venue is the product `zone × row × column`, each
//! coordinate starting at 1. Zone varies slowest and column fastest, so a
//! 1×2×2 venue enumerates as (1,1,1) (1,1,2) (1,2,1) (1,2,2).

use crate::types::{Seat, VenueLayout};
use std::iter::FusedIterator;

/// Lazy enumeration of every seat in a layout.
///
/// Holds only the layout and a cursor. A clone continues from the same
/// cursor; a new one always starts from the first seat.
#[derive(Debug, Clone)]
pub struct SeatInventory {
    layout: VenueLayout,
    next: u64,
    end: u64,
}

impl SeatInventory {
    /// Enumerate all seats of `layout`
    #[must_use]
    pub fn new(layout: VenueLayout) -> Self {
        Self {
            layout,
            next: 0,
            end: layout.capacity(),
        }
    }

    /// Layout being enumerated
    #[must_use]
    pub const fn layout(&self) -> VenueLayout {
        self.layout
    }

    /// Seat at a 0-based position in enumeration order
    ///
    /// Only meaningful for `index < capacity`, which guarantees every
    /// dimension is non-zero.
    #[allow(clippy::cast_possible_truncation)] // each coordinate is bounded by a u32 dimension
    fn seat_at(&self, index: u64) -> Seat {
        let cols = u64::from(self.layout.col_count);
        let rows = u64::from(self.layout.row_count);

        let column = index % cols;
        let row = (index / cols) % rows;
        let zone = index / (cols * rows);

        Seat::new(zone as u32 + 1, row as u32 + 1, column as u32 + 1)
    }
}

impl Iterator for SeatInventory {
    type Item = Seat;

    fn next(&mut self) -> Option<Seat> {
        if self.next >= self.end {
            return None;
        }
        let seat = self.seat_at(self.next);
        self.next += 1;
        Some(seat)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }

    fn nth(&mut self, n: usize) -> Option<Seat> {
        self.next = self.next.saturating_add(u64::try_from(n).unwrap_or(u64::MAX)).min(self.end);
        self.next()
    }
}

impl ExactSizeIterator for SeatInventory {}

impl FusedIterator for SeatInventory {}

/// Generate the full, ordered inventory of a layout.
///
/// Pure and deterministic: the same layout always yields the same sequence.
/// If any dimension is 0 the sequence is empty.
#[must_use]
pub fn generate_seats(layout: VenueLayout) -> SeatInventory {
    SeatInventory::new(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn one_zone_two_by_two_enumerates_column_fastest() {
        let seats: Vec<Seat> = generate_seats(VenueLayout::new(1, 2, 2)).collect();

        assert_eq!(
            seats,
            vec![
                Seat::new(1, 1, 1),
                Seat::new(1, 1, 2),
                Seat::new(1, 2, 1),
                Seat::new(1, 2, 2),
            ]
        );
    }

    #[test]
    fn zone_varies_slowest() {
        let seats: Vec<Seat> = generate_seats(VenueLayout::new(2, 1, 2)).collect();

        assert_eq!(
            seats,
            vec![
                Seat::new(1, 1, 1),
                Seat::new(1, 1, 2),
                Seat::new(2, 1, 1),
                Seat::new(2, 1, 2),
            ]
        );
    }

    #[test]
    fn row_and_column_are_decimal_strings() {
        let last = generate_seats(VenueLayout::new(1, 12, 10)).last();
        assert_eq!(
            last,
            Some(Seat {
                zone_id: 1,
                row: "12".to_string(),
                column: "10".to_string(),
            })
        );
    }

    #[test]
    fn any_zero_dimension_is_empty() {
        assert_eq!(generate_seats(VenueLayout::new(0, 5, 5)).count(), 0);
        assert_eq!(generate_seats(VenueLayout::new(5, 0, 5)).count(), 0);
        assert_eq!(generate_seats(VenueLayout::new(5, 5, 0)).count(), 0);
    }

    #[test]
    fn regeneration_restarts_from_first_seat() {
        let layout = VenueLayout::new(2, 2, 2);
        let mut first = generate_seats(layout);
        first.next();
        first.next();

        let fresh: Vec<Seat> = generate_seats(layout).collect();
        assert_eq!(fresh.first(), Some(&Seat::new(1, 1, 1)));
        assert_eq!(fresh.len(), 8);
    }

    #[test]
    fn clone_continues_from_the_same_cursor() {
        let mut seats = generate_seats(VenueLayout::new(1, 2, 2));
        seats.next();

        let copy = seats.clone();
        assert_eq!(copy.len(), 3);
        assert_eq!(copy.collect::<Vec<_>>(), seats.collect::<Vec<_>>());
    }

    #[test]
    fn nth_skips_without_overrunning() {
        let mut seats = generate_seats(VenueLayout::new(1, 2, 2));
        assert_eq!(seats.nth(2), Some(Seat::new(1, 2, 1)));
        assert_eq!(seats.nth(10), None);
        assert_eq!(seats.next(), None);
    }

    proptest! {
        #[test]
        fn cardinality_and_uniqueness(zones in 0u32..6, rows in 0u32..12, cols in 0u32..12) {
            let layout = VenueLayout::new(zones, rows, cols);
            let seats: Vec<Seat> = generate_seats(layout).collect();
            let expected = usize::try_from(layout.capacity()).unwrap_or(usize::MAX);

            prop_assert_eq!(seats.len(), expected);
            prop_assert_eq!(generate_seats(layout).size_hint(), (expected, Some(expected)));

            let distinct: HashSet<&Seat> = seats.iter().collect();
            prop_assert_eq!(distinct.len(), seats.len());

            for seat in &seats {
                prop_assert!((1..=zones).contains(&seat.zone_id));
                let row: u32 = seat.row.parse().unwrap_or(0);
                let col: u32 = seat.column.parse().unwrap_or(0);
                prop_assert!((1..=rows).contains(&row));
                prop_assert!((1..=cols).contains(&col));
            }
        }
    }
}
