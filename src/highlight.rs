/// Per-country click state. Absent from the highlight map means `Unmarked`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mark {
    #[default]
    Unmarked,
    First,
    Second,
}

impl Mark {
    /// unmarked -> first -> second -> unmarked
    pub fn next(self) -> Self {
        match self {
            Mark::Unmarked => Mark::First,
            Mark::First => Mark::Second,
            Mark::Second => Mark::Unmarked,
        }
    }
}

/// Which color a country is painted with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fill {
    Default,
    Hover,
    First,
    Second,
}

impl Fill {
    /// Back-to-front paint order
    pub const ALL: [Fill; 4] = [Fill::Default, Fill::Hover, Fill::First, Fill::Second];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Marks win over hover.
    pub fn resolve(mark: Mark, hovered: bool) -> Self {
        match mark {
            Mark::First => Fill::First,
            Mark::Second => Fill::Second,
            Mark::Unmarked if hovered => Fill::Hover,
            Mark::Unmarked => Fill::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_period_three() {
        let mut mark = Mark::default();
        let expected = [Mark::First, Mark::Second, Mark::Unmarked];
        for n in 0..9 {
            mark = mark.next();
            assert_eq!(mark, expected[n % 3]);
        }
    }

    #[test]
    fn test_fill_precedence() {
        for hovered in [false, true] {
            assert_eq!(Fill::resolve(Mark::First, hovered), Fill::First);
            assert_eq!(Fill::resolve(Mark::Second, hovered), Fill::Second);
        }
        assert_eq!(Fill::resolve(Mark::Unmarked, true), Fill::Hover);
        assert_eq!(Fill::resolve(Mark::Unmarked, false), Fill::Default);
    }

    #[test]
    fn test_fill_index_matches_order() {
        for (i, fill) in Fill::ALL.iter().enumerate() {
            assert_eq!(fill.index(), i);
        }
    }
}
