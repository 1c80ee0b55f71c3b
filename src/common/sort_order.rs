/// Specifies the direction of an index sort key.
///
/// # Variants
/// - `Ascending`: Sort from smallest to largest value
/// - `Descending`: Sort from largest to smallest value
///
/// The numeric forms (`1` and `-1`) match the convention used by document
/// store drivers in their live index `key` documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest)
    Ascending,
    /// Sort in descending order (largest to smallest)
    Descending,
}

impl SortOrder {
    /// Returns the driver-level numeric direction: `1` ascending, `-1` descending.
    pub fn direction(&self) -> i64 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }

    /// Interprets a driver-level numeric direction; negative means descending.
    pub fn from_direction(direction: i64) -> Self {
        if direction < 0 {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, SortOrder::Descending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_round_trip() {
        assert_eq!(SortOrder::Ascending.direction(), 1);
        assert_eq!(SortOrder::Descending.direction(), -1);
        assert_eq!(SortOrder::from_direction(1), SortOrder::Ascending);
        assert_eq!(SortOrder::from_direction(-1), SortOrder::Descending);
    }

    #[test]
    fn test_zero_direction_is_ascending() {
        assert_eq!(SortOrder::from_direction(0), SortOrder::Ascending);
    }
}
