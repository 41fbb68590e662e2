use serde::{Deserialize, Serialize};

/// Simulation time in months. `Month(0)` is the pre-simulation state; the
/// first settlement produces `Month(1)`. Configuration that is only legal
/// "before the simulation starts" checks against `Month(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month(pub u32);

impl Month {
    /// The month that follows this one.
    pub fn next(self) -> Self {
        Month(self.0 + 1)
    }
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments_by_one() {
        assert_eq!(Month(0).next(), Month(1));
        assert_eq!(Month(23).next(), Month(24));
    }

    #[test]
    fn months_order_chronologically() {
        assert!(Month(1) < Month(2));
        assert!(Month(12) > Month(3));
    }

    #[test]
    fn month_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Month(7)).unwrap();
        assert_eq!(json, "7");
    }
}
