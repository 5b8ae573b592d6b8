//! Five-valued logic used while evaluating requirements.

use capreq_core::CheckState;

/// Degree of certainty that a (sub-)requirement holds.
///
/// Variants are declared from most false to most true, so the derived
/// `Ord` is the lattice order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tri {
    False,
    MaybeFalse,
    Unknown,
    MaybeTrue,
    True,
}

impl Tri {
    /// All values, lowest first.
    pub const ALL: [Tri; 5] = [
        Tri::False,
        Tri::MaybeFalse,
        Tri::Unknown,
        Tri::MaybeTrue,
        Tri::True,
    ];

    /// Conjunction: the more false operand.
    pub fn and(self, other: Tri) -> Tri {
        self.min(other)
    }

    /// Disjunction: the more true operand.
    pub fn or(self, other: Tri) -> Tri {
        self.max(other)
    }

    /// Mirror around `Unknown`.
    pub fn negate(self) -> Tri {
        match self {
            Tri::False => Tri::True,
            Tri::MaybeFalse => Tri::MaybeTrue,
            Tri::Unknown => Tri::Unknown,
            Tri::MaybeTrue => Tri::MaybeFalse,
            Tri::True => Tri::False,
        }
    }

    /// `True` or `False`.
    pub fn certain(value: bool) -> Tri {
        if value {
            Tri::True
        } else {
            Tri::False
        }
    }
}

impl From<Tri> for CheckState {
    fn from(value: Tri) -> Self {
        match value {
            Tri::False => CheckState::CertainFail,
            Tri::MaybeFalse => CheckState::PossibleFail,
            Tri::Unknown => CheckState::Unknown,
            Tri::MaybeTrue => CheckState::PossiblePass,
            Tri::True => CheckState::CertainPass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negation_is_involutive() {
        for value in Tri::ALL {
            assert_eq!(value.negate().negate(), value);
        }
        assert_eq!(Tri::Unknown.negate(), Tri::Unknown);
    }

    #[test]
    fn test_and_or_are_min_max() {
        for a in Tri::ALL {
            for b in Tri::ALL {
                assert_eq!(a.and(b), std::cmp::min(a, b));
                assert_eq!(a.or(b), std::cmp::max(a, b));
                assert_eq!(a.and(b), b.and(a));
                assert_eq!(a.or(b), b.or(a));
            }
            assert_eq!(a.and(a), a);
            assert_eq!(a.or(a), a);
        }
    }

    #[test]
    fn test_de_morgan() {
        for a in Tri::ALL {
            for b in Tri::ALL {
                assert_eq!(a.and(b).negate(), a.negate().or(b.negate()));
            }
        }
    }

    #[test]
    fn test_maps_onto_ordered_states() {
        let codes: Vec<u8> = Tri::ALL.iter().map(|t| CheckState::from(*t).code()).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }
}
