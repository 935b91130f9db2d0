use std::fmt;

/// Stages of the staking workflow, in execution order. Transitions only go
/// forward.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    SeedFunds,
    Staking,
    SeedDelegatorFunds,
    Delegation,
    VerifyBalances,
}

impl Stage {
    pub const FIRST: Self = Self::SeedFunds;

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::SeedFunds => Some(Self::Staking),
            Self::Staking => Some(Self::SeedDelegatorFunds),
            Self::SeedDelegatorFunds => Some(Self::Delegation),
            Self::Delegation => Some(Self::VerifyBalances),
            Self::VerifyBalances => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SeedFunds => "seed funds",
            Self::Staking => "staking",
            Self::SeedDelegatorFunds => "seed delegator funds",
            Self::Delegation => "delegation",
            Self::VerifyBalances => "verify balances",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use std::iter::successors;

    use super::*;

    #[test]
    fn stages_run_in_a_single_forward_chain() {
        let order: Vec<_> = successors(Some(Stage::FIRST), |stage| stage.next()).collect();

        assert_eq!(
            order,
            [
                Stage::SeedFunds,
                Stage::Staking,
                Stage::SeedDelegatorFunds,
                Stage::Delegation,
                Stage::VerifyBalances,
            ]
        );
    }
}
