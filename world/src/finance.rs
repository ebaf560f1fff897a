//! Park ledger charged by executed commands.

use std::collections::BTreeMap;

use landscape_core::{ExpenditureType, Money};

/// Cash balance plus running expenditure per category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Finance {
    cash: Money,
    spent: BTreeMap<ExpenditureType, Money>,
}

impl Finance {
    /// Cash currently available.
    #[must_use]
    pub const fn cash(&self) -> Money {
        self.cash
    }

    /// Total spent under the provided category.
    #[must_use]
    pub fn spent(&self, category: ExpenditureType) -> Money {
        self.spent.get(&category).copied().unwrap_or(Money::ZERO)
    }

    /// Reports whether the balance covers the provided cost.
    #[must_use]
    pub fn can_afford(&self, cost: Money) -> bool {
        cost <= self.cash
    }

    pub(crate) fn set_cash(&mut self, cash: Money) {
        self.cash = cash;
    }

    pub(crate) fn charge(&mut self, amount: Money, category: ExpenditureType) {
        self.cash = self.cash - amount;
        *self.spent.entry(category).or_insert(Money::ZERO) += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charge_moves_cash_into_category() {
        let mut finance = Finance::default();
        finance.set_cash(Money::from_whole(100));
        finance.charge(Money::new(250), ExpenditureType::Landscaping);
        finance.charge(Money::new(-50), ExpenditureType::Landscaping);

        assert_eq!(finance.cash(), Money::new(800));
        assert_eq!(finance.spent(ExpenditureType::Landscaping), Money::new(200));
        assert!(finance.can_afford(Money::new(800)));
        assert!(!finance.can_afford(Money::new(801)));
    }
}
