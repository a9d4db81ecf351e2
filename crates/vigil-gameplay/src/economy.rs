//! Gold balance and gear purchases.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stats::{GearSlot, Loadout};

/// Economy error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    /// Insufficient funds
    #[error("Insufficient funds: need {needed}, have {have}")]
    InsufficientFunds {
        /// Amount needed
        needed: u64,
        /// Amount available
        have: u64,
    },
}

/// Result type for economy operations.
pub type EconomyResult<T> = Result<T, EconomyError>;

/// The hero's gold purse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    gold: u64,
}

impl Wallet {
    /// Creates a wallet holding `initial_gold`.
    #[must_use]
    pub const fn new(initial_gold: u64) -> Self {
        Self { gold: initial_gold }
    }

    /// Returns the gold balance.
    #[must_use]
    pub const fn balance(&self) -> u64 {
        self.gold
    }

    /// Adds gold, saturating at `u64::MAX`.
    pub fn earn(&mut self, amount: u64) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Removes gold if the balance covers it.
    pub fn spend(&mut self, amount: u64) -> EconomyResult<()> {
        if self.gold < amount {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                have: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Returns whether the balance covers `amount`.
    #[must_use]
    pub const fn can_afford(&self, amount: u64) -> bool {
        self.gold >= amount
    }
}

/// Pays for and applies one level on a gear slot.
///
/// Returns the gold spent. Nothing changes when the wallet is short.
pub fn purchase_upgrade(
    wallet: &mut Wallet,
    loadout: &mut Loadout,
    slot: GearSlot,
) -> EconomyResult<u64> {
    let gear = loadout.get_mut(slot);
    let cost = gear.upgrade_cost();
    wallet.spend(cost)?;
    gear.level_up();
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_transactions() {
        let mut wallet = Wallet::new(100);

        assert!(wallet.spend(60).is_ok());
        assert_eq!(wallet.balance(), 40);

        wallet.earn(10);
        assert_eq!(wallet.balance(), 50);
    }

    #[test]
    fn test_wallet_overspend_is_rejected() {
        let mut wallet = Wallet::new(10);
        let err = wallet.spend(11).expect_err("should be short");
        assert_eq!(err, EconomyError::InsufficientFunds { needed: 11, have: 10 });
        assert_eq!(wallet.balance(), 10);
    }

    #[test]
    fn test_wallet_earn_saturates() {
        let mut wallet = Wallet::new(u64::MAX - 1);
        wallet.earn(5);
        assert_eq!(wallet.balance(), u64::MAX);
    }

    #[test]
    fn test_purchase_upgrade() {
        let mut wallet = Wallet::new(130);
        let mut loadout = Loadout::default();

        let spent = purchase_upgrade(&mut wallet, &mut loadout, GearSlot::Weapon)
            .expect("first upgrade is affordable");
        assert_eq!(spent, 50);
        assert_eq!(loadout.weapon.level(), 2);
        assert_eq!(wallet.balance(), 80);

        let spent = purchase_upgrade(&mut wallet, &mut loadout, GearSlot::Weapon)
            .expect("second upgrade is affordable");
        assert_eq!(spent, 75);
        assert_eq!(wallet.balance(), 5);

        assert!(purchase_upgrade(&mut wallet, &mut loadout, GearSlot::Weapon).is_err());
        assert_eq!(loadout.weapon.level(), 3);
        assert_eq!(wallet.balance(), 5);
    }
}
