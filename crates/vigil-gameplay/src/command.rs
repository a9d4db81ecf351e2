//! Commands accepted from input and UI collaborators.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ability::AbilityKind;
use crate::economy::EconomyError;
use crate::stats::GearSlot;

/// Reasons a command was refused. State is untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Argument outside its accepted range
    #[error("Invalid {name}: {value}")]
    InvalidArgument {
        /// Argument name
        name: &'static str,
        /// Rejected value
        value: i64,
    },
    /// Not enough gold
    #[error(transparent)]
    Economy(#[from] EconomyError),
    /// No charge ready and nothing regenerating
    #[error("{0:?} has no charges")]
    NoCharges(AbilityKind),
}

/// Result type for commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// A request to change simulation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Cast an ability, or hasten its regeneration when empty
    Cast {
        /// Which ability
        ability: AbilityKind,
    },
    /// Buy one gear level
    Upgrade {
        /// Which slot
        slot: GearSlot,
    },
    /// Jump to a stage (at least 1)
    SetStage {
        /// Target stage
        stage: i64,
    },
    /// Add gold (positive)
    GrantGold {
        /// Amount
        amount: i64,
    },
    /// Force level-ups (positive)
    GrantLevels {
        /// Number of levels
        count: i64,
    },
    /// Wipe all progress and the stored snapshot
    Reset,
}

/// What an accepted command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Ability fired; `hits` enemies were damaged
    Cast {
        /// Enemies struck
        hits: usize,
    },
    /// Regeneration was sped up instead of casting
    Hastened {
        /// Charges after the hasten
        charges: u32,
    },
    /// Gear upgraded
    Upgraded {
        /// Gold spent
        cost: u64,
        /// New slot level
        level: u32,
    },
    /// Stage set
    StageSet {
        /// New stage
        stage: u32,
    },
    /// Gold added
    GoldGranted {
        /// New balance
        balance: u64,
    },
    /// Levels added
    LevelsGranted {
        /// New level
        level: u32,
    },
    /// Everything reset
    Reset,
}

/// Parses a strictly positive argument into `u32`.
pub(crate) fn positive_u32(name: &'static str, value: i64) -> CommandResult<u32> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or(CommandError::InvalidArgument { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_syntax() {
        let cmd: Command = serde_json::from_str(r#"{"command": "cast", "ability": "whirlwind"}"#).expect("parse");
        assert_eq!(cmd, Command::Cast { ability: AbilityKind::Whirlwind });

        let cmd: Command = serde_json::from_str(r#"{"command": "grant_gold", "amount": 500}"#).expect("parse");
        assert_eq!(cmd, Command::GrantGold { amount: 500 });

        let cmd: Command = serde_json::from_str(r#"{"command": "reset"}"#).expect("parse");
        assert_eq!(cmd, Command::Reset);
    }

    #[test]
    fn test_positive_argument() {
        assert_eq!(positive_u32("count", 3), Ok(3));
        assert!(positive_u32("count", 0).is_err());
        assert!(positive_u32("count", -4).is_err());
        assert!(positive_u32("count", i64::MAX).is_err());
    }
}
