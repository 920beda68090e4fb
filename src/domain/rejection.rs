/// User-input rejections. None of these are fatal: the operation that
/// produced one left every piece of state untouched, and the message is
/// shown to the player as-is.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("Unknown shop item [{0}].")]
    UnknownItem(String),
    #[error("Unknown theme [{0}].")]
    UnknownTheme(String),
    #[error("You already own this theme.")]
    ThemeOwned,
    #[error("This buff is already active for the next game.")]
    BuffArmed,
    #[error("You need more diamonds ({price} needed, {balance} held).")]
    InsufficientDiamonds { price: u32, balance: u32 },
    #[error("You need to buy this theme in the Shop first.")]
    ThemeLocked,
    #[error("Please enter a name.")]
    EmptyName,
    #[error("Starting pattern length must be between 2 and 6 (got {0}).")]
    LitCountOutOfRange(u8),
}
