//! Credit ledger — the only component permitted to mutate credit balances.
//!
//! Every balance change appends an immutable entry; for every account the
//! balance equals the sum of its entries at all times. Per-account locks
//! serialise mutations so an insufficient-credits check can never be bypassed
//! by a race.

pub mod error;
pub mod ledger;
mod locks;

pub use error::LedgerError;
pub use ledger::CreditLedger;
