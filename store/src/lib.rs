//! Abstract repository traits for the XSkill marketplace core.
//!
//! Every storage backend (in-memory, SQL, whatever the deployment uses)
//! implements these traits. The engines depend only on the traits; the exact
//! storage technology stays out of the core.

pub mod account;
pub mod error;
pub mod ledger;
pub mod offering;
pub mod session;
pub mod verification;

pub use account::{AccountRecord, AccountStore, NewAccount};
pub use error::StoreError;
pub use ledger::{LedgerEntryRecord, LedgerStore, NewLedgerEntry};
pub use offering::{NewOffering, OfferingRecord, OfferingStore};
pub use session::{NewSession, SessionRecord, SessionStore};
pub use verification::{
    Evidence, NewVerificationRequest, VerificationRequestRecord, VerificationStore,
};
