//! Identifier newtypes for marketplace entities.
//!
//! Identifiers are store-assigned sequential integers. The core never
//! fabricates them; every id originates from an insert at the persistence
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(u64);

        impl $name {
            pub fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

id_type!(
    /// Identifies an account (learner, teacher, or swapper).
    AccountId,
    "acct-"
);

id_type!(
    /// Identifies a teachable offering.
    OfferingId,
    "offer-"
);

id_type!(
    /// Identifies a booked session between two accounts.
    SessionId,
    "sess-"
);

id_type!(
    /// Identifies an immutable ledger entry.
    EntryId,
    "entry-"
);

id_type!(
    /// Identifies a teacher verification request.
    RequestId,
    "vreq-"
);
