//! Debt settlement engine for expense-sharing groups.
//!
//! Members of a group record shared expenses as payer and debtor split rows.
//! The engine turns those rows into net balances ([`aggregate`]), suggests a
//! short list of payments that settles everyone ([`optimize`]) and projects
//! that list for a single member ([`for_user`]). All money is exact decimal.
//!
//! [`Engine`] wires the pure core to a sea-orm database.

pub use balances::{Allocation, Balance, Balances, aggregate, allocate};
pub use error::EngineError;
pub use expenses::{Expense, ExpenseShare, NewExpense};
pub use groups::Group;
pub use ledger::{
    SettleSummary, SettleView, SettlementRecorder, SplitRecordSupplier, compute_balances,
    compute_settlements,
};
pub use money::{MINOR_UNITS, Money};
pub use ops::{Engine, EngineBuilder};
pub use perspective::{PerspectiveEntry, for_user};
pub use settlement::{Settlement, optimize};
pub use splits::{SplitRole, SplitRow};
pub use tolerance::Tolerance;

mod balances;
mod error;
mod expenses;
mod group_memberships;
mod groups;
mod ledger;
mod money;
mod ops;
mod perspective;
mod settlement;
mod splits;
mod tolerance;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
