pub mod bill;
pub mod calendar;
pub mod money;
pub mod projection;
pub mod schedule;
pub mod transaction;

pub use bill::{Bill, BillKind, BillResolutionStatus, PendingCommission};
pub use calendar::HolidayTable;
pub use money::Money;
pub use projection::{FinancialProjection, ProjectionInputs};
pub use schedule::{DateRange, PayPeriod};
pub use transaction::{Category, OverrideLayer, Transaction, TransactionPatch};
