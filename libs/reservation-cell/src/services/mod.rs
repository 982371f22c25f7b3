pub mod booking;
pub mod ledger;
