pub mod debit_ledger;
pub mod debit_receipt;
pub mod error;
pub mod item_operations;
pub mod item_request;
