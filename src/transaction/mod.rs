//! The transaction domain model and the endpoints for listing, creating, and
//! manually tagging transactions.
//!
//! The rule engine reads transactions through [get_transactions] and writes
//! tags back through [set_transaction_tags]; this module owns both sides of
//! that interface.

mod create;
mod db;
mod list;
mod models;
mod tag;

pub use create::create_transaction_endpoint;
pub use db::{
    create_transaction, create_transaction_table, get_transaction, get_transactions,
    set_transaction_tags,
};
pub use list::get_transactions_endpoint;
pub use models::{
    Direction, Transaction, TransactionBuilder, TransactionId, TransactionState, UNTAGGED_SCOPE,
};
pub use tag::tag_transaction_endpoint;
