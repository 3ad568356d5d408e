//! The placement state machine.
//!
//! Every state-changing operation runs in one transaction: rows are locked in
//! the order pet → placement request → response → transfer, preconditions are
//! checked on the locked rows, the writes go out, and notification intents are
//! dispatched only after commit.

pub mod capability;
pub mod placement_requests;
pub mod relationships;
pub mod responses;
pub mod transfers;
pub mod viewer;

use sea_orm::DatabaseTransaction;

use crate::error::Result;

/// Commit on success, roll back on failure.
pub(crate) async fn finish<T>(txn: DatabaseTransaction, result: Result<T>) -> Result<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            txn.rollback().await?;
            Err(e)
        }
    }
}
