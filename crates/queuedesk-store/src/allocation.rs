//! Atomic read-modify-write over queue numbers.
//!
//! An [`Allocation`] wraps a `BEGIN IMMEDIATE` transaction: the write lock
//! is taken before the "latest" row is read, so no other connection can
//! slip a number in between the read and the update. Dropping an
//! allocation without calling [`Allocation::commit`] rolls it back.

use queuedesk_shared::Prefix;
use rusqlite::{Transaction, TransactionBehavior};

use crate::database::Database;
use crate::error::Result;
use crate::models::Ticket;
use crate::tickets;

pub struct Allocation<'conn> {
    tx: Transaction<'conn>,
}

impl Database {
    /// Start an allocation. Blocks other writers until commit or drop.
    pub fn begin_allocation(&mut self) -> Result<Allocation<'_>> {
        let tx = self
            .conn_mut()
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(Allocation { tx })
    }
}

impl Allocation<'_> {
    pub fn find_by_code(&self, code: &str) -> Result<Ticket> {
        tickets::get_by(&self.tx, "code = ?1", &code)
    }

    pub fn latest_for_prefix(&self, prefix: Prefix) -> Result<Option<Ticket>> {
        tickets::latest_for_prefix(&self.tx, prefix)
    }

    pub fn set_queue_number(&self, ticket_id: i64, value: &str) -> Result<()> {
        tickets::set_queue_number(&self.tx, ticket_id, value)
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tickets::tests::new_ticket;

    #[test]
    fn commit_persists_number() {
        let mut db = Database::open_in_memory().unwrap();
        let ticket = db.insert_ticket(&new_ticket("u1", "iPhone 15")).unwrap();

        let alloc = db.begin_allocation().unwrap();
        let found = alloc.find_by_code("code-u1").unwrap();
        assert!(alloc.latest_for_prefix(Prefix::D).unwrap().is_none());
        alloc.set_queue_number(found.id, "D-001").unwrap();
        alloc.commit().unwrap();

        assert_eq!(db.get_ticket(ticket.id).unwrap().queue_number, "D-001");
    }

    #[test]
    fn drop_rolls_back() {
        let mut db = Database::open_in_memory().unwrap();
        let ticket = db.insert_ticket(&new_ticket("u1", "iPhone 15")).unwrap();

        {
            let alloc = db.begin_allocation().unwrap();
            alloc.set_queue_number(ticket.id, "D-001").unwrap();
        }

        assert_eq!(db.get_ticket(ticket.id).unwrap().queue_number, " ");
    }
}
