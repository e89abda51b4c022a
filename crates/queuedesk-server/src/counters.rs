//! Counter registry driven by push-channel commands.

use queuedesk_shared::constants::DEFAULT_COUNTER_STATUS;
use queuedesk_shared::protocol::{CounterCommand, CounterReply};
use queuedesk_shared::{ProtocolError, QueueError, QueueResult};
use queuedesk_store::{Counter, CounterPatch, NewCounter, StoreError};
use tracing::{debug, warn};

use crate::queue::SharedDb;

#[derive(Clone)]
pub struct CounterRegistry {
    db: SharedDb,
}

impl CounterRegistry {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    /// Decode one text frame and run it. Always produces a reply.
    pub async fn dispatch_text(&self, text: &str) -> CounterReply {
        match CounterCommand::decode(text) {
            Ok(command) => self.handle(command).await,
            Err(ProtocolError::UnknownAction(action)) => {
                debug!(?action, "Unknown counter action");
                CounterReply::error("Unknown action", None)
            }
            Err(err @ ProtocolError::Malformed(_)) => {
                CounterReply::error(err.to_string(), Some("BAD_REQUEST"))
            }
        }
    }

    pub async fn handle(&self, command: CounterCommand) -> CounterReply {
        let action = command.action();
        let failure = command.failure_message();
        let outcome = match command {
            CounterCommand::AddCounter {
                counter_name,
                queues_number,
                status,
                remarks,
            } => self
                .add(NewCounter {
                    counter_name,
                    queues_number: queues_number.unwrap_or(0),
                    status: status.unwrap_or_else(|| DEFAULT_COUNTER_STATUS.to_string()),
                    remarks,
                })
                .await
                .map(CounterReply::created),
            CounterCommand::EditCounter {
                id,
                counter_name,
                queues_number,
                status,
                remarks,
            } => self
                .edit(
                    id,
                    CounterPatch {
                        counter_name,
                        queues_number,
                        status,
                        remarks,
                    },
                )
                .await
                .map(|()| CounterReply::ok("Counter edited successfully")),
            CounterCommand::DeleteCounter { id } => self
                .delete(id)
                .await
                .map(|()| CounterReply::ok("Counter deleted successfully")),
            CounterCommand::ChangeStatus { id, status } => self
                .edit(
                    id,
                    CounterPatch {
                        status: Some(status),
                        ..CounterPatch::default()
                    },
                )
                .await
                .map(|()| CounterReply::ok("Status changed successfully")),
        };

        outcome.unwrap_or_else(|err| {
            warn!(action, error = %err, "Counter command failed");
            CounterReply::error(failure, Some(err.code()))
        })
    }

    pub async fn list(&self) -> QueueResult<Vec<Counter>> {
        Ok(self.db.lock().await.list_counters()?)
    }

    async fn add(&self, counter: NewCounter) -> QueueResult<i64> {
        validate_name(&counter.counter_name)?;
        validate_count(counter.queues_number)?;
        let id = self.db.lock().await.create_counter(&counter)?;
        debug!(id, name = %counter.counter_name, "Counter added");
        Ok(id)
    }

    async fn edit(&self, id: i64, patch: CounterPatch) -> QueueResult<()> {
        if let Some(name) = &patch.counter_name {
            validate_name(name)?;
        }
        if let Some(count) = patch.queues_number {
            validate_count(count)?;
        }
        self.db
            .lock()
            .await
            .update_counter(id, &patch)
            .map_err(|e| counter_not_found(e, id))
    }

    async fn delete(&self, id: i64) -> QueueResult<()> {
        if self.db.lock().await.delete_counter(id)? {
            Ok(())
        } else {
            Err(QueueError::NotFound(format!("counter {id}")))
        }
    }
}

fn validate_name(name: &str) -> QueueResult<()> {
    if name.trim().is_empty() {
        return Err(QueueError::BadRequest("counter_name is required".to_string()));
    }
    Ok(())
}

fn validate_count(count: i64) -> QueueResult<()> {
    if count < 0 {
        return Err(QueueError::BadRequest(
            "queues_number must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn counter_not_found(err: StoreError, id: i64) -> QueueError {
    match err {
        StoreError::NotFound => QueueError::NotFound(format!("counter {id}")),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use queuedesk_store::Database;
    use tokio::sync::Mutex;

    use super::*;

    fn registry() -> CounterRegistry {
        CounterRegistry::new(Arc::new(Mutex::new(Database::open_in_memory().unwrap())))
    }

    async fn add(registry: &CounterRegistry, name: &str) -> i64 {
        let reply = registry
            .dispatch_text(&format!(r#"{{"action":"ADD_COUNTER","counter_name":"{name}"}}"#))
            .await;
        match reply {
            CounterReply::Ok { id: Some(id), .. } => id,
            other => panic!("unexpected reply {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_applies_defaults() {
        let registry = registry();
        let id = add(&registry, "Counter 1").await;

        let counters = registry.list().await.unwrap();
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].id, id);
        assert_eq!(counters[0].queues_number, 0);
        assert_eq!(counters[0].status, "inactive");
        assert_eq!(counters[0].remarks, None);
    }

    #[tokio::test]
    async fn edit_change_status_delete() {
        let registry = registry();
        let id = add(&registry, "Counter 1").await;

        let reply = registry
            .handle(CounterCommand::EditCounter {
                id,
                counter_name: Some("Express".into()),
                queues_number: Some(12),
                status: None,
                remarks: Some("closes at 9".into()),
            })
            .await;
        assert_eq!(reply, CounterReply::ok("Counter edited successfully"));

        let reply = registry
            .dispatch_text(&format!(r#"{{"action":"CHANGE_STATUS","id":{id},"status":"paused"}}"#))
            .await;
        assert_eq!(reply, CounterReply::ok("Status changed successfully"));

        let counter = &registry.list().await.unwrap()[0];
        assert_eq!(counter.counter_name, "Express");
        assert_eq!(counter.queues_number, 12);
        assert_eq!(counter.status, "paused");
        assert_eq!(counter.remarks.as_deref(), Some("closes at 9"));

        let reply = registry.handle(CounterCommand::DeleteCounter { id }).await;
        assert_eq!(reply, CounterReply::ok("Counter deleted successfully"));
        assert!(registry.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_reply_with_error() {
        let registry = registry();

        let reply = registry.handle(CounterCommand::DeleteCounter { id: 5 }).await;
        assert_eq!(
            reply,
            CounterReply::error("Error deleting counter", Some("NOT_FOUND"))
        );

        let reply = registry
            .dispatch_text(r#"{"action":"ADD_COUNTER","counter_name":"  "}"#)
            .await;
        assert_eq!(
            reply,
            CounterReply::error("Error adding counter", Some("BAD_REQUEST"))
        );

        let reply = registry
            .dispatch_text(r#"{"action":"EDIT_COUNTER","id":1,"queues_number":-3}"#)
            .await;
        assert_eq!(
            reply,
            CounterReply::error("Error editing counter", Some("BAD_REQUEST"))
        );

        let reply = registry
            .handle(CounterCommand::ChangeStatus {
                id: 9,
                status: "active".into(),
            })
            .await;
        assert_eq!(
            reply,
            CounterReply::error("Error changing status", Some("NOT_FOUND"))
        );

        assert_eq!(
            registry.dispatch_text(r#"{"action":"NOPE"}"#).await,
            CounterReply::error("Unknown action", None)
        );
        assert!(registry.dispatch_text("{").await.is_error());
    }
}
