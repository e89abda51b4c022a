//! Registrant intake and lookup: bulk import of pre-parsed rows, invitation
//! payload issuance, and read access for the counter screens.

use chrono::Utc;
use queuedesk_shared::constants::{DEFAULT_TICKET_STATUS, UNASSIGNED_SENTINEL};
use queuedesk_shared::invite::qr_payload;
use queuedesk_shared::{is_unassigned, Prefix, QueueError, QueueResult, TicketStatus};
use queuedesk_store::{NewTicket, StoreError, Ticket};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::queue::SharedDb;

/// One imported row. Keys follow the spreadsheet headings; snake_case
/// aliases are accepted too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportRow {
    #[serde(default, deserialize_with = "cell", rename = "Unique Id", alias = "uniqueId")]
    pub unique_id: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Code", alias = "code")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Queue Number", alias = "queue_number")]
    pub queue_number: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Type", alias = "type")]
    pub product_type: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Status", alias = "status")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Customer Name", alias = "customer_name")]
    pub customer_name: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Email", alias = "email")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Phone", alias = "phone")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Product", alias = "product")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "City", alias = "city")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "cell", rename = "Invoice", alias = "invoice")]
    pub invoice: Option<String>,
}

impl ImportRow {
    /// Fill in defaults and reject queue numbers that would poison a prefix.
    pub fn into_new_ticket(self) -> QueueResult<NewTicket> {
        let unique_id = non_blank(self.unique_id).unwrap_or_else(|| Uuid::new_v4().to_string());
        let queue_number =
            non_blank(self.queue_number).unwrap_or_else(|| UNASSIGNED_SENTINEL.to_string());

        if !is_unassigned(&queue_number)
            && !Prefix::ALL.iter().any(|p| p.sequence_of(&queue_number).is_ok())
        {
            return Err(QueueError::BadRequest(format!(
                "row {unique_id}: malformed queue number {queue_number:?}"
            )));
        }

        Ok(NewTicket {
            code: non_blank(self.code).unwrap_or_else(|| unique_id.clone()),
            unique_id,
            queue_number,
            product_type: non_blank(self.product_type).unwrap_or_else(|| "General".to_string()),
            status: TicketStatus::from(
                non_blank(self.status).unwrap_or_else(|| DEFAULT_TICKET_STATUS.to_string()),
            ),
            customer_name: non_blank(self.customer_name)
                .unwrap_or_else(|| "Anonymous".to_string()),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
            product: non_blank(self.product).unwrap_or_else(|| "Default Product".to_string()),
            city: non_blank(self.city).or_else(|| Some("Jakarta".to_string())),
            invoice: non_blank(self.invoice),
        })
    }
}

/// Spreadsheet cells arrive as strings, numbers or booleans depending on
/// how the sheet was typed; every field is kept as text.
fn cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(Option::<Cell>::deserialize(deserializer)?.map(|cell| match cell {
        Cell::Text(text) => text,
        Cell::Int(n) => n.to_string(),
        Cell::Float(f) => f.to_string(),
        Cell::Bool(b) => b.to_string(),
    }))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Handed to the mail adapter for each invited registrant.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Invitation {
    pub id: i64,
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    pub email: Option<String>,
    pub qr_code: String,
}

#[derive(Clone)]
pub struct Registrants {
    db: SharedDb,
}

impl Registrants {
    pub fn new(db: SharedDb) -> Self {
        Self { db }
    }

    pub async fn import(&self, rows: Vec<ImportRow>) -> QueueResult<Vec<Ticket>> {
        if rows.is_empty() {
            return Err(QueueError::BadRequest("No rows to import".to_string()));
        }
        let tickets = rows
            .into_iter()
            .map(ImportRow::into_new_ticket)
            .collect::<QueueResult<Vec<_>>>()?;

        Ok(self.db.lock().await.import_tickets(&tickets)?)
    }

    /// Issue a fresh QR payload to the given registrants, or to everyone
    /// when `ids` is empty.
    pub async fn invite(&self, ids: &[i64]) -> QueueResult<Vec<Invitation>> {
        let mut db = self.db.lock().await;
        let tickets = if ids.is_empty() {
            db.list_tickets()?
        } else {
            db.list_tickets_by_ids(ids)?
        };
        if tickets.is_empty() {
            return Err(QueueError::BadRequest("No users to invite".to_string()));
        }

        let issued_at = Utc::now();
        let invitations: Vec<Invitation> = tickets
            .into_iter()
            .map(|ticket| Invitation {
                qr_code: qr_payload(&ticket.unique_id, issued_at),
                id: ticket.id,
                unique_id: ticket.unique_id,
                email: ticket.email,
            })
            .collect();

        let codes: Vec<(i64, String)> = invitations
            .iter()
            .map(|inv| (inv.id, inv.qr_code.clone()))
            .collect();
        db.set_qr_codes(&codes)?;

        info!(count = invitations.len(), "Invitations issued");
        Ok(invitations)
    }

    pub async fn list(&self) -> QueueResult<Vec<Ticket>> {
        Ok(self.db.lock().await.list_tickets()?)
    }

    pub async fn by_unique_id(&self, unique_id: &str) -> QueueResult<Ticket> {
        self.db
            .lock()
            .await
            .find_ticket_by_unique_id(unique_id)
            .map_err(|e| match e {
                StoreError::NotFound => QueueError::NotFound("User not found".to_string()),
                other => other.into(),
            })
    }

    /// The QR payload issued to a registrant, if they were invited.
    pub async fn qr_code(&self, unique_id: &str) -> QueueResult<String> {
        self.by_unique_id(unique_id)
            .await?
            .qr_code
            .ok_or_else(|| QueueError::NotFound("QR code not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use queuedesk_shared::invite::parse_qr_payload;
    use queuedesk_store::Database;
    use tokio::sync::Mutex;

    use super::*;

    fn registrants() -> Registrants {
        Registrants::new(Arc::new(Mutex::new(Database::open_in_memory().unwrap())))
    }

    fn row(json: &str) -> ImportRow {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn import_row_defaults() {
        let ticket = row(r#"{"Customer Name":"Budi","Type":"iPhone 15"}"#)
            .into_new_ticket()
            .unwrap();
        assert!(Uuid::parse_str(&ticket.unique_id).is_ok());
        assert_eq!(ticket.code, ticket.unique_id);
        assert_eq!(ticket.queue_number, " ");
        assert_eq!(ticket.status, TicketStatus::Invited);
        assert_eq!(ticket.customer_name, "Budi");
        assert_eq!(ticket.product_type, "iPhone 15");
        assert_eq!(ticket.product, "Default Product");

        let general = row(r#"{"customer_name":"Sari","code":"X-9"}"#)
            .into_new_ticket()
            .unwrap();
        assert_eq!(general.product_type, "General");
        assert_eq!(general.code, "X-9");
    }

    #[test]
    fn import_row_accepts_numeric_cells() {
        let ticket = row(
            r#"{"Customer Name":"Budi","Type":"iPhone 15","Phone":812345,"Invoice":1001,"Code":77.5}"#,
        )
        .into_new_ticket()
        .unwrap();
        assert_eq!(ticket.phone.as_deref(), Some("812345"));
        assert_eq!(ticket.invoice.as_deref(), Some("1001"));
        assert_eq!(ticket.code, "77.5");
        assert_eq!(ticket.customer_name, "Budi");

        let nulls = row(r#"{"Phone":null,"email":"b@example.com"}"#)
            .into_new_ticket()
            .unwrap();
        assert_eq!(nulls.phone, None);
        assert_eq!(nulls.email.as_deref(), Some("b@example.com"));
    }

    #[test]
    fn import_row_rejects_malformed_numbers() {
        assert!(row(r#"{"Queue Number":"A-007"}"#).into_new_ticket().is_ok());
        assert!(matches!(
            row(r#"{"Queue Number":"7"}"#).into_new_ticket(),
            Err(QueueError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn invite_issues_payloads() {
        let registrants = registrants();
        let imported = registrants
            .import(vec![
                row(r#"{"uniqueId":"u1","email":"a@example.com"}"#),
                row(r#"{"uniqueId":"u2"}"#),
            ])
            .await
            .unwrap();

        let invitations = registrants.invite(&[imported[0].id]).await.unwrap();
        assert_eq!(invitations.len(), 1);
        let (unique_id, _) = parse_qr_payload(&invitations[0].qr_code).unwrap();
        assert_eq!(unique_id, "u1");
        assert_eq!(registrants.qr_code("u1").await.unwrap(), invitations[0].qr_code);
        assert!(matches!(
            registrants.qr_code("u2").await,
            Err(QueueError::NotFound(_))
        ));

        assert_eq!(registrants.invite(&[]).await.unwrap().len(), 2);
        assert!(matches!(
            registrants.invite(&[404]).await,
            Err(QueueError::BadRequest(_))
        ));
    }
}
