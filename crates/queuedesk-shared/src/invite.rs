use chrono::{DateTime, Utc};

use crate::constants::QR_PAYLOAD_SCHEME;

/// Build the QR payload sent with an invitation.
///
/// The payload embeds the issue time so that re-inviting a registrant
/// invalidates the previous code: `user:<unique_id>-<unix_millis>`.
pub fn qr_payload(unique_id: &str, issued_at: DateTime<Utc>) -> String {
    format!(
        "{}{}-{}",
        QR_PAYLOAD_SCHEME,
        unique_id,
        issued_at.timestamp_millis()
    )
}

/// Split a payload back into its unique id and issue time.
pub fn parse_qr_payload(payload: &str) -> Option<(&str, DateTime<Utc>)> {
    let rest = payload.strip_prefix(QR_PAYLOAD_SCHEME)?;
    let (unique_id, millis) = rest.rsplit_once('-')?;
    let issued_at = DateTime::from_timestamp_millis(millis.parse().ok()?)?;
    if unique_id.is_empty() {
        return None;
    }
    Some((unique_id, issued_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_with_dashed_ids() {
        let issued = DateTime::from_timestamp_millis(1_724_742_838_000).unwrap();
        let payload = qr_payload("5f0c6a2e-8d1b-4c57-9f3e-2b7d1e0a9c44", issued);
        assert_eq!(
            payload,
            "user:5f0c6a2e-8d1b-4c57-9f3e-2b7d1e0a9c44-1724742838000"
        );

        let (id, at) = parse_qr_payload(&payload).unwrap();
        assert_eq!(id, "5f0c6a2e-8d1b-4c57-9f3e-2b7d1e0a9c44");
        assert_eq!(at, issued);
    }

    #[test]
    fn rejects_foreign_payloads() {
        assert!(parse_qr_payload("5f0c6a2e").is_none());
        assert!(parse_qr_payload("user:-12").is_none());
        assert!(parse_qr_payload("user:abc-notanumber").is_none());
    }
}
