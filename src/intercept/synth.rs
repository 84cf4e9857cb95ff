//! Fake ticket synthesis.
//!
//! Builds a monthly ticket without contacting upstream. The identifiers and
//! signatures below are fixed placeholders that only satisfy the client's
//! shape expectations; nothing should verify them.

use chrono::{DateTime, Offset, TimeZone};
use serde::Serialize;

use crate::storage::Trip;

const TICKET_ID: &str = "375ae82f-9610-4f9f-a8c5-ee27b0ad11d0";
const TICKET_TYPE_ID: &str = "9b980fae-e8b2-4c0b-91ee-3f85d05a2738";
const TICKET_TYPE_NAME: &str = "timed_month";
const KEY_ID: &str = "00000000-0000-0000-0000-000000000000";
const TRANSACTION_ID: &str = "87d28aff-d989-43ad-95d2-9cac141f3799";
const BATCH_NUMBER: u32 = 40447;
const SIGNED_IDS: &str =
    "Hma4mQm9fWxAZ7Aaua0l9HcyKqaV4/PuoJdaOfFAvQvs3TqeW0umeJ4Om3ghDmegiRZhwf3Tw3ur8iFxuRqJBQ==";

const DEFAULT_TRIP_ID: &str = "8440cbfe-b550-4c7c-97b6-e410940736ba";
const DEFAULT_VEHICLE_NR: &str = "17998";
const DEFAULT_TRIP_SIGNATURE: &str =
    "0jaKtnGWQwahPz1mJRGFpGdwOLNRqVqmhS4Qnsmm2dIM9mPKI5V8pbikhjK1000uTp0L0FIe+USYkxX4K9wrBg==";

/// Local wall-clock time the synthesized ticket is activated at.
pub const ACTIVATION_HOUR: u32 = 5;
pub const ACTIVATION_MINUTE: u32 = 30;

/// Validity of a synthesized ticket.
pub const VALID_DAYS: i64 = 30;

/// Wire shape of a ticket as the client expects it.
#[derive(Debug, Clone, Serialize)]
pub struct SyntheticTicket {
    pub type_name: &'static str,
    pub valid_from: Option<i64>,
    pub valid_till: Option<i64>,
    pub valid_period: Option<i64>,
    pub id: &'static str,
    pub type_id: &'static str,
    pub purchase_time: i64,
    pub key_id: &'static str,
    pub transaction_id: &'static str,
    pub batch_number: u32,
    pub is_annulled: bool,
    pub signed_ids: &'static str,
    pub activated: i64,
    pub trips: Vec<Trip>,
    pub expiry_time: i64,
}

/// Today's activation instant (05:30 local to `now`) in epoch seconds.
pub fn activation_instant<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    let Some(local) = now
        .date_naive()
        .and_hms_opt(ACTIVATION_HOUR, ACTIVATION_MINUTE, 0)
    else {
        return now.timestamp();
    };

    match now.timezone().from_local_datetime(&local).earliest() {
        Some(instant) => instant.timestamp(),
        // 05:30 skipped by a DST jump: use the offset in effect now
        None => local.and_utc().timestamp() - i64::from(now.offset().fix().local_minus_utc()),
    }
}

/// Build the ticket list. `latest` is the ledger's newest trip after
/// [`activation_instant`], if any.
pub fn synthesize<Tz: TimeZone>(now: &DateTime<Tz>, latest: Option<Trip>) -> Vec<SyntheticTicket> {
    let now_secs = now.timestamp();
    let activated = activation_instant(now);

    let mut trips = vec![Trip {
        id: DEFAULT_TRIP_ID.to_string(),
        time: activated,
        vehicle_nr: DEFAULT_VEHICLE_NR.to_string(),
        ticket_id: TICKET_ID.to_string(),
        signature: DEFAULT_TRIP_SIGNATURE.to_string(),
    }];
    trips.extend(latest);

    vec![SyntheticTicket {
        type_name: TICKET_TYPE_NAME,
        valid_from: None,
        valid_till: None,
        valid_period: None,
        id: TICKET_ID,
        type_id: TICKET_TYPE_ID,
        purchase_time: now_secs,
        key_id: KEY_ID,
        transaction_id: TRANSACTION_ID,
        batch_number: BATCH_NUMBER,
        is_annulled: false,
        signed_ids: SIGNED_IDS,
        activated,
        trips,
        expiry_time: now_secs + VALID_DAYS * 24 * 60 * 60,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{Database, TripLedger};
    use chrono::{FixedOffset, Utc};

    fn at(offset_hours: i32, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn trip(id: &str, time: i64) -> Trip {
        Trip {
            id: id.to_string(),
            time,
            vehicle_nr: "16042".to_string(),
            ticket_id: TICKET_ID.to_string(),
            signature: "sig".to_string(),
        }
    }

    #[test]
    fn test_activation_is_local_half_past_five() {
        let now = at(2, 2024, 3, 10, 14, 0);
        let expected = at(2, 2024, 3, 10, 5, 30).timestamp();
        assert_eq!(activation_instant(&now), expected);

        // early morning still uses the same calendar day, even before 05:30
        let early = at(2, 2024, 3, 10, 1, 0);
        assert_eq!(activation_instant(&early), expected);
    }

    #[test]
    fn test_activation_follows_time_zone() {
        let utc = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let plus_two = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(activation_instant(&plus_two) + 2 * 3600, activation_instant(&utc));
    }

    #[test]
    fn test_single_default_trip_without_ledger() {
        let now = at(0, 2024, 6, 1, 12, 0);
        let tickets = synthesize(&now, None);

        assert_eq!(tickets.len(), 1);
        let ticket = &tickets[0];
        assert_eq!(ticket.trips.len(), 1);
        assert_eq!(ticket.trips[0].id, DEFAULT_TRIP_ID);
        assert_eq!(ticket.trips[0].time, activation_instant(&now));
        assert_eq!(ticket.activated, activation_instant(&now));
        assert_eq!(ticket.purchase_time, now.timestamp());
        assert_eq!(ticket.expiry_time, now.timestamp() + 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_latest_trip_after_activation_is_appended() {
        let now = at(1, 2024, 6, 1, 12, 0);
        let activation = activation_instant(&now);
        let ledger = TripLedger::new(Database::memory().unwrap());
        ledger.append(&trip("before", activation - 5)).unwrap();
        ledger.append(&trip("after", activation + 5)).unwrap();

        let tickets = synthesize(&now, ledger.latest_after(activation));
        let trips = &tickets[0].trips;
        assert_eq!(trips.len(), 2);
        assert_eq!(trips[1], trip("after", activation + 5));
    }

    #[test]
    fn test_wire_shape() {
        let now = at(0, 2024, 6, 1, 12, 0);
        let json = serde_json::to_value(synthesize(&now, None)).unwrap();

        assert!(json.is_array());
        assert_eq!(json[0]["type_name"], "timed_month");
        assert!(json[0]["valid_from"].is_null());
        assert_eq!(json[0]["is_annulled"], false);
        assert_eq!(json[0]["trips"][0]["vehicle_nr"], "17998");
        assert_eq!(json[0]["trips"][0]["ticket_id"], json[0]["id"]);
    }
}
