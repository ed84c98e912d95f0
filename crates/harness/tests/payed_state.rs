use serde_json::json;

use finetrack_core::ErrorCode;
use finetrack_engine::OperationOutcome;
use finetrack_harness::TestClub;

const CREATED: &str = "2011-10-10T08:00:00+0000";
const PAYED_AT: &str = "2011-10-15T10:42:38+0000";

fn payed() -> serde_json::Value {
    json!({ "state": "payed", "payDate": "2011-10-14T10:42:38+0000", "inApp": false })
}

#[test]
fn unpayed_fine_becomes_payed() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-scenario")?;
    let person = club.fixtures.person_id();
    let fine_id = club.create_unpayed_fine(2, person, CREATED)?;
    let before = club.stored_fine(fine_id)?.expect("fine stored");

    let outcome = club.change_payed_state(fine_id, payed(), PAYED_AT, person)?;
    assert_eq!(outcome, OperationOutcome::Applied);

    let stored = club.stored_fine(fine_id)?.expect("fine stored");
    assert_eq!(
        stored["payedState"],
        json!({ "state": "payed", "payDate": "2011-10-14T10:42:38.000Z", "inApp": false })
    );
    assert_eq!(stored["number"], json!(2));
    assert_eq!(stored["personId"], json!(person.to_string()));
    assert_eq!(stored["fineReason"], before["fineReason"]);
    assert_eq!(stored["updateProperties"]["timestamp"], json!("2011-10-15T10:42:38.000Z"));

    let events = club.events("changeFinePayed")?;
    assert_eq!(events.len(), 1);
    let previous = events[0].properties.previous_state.as_ref().expect("previous fine");
    assert_eq!(
        previous["payedState"],
        json!({ "state": "unpayed", "inApp": null, "payDate": null })
    );
    assert_eq!(previous, &before);
    assert_eq!(events[0].properties.changed_state, stored);
    Ok(())
}

#[test]
fn deleted_fine_is_unavailable() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-deleted")?;
    let person = club.fixtures.person_id();
    let fine_id = club.create_unpayed_fine(2, person, CREATED)?;
    club.delete_fine(fine_id, "2011-10-12T08:00:00+0000", person)?;

    let err = club.change_payed_state(fine_id, payed(), PAYED_AT, person).unwrap_err();
    assert_eq!(err.code, ErrorCode::Unavailable);
    assert_eq!(err.message, "Couldn't get fine from 'Deleted'.");
    assert!(club.events("changeFinePayed")?.is_empty());
    assert_eq!(club.stored_fine(fine_id)?.expect("tombstone")["deleted"], json!(true));
    Ok(())
}

#[test]
fn missing_fine_is_unavailable() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-missing")?;
    let person = club.fixtures.person_id();
    let fine_id = club.fixtures.fine_id();
    let err = club.change_payed_state(fine_id, payed(), PAYED_AT, person).unwrap_err();
    assert_eq!(err.code, ErrorCode::Unavailable);
    assert_eq!(err.message, "Couldn't get fine from 'Absent'.");
    Ok(())
}

#[test]
fn invalid_state_is_rejected_before_reading() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-invalid")?;
    let person = club.fixtures.person_id();
    let fine_id = club.fixtures.fine_id();
    let err = club
        .change_payed_state(fine_id, json!({ "state": "invalid state" }), PAYED_AT, person)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert_eq!(
        err.message,
        "Couldn't parse PayedState parameter 'state'. Expected values 'payed', 'settled' or 'unpayed', but got 'invalid state' from type 'string'."
    );
    Ok(())
}

#[test]
fn unparseable_pay_date_names_literal() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-date")?;
    let person = club.fixtures.person_id();
    let fine_id = club.create_unpayed_fine(1, person, CREATED)?;
    let state = json!({ "state": "payed", "payDate": "last tuesday", "inApp": true });
    let err = club.change_payed_state(fine_id, state, PAYED_AT, person).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert_eq!(
        err.message,
        "Couldn't parse 'payDate'. Expected ISO-8601 date string, but got 'last tuesday'."
    );
    Ok(())
}

#[test]
fn stale_payed_change_is_discarded() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-stale")?;
    let person = club.fixtures.person_id();
    let fine_id = club.create_unpayed_fine(1, person, PAYED_AT)?;

    let outcome = club.change_payed_state(fine_id, payed(), CREATED, person)?;
    assert_eq!(outcome, OperationOutcome::Discarded);
    assert_eq!(
        club.stored_fine(fine_id)?.expect("stored")["payedState"]["state"],
        json!("unpayed")
    );
    assert!(club.events("changeFinePayed")?.is_empty());
    Ok(())
}

#[test]
fn settled_clears_payment_details() -> Result<(), Box<dyn std::error::Error>> {
    let mut club = TestClub::new("payed-settled")?;
    let person = club.fixtures.person_id();
    let fine_id = club.create_unpayed_fine(1, person, CREATED)?;
    club.change_payed_state(fine_id, payed(), PAYED_AT, person)?;
    club.change_payed_state(fine_id, json!({ "state": "settled" }), "2011-10-16T00:00:00Z", person)?;

    assert_eq!(
        club.stored_fine(fine_id)?.expect("stored")["payedState"],
        json!({ "state": "settled", "payDate": null, "inApp": null })
    );
    assert_eq!(club.events("changeFinePayed")?.len(), 2);
    Ok(())
}
