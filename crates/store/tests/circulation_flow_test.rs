//! Issue, renew, and return lifecycle against the in-memory store.

mod common;

use common::{day, library, library_with};
use libris_circulation::model::CopyStatus;
use libris_circulation::{
    CirculationError, CirculationPolicy, DenialReason, IssueRequest, ReturnRequest,
};

fn denial(err: CirculationError) -> DenialReason {
    match err {
        CirculationError::Denied(reason) => reason,
        other => panic!("expected a denial, got {other:?}"),
    }
}

#[test]
fn on_time_return_closes_the_loan_without_a_fine() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");

    let issue = lib.issue_for(ada, "C-1", Some(14), day(0));
    assert_eq!(issue.due_at, day(14));
    assert_eq!(lib.copy_status(copy), CopyStatus::Issued);

    let outcome = lib
        .service
        .return_copy(
            ReturnRequest {
                issue_id: issue.id,
                returned_at: None,
                staff_id: lib.staff,
            },
            day(10),
        )
        .unwrap();

    assert!(outcome.fine.is_none());
    assert_eq!(outcome.copy.status, CopyStatus::Available);
    assert_eq!(outcome.issue.returned_at, Some(day(10)));
}

#[test]
fn six_days_late_costs_six_daily_fines() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");
    let rate = lib.service.policy().daily_fine;

    let issue = lib.issue_for(ada, "C-1", Some(14), day(0));

    let outcome = lib
        .service
        .return_copy(
            ReturnRequest {
                issue_id: issue.id,
                returned_at: None,
                staff_id: lib.staff,
            },
            day(20),
        )
        .unwrap();

    let fine = outcome.fine.expect("overdue fine");
    assert_eq!(fine.amount, 6 * rate);
    assert_eq!(fine.issue_id, Some(issue.id));
    assert_eq!(lib.copy_status(copy), CopyStatus::Available);
}

#[test]
fn default_loan_period_comes_from_policy() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");

    let issue = lib.issue(ada, "C-1", day(0));
    assert_eq!(issue.due_at, day(lib.service.policy().loan_days));
}

#[test]
fn loan_period_outside_policy_bounds_is_rejected_before_any_write() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");

    for bad in [0, -3, 31] {
        let err = lib
            .service
            .issue(
                IssueRequest {
                    reader_id: ada,
                    copy_code: "C-1".to_string(),
                    due_days: Some(bad),
                    staff_id: lib.staff,
                    notes: None,
                },
                day(0),
            )
            .unwrap_err();
        assert!(matches!(err, CirculationError::Validation(_)));
    }
    assert_eq!(lib.copy_status(copy), CopyStatus::Available);
}

#[test]
fn a_copy_already_out_is_unavailable() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let bob = lib.add_reader("Bob");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");

    lib.issue(ada, "C-1", day(0));

    let err = lib
        .service
        .issue(lib.issue_request(bob, "C-1"), day(1))
        .unwrap_err();
    assert_eq!(denial(err), DenialReason::CopyUnavailable);
}

#[test]
fn one_overdue_issue_blocks_every_new_loan() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");
    lib.add_copy(title, "C-2");

    lib.issue_for(ada, "C-1", Some(7), day(0));

    // Day 10: C-1 is three days overdue; even an unrelated copy is refused.
    let err = lib
        .service
        .issue(lib.issue_request(ada, "C-2"), day(10))
        .unwrap_err();
    assert_eq!(denial(err), DenialReason::HasOverdue);
}

#[test]
fn the_open_issue_limit_blocks_the_next_loan() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Discworld", "Terry Pratchett");
    for i in 0..6 {
        lib.add_copy(title, &format!("C-{i}"));
    }

    for i in 0..5 {
        lib.issue_for(ada, &format!("C-{i}"), Some(21), day(0));
    }

    let err = lib
        .service
        .issue(lib.issue_request(ada, "C-5"), day(1))
        .unwrap_err();
    assert_eq!(denial(err), DenialReason::LimitReached);
}

#[test]
fn inactive_readers_are_turned_away() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");

    lib.deactivate_reader(ada);

    let err = lib
        .service
        .issue(lib.issue_request(ada, "C-1"), day(0))
        .unwrap_err();
    assert_eq!(denial(err), DenialReason::InactiveReader);
}

#[test]
fn renewals_push_the_due_date_and_stop_at_the_cap() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");

    let issue = lib.issue_for(ada, "C-1", Some(14), day(0));

    let renewed = lib.service.renew(issue.id, 7).unwrap();
    assert_eq!(renewed.due_at, day(21));
    assert_eq!(renewed.renewal_count, 1);

    lib.service.renew(issue.id, 7).unwrap();
    let third = lib.service.renew(issue.id, 7).unwrap();
    assert_eq!(third.renewal_count, 3);
    assert_eq!(third.due_at, day(35));

    // The cap is three; the fourth attempt is denied.
    let err = lib.service.renew(issue.id, 7).unwrap_err();
    assert_eq!(denial(err), DenialReason::RenewalLimit);
}

#[test]
fn renewal_extension_must_stay_within_one_to_thirty_days() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");

    let issue = lib.issue_for(ada, "C-1", Some(14), day(0));

    for bad in [0, -1, 31] {
        let err = lib.service.renew(issue.id, bad).unwrap_err();
        assert!(matches!(err, CirculationError::Validation(_)));
    }
    assert!(lib.service.renew(issue.id, 1).is_ok());
    assert!(lib.service.renew(issue.id, 30).is_ok());
}

#[test]
fn closed_issues_cannot_be_renewed_or_returned_again() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");

    let issue = lib.issue_for(ada, "C-1", Some(14), day(0));
    lib.service
        .return_copy(
            ReturnRequest {
                issue_id: issue.id,
                returned_at: None,
                staff_id: lib.staff,
            },
            day(3),
        )
        .unwrap();

    let err = lib.service.renew(issue.id, 7).unwrap_err();
    assert_eq!(denial(err), DenialReason::AlreadyReturned);

    let err = lib
        .service
        .return_copy(
            ReturnRequest {
                issue_id: issue.id,
                returned_at: None,
                staff_id: lib.staff,
            },
            day(4),
        )
        .unwrap_err();
    assert_eq!(denial(err), DenialReason::AlreadyReturned);
}

#[test]
fn returns_cannot_predate_the_issue() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");

    let issue = lib.issue_for(ada, "C-1", Some(14), day(5));

    let err = lib
        .service
        .return_copy(
            ReturnRequest {
                issue_id: issue.id,
                returned_at: Some(day(2)),
                staff_id: lib.staff,
            },
            day(6),
        )
        .unwrap_err();
    assert!(matches!(err, CirculationError::Validation(_)));

    // The rejection left the loan open and the copy out.
    assert_eq!(lib.copy_status(copy), CopyStatus::Issued);
    let open = lib.service.active_issues(ada).unwrap();
    assert_eq!(open.len(), 1);
}

#[test]
fn unknown_entities_come_back_as_not_found() {
    let lib = library();
    let ada = lib.add_reader("Ada");

    let err = lib
        .service
        .issue(lib.issue_request(ada, "NOPE"), day(0))
        .unwrap_err();
    assert!(matches!(err, CirculationError::NotFound { .. }));

    let err = lib
        .service
        .renew(libris_circulation::model::IssueId::new(), 7)
        .unwrap_err();
    assert!(matches!(err, CirculationError::NotFound { .. }));
}

#[test]
fn marking_lost_force_closes_the_loan_and_charges_replacement() {
    let lib = library_with(CirculationPolicy {
        replacement_fee: Some(2500),
        ..CirculationPolicy::default()
    });
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");

    let issue = lib.issue_for(ada, "C-1", Some(7), day(0));

    // Lost on day 20, long past due; only the replacement fee applies,
    // never the overdue clock.
    let marked = lib.service.mark_lost(copy, lib.staff, day(20)).unwrap();
    assert_eq!(marked.status, CopyStatus::Lost);

    assert!(lib.service.active_issues(ada).unwrap().is_empty());

    let fines = lib.service.unpaid_fines(ada).unwrap();
    assert_eq!(fines.len(), 1);
    assert_eq!(fines[0].amount, 2500);
    assert_eq!(fines[0].issue_id, Some(issue.id));
}

#[test]
fn marking_damaged_without_a_fee_policy_just_parks_the_copy() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");

    lib.issue_for(ada, "C-1", Some(7), day(0));
    let marked = lib.service.mark_damaged(copy, lib.staff, day(3)).unwrap();

    assert_eq!(marked.status, CopyStatus::Damaged);
    assert!(lib.service.unpaid_fines(ada).unwrap().is_empty());
    assert!(lib.service.active_issues(ada).unwrap().is_empty());
}

#[test]
fn lost_copies_cannot_be_marked_again() {
    let lib = library();
    let title = lib.add_title("Dune", "Frank Herbert");
    let copy = lib.add_copy(title, "C-1");

    lib.service.mark_lost(copy, lib.staff, day(0)).unwrap();
    let err = lib.service.mark_lost(copy, lib.staff, day(1)).unwrap_err();
    assert_eq!(denial(err), DenialReason::NotCirculating);
}

#[test]
fn overdue_report_lists_only_open_past_due_loans() {
    let lib = library();
    let ada = lib.add_reader("Ada");
    let bob = lib.add_reader("Bob");
    let title = lib.add_title("Dune", "Frank Herbert");
    lib.add_copy(title, "C-1");
    lib.add_copy(title, "C-2");
    lib.add_copy(title, "C-3");

    let overdue = lib.issue_for(ada, "C-1", Some(7), day(0));
    lib.issue_for(bob, "C-2", Some(30), day(0));
    let returned = lib.issue_for(bob, "C-3", Some(7), day(0));
    lib.service
        .return_copy(
            ReturnRequest {
                issue_id: returned.id,
                returned_at: None,
                staff_id: lib.staff,
            },
            day(20),
        )
        .unwrap();

    let report = lib.service.overdue_issues(day(10)).unwrap();
    let ids: Vec<_> = report.iter().map(|issue| issue.id).collect();
    assert_eq!(ids, vec![overdue.id]);
}
