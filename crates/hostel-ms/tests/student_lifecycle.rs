//! Student approval numbering, unguarded status helpers, and soft deletion exercised through
//! the public record service.

use std::sync::Arc;

use chrono::NaiveDate;
use hostel_ms::clock::FixedClock;
use hostel_ms::records::{
    AdmissionAction, AdmissionStatus, Gender, Hostel, HostelAction, HostelAdmission, HostelStatus,
    RecordId, Stateful, Student, StudentAction, StudentStatus,
};
use hostel_ms::sequence::{InMemorySequence, STUDENT_SEQUENCE_CODE};
use hostel_ms::service::{RecordService, ServiceError};
use hostel_ms::store::{InMemoryRepository, Repository, SearchScope};

type Service<T> = RecordService<T, InMemoryRepository<T>, InMemorySequence>;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 8, 6).expect("valid date")
}

fn service<T: hostel_ms::records::Record>(sequences: &Arc<InMemorySequence>) -> Service<T> {
    RecordService::new(
        Arc::new(InMemoryRepository::default()),
        sequences.clone(),
        Arc::new(FixedClock(today())),
    )
}

fn student(name: &str, admitted: Option<NaiveDate>) -> Student {
    let mut student = Student::new(name, "Guardian", &format!("REG-{name}"), Gender::Male, today());
    student.admission_date = admitted;
    student
}

#[test]
fn approvals_number_students_by_admission_year() {
    let sequences = Arc::new(InMemorySequence::standard());
    let students: Service<Student> = service(&sequences);

    let first = students
        .create(student("Hamza", NaiveDate::from_ymd_opt(2021, 9, 1)))
        .expect("created");
    let second = students
        .create(student("Sara", NaiveDate::from_ymd_opt(2022, 2, 1)))
        .expect("created");
    let third = students
        .create(student("Usman", NaiveDate::from_ymd_opt(2021, 9, 1)))
        .expect("created");

    let numbers: Vec<String> = [first.id, second.id, third.id]
        .into_iter()
        .map(|id| {
            students
                .transition(id, StudentAction::SetToApproved)
                .expect("approved")
                .record
                .admission_no
                .expect("number assigned")
        })
        .collect();

    assert_eq!(numbers, vec!["2021-1", "2022-2", "2021-3"]);
    assert_eq!(sequences.peek(STUDENT_SEQUENCE_CODE), Some(4));
}

#[test]
fn approving_twice_draws_a_fresh_number() {
    let sequences = Arc::new(InMemorySequence::starting_at(17));
    let students: Service<Student> = service(&sequences);
    let created = students.create(student("Hamza", None)).expect("created");

    let first = students
        .transition(created.id, StudentAction::SetToApproved)
        .expect("approved");
    let second = students
        .transition(created.id, StudentAction::SetToApproved)
        .expect("approved again");

    assert_eq!(first.record.admission_no.as_deref(), Some("2021-17"));
    assert_eq!(second.record.admission_no.as_deref(), Some("2021-18"));
}

#[test]
fn approval_without_admission_date_changes_nothing() {
    let sequences = Arc::new(InMemorySequence::standard());
    let students: Service<Student> = service(&sequences);
    let created = students.create(student("Hamza", None)).expect("created");
    students
        .transition(created.id, StudentAction::SetToVerified)
        .expect("verified");
    let mut cleared = students.get(created.id).expect("fetched").record;
    cleared.admission_date = None;
    students.update(created.id, cleared).expect("updated");

    let err = students
        .transition(created.id, StudentAction::SetToApproved)
        .expect_err("approval rejected");

    assert!(matches!(err, ServiceError::Transition(_)));
    assert_eq!(err.to_string(), "Please enter admission date for student Hamza");
    let stored = students.get(created.id).expect("fetched");
    assert_eq!(stored.record.state, StudentStatus::Verified);
    assert_eq!(stored.record.admission_no, None);
    assert_eq!(sequences.peek(STUDENT_SEQUENCE_CODE), Some(1));
}

#[test]
fn status_helpers_accept_any_prior_status() {
    let sequences = Arc::new(InMemorySequence::standard());
    let students: Service<Student> = service(&sequences);
    let created = students.create(student("Hamza", None)).expect("created");

    let script = [
        (StudentAction::SetToCancelled, StudentStatus::Cancelled),
        (StudentAction::SetToApproved, StudentStatus::Approved),
        (StudentAction::SetToDraft, StudentStatus::Draft),
        (StudentAction::SetToApproved, StudentStatus::Approved),
        (StudentAction::SetToVerified, StudentStatus::Verified),
        (StudentAction::SetToCancelled, StudentStatus::Cancelled),
    ];
    for (action, expected) in script {
        let stored = students.transition(created.id, action).expect("transition");
        assert_eq!(stored.record.status(), expected, "after {action:?}");
    }

    let hostels: Service<Hostel> = service(&sequences);
    let hostel = hostels
        .create(Hostel::new("Iqbal Hall", "Canal Road", "120", today()))
        .expect("created");
    assert_eq!(hostel.record.state, HostelStatus::Draft);
    let approved = hostels
        .transition(hostel.id, HostelAction::SetToApproved)
        .expect("approved");
    assert_eq!(approved.record.state, HostelStatus::Approved);

    let admissions: Service<HostelAdmission> = service(&sequences);
    let billing = today().and_hms_opt(9, 0, 0).expect("valid time");
    let admission = admissions
        .create(HostelAdmission::new(
            created.id,
            hostel.id,
            RecordId(1),
            billing,
            billing,
        ))
        .expect("created");
    assert_eq!(admission.record.admission_date, Some(today()));
    let done = admissions
        .transition(admission.id, AdmissionAction::SetDone)
        .expect("done");
    assert_eq!(done.record.state, AdmissionStatus::Done);
}

#[test]
fn archived_students_leave_listings_but_stay_stored() {
    let sequences = Arc::new(InMemorySequence::standard());
    let students: Service<Student> = service(&sequences);
    let kept = students.create(student("Kept", None)).expect("created");
    let archived = students.create(student("Archived", None)).expect("created");

    students.archive(archived.id).expect("archived");

    let listed: Vec<RecordId> = students
        .list(SearchScope::ActiveOnly)
        .expect("list")
        .into_iter()
        .map(|stored| stored.id)
        .collect();
    assert_eq!(listed, vec![kept.id]);

    let raw = students
        .repository()
        .fetch(archived.id)
        .expect("fetch")
        .expect("still stored");
    assert!(!raw.record.active);
    assert_eq!(
        students
            .list(SearchScope::IncludeArchived)
            .expect("list")
            .len(),
        2
    );

    let restored = students.restore(archived.id).expect("restored");
    assert!(restored.record.active);
    assert_eq!(students.list(SearchScope::ActiveOnly).expect("list").len(), 2);
}
