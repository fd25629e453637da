//! Date-of-birth range selection and rendering hand-off of the student report wizard.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use hostel_ms::clock::FixedClock;
use hostel_ms::records::{Gender, RecordId, Student};
use hostel_ms::reports::{
    CsvStudentReportRenderer, RenderedReport, ReportError, ReportRenderer, StudentReportWizard,
    STUDENT_REPORT_REF,
};
use hostel_ms::store::{InMemoryRepository, Repository};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn today() -> NaiveDate {
    date(2021, 8, 6)
}

fn seed(repository: &InMemoryRepository<Student>, name: &str, born: Option<NaiveDate>) -> RecordId {
    let registration_no = format!("REG-{name}");
    let mut student = Student::new(name, "Guardian", &registration_no, Gender::Female, today());
    student.date_of_birth = born;
    repository.insert(student).expect("insert").id
}

#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<(String, Vec<RecordId>, serde_json::Value)>>,
}

impl ReportRenderer for RecordingRenderer {
    fn render(
        &self,
        report_ref: &str,
        record_ids: &[RecordId],
        data: &serde_json::Value,
    ) -> Result<RenderedReport, ReportError> {
        self.calls.lock().expect("calls lock").push((
            report_ref.to_string(),
            record_ids.to_vec(),
            data.clone(),
        ));
        Ok(RenderedReport {
            report_ref: report_ref.to_string(),
            record_ids: record_ids.to_vec(),
            data: data.clone(),
            content_type: "text/plain",
            body: String::new(),
        })
    }
}

#[test]
fn selects_birth_dates_inside_inclusive_range() {
    let repository = InMemoryRepository::default();
    let before = seed(&repository, "Before", Some(date(1999, 12, 31)));
    let first_day = seed(&repository, "FirstDay", Some(date(2000, 1, 1)));
    let mid_year = seed(&repository, "MidYear", Some(date(2000, 6, 15)));
    let last_day = seed(&repository, "LastDay", Some(date(2000, 12, 31)));
    let after = seed(&repository, "After", Some(date(2001, 1, 1)));
    let unknown = seed(&repository, "Unknown", None);

    let wizard = StudentReportWizard {
        from_date: date(2000, 1, 1),
        to_date: date(2000, 12, 31),
    };
    let ids = wizard.matching_ids(&repository).expect("search");

    assert_eq!(ids, vec![first_day, mid_year, last_day]);
    for excluded in [before, after, unknown] {
        assert!(!ids.contains(&excluded));
    }
}

#[test]
fn archived_students_are_not_reported() {
    let repository = InMemoryRepository::default();
    let active = seed(&repository, "Active", Some(date(2000, 3, 1)));
    let archived = seed(&repository, "Archived", Some(date(2000, 4, 1)));
    let mut stored = repository.fetch(archived).expect("fetch").expect("present");
    stored.record.active = false;
    repository.update(stored).expect("update");

    let wizard = StudentReportWizard {
        from_date: date(2000, 1, 1),
        to_date: date(2000, 12, 31),
    };
    assert_eq!(wizard.matching_ids(&repository).expect("search"), vec![active]);
}

#[test]
fn bounds_default_to_today_independently() {
    let wizard = StudentReportWizard::with_bounds(Some(date(2000, 1, 1)), None, today());
    assert_eq!(wizard.from_date, date(2000, 1, 1));
    assert_eq!(wizard.to_date, today());

    let wizard = StudentReportWizard::with_bounds(None, Some(date(2030, 1, 1)), today());
    assert_eq!(wizard.from_date, today());
    assert_eq!(wizard.to_date, date(2030, 1, 1));

    assert_eq!(
        StudentReportWizard::new(today()),
        StudentReportWizard::with_bounds(None, None, today())
    );
}

#[test]
fn inverted_range_hands_an_empty_selection_to_the_renderer() {
    let repository = InMemoryRepository::default();
    seed(&repository, "Someone", Some(date(2000, 6, 1)));
    let renderer = RecordingRenderer::default();

    let wizard = StudentReportWizard {
        from_date: date(2000, 12, 31),
        to_date: date(2000, 1, 1),
    };
    let report = wizard.print_report(&repository, &renderer).expect("rendered");

    assert!(report.record_ids.is_empty());
    let calls = renderer.calls.lock().expect("calls lock");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, STUDENT_REPORT_REF);
    assert_eq!(calls[0].2["from_date"], "2000-12-31");
    assert_eq!(calls[0].2["to_date"], "2000-01-01");
}

#[test]
fn csv_report_lists_selected_students_with_ages() {
    let repository = Arc::new(InMemoryRepository::default());
    seed(&repository, "Outside", Some(date(1998, 5, 5)));
    seed(&repository, "Sara", Some(date(2000, 3, 14)));
    let renderer = CsvStudentReportRenderer::new(repository.clone(), Arc::new(FixedClock(today())));

    let wizard = StudentReportWizard {
        from_date: date(2000, 1, 1),
        to_date: date(2000, 12, 31),
    };
    let report = wizard
        .print_report(repository.as_ref(), &renderer)
        .expect("rendered");

    assert_eq!(report.report_ref, STUDENT_REPORT_REF);
    assert_eq!(report.record_ids, vec![RecordId(2)]);
    assert!(report.content_type.starts_with("text/csv"));
    let rows: Vec<&str> = report.body.lines().collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], "2,Sara,Guardian,REG-Sara,2000-03-14,21,,Draft");
}
