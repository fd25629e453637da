use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::renderer::{RenderedReport, ReportError, ReportRenderer};
use crate::records::{RecordId, Student};
use crate::store::{Repository, RepositoryError, SearchScope};

/// Report printed by the student wizard.
pub const STUDENT_REPORT_REF: &str = "hms_student.report_qweb_3_id";

/// Transient query selecting students born within an inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentReportWizard {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
}

impl StudentReportWizard {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            from_date: today,
            to_date: today,
        }
    }

    /// Each bound falls back to `today` on its own.
    pub fn with_bounds(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Self {
        Self {
            from_date: from.unwrap_or(today),
            to_date: to.unwrap_or(today),
        }
    }

    pub fn includes(&self, student: &Student) -> bool {
        student
            .date_of_birth
            .is_some_and(|born| born >= self.from_date && born <= self.to_date)
    }

    /// Ids of active students whose birth date lies in the range, ascending.
    pub fn matching_ids<R>(&self, students: &R) -> Result<Vec<RecordId>, RepositoryError>
    where
        R: Repository<Student> + ?Sized,
    {
        let found = students.search(SearchScope::ActiveOnly, &|student| self.includes(student))?;
        Ok(found.into_iter().map(|stored| stored.id).collect())
    }

    /// Wizard fields as the report's data payload.
    pub fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "from_date": self.from_date,
            "to_date": self.to_date,
        })
    }

    pub fn print_report<R, P>(
        &self,
        students: &R,
        renderer: &P,
    ) -> Result<RenderedReport, ReportError>
    where
        R: Repository<Student> + ?Sized,
        P: ReportRenderer + ?Sized,
    {
        let ids = self.matching_ids(students)?;
        info!(
            from = %self.from_date,
            to = %self.to_date,
            matches = ids.len(),
            "student report requested"
        );
        renderer.render(STUDENT_REPORT_REF, &ids, &self.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Gender;
    use crate::store::InMemoryRepository;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn student(name: &str, born: Option<NaiveDate>) -> Student {
        let mut record = Student::new(name, "Parent", "REG", Gender::Female, date(2021, 8, 6));
        record.date_of_birth = born;
        record
    }

    #[test]
    fn bounds_default_independently() {
        let today = date(2021, 8, 6);
        let wizard = StudentReportWizard::with_bounds(Some(date(2000, 1, 1)), None, today);
        assert_eq!(wizard.from_date, date(2000, 1, 1));
        assert_eq!(wizard.to_date, today);
        assert_eq!(
            StudentReportWizard::with_bounds(None, None, today),
            StudentReportWizard::new(today)
        );
    }

    #[test]
    fn range_is_inclusive_and_skips_missing_birth_dates() {
        let wizard = StudentReportWizard::with_bounds(
            Some(date(2000, 1, 1)),
            Some(date(2000, 12, 31)),
            date(2021, 8, 6),
        );
        assert!(wizard.includes(&student("first", Some(date(2000, 1, 1)))));
        assert!(wizard.includes(&student("last", Some(date(2000, 12, 31)))));
        assert!(!wizard.includes(&student("late", Some(date(2001, 1, 1)))));
        assert!(!wizard.includes(&student("unknown", None)));
    }

    #[test]
    fn matching_ids_are_ascending_and_active_only() {
        let students = InMemoryRepository::<Student>::default();
        let mut ids = Vec::new();
        for name in ["a", "b", "c"] {
            let stored = students
                .insert(student(name, Some(date(2000, 6, 1))))
                .expect("insert");
            ids.push(stored.id);
        }
        let mut archived = students.fetch(ids[1]).expect("fetch").expect("present");
        archived.record.active = false;
        students.update(archived).expect("update");

        let wizard = StudentReportWizard::with_bounds(
            Some(date(2000, 1, 1)),
            Some(date(2000, 12, 31)),
            date(2021, 8, 6),
        );
        let found = wizard.matching_ids(&students).expect("search");
        assert_eq!(found, vec![ids[0], ids[2]]);
    }

    #[test]
    fn params_carry_both_bounds() {
        let wizard = StudentReportWizard::with_bounds(
            Some(date(2000, 1, 1)),
            Some(date(2000, 12, 31)),
            date(2021, 8, 6),
        );
        let params = wizard.params();
        assert_eq!(params["from_date"], "2000-01-01");
        assert_eq!(params["to_date"], "2000-12-31");
    }
}
