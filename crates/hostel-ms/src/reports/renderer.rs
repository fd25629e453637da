use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::wizard::STUDENT_REPORT_REF;
use crate::clock::Clock;
use crate::records::{Record, RecordId, Student};
use crate::store::{Repository, RepositoryError};

/// Turns a report reference, the selected ids, and a data payload into a document.
pub trait ReportRenderer: Send + Sync {
    fn render(
        &self,
        report_ref: &str,
        record_ids: &[RecordId],
        data: &serde_json::Value,
    ) -> Result<RenderedReport, ReportError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    pub report_ref: String,
    pub record_ids: Vec<RecordId>,
    pub data: serde_json::Value,
    pub content_type: &'static str,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report '{0}'")]
    UnknownReport(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to encode report: {0}")]
    Encoding(String),
}

impl From<csv::Error> for ReportError {
    fn from(value: csv::Error) -> Self {
        Self::Encoding(value.to_string())
    }
}

#[derive(Debug, Serialize)]
struct StudentReportRow<'a> {
    id: RecordId,
    name: &'a str,
    father_name: &'a str,
    registration_no: &'a str,
    date_of_birth: Option<NaiveDate>,
    age: u32,
    admission_no: Option<&'a str>,
    status: &'static str,
}

/// Renders the student report as CSV, one row per selected student.
pub struct CsvStudentReportRenderer<R> {
    students: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CsvStudentReportRenderer<R>
where
    R: Repository<Student>,
{
    pub fn new(students: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { students, clock }
    }
}

impl<R> ReportRenderer for CsvStudentReportRenderer<R>
where
    R: Repository<Student>,
{
    fn render(
        &self,
        report_ref: &str,
        record_ids: &[RecordId],
        data: &serde_json::Value,
    ) -> Result<RenderedReport, ReportError> {
        if report_ref != STUDENT_REPORT_REF {
            return Err(ReportError::UnknownReport(report_ref.to_string()));
        }

        let today = self.clock.today();
        let mut students = Vec::with_capacity(record_ids.len());
        for &id in record_ids {
            let stored = self.students.fetch(id)?.ok_or(RepositoryError::NotFound {
                model: Student::MODEL,
                id,
            })?;
            students.push(stored);
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        if students.is_empty() {
            writer.write_record([
                "id",
                "name",
                "father_name",
                "registration_no",
                "date_of_birth",
                "age",
                "admission_no",
                "status",
            ])?;
        }
        for stored in &students {
            let student = &stored.record;
            writer.serialize(StudentReportRow {
                id: stored.id,
                name: &student.name,
                father_name: &student.father_name,
                registration_no: &student.registration_no,
                date_of_birth: student.date_of_birth,
                age: student.age_on(today),
                admission_no: student.admission_no.as_deref(),
                status: student.state.label(),
            })?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| ReportError::Encoding(err.to_string()))?;
        let body = String::from_utf8(bytes).map_err(|err| ReportError::Encoding(err.to_string()))?;

        Ok(RenderedReport {
            report_ref: report_ref.to_string(),
            record_ids: record_ids.to_vec(),
            data: data.clone(),
            content_type: "text/csv; charset=utf-8",
            body,
        })
    }
}
