//! Student report wizard and the renderers it hands results to.

mod renderer;
mod wizard;

pub use renderer::{CsvStudentReportRenderer, RenderedReport, ReportError, ReportRenderer};
pub use wizard::{StudentReportWizard, STUDENT_REPORT_REF};
