// CSV report: one header plus a Section,Metric,Value row per summary entry

use super::summary::summary_rows;
use crate::error::ReportError;
use crate::models::Snapshot;

pub(super) fn render(snapshot: &Snapshot) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Section", "Metric", "Value"])?;
    for r in summary_rows(snapshot) {
        writer.write_record([r.section, r.metric.as_str(), r.value.as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| ReportError::Io(e.into_error()))
}
