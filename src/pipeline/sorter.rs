use crate::data_model::ProcessingOutcome;
use crate::utils::dates::sortable_timestamp;

/// Sort key of one slot. Failed slots carry no date and go last.
pub fn sort_key(outcome: &ProcessingOutcome) -> f64 {
    match outcome.document() {
        Some(document) => sortable_timestamp(document.sort_date()),
        None => f64::INFINITY,
    }
}

/// Stable ascending sort by document date. Equal keys, including every
/// unparseable date, keep their relative input order.
pub fn sort_by_document_date(outcomes: Vec<ProcessingOutcome>) -> Vec<ProcessingOutcome> {
    let mut keyed: Vec<(f64, ProcessingOutcome)> = outcomes
        .into_iter()
        .map(|outcome| (sort_key(&outcome), outcome))
        .collect();
    // slice::sort_by is stable
    keyed.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    keyed.into_iter().map(|(_, outcome)| outcome).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::{
        ExtractedRecord, InstallationFields, SupplyRequestFields, WorkOrderFields,
    };
    use crate::pipeline::normalizer::normalize;

    fn work_order(file: &str, fecha_registro: &str) -> ProcessingOutcome {
        normalize(
            ExtractedRecord::WorkOrder(WorkOrderFields {
                orden: file.trim_end_matches(".pdf").to_string(),
                fecha_registro: fecha_registro.to_string(),
                ..Default::default()
            }),
            file,
        )
        .into()
    }

    fn supply_request(file: &str, fecha_registro: &str) -> ProcessingOutcome {
        normalize(
            ExtractedRecord::SupplyRequest(SupplyRequestFields {
                fecha_registro: fecha_registro.to_string(),
                ..Default::default()
            }),
            file,
        )
        .into()
    }

    fn installation(file: &str, fecha: &str) -> ProcessingOutcome {
        normalize(
            ExtractedRecord::Installation(InstallationFields {
                fecha: fecha.to_string(),
                ..Default::default()
            }),
            file,
        )
        .into()
    }

    fn names(outcomes: &[ProcessingOutcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.original_file_name()).collect()
    }

    #[test]
    fn orders_mixed_formats_by_calendar_date() {
        let sorted = sort_by_document_date(vec![
            work_order("b.pdf", "20-01-24"),
            supply_request("a.pdf", "01/15/24"),
        ]);
        assert_eq!(names(&sorted), vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn installation_uses_fecha() {
        let sorted = sort_by_document_date(vec![
            work_order("late.pdf", "10-03-24"),
            installation("early.pdf", "01-03-24"),
        ]);
        assert_eq!(names(&sorted), vec!["early.pdf", "late.pdf"]);
    }

    #[test]
    fn unparseable_dates_keep_input_order_at_the_end() {
        let sorted = sort_by_document_date(vec![
            work_order("x.pdf", "no date"),
            ProcessingOutcome::failed("failed.pdf", "boom"),
            work_order("y.pdf", ""),
            supply_request("dated.pdf", "12/31/23"),
            work_order("z.pdf", "2024-01-01"),
        ]);
        assert_eq!(
            names(&sorted),
            vec!["dated.pdf", "x.pdf", "failed.pdf", "y.pdf", "z.pdf"]
        );
    }

    #[test]
    fn equal_dates_are_stable() {
        let sorted = sort_by_document_date(vec![
            work_order("first.pdf", "01-02-24"),
            supply_request("second.pdf", "02/01/24"),
            work_order("third.pdf", "01-02-24"),
        ]);
        assert_eq!(names(&sorted), vec!["first.pdf", "second.pdf", "third.pdf"]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(sort_by_document_date(Vec::new()).is_empty());
    }
}
