use chrono::{NaiveDate, NaiveDateTime};

use crate::{engine::DueLead, storage::Table};

/// Digest date rendering, e.g. "June 15, 2024".
pub fn format_digest_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

fn format_optional_date(date: Option<NaiveDateTime>) -> String {
    match date {
        Some(d) => format_digest_date(d.date()),
        None => "N/A".to_string(),
    }
}

pub fn renewal_digest_subject(today: NaiveDate) -> String {
    format!("Daily Follow Up - {}", format_digest_date(today))
}

pub fn working_leads_subject(today: NaiveDate) -> String {
    format!("Monthly Working Leads Summary - {}", format_digest_date(today))
}

/// Body of the daily renewal digest, one numbered line per due lead in scan
/// order.
pub fn render_renewal_digest(leads: &[DueLead]) -> String {
    let mut body = String::from("Dear Admin,\n\nThe following leads are due for follow-up today:\n\n");

    for (index, lead) in leads.iter().enumerate() {
        body.push_str(&format!(
            "{}. {} {} – Contact: {} – Renewal Date: {}\n",
            index + 1,
            lead.first_name,
            lead.last_name,
            lead.contact_number,
            format_optional_date(lead.renewal_date),
        ));
    }

    body.push_str("\nRegards,\nCRM Workflow Bot\n\n(This is an automated message, please do not reply.)");
    body
}

/// Body of the monthly working-leads digest: a numbered dump of every row up
/// to the first blank-first-column sentinel.
pub fn render_working_leads_digest(table: &Table) -> String {
    let mut body = String::from("Dear Admin,\n\nBelow are the current active working leads:\n\n");

    for (row_idx, row) in table.bounded_rows() {
        let cells: Vec<String> = row.cells().iter().map(|c| c.display()).collect();
        body.push_str(&format!("{}. {}\n", row_idx, cells.join(" | ")));
    }

    body.push_str("\nRegards,\nCRM Workflow Bot\n(This is an automated message)");
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Record;

    fn due(first: &str, renewal: Option<&str>) -> DueLead {
        DueLead {
            row: 1,
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            contact_number: "555-0101".to_string(),
            renewal_date: renewal.map(|r| {
                NaiveDate::parse_from_str(r, "%Y-%m-%d")
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            }),
        }
    }

    #[test]
    fn test_renewal_digest_line_shape() {
        let body = render_renewal_digest(&[due("Ana", Some("2024-07-27"))]);
        assert!(body.contains("1. Ana Doe – Contact: 555-0101 – Renewal Date: July 27, 2024"));
        assert!(body.starts_with("Dear Admin,"));
    }

    #[test]
    fn test_renewal_digest_missing_date_renders_na() {
        let body = render_renewal_digest(&[due("Ana", None)]);
        assert!(body.contains("Renewal Date: N/A"));
    }

    #[test]
    fn test_renewal_digest_numbering_follows_scan_order() {
        let body = render_renewal_digest(&[due("Ana", None), due("Bea", None)]);
        assert!(body.contains("1. Ana"));
        assert!(body.contains("2. Bea"));
    }

    #[test]
    fn test_working_leads_digest_truncates_at_blank_row() {
        let table = Table::new(
            "WorkingLeads",
            vec![
                Record::from_texts(&["Name", "Company"]),
                Record::from_texts(&["Ana", "Acme"]),
                Record::from_texts(&["", ""]),
                Record::from_texts(&["Bea", "Globex"]),
            ],
        );
        let body = render_working_leads_digest(&table);
        assert!(body.contains("1. Ana | Acme"));
        assert!(!body.contains("Bea"));
    }

    #[test]
    fn test_subjects_carry_formatted_date() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(renewal_digest_subject(today), "Daily Follow Up - June 15, 2024");
        assert_eq!(
            working_leads_subject(today),
            "Monthly Working Leads Summary - June 15, 2024"
        );
    }
}
