use csv::WriterBuilder;

use super::layout::{CellValue, MemberReport};
use super::RenderError;

const IMAGE_CELL: &str = "Photo";

/// Writes the report as CSV: a title block, then one block per section.
pub fn render_spreadsheet(report: &MemberReport) -> Result<Vec<u8>, RenderError> {
    let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());

    writer.write_record(["Member Dossier Report"])?;
    writer.write_record(["Member", report.member_name.as_str()])?;
    writer.write_record(["Category", report.selector_label])?;
    writer.write_record(["View", report.view.label()])?;
    writer.write_record(["Occupation", report.occupation.label()])?;
    let generated = report.generated_at.format("%d/%m/%Y %H:%M").to_string();
    writer.write_record(["Generated", generated.as_str()])?;

    for section in &report.sections {
        writer.write_record([""])?;
        writer.write_record([section.title])?;

        if !section.rows.is_empty() {
            writer.write_record(["S.No.", "Field", "Value"])?;
            for row in &section.rows {
                let value = match &row.value {
                    CellValue::Text(text) => text.as_str(),
                    CellValue::Missing => report.placeholder.as_str(),
                    CellValue::Image(_) => IMAGE_CELL,
                };
                let serial = row.serial.to_string();
                writer.write_record([serial.as_str(), row.label.as_str(), value])?;
            }
        }

        if !section.family_members.is_empty() {
            writer.write_record(["S.No.", "Name", "Membership No.", "Relation"])?;
            for member in &section.family_members {
                let serial = member.serial.to_string();
                writer.write_record([
                    serial.as_str(),
                    member.name.as_str(),
                    member.membership_no.as_str(),
                    member.relation.as_str(),
                ])?;
            }
        }
    }

    writer
        .into_inner()
        .map_err(|err| RenderError::Io(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::catalog::Category;
    use crate::dossier::occupation::OccupationType;
    use crate::dossier::projection::ViewType;
    use crate::report::layout::{FamilyMemberRow, ReportRow, ReportSection};
    use chrono::NaiveDate;

    fn report() -> MemberReport {
        MemberReport {
            member_name: "Smt. Kamla Devi".to_string(),
            selector: "personal",
            selector_label: "Personal Details",
            view: ViewType::All,
            occupation: OccupationType::Business,
            generated_at: NaiveDate::from_ymd_opt(2025, 1, 5)
                .expect("valid date")
                .and_hms_opt(16, 45, 0)
                .expect("valid time"),
            placeholder: "\u{2014}".to_string(),
            sections: vec![
                ReportSection {
                    category: Category::Personal,
                    title: Category::Personal.label(),
                    rows: vec![
                        ReportRow {
                            serial: 1,
                            path: "personalDetails.titleCombinedName",
                            label: "Name".to_string(),
                            value: CellValue::Text("Smt. Kamla Devi".to_string()),
                        },
                        ReportRow {
                            serial: 2,
                            path: "personalDetails.emailId",
                            label: "Email, Primary".to_string(),
                            value: CellValue::Missing,
                        },
                    ],
                    family_members: Vec::new(),
                },
                ReportSection {
                    category: Category::Documents,
                    title: Category::Documents.label(),
                    rows: vec![ReportRow {
                        serial: 1,
                        path: "documents.passportSize",
                        label: "Passport Size Photo".to_string(),
                        value: CellValue::Image("https://cdn.example.org/k.jpg".to_string()),
                    }],
                    family_members: Vec::new(),
                },
                ReportSection {
                    category: Category::Family,
                    title: Category::Family.label(),
                    rows: Vec::new(),
                    family_members: vec![FamilyMemberRow {
                        serial: 1,
                        name: "Ravi".to_string(),
                        membership_no: String::new(),
                        relation: "Son".to_string(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn sections_render_as_blocks_with_local_serials() {
        let bytes = render_spreadsheet(&report()).expect("csv renders");
        let text = String::from_utf8(bytes).expect("utf-8");

        assert!(text.starts_with("Member Dossier Report\n"));
        assert!(text.contains("Generated,05/01/2025 16:45\n"));
        assert!(text.contains("1,Name,Smt. Kamla Devi\n"));
        assert!(text.contains("2,\"Email, Primary\",\u{2014}\n"));
        assert!(text.contains("S.No.,Name,Membership No.,Relation\n1,Ravi,,Son\n"));
    }

    #[test]
    fn photo_cells_never_leak_urls() {
        let bytes = render_spreadsheet(&report()).expect("csv renders");
        let text = String::from_utf8(bytes).expect("utf-8");
        assert!(text.contains("1,Passport Size Photo,Photo\n"));
        assert!(!text.contains("cdn.example.org"));
    }
}
