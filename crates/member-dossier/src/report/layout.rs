use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::dossier::catalog::{Category, FieldCatalog, FieldCatalogEntry, FieldKind};
use crate::dossier::format::{format_address, format_value};
use crate::dossier::missing::is_missing_value;
use crate::dossier::occupation::OccupationType;
use crate::dossier::projection::{field_missing, CategorySelector, FieldProjector, ViewType};
use crate::dossier::{path, virtual_fields};

/// Parallel family arrays, zipped by index into the members table.
pub const FAMILY_MEMBER_COLUMNS: [&str; 3] = [
    "familyDetails.familyMember",
    "familyDetails.familyMemberNo",
    "familyDetails.relationWithApplicant",
];

const MEMBER_NAME_PATH: &str = "personalDetails.titleCombinedName";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Cell text for missing values.
    pub placeholder: String,
    /// Member name used in headings and filenames when the record has none.
    pub unknown_label: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            placeholder: "\u{2014}".to_string(),
            unknown_label: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum CellValue {
    Text(String),
    Missing,
    Image(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub serial: usize,
    pub path: &'static str,
    pub label: String,
    pub value: CellValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyMemberRow {
    pub serial: usize,
    pub name: String,
    pub membership_no: String,
    pub relation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub category: Category,
    pub title: &'static str,
    pub rows: Vec<ReportRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub family_members: Vec<FamilyMemberRow>,
}

impl ReportSection {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.family_members.is_empty()
    }
}

/// Sections of one member's report, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberReport {
    pub member_name: String,
    pub selector: &'static str,
    pub selector_label: &'static str,
    pub view: ViewType,
    pub occupation: OccupationType,
    pub generated_at: NaiveDateTime,
    pub placeholder: String,
    pub sections: Vec<ReportSection>,
}

impl MemberReport {
    pub fn field_count(&self) -> usize {
        self.sections
            .iter()
            .map(|section| section.rows.len() + section.family_members.len())
            .sum()
    }
}

/// Turns a projection into report sections.
#[derive(Debug, Clone)]
pub struct ReportBuilder<'a> {
    projector: FieldProjector<'a>,
    options: ReportOptions,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(catalog: &'a FieldCatalog, options: ReportOptions) -> Self {
        Self {
            projector: FieldProjector::new(catalog),
            options,
        }
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn build(
        &self,
        record: &Value,
        selector: CategorySelector,
        view: ViewType,
        generated_at: NaiveDateTime,
    ) -> MemberReport {
        let entries = self.projector.project(record, selector, view);
        let sections = Category::ordered()
            .into_iter()
            .map(|category| {
                let in_category: Vec<&FieldCatalogEntry> = entries
                    .iter()
                    .copied()
                    .filter(|entry| entry.category == category)
                    .collect();
                self.section(record, category, view, &in_category)
            })
            .filter(|section| !section.is_empty())
            .collect();

        MemberReport {
            member_name: member_name(record, &self.options.unknown_label),
            selector: selector.key(),
            selector_label: selector.label(),
            view,
            occupation: OccupationType::detect(record),
            generated_at,
            placeholder: self.options.placeholder.clone(),
            sections,
        }
    }

    fn section(
        &self,
        record: &Value,
        category: Category,
        view: ViewType,
        entries: &[&FieldCatalogEntry],
    ) -> ReportSection {
        // A missing-fields report lists the empty family columns as plain rows;
        // the zipped table would only repeat filled values.
        let family_members = if category == Category::Family
            && view != ViewType::Missing
            && entries
                .iter()
                .any(|entry| FAMILY_MEMBER_COLUMNS.contains(&entry.path))
        {
            zip_family_members(record)
        } else {
            Vec::new()
        };

        let mut rows = Vec::new();
        for entry in entries {
            if !family_members.is_empty() && FAMILY_MEMBER_COLUMNS.contains(&entry.path) {
                continue;
            }
            for (label, value) in self.cells(record, entry) {
                rows.push(ReportRow {
                    serial: rows.len() + 1,
                    path: entry.path,
                    label,
                    value,
                });
            }
        }

        ReportSection {
            category,
            title: category.label(),
            rows,
            family_members,
        }
    }

    fn cells(&self, record: &Value, entry: &FieldCatalogEntry) -> Vec<(String, CellValue)> {
        let label = entry.label.to_string();

        if field_missing(record, entry.path) {
            return vec![(label, CellValue::Missing)];
        }

        if let Some(name) = virtual_fields::resolve(entry.path, record, &self.options.placeholder)
        {
            return vec![(label, CellValue::Text(name))];
        }

        let Some(value) = path::get(record, entry.path) else {
            return vec![(label, CellValue::Missing)];
        };

        match entry.kind {
            FieldKind::Image => {
                let cell = value
                    .as_str()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
                    .map(|url| CellValue::Image(url.to_string()))
                    .unwrap_or(CellValue::Missing);
                vec![(label, cell)]
            }
            FieldKind::Address => match value {
                Value::Array(addresses) => addresses
                    .iter()
                    .filter(|address| !is_missing_value(address))
                    .enumerate()
                    .map(|(index, address)| {
                        (
                            format!("{} {}", entry.label, index + 1),
                            CellValue::Text(format_address(address)),
                        )
                    })
                    .collect(),
                other => vec![(label, CellValue::Text(format_address(other)))],
            },
            FieldKind::Text => vec![(label, CellValue::Text(format_value(value)))],
        }
    }
}

/// Zips the parallel family arrays; short arrays contribute blank cells.
pub fn zip_family_members(record: &Value) -> Vec<FamilyMemberRow> {
    let [names, numbers, relations] = FAMILY_MEMBER_COLUMNS.map(|column| column_values(record, column));
    let len = names.len().max(numbers.len()).max(relations.len());

    (0..len)
        .map(|index| {
            (
                cell_at(&names, index),
                cell_at(&numbers, index),
                cell_at(&relations, index),
            )
        })
        .filter(|(name, number, relation)| {
            !(name.is_empty() && number.is_empty() && relation.is_empty())
        })
        .enumerate()
        .map(|(index, (name, membership_no, relation))| FamilyMemberRow {
            serial: index + 1,
            name,
            membership_no,
            relation,
        })
        .collect()
}

pub fn member_name(record: &Value, unknown_label: &str) -> String {
    virtual_fields::resolve(MEMBER_NAME_PATH, record, unknown_label)
        .unwrap_or_else(|| unknown_label.to_string())
}

fn cell_at(values: &[String], index: usize) -> String {
    values.get(index).cloned().unwrap_or_default()
}

fn column_values(record: &Value, column: &str) -> Vec<String> {
    match path::get(record, column) {
        Some(Value::Array(items)) => items.iter().map(format_value).collect(),
        Some(value) if !is_missing_value(value) => vec![format_value(value)],
        _ => Vec::new(),
    }
}
