use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::catalog::{Category, FieldCatalog, FieldCatalogEntry};
use super::format::format_value;
use super::missing::is_missing;
use super::occupation::{filter_fields_by_occupation, OccupationType};
use super::path;
use super::virtual_fields;

pub const SPOUSE_NAME_PATH: &str = "personalDetails.nameOfSpouse";
const MARITAL_STATUS_PATH: &str = "personalDetails.maritalStatus";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewType {
    #[default]
    All,
    Filled,
    Missing,
}

impl ViewType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "filled" => Some(Self::Filled),
            "missing" => Some(Self::Missing),
            _ => None,
        }
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Filled => "filled",
            Self::Missing => "missing",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Fields",
            Self::Filled => "Filled Fields",
            Self::Missing => "Missing Fields",
        }
    }

    fn admits(self, missing: bool) -> bool {
        match self {
            Self::All => true,
            Self::Filled => !missing,
            Self::Missing => missing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategorySelector {
    #[default]
    All,
    Group(Category),
}

impl CategorySelector {
    pub const fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Group(category) => category.key(),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All Categories",
            Self::Group(category) => category.label(),
        }
    }
}

/// A selector string as sent by existing clients: `"all"`, `"filled"`,
/// `"missing"`, or a group key. The two view words select every category and
/// force the corresponding view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorRequest {
    pub selector: CategorySelector,
    pub view_override: Option<ViewType>,
}

impl SelectorRequest {
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some(view) = ViewType::parse(raw) {
            let view_override = (view != ViewType::All).then_some(view);
            return Some(Self {
                selector: CategorySelector::All,
                view_override,
            });
        }

        Category::from_key(raw).map(|category| Self {
            selector: CategorySelector::Group(category),
            view_override: None,
        })
    }

    /// View to apply when the caller also asked for `requested`.
    pub fn effective_view(&self, requested: ViewType) -> ViewType {
        self.view_override.unwrap_or(requested)
    }
}

/// One projected field, ready for screen display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub path: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub value: Value,
    pub display: String,
    pub is_missing: bool,
}

/// Selects catalog fields for a record by category and view type.
#[derive(Debug, Clone, Copy)]
pub struct FieldProjector<'a> {
    catalog: &'a FieldCatalog,
}

impl<'a> FieldProjector<'a> {
    pub fn new(catalog: &'a FieldCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a FieldCatalog {
        self.catalog
    }

    /// Ordered catalog entries to show or export for `record`.
    pub fn project(
        &self,
        record: &Value,
        selector: CategorySelector,
        view: ViewType,
    ) -> Vec<&'a FieldCatalogEntry> {
        let married = is_married(record);
        let selected = self
            .catalog
            .entries()
            .iter()
            .filter(|entry| married || entry.path != SPOUSE_NAME_PATH)
            .filter(|entry| match selector {
                CategorySelector::All => true,
                CategorySelector::Group(category) => Category::for_path(entry.path) == Some(category),
            })
            .filter(|entry| view.admits(field_missing(record, entry.path)))
            .collect();

        filter_fields_by_occupation(selected, OccupationType::detect(record))
    }

    pub fn project_paths(
        &self,
        record: &Value,
        selector: CategorySelector,
        view: ViewType,
    ) -> Vec<&'static str> {
        self.project(record, selector, view)
            .into_iter()
            .map(|entry| entry.path)
            .collect()
    }

    pub fn field_views(
        &self,
        record: &Value,
        selector: CategorySelector,
        view: ViewType,
        placeholder: &str,
    ) -> Vec<FieldView> {
        self.project(record, selector, view)
            .into_iter()
            .map(|entry| {
                let value = virtual_fields::lookup(record, entry.path).unwrap_or(Value::Null);
                let is_missing = is_missing(Some(&value));
                let display = if is_missing {
                    placeholder.to_string()
                } else {
                    format_value(&value)
                };
                FieldView {
                    path: entry.path,
                    label: entry.label,
                    category: entry.category,
                    value,
                    display,
                    is_missing,
                }
            })
            .collect()
    }
}

/// Missingness of a catalogued path, consulting virtual fields first.
pub fn field_missing(record: &Value, field: &str) -> bool {
    match virtual_fields::rule_for(field) {
        Some(rule) => rule.combine(record).is_empty(),
        None => is_missing(path::get(record, field)),
    }
}

fn is_married(record: &Value) -> bool {
    path::get(record, MARITAL_STATUS_PATH)
        .and_then(Value::as_str)
        .map(|status| status.trim().eq_ignore_ascii_case("married"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dossier::catalog::FieldKind;
    use serde_json::json;

    fn small_catalog() -> FieldCatalog {
        FieldCatalog::from_fields(&[
            ("personalDetails.titleCombinedName", "Name", FieldKind::Text),
            ("personalDetails.maritalStatus", "Marital Status", FieldKind::Text),
            ("personalDetails.nameOfSpouse", "Spouse", FieldKind::Text),
            ("professionalDetails.qualification", "Qualification", FieldKind::Text),
            (
                "professionalDetails.serviceDetails.designation",
                "Designation",
                FieldKind::Text,
            ),
            (
                "professionalDetails.businessDetails.gstNo",
                "GST No.",
                FieldKind::Text,
            ),
            ("loanDetails", "Loans", FieldKind::Text),
        ])
        .expect("valid catalog")
    }

    fn record() -> Value {
        json!({
            "personalDetails": {
                "title": "Mrs",
                "nameOfMember": "Kiran Bala",
                "maritalStatus": "MARRIED",
                "nameOfSpouse": ""
            },
            "professionalDetails": {
                "qualification": "B.Com",
                "inCaseOfServiceGovt": true,
                "serviceDetails": { "designation": "Clerk" }
            },
            "loanDetails": []
        })
    }

    #[test]
    fn projects_in_catalog_order_with_substituted_catalog() {
        let catalog = small_catalog();
        let projector = FieldProjector::new(&catalog);
        assert_eq!(
            projector.project_paths(&record(), CategorySelector::All, ViewType::All),
            vec![
                "personalDetails.titleCombinedName",
                "personalDetails.maritalStatus",
                "personalDetails.nameOfSpouse",
                "professionalDetails.qualification",
                "professionalDetails.serviceDetails.designation",
                "loanDetails",
            ]
        );
    }

    #[test]
    fn view_type_filters_on_missingness() {
        let catalog = small_catalog();
        let projector = FieldProjector::new(&catalog);
        assert_eq!(
            projector.project_paths(&record(), CategorySelector::All, ViewType::Missing),
            vec!["personalDetails.nameOfSpouse", "loanDetails"]
        );
        assert!(!projector
            .project_paths(&record(), CategorySelector::All, ViewType::Filled)
            .contains(&"loanDetails"));
    }

    #[test]
    fn group_selector_limits_to_category() {
        let catalog = small_catalog();
        let projector = FieldProjector::new(&catalog);
        assert_eq!(
            projector.project_paths(
                &record(),
                CategorySelector::Group(Category::Professional),
                ViewType::Filled
            ),
            vec![
                "professionalDetails.qualification",
                "professionalDetails.serviceDetails.designation",
            ]
        );
    }

    #[test]
    fn spouse_name_requires_married_status() {
        let catalog = small_catalog();
        let projector = FieldProjector::new(&catalog);
        let single = path::set(&record(), "personalDetails.maritalStatus", json!("Single"))
            .expect("valid path");
        assert!(!projector
            .project_paths(&single, CategorySelector::All, ViewType::All)
            .contains(&SPOUSE_NAME_PATH));
    }

    #[test]
    fn field_views_carry_display_values() {
        let catalog = small_catalog();
        let projector = FieldProjector::new(&catalog);
        let views = projector.field_views(
            &record(),
            CategorySelector::Group(Category::Personal),
            ViewType::All,
            "—",
        );

        assert_eq!(views[0].display, "Mrs Kiran Bala");
        assert!(!views[0].is_missing);
        let spouse = views
            .iter()
            .find(|view| view.path == SPOUSE_NAME_PATH)
            .expect("spouse row");
        assert!(spouse.is_missing);
        assert_eq!(spouse.display, "—");
    }

    #[test]
    fn legacy_selector_strings() {
        let filled = SelectorRequest::parse("filled").expect("view word");
        assert_eq!(filled.selector, CategorySelector::All);
        assert_eq!(filled.effective_view(ViewType::All), ViewType::Filled);

        let all = SelectorRequest::parse("ALL").expect("all");
        assert_eq!(all.effective_view(ViewType::Missing), ViewType::Missing);

        let group = SelectorRequest::parse("nomineeDetails").expect("group");
        assert_eq!(group.selector, CategorySelector::Group(Category::Nominee));

        assert!(SelectorRequest::parse("salary").is_none());
    }
}
