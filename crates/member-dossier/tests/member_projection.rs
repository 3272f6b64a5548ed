use member_dossier::dossier::{
    format::format_value, is_missing, path, Category, CategorySelector, FieldCatalog,
    FieldProjector, OccupationType, ViewType,
};
use serde_json::{json, Value};
use std::collections::HashSet;

fn full_member() -> Value {
    json!({
        "personalDetails": {
            "title": "Mr",
            "nameOfMember": "John Doe",
            "fatherTitle": "Shri",
            "nameOfFather": "Ram Doe",
            "membershipNumber": "M-2041",
            "maritalStatus": "Married",
            "nameOfSpouse": "Jane Doe",
            "dateOfBirth": "1980-01-15",
            "phoneNo1": 9816000000u64,
            "emailId1": ""
        },
        "addressDetails": {
            "permanentAddress": {
                "flatHouseNo": "",
                "areaStreetSector": "",
                "city": "",
                "state": ""
            },
            "currentResidentalAddress": { "city": "Shimla", "state": "HP" }
        },
        "documents": {
            "passportSize": "https://cdn.example.org/photos/john.jpg",
            "panNo": "ABCDE1234F"
        },
        "professionalDetails": {
            "occupation": "Business",
            "qualification": "MBA",
            "serviceType": "",
            "inCaseOfBusiness": true,
            "businessDetails": {
                "fullNameOfCompany": "Doe & Sons",
                "gstNo": "02ABCDE1234F1Z5"
            },
            "serviceDetails": { "designation": "Manager" }
        },
        "familyDetails": {
            "familyMembersMemberOfSociety": false,
            "familyMember": ["Jane Doe"],
            "familyMemberNo": ["M-2042"],
            "relationWithApplicant": ["Wife"]
        },
        "loanDetails": [
            { "_id": "6650a1", "loanType": "Personal", "amount": "5000" }
        ],
        "nomineeDetails": { "nomineeName": "Jane Doe" }
    })
}

fn selectors() -> Vec<CategorySelector> {
    std::iter::once(CategorySelector::All)
        .chain(Category::ordered().into_iter().map(CategorySelector::Group))
        .collect()
}

#[test]
fn set_then_get_returns_the_written_value() {
    let record = full_member();
    let cases = [
        ("personalDetails.nameOfMember", json!("Johnny Doe")),
        ("addressDetails.permanentAddress.city", json!("Mandi")),
        ("guaranteeDetails.ourSociety", json!([{ "name": "Om" }])),
        ("nomineeDetails.nomineeMobileNo", json!(9999)),
    ];

    for (field, value) in cases {
        let updated = path::set(&record, field, value.clone()).expect("path is valid");
        assert_eq!(path::get(&updated, field), Some(&value), "{field}");
    }
}

#[test]
fn set_leaves_the_input_record_untouched() {
    let record = full_member();
    let snapshot = record.clone();
    let updated = path::set(&record, "personalDetails.title", json!("Dr")).expect("valid path");

    assert_eq!(record, snapshot);
    assert_ne!(updated, snapshot);
}

#[test]
fn projection_is_idempotent_and_catalog_ordered() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let record = full_member();
    let order: Vec<&str> = catalog.entries().iter().map(|entry| entry.path).collect();

    for selector in selectors() {
        for view in [ViewType::All, ViewType::Filled, ViewType::Missing] {
            let first = projector.project_paths(&record, selector, view);
            let second = projector.project_paths(&record, selector, view);
            assert_eq!(first, second);

            let unique: HashSet<_> = first.iter().collect();
            assert_eq!(unique.len(), first.len(), "duplicates in {selector:?}/{view:?}");

            let positions: Vec<usize> = first
                .iter()
                .map(|field| order.iter().position(|known| known == field).expect("catalogued"))
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }
}

#[test]
fn filled_and_missing_partition_all() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);

    for record in [full_member(), json!({}), json!({ "personalDetails": "corrupt" })] {
        for selector in selectors() {
            let all: HashSet<_> = projector
                .project_paths(&record, selector, ViewType::All)
                .into_iter()
                .collect();
            let filled: HashSet<_> = projector
                .project_paths(&record, selector, ViewType::Filled)
                .into_iter()
                .collect();
            let missing: HashSet<_> = projector
                .project_paths(&record, selector, ViewType::Missing)
                .into_iter()
                .collect();

            assert!(filled.is_disjoint(&missing));
            assert_eq!(filled.union(&missing).copied().collect::<HashSet<_>>(), all);
        }
    }
}

#[test]
fn spouse_name_follows_marital_status() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let spouse = "personalDetails.nameOfSpouse";

    let married = full_member();
    assert!(projector
        .project_paths(&married, CategorySelector::All, ViewType::All)
        .contains(&spouse));

    for status in ["Single", "widowed", ""] {
        let record = path::set(&married, "personalDetails.maritalStatus", json!(status))
            .expect("valid path");
        for view in [ViewType::All, ViewType::Filled, ViewType::Missing] {
            assert!(
                !projector
                    .project_paths(&record, CategorySelector::All, view)
                    .contains(&spouse),
                "status {status:?}, view {view:?}"
            );
        }
    }
}

#[test]
fn combined_member_name_is_filled() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let record = full_member();

    let filled = projector.project_paths(
        &record,
        CategorySelector::Group(Category::Personal),
        ViewType::Filled,
    );
    assert!(filled.contains(&"personalDetails.titleCombinedName"));

    let views = projector.field_views(
        &record,
        CategorySelector::Group(Category::Personal),
        ViewType::Filled,
        "\u{2014}",
    );
    let name = views
        .iter()
        .find(|view| view.path == "personalDetails.titleCombinedName")
        .expect("name projected");
    assert_eq!(name.display, "Mr John Doe");
}

#[test]
fn business_members_see_business_details_only() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let record = full_member();
    assert_eq!(OccupationType::detect(&record), OccupationType::Business);

    let professional = projector.project_paths(
        &record,
        CategorySelector::Group(Category::Professional),
        ViewType::All,
    );
    assert!(professional.contains(&"professionalDetails.qualification"));
    assert!(professional.contains(&"professionalDetails.businessDetails.gstNo"));
    assert!(!professional.contains(&"professionalDetails.serviceDetails.designation"));
}

#[test]
fn address_with_only_blank_components_is_missing() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let record = full_member();

    assert!(is_missing(path::get(&record, "addressDetails.permanentAddress")));
    let missing = projector.project_paths(
        &record,
        CategorySelector::Group(Category::Address),
        ViewType::Missing,
    );
    assert!(missing.contains(&"addressDetails.permanentAddress"));
    assert!(!missing.contains(&"addressDetails.currentResidentalAddress"));
}

#[test]
fn loan_entries_render_as_key_value_text() {
    let record = full_member();
    let loans = path::get(&record, "loanDetails").expect("loans present");
    assert_eq!(format_value(loans), "loanType: Personal; amount: 5000");
}

#[test]
fn false_and_zero_answers_count_as_filled() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let record = full_member();

    let filled = projector.project_paths(
        &record,
        CategorySelector::Group(Category::Family),
        ViewType::Filled,
    );
    assert!(filled.contains(&"familyDetails.familyMembersMemberOfSociety"));
}

#[test]
fn malformed_groups_degrade_to_missing() {
    let catalog = FieldCatalog::standard();
    let projector = FieldProjector::new(&catalog);
    let record = json!({ "personalDetails": "corrupt", "documents": [1, 2, 3] });

    let filled = projector.project_paths(&record, CategorySelector::All, ViewType::Filled);
    assert!(filled.is_empty());
    let missing = projector.project_paths(&record, CategorySelector::All, ViewType::Missing);
    assert!(missing.contains(&"documents.panNo"));
}
