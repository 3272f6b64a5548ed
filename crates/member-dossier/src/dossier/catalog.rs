use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::path::FieldPath;

/// Top-level partition of a member dossier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Personal,
    Address,
    Documents,
    Professional,
    Family,
    Bank,
    Guarantee,
    Loan,
    Reference,
    Nominee,
}

const CATEGORY_PREFIXES: [(&str, Category); 10] = [
    ("personalDetails", Category::Personal),
    ("addressDetails", Category::Address),
    ("documents", Category::Documents),
    ("professionalDetails", Category::Professional),
    ("familyDetails", Category::Family),
    ("bankDetails", Category::Bank),
    ("guaranteeDetails", Category::Guarantee),
    ("loanDetails", Category::Loan),
    ("referenceDetails", Category::Reference),
    ("nomineeDetails", Category::Nominee),
];

impl Category {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::Personal,
            Self::Address,
            Self::Documents,
            Self::Professional,
            Self::Family,
            Self::Bank,
            Self::Guarantee,
            Self::Loan,
            Self::Reference,
            Self::Nominee,
        ]
    }

    /// Record group key, also accepted as the category selector value.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Personal => "personalDetails",
            Self::Address => "addressDetails",
            Self::Documents => "documents",
            Self::Professional => "professionalDetails",
            Self::Family => "familyDetails",
            Self::Bank => "bankDetails",
            Self::Guarantee => "guaranteeDetails",
            Self::Loan => "loanDetails",
            Self::Reference => "referenceDetails",
            Self::Nominee => "nomineeDetails",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal Details",
            Self::Address => "Address Details",
            Self::Documents => "Documents",
            Self::Professional => "Professional Details",
            Self::Family => "Family Details",
            Self::Bank => "Bank Details",
            Self::Guarantee => "Guarantee Details",
            Self::Loan => "Loan Details",
            Self::Reference => "Reference Details",
            Self::Nominee => "Nominee Details",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        CATEGORY_PREFIXES
            .iter()
            .find(|(prefix, _)| prefix.eq_ignore_ascii_case(key))
            .map(|(_, category)| *category)
    }

    /// Category owning `path`, matched on the first path segment.
    pub fn for_path(path: &str) -> Option<Self> {
        let root = path.split('.').next()?;
        CATEGORY_PREFIXES
            .iter()
            .find(|(prefix, _)| *prefix == root)
            .map(|(_, category)| *category)
    }
}

/// How a catalogued value is laid out in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Image,
    Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldCatalogEntry {
    pub path: &'static str,
    pub label: &'static str,
    pub category: Category,
    pub kind: FieldKind,
}

impl FieldCatalogEntry {
    pub fn new(path: &'static str, label: &'static str, kind: FieldKind) -> Option<Self> {
        let category = Category::for_path(path)?;
        Some(Self {
            path,
            label,
            category,
            kind,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog path '{0}' is malformed")]
    MalformedPath(&'static str),
    #[error("catalog path '{0}' does not belong to a known category")]
    UnknownCategory(&'static str),
    #[error("catalog path '{0}' is declared more than once")]
    DuplicatePath(&'static str),
}

/// Ordered path → label table. Declaration order is the display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    entries: Vec<FieldCatalogEntry>,
}

impl FieldCatalog {
    pub fn from_fields(
        fields: &[(&'static str, &'static str, FieldKind)],
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(fields.len());
        let mut entries = Vec::with_capacity(fields.len());

        for &(path, label, kind) in fields {
            FieldPath::parse(path).map_err(|_| CatalogError::MalformedPath(path))?;
            if !seen.insert(path) {
                return Err(CatalogError::DuplicatePath(path));
            }
            let entry =
                FieldCatalogEntry::new(path, label, kind).ok_or(CatalogError::UnknownCategory(path))?;
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// The society's member dossier layout.
    pub fn standard() -> Self {
        let entries = STANDARD_FIELDS
            .iter()
            .filter_map(|&(path, label, kind)| FieldCatalogEntry::new(path, label, kind))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[FieldCatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, path: &str) -> Option<&FieldCatalogEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    pub fn label_for(&self, path: &str) -> Option<&'static str> {
        self.entry(path).map(|entry| entry.label)
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &FieldCatalogEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.category == category)
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

use FieldKind::{Address, Image, Text};

const STANDARD_FIELDS: &[(&str, &str, FieldKind)] = &[
    // Personal
    ("personalDetails.titleCombinedName", "Name of Member", Text),
    ("personalDetails.membershipNumber", "Membership No.", Text),
    ("personalDetails.membershipDate", "Membership Date", Text),
    ("personalDetails.amountInCredit", "Amount in Credit", Text),
    ("personalDetails.gender", "Gender", Text),
    ("personalDetails.dateOfBirth", "Date of Birth", Text),
    ("personalDetails.ageInYears", "Age (Years)", Text),
    ("personalDetails.birthPlace", "Place of Birth", Text),
    ("personalDetails.fatherCombinedName", "Father's Name", Text),
    ("personalDetails.motherCombinedName", "Mother's Name", Text),
    ("personalDetails.maritalStatus", "Marital Status", Text),
    ("personalDetails.nameOfSpouse", "Spouse's Name", Text),
    ("personalDetails.religion", "Religion", Text),
    ("personalDetails.caste", "Caste", Text),
    ("personalDetails.phoneNo1", "Primary Phone", Text),
    ("personalDetails.phoneNo2", "Secondary Phone", Text),
    ("personalDetails.alternatePhoneNo", "Alternate Phone", Text),
    ("personalDetails.whatsappNo", "WhatsApp No.", Text),
    ("personalDetails.emailId1", "Primary Email", Text),
    ("personalDetails.emailId2", "Secondary Email", Text),
    // Address
    ("addressDetails.permanentAddress", "Permanent Address", Address),
    ("addressDetails.currentResidentalAddress", "Current Residential Address", Address),
    ("addressDetails.previousCurrentAddress", "Previous Address", Address),
    ("addressDetails.residenceType", "Residence Type", Text),
    ("addressDetails.yearsAtCurrentAddress", "Years at Current Address", Text),
    // Documents
    ("documents.passportSize", "Passport Size Photo", Image),
    ("documents.signatureThumb", "Signature / Thumb Impression", Image),
    ("documents.panNo", "PAN No.", Text),
    ("documents.panNoPhoto", "PAN Card", Image),
    ("documents.aadhaarCardNo", "Aadhaar No.", Text),
    ("documents.aadhaarCardPhoto", "Aadhaar Card", Image),
    ("documents.rationCard", "Ration Card No.", Text),
    ("documents.rationCardPhoto", "Ration Card", Image),
    ("documents.drivingLicense", "Driving License No.", Text),
    ("documents.drivingLicensePhoto", "Driving License", Image),
    ("documents.voterIdNo", "Voter ID No.", Text),
    ("documents.voterIdPhoto", "Voter ID", Image),
    ("documents.passportNo", "Passport No.", Text),
    ("documents.passportNoPhoto", "Passport", Image),
    ("documents.bankPassbookPhoto", "Bank Passbook", Image),
    // Professional
    ("professionalDetails.qualification", "Qualification", Text),
    ("professionalDetails.occupation", "Occupation", Text),
    ("professionalDetails.degreeNumber", "Degree Number", Text),
    ("professionalDetails.serviceType", "Service Type", Text),
    ("professionalDetails.serviceDetails.fullNameOfCompany", "Employer Name", Text),
    ("professionalDetails.serviceDetails.addressOfCompany", "Employer Address", Text),
    ("professionalDetails.serviceDetails.monthlyIncome", "Monthly Income", Text),
    ("professionalDetails.serviceDetails.designation", "Designation", Text),
    ("professionalDetails.serviceDetails.dateOfJoining", "Date of Joining", Text),
    ("professionalDetails.serviceDetails.employeeCode", "Employee Code", Text),
    ("professionalDetails.serviceDetails.dateOfRetirement", "Date of Retirement", Text),
    ("professionalDetails.serviceDetails.officeNo", "Office Phone", Text),
    ("professionalDetails.businessDetails.fullNameOfCompany", "Business Name", Text),
    ("professionalDetails.businessDetails.addressOfCompany", "Business Address", Text),
    ("professionalDetails.businessDetails.businessStructure", "Business Structure", Text),
    ("professionalDetails.businessDetails.annualIncome", "Annual Income", Text),
    ("professionalDetails.businessDetails.gstNo", "GST No.", Text),
    ("professionalDetails.businessDetails.yearsInBusiness", "Years in Business", Text),
    // Family
    (
        "familyDetails.familyMembersMemberOfSociety",
        "Family Members in Society",
        Text,
    ),
    ("familyDetails.familyMember", "Family Member", Text),
    ("familyDetails.familyMemberNo", "Family Member Membership No.", Text),
    ("familyDetails.relationWithApplicant", "Relation with Applicant", Text),
    // Bank
    ("bankDetails", "Bank Accounts", Text),
    // Guarantee
    (
        "guaranteeDetails.whetherMemberHasGivenGuaranteeInOtherSociety",
        "Guarantee Given in Other Society",
        Text,
    ),
    ("guaranteeDetails.otherSociety", "Other Society Guarantees", Text),
    (
        "guaranteeDetails.whetherMemberHasGivenGuaranteeInOurSociety",
        "Guarantee Given in Our Society",
        Text,
    ),
    ("guaranteeDetails.ourSociety", "Our Society Guarantees", Text),
    // Loans and references stand alone
    ("loanDetails", "Loans", Text),
    ("referenceDetails", "References", Text),
    // Nominee
    ("nomineeDetails.nomineeName", "Nominee Name", Text),
    ("nomineeDetails.relationWithApplicant", "Nominee Relation", Text),
    ("nomineeDetails.nomineeDateOfBirth", "Nominee Date of Birth", Text),
    ("nomineeDetails.nomineeMobileNo", "Nominee Mobile No.", Text),
    ("nomineeDetails.introduceBy", "Introduced By", Text),
    ("nomineeDetails.memberShipNo", "Introducer Membership No.", Text),
];
