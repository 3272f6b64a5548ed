//! Field catalog and projection engine for member dossiers.
//!
//! Records are plain JSON documents as served by the member API. Everything in
//! this module is pure: lookups never fail on malformed sub-objects, they
//! simply report the field as missing.

pub mod catalog;
pub mod format;
pub mod missing;
pub mod occupation;
pub mod path;
pub mod projection;
pub mod virtual_fields;

pub use catalog::{Category, CatalogError, FieldCatalog, FieldCatalogEntry, FieldKind};
pub use missing::{is_missing, is_missing_value};
pub use occupation::{filter_fields_by_occupation, OccupationType};
pub use path::{FieldPath, PathError};
pub use projection::{
    field_missing, CategorySelector, FieldProjector, FieldView, SelectorRequest, ViewType,
};
pub use virtual_fields::VirtualFieldRule;
