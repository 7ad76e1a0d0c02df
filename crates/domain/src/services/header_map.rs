//! Spreadsheet header resolution.
//!
//! Upstream sheets name their columns inconsistently. A header resolves in
//! two tiers: an exact match against [`HEADER_PATTERNS`], then the first
//! pattern (in list order) that contains the header or is contained by it.

use std::collections::BTreeMap;

use crate::models::CanonicalField;

/// Known header spellings, in match priority order.
pub const HEADER_PATTERNS: &[(&str, CanonicalField)] = &[
    ("PERSONNEL_NO", CanonicalField::PersonnelNo),
    ("PRE HIRE ID", CanonicalField::PersonnelNo),
    ("PERSONNEL_NO/PRE HIRE ID", CanonicalField::PersonnelNo),
    ("PERSONNEL NO", CanonicalField::PersonnelNo),
    ("NAME", CanonicalField::Name),
    ("EMPLOYEE_PRIMARY_SKILL", CanonicalField::PrimarySkill),
    ("EMPLOYEE PRIMARY SKILL", CanonicalField::PrimarySkill),
    ("PRIMARY SKILL", CanonicalField::PrimarySkill),
    ("MANAGEMENT LEVEL", CanonicalField::ManagementLevel),
    ("MANAGEMENT_LEVEL", CanonicalField::ManagementLevel),
    ("HOME_LOC", CanonicalField::HomeLocation),
    ("HOME LOC", CanonicalField::HomeLocation),
    ("HOME LOCATION", CanonicalField::HomeLocation),
    ("CURRENT_LOCK_STATUS", CanonicalField::LockStatus),
    ("CURRENT LOCK STATUS", CanonicalField::LockStatus),
    ("LOCK STATUS", CanonicalField::LockStatus),
    ("ROLL_OFF_DATE", CanonicalField::AvailabilityStatus),
    ("ROLL OFF DATE", CanonicalField::AvailabilityStatus),
    ("ROLLOFF DATE", CanonicalField::AvailabilityStatus),
    ("E_MAIL_ADDRESS", CanonicalField::Email),
    ("E MAIL ADDRESS", CanonicalField::Email),
    ("EMAIL", CanonicalField::Email),
    ("EMAIL ADDRESS", CanonicalField::Email),
    ("CONTACT_DETAILS", CanonicalField::ContactDetails),
    ("CONTACT DETAILS", CanonicalField::ContactDetails),
    ("CONTACT", CanonicalField::ContactDetails),
    ("PHONE", CanonicalField::ContactDetails),
    ("JOINING DATE", CanonicalField::JoiningDate),
    ("JOINING DATE (BENCH/JOINERS)", CanonicalField::JoiningDate),
    ("JOINING_DATE", CanonicalField::JoiningDate),
];

/// Resolves one raw header cell. Blank headers never resolve.
pub fn resolve_header(raw: &str) -> Option<CanonicalField> {
    let normalized = raw.trim().to_uppercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some((_, field)) = HEADER_PATTERNS.iter().find(|(p, _)| *p == normalized) {
        return Some(*field);
    }

    HEADER_PATTERNS
        .iter()
        .find(|(p, _)| normalized.contains(p) || p.contains(normalized.as_str()))
        .map(|(_, field)| *field)
}

/// Column index to field for every resolvable header.
pub fn resolve_columns<I, S>(headers: I) -> BTreeMap<usize, CanonicalField>
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    headers
        .into_iter()
        .enumerate()
        .filter_map(|(idx, header)| {
            header
                .and_then(|h| resolve_header(h.as_ref()))
                .map(|field| (idx, field))
        })
        .collect()
}
