use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::isolation::{Ownership, RecordId, TenantId, TenantScoped};

/// The tenant itself. An organization row is visible only to sessions running as it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub created_on: NaiveDate,
}

impl Organization {
    pub fn new(id: TenantId, name: impl Into<String>, created_on: NaiveDate) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id,
            name,
            slug,
            created_on,
        }
    }
}

impl TenantScoped for Organization {
    const TABLE: &'static str = "organizations";

    fn record_id(&self) -> RecordId {
        RecordId(*self.id.as_uuid())
    }

    fn ownership(&self) -> Ownership {
        Ownership::Organization(Some(self.id))
    }
}

pub(crate) fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
