use serde::{Deserialize, Serialize};

use licensedesk_core::{DomainError, DomainResult, Entity, LicenseId, UserId};

use crate::license::License;
use crate::status::LicenseStatus;

/// Snapshot of a license as it looked when it was assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Referenced license id.
    pub id: LicenseId,
    pub name: String,
    pub status: LicenseStatus,
}

impl Assignment {
    pub fn snapshot(license: &License) -> Self {
        Self {
            id: license.id.clone(),
            name: license.name.clone(),
            status: license.status(),
        }
    }
}

/// A person who can hold license seats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    assigned_licenses: Vec<Assignment>,
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEdit {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl User {
    pub fn create(id: UserId, input: NewUser) -> DomainResult<Self> {
        let user = Self {
            id,
            name: input.name.trim().to_string(),
            email: normalize_email(&input.email),
            department: input.department.trim().to_string(),
            assigned_licenses: Vec::new(),
        };
        user.validate()?;
        Ok(user)
    }

    pub(crate) fn with_assignments(mut self, assignments: Vec<Assignment>) -> Self {
        self.assigned_licenses = assignments;
        self
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        if self.department.is_empty() {
            return Err(DomainError::validation("department cannot be empty"));
        }
        Ok(())
    }

    pub fn apply_edit(&mut self, edit: UserEdit) -> DomainResult<()> {
        let mut next = self.clone();
        if let Some(name) = edit.name {
            next.name = name.trim().to_string();
        }
        if let Some(email) = edit.email {
            next.email = normalize_email(&email);
        }
        if let Some(department) = edit.department {
            next.department = department.trim().to_string();
        }
        next.validate()?;
        *self = next;
        Ok(())
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assigned_licenses
    }

    pub fn holds(&self, license_id: &LicenseId) -> bool {
        self.assigned_licenses.iter().any(|a| &a.id == license_id)
    }

    /// Replace the assignment list wholesale.
    pub fn replace_assignments(&mut self, assignments: Vec<Assignment>) {
        self.assigned_licenses = assignments;
    }

    /// Drop every assignment of `license_id`; returns whether anything changed.
    pub fn release(&mut self, license_id: &LicenseId) -> bool {
        let before = self.assigned_licenses.len();
        self.assigned_licenses.retain(|a| &a.id != license_id);
        self.assigned_licenses.len() != before
    }
}
