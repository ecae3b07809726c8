use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::TeacherId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TeacherError {
    #[error("teacher name cannot be empty")]
    EmptyName,
}

/// A tutor who is assigned students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub contract_end_month: Option<String>,
    #[serde(default)]
    pub contract_termination_date: Option<NaiveDate>,
    #[serde(default)]
    pub class_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub police_check_date: Option<NaiveDate>,
    #[serde(default)]
    pub contract_date: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
}

impl Teacher {
    /// Creates a teacher.
    ///
    /// # Errors
    ///
    /// Returns `TeacherError::EmptyName` if name is empty or whitespace-only.
    pub fn new(
        id: TeacherId,
        name: impl Into<String>,
        major: impl Into<String>,
    ) -> Result<Self, TeacherError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TeacherError::EmptyName);
        }
        Ok(Self {
            id,
            name: name.trim().to_owned(),
            major: major.into().trim().to_owned(),
            contract_end_month: None,
            contract_termination_date: None,
            class_start_date: None,
            phone: None,
            police_check_date: None,
            contract_date: None,
            date_of_birth: None,
            address: None,
            email: None,
            bank_account: None,
        })
    }

    /// Sets the phone number with separators stripped.
    pub fn set_phone(&mut self, phone: Option<&str>) {
        self.phone = phone.map(normalize_phone).filter(|p| !p.is_empty());
    }
}

/// Strips dashes and whitespace from a phone number.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect()
}
