use serde::Deserialize;

use shared_models::department::{DepartmentChanges, NewDepartment};
use shared_utils::TextFields;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepartmentRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Stored filename; the upload itself happens elsewhere.
    pub image: Option<String>,
}

impl TextFields for DepartmentRequest {
    const TEXT_FIELDS: &'static [&'static str] = &["name", "description", "image"];
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl DepartmentRequest {
    pub fn sanitized(self) -> Self {
        Self {
            name: non_blank(self.name),
            description: non_blank(self.description),
            image: non_blank(self.image),
        }
    }

    pub fn into_new(self) -> Option<NewDepartment> {
        Some(NewDepartment {
            name: self.name?,
            description: self.description,
            image: self.image,
        })
    }

    pub fn into_changes(self) -> DepartmentChanges {
        DepartmentChanges {
            name: self.name,
            description: self.description,
            image: self.image,
        }
    }
}
