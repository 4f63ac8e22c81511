use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRecord {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDepartment {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Partial update; only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DepartmentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl DepartmentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image.is_none()
    }

    pub fn apply(&self, department: &mut DepartmentRecord) {
        if let Some(name) = &self.name {
            department.name = name.clone();
        }
        if let Some(description) = &self.description {
            department.description = Some(description.clone());
        }
        if let Some(image) = &self.image {
            department.image = Some(image.clone());
        }
    }
}
