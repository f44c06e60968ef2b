//! Lookup tables and user profiles

use crate::error::ValidationError;
use crate::types::UserRole;
use crate::validate::{Validate, Validator};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of `master_work_units`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub jenis: Option<String>,
    #[serde(default)]
    pub kategori: Option<String>,
}

/// Request body for a work unit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkUnitDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jenis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kategori: Option<String>,
}

impl Validate for WorkUnitDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut v = Validator::new();
        v.require_text("name", self.name.as_deref())
            .require_text("code", self.code.as_deref());
        if let Some(code) = &self.code {
            if code.chars().any(char::is_whitespace) {
                v.reject("code", "must not contain whitespace");
            }
        }
        v.finish()
    }
}

/// Row of `master_risk_categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCategory {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Request body for a risk category
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskCategoryDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for RiskCategoryDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        Validator::new()
            .require_text("name", self.name.as_deref())
            .finish()
    }
}

/// Row of `user_profiles`; `id` equals the auth user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: UserRole,
    #[serde(default)]
    pub organization_id: Option<Uuid>,
}

/// Lookup by id, tolerant of absent and dangling references
#[must_use]
pub fn find_by_id<'a, T, F>(rows: &'a [T], id: Option<Uuid>, key: F) -> Option<&'a T>
where
    F: Fn(&T) -> Uuid,
{
    let id = id?;
    rows.iter().find(|r| key(r) == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_unit_code_must_be_compact() {
        let draft = WorkUnitDraft {
            name: Some("Instalasi Gawat Darurat".into()),
            code: Some("IG D".into()),
            ..Default::default()
        };
        assert!(draft.validate().unwrap_err().has_field("code"));
    }

    #[test]
    fn profile_role_decodes_from_snake_case() {
        let row = serde_json::json!({
            "id": Uuid::new_v4(),
            "email": "admin@rs.id",
            "role": "superadmin"
        });
        let p: UserProfile = serde_json::from_value(row).unwrap();
        assert_eq!(p.role, UserRole::Superadmin);
        assert!(p.organization_id.is_none());
    }

    #[test]
    fn find_by_id_handles_missing_ids() {
        let units = vec![WorkUnit {
            id: Uuid::new_v4(),
            name: "Farmasi".into(),
            code: "FAR".into(),
            jenis: None,
            kategori: None,
        }];
        assert!(find_by_id(&units, None, |u| u.id).is_none());
        assert!(find_by_id(&units, Some(Uuid::new_v4()), |u| u.id).is_none());
        assert_eq!(find_by_id(&units, Some(units[0].id), |u| u.id).unwrap().name, "Farmasi");
    }
}
