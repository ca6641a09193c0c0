//! User and role entities of the demo service

use chrono::{DateTime, Utc};
use crudkit::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[serde(default)]
    pub id: i64,
    pub name: LocalizedText,
}

impl Role {
    pub fn display_name(&self) -> LocalizedText {
        self.name.clone()
    }
}

impl Entity for Role {
    fn type_name() -> &'static str {
        "Role"
    }

    fn resource_name() -> &'static str {
        "roles"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Role>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .field("Name", FieldKind::Localized, |r: &Role| r.name.clone().into())
                .build()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Admin,
    Staff,
    Customer,
}

impl UserType {
    pub const VARIANTS: &'static [&'static str] = &["Admin", "Staff", "Customer"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    /// Role name is filled in on read, clients only need to send the id
    #[serde(default)]
    pub role: Option<RelatedRef>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn role_slot(&mut self) -> &mut Option<RelatedRef> {
        &mut self.role
    }
}

impl Entity for User {
    fn type_name() -> &'static str {
        "User"
    }

    fn resource_name() -> &'static str {
        "users"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<User>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .field("FirstName", FieldKind::String, |u: &User| {
                    u.first_name.clone().into()
                })
                .field("LastName", FieldKind::String, |u: &User| {
                    u.last_name.clone().into()
                })
                // not stored, so excluded from free-text search
                .computed("Name", FieldKind::String, |u: &User| u.name().into())
                .field("UserType", FieldKind::Enum(UserType::VARIANTS), |u: &User| {
                    FieldValue::Enum(u.user_type as usize)
                })
                .optional("Role", FieldKind::Relation, |u: &User| u.role.clone().into())
                .field("CreatedAt", FieldKind::Timestamp, |u: &User| {
                    u.created_at.into()
                })
                .build()
        })
    }
}
