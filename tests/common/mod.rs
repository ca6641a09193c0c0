//! Shared fixtures for integration tests
//!
//! Provides `Person` (a field of every kind), and `Role`/`User` (a relation
//! whose display name is localized), plus sample data.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};

use crudkit::cache::CacheProvider;
use crudkit::config::CacheConfig;
use crudkit::core::entity::Entity;
use crudkit::core::field::{FieldKind, FieldValue, RelatedRef, Schema};
use crudkit::core::localized::LocalizedText;

// ---------------------------------------------------------------------------
// Person
// ---------------------------------------------------------------------------

pub const STATUSES: &[&str] = &["Active", "Suspended", "Retired"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub nickname: Option<String>,
    pub birth_date: Option<NaiveDate>,
    /// Index into [`STATUSES`]
    pub status: usize,
    pub role: Option<RelatedRef>,
    pub tag_ids: Vec<i64>,
    pub bio: LocalizedText,
}

impl Entity for Person {
    fn type_name() -> &'static str {
        "Person"
    }

    fn resource_name() -> &'static str {
        "people"
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn schema() -> &'static Schema<Self> {
        static SCHEMA: OnceLock<Schema<Person>> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::builder()
                .field("Name", FieldKind::String, |p: &Person| p.name.clone().into())
                .field("Age", FieldKind::Integer, |p: &Person| p.age.into())
                .optional("Nickname", FieldKind::String, |p: &Person| {
                    p.nickname.clone().into()
                })
                .optional("BirthDate", FieldKind::Date, |p: &Person| p.birth_date.into())
                .field("Status", FieldKind::Enum(STATUSES), |p: &Person| {
                    FieldValue::Enum(p.status)
                })
                .optional("Role", FieldKind::Relation, |p: &Person| {
                    p.role.clone().into()
                })
                .field("Tags", FieldKind::Collection, |p: &Person| {
                    p.tag_ids.clone().into()
                })
                .field("Bio", FieldKind::Localized, |p: &Person| p.bio.clone().into())
                .build()
        })
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn person(id: i64, name: &str, age: i64) -> Person {
    Person {
        id,
        name: name.to_string(),
        age,
        nickname: None,
        birth_date: None,
        status: 0,
        role: None,
        tag_ids: Vec::new(),
        bio: LocalizedText::new(),
    }
}

pub fn admin_ref() -> RelatedRef {
    RelatedRef {
        id: 1,
        name: LocalizedText::new().with("en", "Admin").with("ar", "مدير"),
    }
}

pub fn editor_ref() -> RelatedRef {
    RelatedRef {
        id: 2,
        name: LocalizedText::new().with("en", "Editor").with("ar", "محرر"),
    }
}

/// Eight people covering nulls, duplicates and every field kind
pub fn sample_people() -> Vec<Person> {
    vec![
        Person {
            nickname: Some("Ally".to_string()),
            birth_date: Some(date(1994, 3, 14)),
            role: Some(admin_ref()),
            tag_ids: vec![1, 2],
            bio: LocalizedText::new().with("en", "Gardener").with("ar", "بستاني"),
            ..person(1, "Alice", 30)
        },
        Person {
            birth_date: Some(date(2007, 8, 1)),
            status: 1,
            role: Some(editor_ref()),
            tag_ids: vec![3],
            ..person(2, "Bob", 17)
        },
        Person {
            nickname: Some("Caz".to_string()),
            birth_date: Some(date(1980, 1, 1)),
            status: 2,
            tag_ids: vec![2, 3],
            bio: LocalizedText::new().with("en", "Retired pilot"),
            ..person(3, "Carol", 44)
        },
        Person {
            birth_date: Some(date(1994, 3, 14)),
            role: Some(editor_ref()),
            ..person(4, "Dave", 30)
        },
        Person {
            nickname: Some("Eve".to_string()),
            role: Some(admin_ref()),
            tag_ids: vec![1],
            ..person(5, "Eve", 52)
        },
        Person {
            birth_date: Some(date(2001, 12, 31)),
            status: 1,
            ..person(6, "Frank", 23)
        },
        Person {
            nickname: Some("Gigi".to_string()),
            birth_date: Some(date(1999, 6, 5)),
            role: Some(editor_ref()),
            tag_ids: vec![4],
            bio: LocalizedText::new().with("ar", "مهندسة"),
            ..person(7, "Grace", 25)
        },
        Person {
            birth_date: Some(date(1965, 10, 20)),
            status: 2,
            ..person(8, "Heidi", 59)
        },
    ]
}

pub fn ids(items: &[Person]) -> Vec<i64> {
    items.iter().map(|p| p.id).collect()
}

// ---------------------------------------------------------------------------
// Role / User
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: i64,
    pub name: LocalizedText,
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<RelatedRef>,
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
                .computed("Name", FieldKind::String, |u: &User| {
                    format!("{} {}", u.first_name, u.last_name).into()
                })
                .optional("Role", FieldKind::Relation, |u: &User| {
                    u.role.clone().into()
                })
                .build()
        })
    }
}

pub fn sample_roles() -> Vec<Role> {
    vec![
        Role {
            id: 1,
            name: admin_ref().name,
        },
        Role {
            id: 2,
            name: editor_ref().name,
        },
    ]
}

pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            first_name: "Amina".to_string(),
            last_name: "Haddad".to_string(),
            role: Some(admin_ref()),
        },
        User {
            id: 2,
            first_name: "Omar".to_string(),
            last_name: "Khalil".to_string(),
            role: Some(editor_ref()),
        },
        User {
            id: 3,
            first_name: "Lina".to_string(),
            last_name: "Saleh".to_string(),
            role: None,
        },
    ]
}

pub fn user_role(user: &mut User) -> &mut Option<RelatedRef> {
    &mut user.role
}

pub fn role_name(role: &Role) -> LocalizedText {
    role.name.clone()
}

/// Cache where writes to roles also evict user entries
pub fn role_user_cache() -> Arc<CacheProvider> {
    Arc::new(CacheProvider::new(
        CacheConfig::default().relate("Role", "User"),
    ))
}
