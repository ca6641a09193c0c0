//! User/role API
//!
//! Run with an optional YAML configuration:
//!
//! ```text
//! cargo run --example main_service -- config.yaml
//! ```
//!
//! Users embed their role's name. It is resolved from the roles service when
//! the user list is loaded, and writes to a role evict cached user listings.

mod entities;

use crudkit::prelude::*;
use entities::{Role, User, UserType};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_yaml_file(&path)?,
        None => AppConfig::default(),
    };
    config.cache = config.cache.relate(Role::type_name(), User::type_name());

    let (roles, users) = seed_data();
    let addr = config.server.addr();

    println!("🚀 Starting user service on http://{}", addr);
    println!("\n📚 Routes:");
    for resource in [Role::resource_name(), User::resource_name()] {
        println!("    GET    /{}/{{id}}", resource);
        println!("    GET    /{}/All", resource);
        println!("    POST   /{}/Create", resource);
        println!("    PUT    /{}/Update", resource);
        println!("    DELETE /{}/Delete/{{id}}", resource);
    }
    println!("    GET    /health");
    println!("\n📝 Example:");
    println!(
        "   curl -H 'Accept-Language: en' 'http://{}/users/All?filters=[{{\"fieldName\":\"UserType\",\"operation\":\"eq\",\"value\":\"Staff\"}}]&orders=[{{\"fieldName\":\"Role\",\"direction\":1}}]'",
        addr
    );

    let builder = ServerBuilder::new(config);
    let roles = builder.service(InMemoryStore::with_items(roles));
    let users = builder
        .service(InMemoryStore::with_items(users))
        .include(Include::new(roles.clone(), User::role_slot, Role::display_name));

    builder
        .register_service(roles)
        .register_service(users)
        .serve()
        .await
}

fn seed_data() -> (Vec<Role>, Vec<User>) {
    let admin = Role {
        id: 1,
        name: LocalizedText::new().with("en", "Administrator").with("ar", "مدير"),
    };
    let support = Role {
        id: 2,
        name: LocalizedText::new().with("en", "Support").with("ar", "دعم"),
    };

    let user = |id, first: &str, last: &str, user_type, role: Option<&Role>| User {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        user_type,
        role: role.map(|r: &Role| RelatedRef::new(r.id)),
        created_at: Utc::now(),
    };

    let users = vec![
        user(1, "Amina", "Haddad", UserType::Admin, Some(&admin)),
        user(2, "Omar", "Khalil", UserType::Staff, Some(&support)),
        user(3, "Lina", "Saleh", UserType::Staff, Some(&support)),
        user(4, "Yusuf", "Nasser", UserType::Customer, None),
    ];

    (vec![admin, support], users)
}
