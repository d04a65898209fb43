// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Config Integration Tests
//!
//! Configuration text through to a seeded store.

use hrms_config::{ConfigFormat, ConfigLoader, StorageBackend};
use hrms_core::GrantRule;
use hrms_store::BootstrapSeeder;
use hrms_tests::prelude::*;

const MANAGER_YAML: &str = r#"
security:
  jwt:
    secret: integration-secret-0123456789abcdef
storage:
  backend: memory
seed:
  roles:
    - name: Admin
      rule: all
    - name: Manager
      rule:
        except: [Delete]
    - name: User
      rule:
        only: [View]
  default_role: User
"#;

fn loader() -> ConfigLoader {
    ConfigLoader::new().with_env_vars(false)
}

#[tokio::test]
async fn test_yaml_seed_drives_bootstrap() {
    let config = loader()
        .load_from_str(MANAGER_YAML, ConfigFormat::Yaml)
        .unwrap();
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.seed.roles.len(), 3);

    let store = StoreFixtures::memory();
    let catalog = CatalogFixtures::verbs();
    let report = BootstrapSeeder::new(store.clone(), catalog)
        .run(&config.seed)
        .await
        .unwrap();

    assert_eq!(report.roles_created, vec!["Admin", "Manager", "User"]);
    assert!(report.admin_created);
    let manager = store.roles.list_for_role("Manager").await.unwrap();
    assert_eq!(manager.to_strings(), vec!["Create", "Update", "View"]);
}

#[test]
fn test_toml_seed_rules() {
    let toml = r#"
[security.jwt]
secret = "integration-secret-0123456789abcdef"

[[seed.roles]]
name = "Admin"
rule = "all"

[[seed.roles]]
name = "User"
rule = { only = ["View"] }
"#;

    let config = loader().load_from_str(toml, ConfigFormat::Toml).unwrap();

    assert_eq!(config.seed.roles[0].rule, GrantRule::All);
    assert!(matches!(&config.seed.roles[1].rule, GrantRule::Only(list) if list.len() == 1));
    assert_eq!(config.seed.default_role, "User");
}

#[test]
fn test_missing_secret_is_rejected() {
    let err = loader()
        .load_from_str("storage:\n  backend: memory\n", ConfigFormat::Yaml)
        .unwrap_err();

    assert!(err.is_validation());
}

#[test]
fn test_default_role_must_be_baseline() {
    let json = r#"{
        "security": {"jwt": {"secret": "integration-secret-0123456789abcdef"}},
        "seed": {"roles": [{"name": "Admin", "rule": "all"}], "default_role": "Guest"}
    }"#;

    let err = loader().load_from_str(json, ConfigFormat::Json).unwrap_err();

    assert!(err.is_validation());
    assert!(err.to_string().contains("Guest"));
}
