// tests/config/settings_test.rs
use std::env;
use std::fs;

use tablemap::config::{Settings, SettingsError};
use tablemap::entity;
use tablemap::mapper::{MappingOptions, MappingRegistry, TableNaming};
use tablemap::Dialect;

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct InvoiceLine {
        pub id: i64,
        pub amount: f64,
        pub deleted: String,
    }
}

const CONFIG: &str = r#"
[mapping]
delete_flag_property = "deleted"
delete_flag_string_value = "D"
table_naming = "plural_snake_case"

[providers]
"Devart.Data.PostgreSql" = "postgres"

[database]
provider = "Devart.Data.PostgreSql"
connection_string = "host=${TABLEMAP_IT_HOST};db=ledger"
"#;

#[test]
fn test_from_file_drives_registry_and_dialect() {
    env::set_var("TABLEMAP_IT_HOST", "db.internal");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tablemap.toml");
    fs::write(&path, CONFIG).unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.mapping.table_naming, TableNaming::PluralSnakeCase);
    assert_eq!(
        settings.database.connection_string,
        "host=${TABLEMAP_IT_HOST};db=ledger"
    );
    assert_eq!(
        settings.database.resolved_connection_string().unwrap(),
        "host=db.internal;db=ledger"
    );
    assert_eq!(settings.dialect().unwrap(), Dialect::Postgres);

    let registry =
        MappingRegistry::with_options(MappingOptions::default().with_conventions(settings.conventions()));
    let mapping = registry.get_mapping::<InvoiceLine>().unwrap();
    assert_eq!(mapping.table_name(), "invoice_lines");
    let flag = mapping.delete_flag_property().unwrap();
    assert_eq!(flag.name(), "deleted");
    assert_eq!(
        flag.delete_flag_true_value(),
        Some(&tablemap::Value::from("D"))
    );
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(matches!(
        Settings::from_file(&missing),
        Err(SettingsError::FileNotFound(path)) if path == missing
    ));
}

#[test]
fn test_invalid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[mapping\n").unwrap();
    assert!(matches!(
        Settings::from_file(&path),
        Err(SettingsError::ParseError(_))
    ));
}

#[test]
fn test_missing_env_var_is_reported_on_resolve() {
    let settings =
        Settings::parse("[database]\nconnection_string = \"${TABLEMAP_IT_UNSET_VAR}\"\n").unwrap();
    let err = settings.database.resolved_connection_string().unwrap_err();
    assert!(matches!(err, SettingsError::MissingEnvVar(name) if name == "TABLEMAP_IT_UNSET_VAR"));
}

#[test]
fn test_dollar_in_comment_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tablemap.toml");
    fs::write(
        &path,
        "# budget is $5 per month\n[database]\nprovider = \"sqlite\"\n",
    )
    .unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.dialect().unwrap(), Dialect::Sqlite);
}

#[test]
fn test_load_prefers_env_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "[database]\nprovider = \"mssql\"\n").unwrap();

    env::set_var("TABLEMAP_CONFIG", &path);
    let settings = Settings::load().unwrap();
    env::remove_var("TABLEMAP_CONFIG");

    assert_eq!(settings.dialect().unwrap(), Dialect::TSql);
    assert_eq!(settings.mapping.delete_flag_property, "Is_Del");
}

#[test]
fn test_defaults_when_sections_missing() {
    let settings = Settings::parse("").unwrap();
    assert_eq!(settings.database.provider, "sqlite");
    assert_eq!(settings.dialect().unwrap(), Dialect::Sqlite);
    assert_eq!(settings.mapping.table_naming, TableNaming::TypeName);
}
