// tests/sql/generator_test.rs
use tablemap::entity;
use tablemap::mapper::{ClassMapper, KeyType, MapResult, MappingRegistry};
use tablemap::{Dialect, PropertyFilter, SqlGenerator};

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct Employee {
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        pub salary: f64,
        pub hired_on: String,
        pub badge: Option<String>,
        pub is_del: bool,
    }
}

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct Enrollment {
        pub student_id: i32,
        pub course_id: i32,
        pub grade: Option<String>,
    }
}

fn registry() -> MappingRegistry {
    let registry = MappingRegistry::new();
    registry.register::<Employee, _>(|m: &mut ClassMapper<Employee>| -> MapResult<()> {
        m.schema("hr").table("employees");
        m.map(Employee::first_name)?.column("given_name")?;
        m.map(Employee::hired_on)?.read_only()?;
        m.map(Employee::badge)?.ignore()?;
        m.auto_map()?;
        Ok(())
    });
    registry.register::<Enrollment, _>(|m: &mut ClassMapper<Enrollment>| -> MapResult<()> {
        m.table("enrollments");
        m.map(Enrollment::student_id)?.key(KeyType::Assigned)?;
        m.map(Enrollment::course_id)?.key(KeyType::Assigned)?;
        m.auto_map()?;
        Ok(())
    });
    registry
}

fn generator<E: tablemap::Entity>(dialect: Dialect) -> SqlGenerator {
    SqlGenerator::new(registry().get_mapping::<E>().unwrap(), dialect)
}

fn names(props: Vec<&tablemap::mapper::PropertyMapping>) -> Vec<&str> {
    props.into_iter().map(|p| p.name()).collect()
}

#[test]
fn test_qualified_table_per_dialect() {
    assert_eq!(
        generator::<Employee>(Dialect::TSql).table_name(None),
        "[hr].[employees]"
    );
    assert_eq!(
        generator::<Employee>(Dialect::Postgres).table_name(Some("e")),
        r#""hr"."employees" AS "e""#
    );
    assert_eq!(
        generator::<Employee>(Dialect::MySql).table_name(None),
        "`hr`.`employees`"
    );
    assert_eq!(
        generator::<Enrollment>(Dialect::Oracle).table_name(Some("en")),
        r#""enrollments" "en""#
    );
}

#[test]
fn test_renamed_column_is_aliased_in_select() {
    let g = generator::<Employee>(Dialect::TSql);
    assert_eq!(g.column_name("first_name", false, false).unwrap(), "[given_name]");
    assert_eq!(
        g.column_name("FIRST_NAME", false, true).unwrap(),
        "[given_name] AS [first_name]"
    );
    assert_eq!(g.column_name("salary", false, true).unwrap(), "[salary]");
    assert_eq!(
        g.column_name("salary", true, false).unwrap(),
        "[hr].[employees].[salary]"
    );
}

#[test]
fn test_select_set_excludes_ignored_and_delete_flag() {
    let g = generator::<Employee>(Dialect::Ansi);
    let selected = names(g.select_properties::<&str>(&[]).unwrap());
    assert_eq!(
        selected,
        ["first_name", "hired_on", "id", "last_name", "salary"]
    );
    assert!(!selected.contains(&"badge"));
    assert!(!selected.contains(&"is_del"));

    let without_salary = names(g.select_properties(&[Employee::salary]).unwrap());
    assert!(!without_salary.contains(&"salary"));
}

#[test]
fn test_insert_set_skips_identity_and_read_only() {
    let g = generator::<Employee>(Dialect::Ansi);
    assert_eq!(
        names(g.insert_properties::<&str>(&[]).unwrap()),
        ["first_name", "last_name", "salary"]
    );

    let assigned = generator::<Enrollment>(Dialect::Ansi);
    assert_eq!(
        names(assigned.insert_properties::<&str>(&[]).unwrap()),
        ["student_id", "course_id", "grade"]
    );
}

#[test]
fn test_update_set_never_includes_keys() {
    let g = generator::<Enrollment>(Dialect::Ansi);
    assert_eq!(names(g.update_properties(&PropertyFilter::All).unwrap()), ["grade"]);

    let e = generator::<Employee>(Dialect::Ansi);
    assert_eq!(
        names(
            e.update_properties(&PropertyFilter::include(&[Employee::salary, Employee::id]))
                .unwrap()
        ),
        ["salary"]
    );
    assert_eq!(
        names(
            e.update_properties(&PropertyFilter::exclude(&[Employee::salary]))
                .unwrap()
        ),
        ["first_name", "last_name"]
    );
}

#[test]
fn test_composite_keys_in_declaration_order() {
    let g = generator::<Enrollment>(Dialect::Ansi);
    assert_eq!(names(g.key_properties().unwrap()), ["student_id", "course_id"]);
}

#[test]
fn test_select_list_rendering() {
    let g = generator::<Employee>(Dialect::Sqlite);
    let list = g
        .select_list(&[Employee::hired_on, Employee::last_name])
        .unwrap()
        .serialize(Dialect::Sqlite);
    assert_eq!(list, r#""given_name" AS "first_name", "id", "salary""#);
}
