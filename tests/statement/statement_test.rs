// tests/statement/statement_test.rs
use insta::assert_snapshot;
use tablemap::entity;
use tablemap::mapper::{ClassMapper, KeyType, MapResult, MappingRegistry};
use tablemap::statement::{StatementError, DELETE_FLAG_PARAM};
use tablemap::{
    Dialect, Key, OrderBy, PropertyFilter, StatementBuilder, StatementKind, Value,
};

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct Article {
        pub id: i64,
        pub title: String,
        pub body: String,
        pub views: i32,
        pub published_at: Option<String>,
        pub is_del: bool,
    }
}

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct OrderLine {
        pub order_id: i32,
        pub line_no: i32,
        pub sku: String,
        pub quantity: i32,
    }
}

fn registry() -> MappingRegistry {
    let registry = MappingRegistry::new();
    registry.register::<Article, _>(|m: &mut ClassMapper<Article>| -> MapResult<()> {
        m.table("articles");
        m.map(Article::published_at)?.read_only()?;
        m.auto_map()?;
        Ok(())
    });
    registry.register::<OrderLine, _>(|m: &mut ClassMapper<OrderLine>| -> MapResult<()> {
        m.table("order_lines");
        m.map(OrderLine::order_id)?.key(KeyType::Assigned)?;
        m.map(OrderLine::line_no)?.key(KeyType::Assigned)?;
        m.auto_map()?;
        Ok(())
    });
    registry
}

fn articles(dialect: Dialect) -> StatementBuilder<Article> {
    StatementBuilder::from_registry(&registry(), dialect).unwrap()
}

fn lines(dialect: Dialect) -> StatementBuilder<OrderLine> {
    StatementBuilder::from_registry(&registry(), dialect).unwrap()
}

fn article() -> Article {
    Article {
        id: 3,
        title: "Hello".into(),
        body: "World".into(),
        views: 10,
        published_at: None,
        is_del: false,
    }
}

#[test]
fn test_select_by_key_filters_soft_deleted_rows() {
    let s = articles(Dialect::TSql).select_by_key(&Key::from(3), &[]).unwrap();
    assert_snapshot!(s.sql, @"SELECT [published_at], [id], [title], [body], [views] FROM [articles] WHERE [id] = @p0 AND [is_del] <> @p_delete_flag");
    assert_eq!(s.kind, StatementKind::Select);
    let flag = s.parameters.last().unwrap();
    assert_eq!(flag.name, format!("@{DELETE_FLAG_PARAM}"));
    assert_eq!(flag.value, Value::Bool(true));
}

#[test]
fn test_select_by_where_with_exclusions() {
    let p = Article::views.gte(100) & Article::title.contains("rust");
    let s = articles(Dialect::Postgres)
        .select_by_where(Some(&p), &[Article::body, Article::published_at])
        .unwrap();
    assert_snapshot!(s.sql, @r#"SELECT "id", "title", "views" FROM "articles" WHERE "views" >= :p0 AND "title" LIKE :p1 ESCAPE '!' AND "is_del" <> :p_delete_flag"#);
    assert_eq!(s.parameters[0].value, Value::Int(100));
    assert_eq!(s.parameters[1].value, Value::from("%rust%"));
}

#[test]
fn test_composite_key_ands_in_key_order() {
    let key = Key::composite(&[("line_no", Value::Int(2)), ("order_id", Value::Int(5))]);
    let s = lines(Dialect::Sqlite).select_by_key(&key, &[]).unwrap();
    assert_snapshot!(s.sql, @r#"SELECT "order_id", "line_no", "sku", "quantity" FROM "order_lines" WHERE "order_id" = @p0 AND "line_no" = @p1"#);
    let values: Vec<_> = s.parameters.iter().map(|p| p.value.clone()).collect();
    assert_eq!(values, [Value::Int(5), Value::Int(2)]);
}

#[test]
fn test_insert_columns() {
    let s = articles(Dialect::MySql).insert(&article(), &[]).unwrap();
    assert_snapshot!(s.sql, @"INSERT INTO `articles` (`title`, `body`, `views`) VALUES (@p0, @p1, @p2)");
    assert!(s.returns_identity);
    assert_eq!(s.kind, StatementKind::Insert);

    let line = OrderLine {
        order_id: 5,
        line_no: 2,
        sku: "A-1".into(),
        quantity: 4,
    };
    let s = lines(Dialect::MySql).insert(&line, &[OrderLine::quantity]).unwrap();
    assert_snapshot!(s.sql, @"INSERT INTO `order_lines` (`order_id`, `line_no`, `sku`) VALUES (@p0, @p1, @p2)");
    assert!(!s.returns_identity);
}

#[test]
fn test_update_variants() {
    let b = articles(Dialect::Oracle);

    let s = b.update(&article(), &PropertyFilter::All).unwrap();
    assert_snapshot!(s.sql, @r#"UPDATE "articles" SET "title" = :p0, "body" = :p1, "views" = :p2 WHERE "id" = :p3"#);
    assert_eq!(s.parameters[3].value, Value::Int(3));

    let s = b
        .update(&article(), &PropertyFilter::include(&[Article::views]))
        .unwrap();
    assert_snapshot!(s.sql, @r#"UPDATE "articles" SET "views" = :p0 WHERE "id" = :p1"#);

    let s = b
        .update_by_key(&Key::from(9), &article(), &PropertyFilter::exclude(&[Article::body]))
        .unwrap();
    assert_snapshot!(s.sql, @r#"UPDATE "articles" SET "title" = :p0, "views" = :p1 WHERE "id" = :p2"#);
    assert_eq!(s.parameters[2].value, Value::Int(9));
}

#[test]
fn test_update_by_where_never_soft_filters() {
    let s = articles(Dialect::TSql)
        .update_by_where(
            &Article::views.lt(5),
            &[(Article::title, Value::from("stale"))],
        )
        .unwrap();
    assert_snapshot!(s.sql, @"UPDATE [articles] SET [title] = @p0 WHERE [views] < @p1");
    assert_eq!(s.kind, StatementKind::Update);
}

#[test]
fn test_update_rejects_read_only_assignment() {
    let err = articles(Dialect::TSql)
        .update_by_key_values(&Key::from(1), &[(Article::published_at, Value::Null)])
        .unwrap_err();
    assert!(matches!(err, StatementError::NotAssignable { ref property, .. } if property == "published_at"));
}

#[test]
fn test_deletes() {
    let b = lines(Dialect::TSql);
    let line = OrderLine {
        order_id: 5,
        line_no: 2,
        ..OrderLine::default()
    };
    let s = b.delete_entity(&line).unwrap();
    assert_snapshot!(s.sql, @"DELETE FROM [order_lines] WHERE [order_id] = @p0 AND [line_no] = @p1");

    let s = b.delete_by_where(&OrderLine::quantity.eq(0)).unwrap();
    assert_snapshot!(s.sql, @"DELETE FROM [order_lines] WHERE [quantity] = @p0");

    let s = articles(Dialect::TSql).delete_by_key(&Key::from(4)).unwrap();
    assert!(!s.sql.contains("is_del"));
}

#[test]
fn test_count_where() {
    let s = articles(Dialect::Sqlite)
        .count_where(Some(&Article::views.gt(0)))
        .unwrap();
    assert_snapshot!(s.sql, @r#"SELECT COUNT(*) FROM "articles" WHERE "views" > @p0 AND "is_del" <> @p_delete_flag"#);
    assert_eq!(s.kind, StatementKind::Count);

    let s = lines(Dialect::Sqlite).count_where(None).unwrap();
    assert_eq!(s.sql, r#"SELECT COUNT(*) FROM "order_lines""#);
}

#[test]
fn test_select_where_custom_list() {
    let s = articles(Dialect::Sqlite)
        .select_where("id, views * 2", Some(&Article::id.eq(1)))
        .unwrap();
    assert_snapshot!(s.sql, @r#"SELECT id, views * 2 FROM "articles" WHERE "id" = @p0 AND "is_del" <> @p_delete_flag"#);
    assert_eq!(s.kind, StatementKind::Select);

    let s = articles(Dialect::Oracle).select_where("COUNT(*)", None).unwrap();
    assert_snapshot!(s.sql, @r#"SELECT COUNT(*) FROM "articles" WHERE "is_del" <> :p_delete_flag"#);
}

#[test]
fn test_soft_delete_by_key_values() {
    let s = articles(Dialect::Sqlite)
        .update_by_key_values(&Key::from(3), &[(Article::is_del, Value::Bool(true))])
        .unwrap();
    assert_snapshot!(s.sql, @r#"UPDATE "articles" SET "is_del" = @p0 WHERE "id" = @p1"#);

    let err = articles(Dialect::Sqlite)
        .update_by_key_values(&Key::from(3), &[(Article::id, Value::Int(4))])
        .unwrap_err();
    assert!(matches!(err, StatementError::NotAssignable { .. }));
}

#[test]
fn test_paging() {
    let s = articles(Dialect::TSql)
        .select_page(None, &[Article::body], &[], 2, 25)
        .unwrap();
    assert_snapshot!(s.sql, @"SELECT [published_at], [id], [title], [views] FROM [articles] WHERE [is_del] <> @p_delete_flag ORDER BY [id] OFFSET 25 ROWS FETCH NEXT 25 ROWS ONLY");

    let s = articles(Dialect::Postgres)
        .select_page(
            Some(&Article::views.gt(1)),
            &[Article::body],
            &[OrderBy::desc(Article::views)],
            3,
            10,
        )
        .unwrap();
    assert_snapshot!(s.sql, @r#"SELECT "published_at", "id", "title", "views" FROM "articles" WHERE "views" > :p0 AND "is_del" <> :p_delete_flag ORDER BY "views" DESC LIMIT 10 OFFSET 20"#);
}

#[test]
fn test_entity_key() {
    let line = OrderLine {
        order_id: 5,
        line_no: 2,
        ..OrderLine::default()
    };
    let key = lines(Dialect::Ansi).entity_key(&line).unwrap();
    assert_eq!(key.to_string(), "{order_id: 5, line_no: 2}");
}
