// tests/repository/sqlite_repository_test.rs
use tablemap::entity;
use tablemap::mapper::{ClassMapper, KeyType, MapResult, MappingRegistry};
use tablemap::{
    Dialect, EntityQuery, Key, Repository, SqlExecutor, SqliteExecutor, UnitOfWork, Value,
};
use uuid::Uuid;

entity! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Book {
        pub id: i64,
        pub title: String,
        pub author: String,
        pub pages: i32,
        pub rating: Option<f64>,
        pub is_del: bool,
    }
}

entity! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Tag {
        pub tag_id: Uuid,
        pub label: String,
    }
}

entity! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Loan {
        pub book_id: i64,
        pub member_no: String,
        pub days: i32,
    }
}

const SCHEMA: &str = "
CREATE TABLE books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author_name TEXT NOT NULL,
    pages INTEGER NOT NULL,
    rating REAL,
    is_del INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE Tag (tag_id TEXT PRIMARY KEY, label TEXT NOT NULL);
CREATE TABLE loans (
    book_id INTEGER NOT NULL,
    member_no TEXT NOT NULL,
    days INTEGER NOT NULL,
    PRIMARY KEY (book_id, member_no)
);
";

fn setup() -> (SqliteExecutor, MappingRegistry) {
    let executor = SqliteExecutor::open_in_memory().unwrap();
    executor.execute_batch(SCHEMA).unwrap();

    let registry = MappingRegistry::new();
    registry.register::<Book, _>(|m: &mut ClassMapper<Book>| -> MapResult<()> {
        m.table("books");
        m.map(Book::author)?.column("author_name")?;
        m.auto_map()?;
        Ok(())
    });
    registry.register::<Loan, _>(|m: &mut ClassMapper<Loan>| -> MapResult<()> {
        m.table("loans");
        m.map(Loan::book_id)?.key(KeyType::Assigned)?;
        m.map(Loan::member_no)?.key(KeyType::Assigned)?;
        m.auto_map()?;
        Ok(())
    });
    (executor, registry)
}

fn book(title: &str, author: &str, pages: i32) -> Book {
    Book {
        title: title.into(),
        author: author.into(),
        pages,
        ..Book::default()
    }
}

fn seed(repo: &Repository<'_, Book>) -> Vec<Key> {
    [
        book("Dune", "Herbert", 412),
        book("Emma", "Austen", 474),
        book("Ubik", "Dick", 202),
        book("Persuasion", "Austen", 249),
    ]
    .iter()
    .map(|b| repo.insert(b, &[]).unwrap().unwrap())
    .collect()
}

#[test]
fn test_insert_returns_identity_and_round_trips() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();

    let key = repo.insert(&book("Dune", "Herbert", 412), &[]).unwrap().unwrap();
    assert_eq!(key, Key::Simple(Value::Int(1)));

    let loaded = repo.get_by_key(key).unwrap().unwrap();
    assert_eq!(loaded.id, 1);
    assert_eq!(loaded.author, "Herbert");
    assert_eq!(loaded.rating, None);
    assert!(!loaded.is_del);
}

#[test]
fn test_soft_deleted_rows_are_hidden() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    seed(&repo);

    let flagged = repo
        .update_by_where(&Book::title.eq("Ubik"), &[(Book::is_del, Value::Bool(true))])
        .unwrap();
    assert_eq!(flagged, 1);

    assert_eq!(repo.count(None).unwrap(), 3);
    assert!(repo.get_by_key(3).unwrap().is_none());
    assert!(repo.get_single(&Book::title.eq("Ubik")).unwrap().is_none());
    let titles: Vec<_> = repo
        .query(None, &[])
        .unwrap()
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert!(!titles.contains(&"Ubik".to_string()));

    assert_eq!(
        repo.update_by_key_values(1, &[(Book::is_del, Value::Bool(true))])
            .unwrap(),
        1
    );
    assert!(repo.get_by_key(1).unwrap().is_none());
    assert_eq!(repo.count(None).unwrap(), 2);
}

#[test]
fn test_execute_scalar_over_mapped_table() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    seed(&repo);

    let austen = Book::author.eq("Austen");
    assert_eq!(
        repo.execute_scalar("SUM(pages)", Some(&austen)).unwrap(),
        Value::Int(723)
    );

    repo.update_by_where(&Book::title.eq("Persuasion"), &[(Book::is_del, Value::Bool(true))])
        .unwrap();
    assert_eq!(
        repo.execute_scalar("SUM(pages)", Some(&austen)).unwrap(),
        Value::Int(474)
    );
    assert_eq!(repo.execute_scalar("MAX(pages)", None).unwrap(), Value::Int(474));
}

#[test]
fn test_get_list_filters_and_orders() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    seed(&repo);

    let query = EntityQuery::new()
        .filter(Book::author.eq("Austen"))
        .ignore(Book::rating)
        .order_by_asc(Book::pages);
    let books = repo.get_list(&query).unwrap();
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Persuasion", "Emma"]);

    let single = repo.get_single(&Book::title.starts_with("Du")).unwrap().unwrap();
    assert_eq!(single.pages, 412);
    assert!(repo.get_single(&Book::title.eq("Missing")).unwrap().is_none());
}

#[test]
fn test_string_match_treats_wildcards_literally() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    repo.insert(&book("50% Off", "Ads", 10), &[]).unwrap();
    repo.insert(&book("500 Offers", "Ads", 20), &[]).unwrap();
    repo.insert(&book("my_book", "Ads", 30), &[]).unwrap();
    repo.insert(&book("myxbook", "Ads", 40), &[]).unwrap();

    let query = EntityQuery::new().filter(Book::title.contains("50%"));
    let found = repo.get_list(&query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "50% Off");

    let query = EntityQuery::new().filter(Book::title.starts_with("my_"));
    let found = repo.get_list(&query).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].pages, 30);
}

#[test]
fn test_paging() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    seed(&repo);

    let query = EntityQuery::new().order_by_desc(Book::pages);
    let page = repo.get_page(&query, 2, 3).unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.page_count(), 2);
    assert!(!page.has_next());
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].title, "Ubik");
}

#[test]
fn test_updates() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    seed(&repo);

    let mut dune = repo.get_by_key(1).unwrap().unwrap();
    dune.pages = 500;
    dune.title = "Dune (revised)".into();
    assert_eq!(repo.update(&dune, &[Book::pages]).unwrap(), 1);
    let reloaded = repo.get_by_key(1).unwrap().unwrap();
    assert_eq!(reloaded.pages, 500);
    assert_eq!(reloaded.title, "Dune");

    assert_eq!(repo.update_ignore(&dune, &[Book::pages]).unwrap(), 1);
    assert_eq!(repo.get_by_key(1).unwrap().unwrap().title, "Dune (revised)");

    assert_eq!(
        repo.update_by_key_values(2, &[(Book::rating, Value::Float(4.5))])
            .unwrap(),
        1
    );
    assert_eq!(repo.get_by_key(2).unwrap().unwrap().rating, Some(4.5));

    let changed = repo
        .update_by_where(&Book::author.eq("Austen"), &[(Book::pages, Value::Int(1))])
        .unwrap();
    assert_eq!(changed, 2);
}

#[test]
fn test_deletes() {
    let (executor, registry) = setup();
    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    seed(&repo);

    assert_eq!(repo.delete_by_key(1).unwrap(), 1);
    assert_eq!(repo.delete_by_key(1).unwrap(), 0);
    let emma = repo.get_by_key(2).unwrap().unwrap();
    assert_eq!(repo.delete(&emma).unwrap(), 1);
    assert_eq!(repo.delete_by_where(&Book::pages.lt(300)).unwrap(), 2);
    assert_eq!(repo.count(None).unwrap(), 0);
}

#[test]
fn test_guid_and_composite_keys() {
    let (executor, registry) = setup();

    let tags = Repository::<Tag>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    let tag = Tag {
        tag_id: Uuid::new_v4(),
        label: "classic".into(),
    };
    let key = tags.insert(&tag, &[]).unwrap().unwrap();
    assert_eq!(key.value_for("tag_id"), Some(&Value::Uuid(tag.tag_id)));
    assert_eq!(tags.get_by_key(tag.tag_id).unwrap(), Some(tag));

    let loans = Repository::<Loan>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    let loan = Loan {
        book_id: 7,
        member_no: "M-1".into(),
        days: 14,
    };
    loans.insert(&loan, &[]).unwrap();
    let key = Key::composite(&[("book_id", Value::Int(7)), ("member_no", Value::from("M-1"))]);
    assert_eq!(loans.get_by_key(key.clone()).unwrap(), Some(loan));
    assert_eq!(loans.delete_by_key(key).unwrap(), 1);
}

#[test]
fn test_unit_of_work_commit_and_rollback() {
    let (executor, registry) = setup();

    let uow = UnitOfWork::begin(&executor, &registry, Dialect::Sqlite).unwrap();
    let repo = uow.repository::<Book>().unwrap();
    repo.insert(&book("Dune", "Herbert", 412), &[]).unwrap();
    uow.save_changes().unwrap();
    assert!(!executor.in_transaction());

    let uow = UnitOfWork::begin(&executor, &registry, Dialect::Sqlite).unwrap();
    uow.repository::<Book>()
        .unwrap()
        .insert(&book("Emma", "Austen", 474), &[])
        .unwrap();
    uow.rollback().unwrap();

    {
        let uow = UnitOfWork::begin(&executor, &registry, Dialect::Sqlite).unwrap();
        uow.repository::<Book>()
            .unwrap()
            .insert(&book("Ubik", "Dick", 202), &[])
            .unwrap();
    }
    assert!(!executor.in_transaction());

    let repo = Repository::<Book>::new(&executor, &registry, Dialect::Sqlite).unwrap();
    assert_eq!(repo.count(None).unwrap(), 1);
}

#[test]
fn test_nested_begin_is_rejected() {
    let (executor, registry) = setup();
    let _uow = UnitOfWork::begin(&executor, &registry, Dialect::Sqlite).unwrap();
    assert!(UnitOfWork::begin(&executor, &registry, Dialect::Sqlite).is_err());
}
