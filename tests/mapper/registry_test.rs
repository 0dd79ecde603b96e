// tests/mapper/registry_test.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread;

use tablemap::entity;
use tablemap::mapper::{
    ClassMap, ClassMapper, DefaultMapper, KeyType, MapResult, MappingBuilder, MappingCatalog,
    MappingConventions, MappingOptions, MappingRegistry, TableNaming,
};

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct Supplier {
        pub id: i32,
        pub name: String,
        pub is_del: bool,
    }
}

entity! {
    #[derive(Debug, Clone, Default)]
    pub struct StockItem {
        pub sku: String,
        pub on_hand: i32,
    }
}

struct StockItemMap;

impl ClassMap<StockItem> for StockItemMap {
    fn configure(&self, mapper: &mut ClassMapper<StockItem>) -> MapResult<()> {
        mapper.schema("inventory").table("stock");
        mapper.map(StockItem::sku)?.key(KeyType::Assigned)?;
        mapper.auto_map()?;
        Ok(())
    }
}

struct UpperCaseTables;

impl DefaultMapper for UpperCaseTables {
    fn configure(&self, builder: &mut MappingBuilder) -> MapResult<()> {
        let table = builder.entity_name().to_uppercase();
        builder.table(table);
        builder.auto_map()?;
        Ok(())
    }
}

#[test]
fn test_mapping_is_cached_per_type() {
    let registry = MappingRegistry::new();
    assert!(!registry.is_cached::<Supplier>());

    let first = registry.get_mapping::<Supplier>().unwrap();
    let second = registry.get_mapping::<Supplier>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(registry.is_cached::<Supplier>());
    assert_eq!(registry.cached_len(), 1);
}

#[test]
fn test_invalidate_rebuilds() {
    let registry = MappingRegistry::new();
    let first = registry.get_mapping::<Supplier>().unwrap();
    registry.invalidate();
    assert_eq!(registry.cached_len(), 0);
    let rebuilt = registry.get_mapping::<Supplier>().unwrap();
    assert!(!Arc::ptr_eq(&first, &rebuilt));
    assert_eq!(first.table_name(), rebuilt.table_name());
}

#[test]
fn test_registered_map_takes_precedence() {
    let registry = MappingRegistry::new();
    registry.register::<StockItem, _>(StockItemMap);

    let mapping = registry.get_mapping::<StockItem>().unwrap();
    assert_eq!(mapping.schema_name(), Some("inventory"));
    assert_eq!(mapping.table_name(), "stock");
    let keys: Vec<_> = mapping.key_properties().map(|p| p.name()).collect();
    assert_eq!(keys, ["sku"]);
}

#[test]
fn test_register_invalidates_cache() {
    let registry = MappingRegistry::new();
    assert_eq!(registry.get_mapping::<Supplier>().unwrap().table_name(), "Supplier");

    registry.register::<Supplier, _>(|m: &mut ClassMapper<Supplier>| -> MapResult<()> {
        m.table("suppliers");
        m.auto_map()?;
        Ok(())
    });
    assert!(!registry.is_cached::<Supplier>());
    assert_eq!(registry.get_mapping::<Supplier>().unwrap().table_name(), "suppliers");
}

#[test]
fn test_catalog_search_order() {
    let mut first = MappingCatalog::new("first");
    first.register::<Supplier, _>(|m: &mut ClassMapper<Supplier>| -> MapResult<()> {
        m.table("first_suppliers");
        m.auto_map()?;
        Ok(())
    });
    let mut second = MappingCatalog::new("second");
    second
        .register::<Supplier, _>(|m: &mut ClassMapper<Supplier>| -> MapResult<()> {
            m.table("second_suppliers");
            m.auto_map()?;
            Ok(())
        })
        .register::<StockItem, _>(StockItemMap);

    let registry = MappingRegistry::with_options(
        MappingOptions::default()
            .with_catalog(first)
            .with_catalog(second),
    );
    assert_eq!(
        registry.get_mapping::<Supplier>().unwrap().table_name(),
        "first_suppliers"
    );
    assert_eq!(registry.get_mapping::<StockItem>().unwrap().table_name(), "stock");
}

#[test]
fn test_configure_replaces_default_mapper() {
    let mut registry = MappingRegistry::new();
    assert_eq!(registry.get_mapping::<Supplier>().unwrap().table_name(), "Supplier");

    registry.configure(MappingOptions::default().with_default_mapper(UpperCaseTables));
    assert_eq!(registry.cached_len(), 0);
    assert_eq!(registry.get_mapping::<Supplier>().unwrap().table_name(), "SUPPLIER");
}

#[test]
fn test_conventions_flow_into_default_mapping() {
    let registry = MappingRegistry::with_options(MappingOptions::default().with_conventions(
        MappingConventions {
            table_naming: TableNaming::PluralSnakeCase,
            ..MappingConventions::default()
        },
    ));
    let mapping = registry.get_mapping::<StockItem>().unwrap();
    assert_eq!(mapping.table_name(), "stock_items");
    assert!(!mapping.has_key());

    let supplier = registry.get_mapping::<Supplier>().unwrap();
    assert_eq!(supplier.delete_flag_property().unwrap().name(), "is_del");
}

#[test]
fn test_failed_build_is_not_cached() {
    let registry = MappingRegistry::new();
    registry.register::<Supplier, _>(|m: &mut ClassMapper<Supplier>| -> MapResult<()> {
        m.map(Supplier::name)?;
        m.map(Supplier::name)?;
        Ok(())
    });
    assert!(registry.get_mapping::<Supplier>().is_err());
    assert!(!registry.is_cached::<Supplier>());
}

#[test]
fn test_concurrent_first_requests_share_one_mapping() {
    let registry = Arc::new(MappingRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || registry.get_mapping::<Supplier>().unwrap())
        })
        .collect();
    let mappings: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(mappings.iter().all(|m| Arc::ptr_eq(m, &mappings[0])));
    assert_eq!(registry.cached_len(), 1);
}

/// Registers a `Supplier` map on its registry while building the first
/// default mapping, the way another thread's `register` could interleave.
struct RegisterDuringBuild {
    registry: Arc<OnceLock<Weak<MappingRegistry>>>,
    fired: AtomicBool,
}

impl DefaultMapper for RegisterDuringBuild {
    fn configure(&self, builder: &mut MappingBuilder) -> MapResult<()> {
        if !self.fired.swap(true, Ordering::SeqCst) {
            if let Some(registry) = self.registry.get().and_then(Weak::upgrade) {
                registry.register::<Supplier, _>(|m: &mut ClassMapper<Supplier>| -> MapResult<()> {
                    m.table("suppliers");
                    m.auto_map()?;
                    Ok(())
                });
            }
        }
        builder.auto_map()?;
        Ok(())
    }
}

#[test]
fn test_registration_during_build_is_not_lost() {
    let slot = Arc::new(OnceLock::new());
    let registry = Arc::new(MappingRegistry::with_options(
        MappingOptions::default().with_default_mapper(RegisterDuringBuild {
            registry: Arc::clone(&slot),
            fired: AtomicBool::new(false),
        }),
    ));
    slot.set(Arc::downgrade(&registry)).unwrap();

    let mapping = registry.get_mapping::<Supplier>().unwrap();
    assert_eq!(mapping.table_name(), "suppliers");
    assert_eq!(registry.get_mapping::<Supplier>().unwrap().table_name(), "suppliers");
}
