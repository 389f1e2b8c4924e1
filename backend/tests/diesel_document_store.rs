//! Listing, radius and uniqueness behaviour of `DieselDocumentStore` against
//! embedded PostgreSQL.
//!
//! The same scenarios run over the in-memory store in the unit suites; here
//! the generated SQL (jsonb coercion, ordering, windowing, spherical
//! containment) executes for real.

use std::sync::Arc;

use pg_embedded_setup_unpriv::TestCluster;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::runtime::Runtime;

use devcamper::domain::ports::{DocumentStore, FixtureGeocoder};
use devcamper::domain::{
    BootcampInput, BootcampsService, ErrorCode, QueryResultEnvelope, ResourceId, UserInput,
    UsersService,
};
use devcamper::outbound::persistence::{DbPool, DieselDocumentStore, PoolConfig, run_migrations};
use devcamper::outbound::storage::FsPhotoStorage;

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{handle_cluster_setup_failure, test_cluster};

struct StoreContext {
    runtime: Runtime,
    bootcamps: BootcampsService,
    users: UsersService,
    _uploads: TempDir,
    _cluster: TestCluster,
}

fn setup_context() -> Result<StoreContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = test_cluster()?;
    let url = cluster.connection().database_url("postgres");

    let pool = runtime.block_on(async {
        run_migrations(&url).await.map_err(|err| err.to_string())?;
        DbPool::new(PoolConfig::new(&url).with_max_size(2))
            .await
            .map_err(|err| err.to_string())
    })?;
    let store: Arc<dyn DocumentStore> = Arc::new(DieselDocumentStore::new(pool));
    let uploads = tempfile::tempdir().map_err(|err| err.to_string())?;
    let photos = FsPhotoStorage::open(uploads.path()).map_err(|err| err.to_string())?;

    Ok(StoreContext {
        runtime,
        bootcamps: BootcampsService::new(
            Arc::clone(&store),
            Arc::new(FixtureGeocoder),
            Arc::new(photos),
        ),
        users: UsersService::new(store),
        _uploads: uploads,
        _cluster: cluster,
    })
}

#[fixture]
fn store_context() -> Option<StoreContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn input(name: &str, address: &str, average_cost: f64, careers: &[&str]) -> BootcampInput {
    BootcampInput {
        name: Some(name.to_owned()),
        description: Some(format!("{name} teaches full stack development")),
        address: Some(address.to_owned()),
        careers: Some(careers.iter().map(|career| (*career).to_owned()).collect()),
        average_cost: Some(average_cost),
        ..BootcampInput::default()
    }
}

/// Five camps costing 1000..=5000 in creation order; the last teaches data
/// science in Manhattan.
fn seed_five(context: &StoreContext, owner: Option<ResourceId>) {
    context.runtime.block_on(async {
        for n in 1..=5_u32 {
            let (address, careers): (&str, &[&str]) = if n == 5 {
                ("10001", &["Data Science"])
            } else {
                ("233 Bay State Rd, Boston, MA 02215", &["Web Development", "UI/UX"])
            };
            context
                .bootcamps
                .create(owner, input(&format!("Camp {n}"), address, f64::from(n) * 1000.0, careers))
                .await
                .expect("seed bootcamp");
        }
    });
}

fn list(context: &StoreContext, raw: &[(&str, &str)]) -> QueryResultEnvelope {
    let params: Vec<(String, String)> = raw
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    context
        .runtime
        .block_on(context.bootcamps.list(&params, 25))
        .expect("listing")
}

fn names(envelope: &QueryResultEnvelope) -> Vec<&str> {
    envelope
        .data
        .iter()
        .filter_map(|record| record.get("name").and_then(Value::as_str))
        .collect()
}

#[rstest]
fn second_page_of_two(store_context: Option<StoreContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: second_page_of_two skipped");
        return;
    };
    seed_five(&context, None);

    let envelope = list(&context, &[("page", "2"), ("limit", "2")]);

    assert_eq!(names(&envelope), ["Camp 3", "Camp 4"]);
    assert_eq!(envelope.pagination.next.map(|link| link.page), Some(3));
    assert_eq!(envelope.pagination.prev.map(|link| link.page), Some(1));
}

#[rstest]
fn comparison_sort_and_select(store_context: Option<StoreContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: comparison_sort_and_select skipped");
        return;
    };
    seed_five(&context, None);

    let envelope = list(
        &context,
        &[
            ("averageCost[lte]", "3000"),
            ("sort", "-averageCost"),
            ("select", "name,averageCost"),
        ],
    );

    assert_eq!(names(&envelope), ["Camp 3", "Camp 2", "Camp 1"]);
    let mut keys: Vec<&str> = envelope.data[0]
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    keys.sort_unstable();
    assert_eq!(keys, ["averageCost", "id", "name"]);
    assert!(envelope.pagination.is_empty());
}

#[rstest]
#[case(&[("careers[in]", "Data Science,Business")], &["Camp 5"])]
#[case(&[("careers", "UI/UX"), ("averageCost[gt]", "2000")], &["Camp 3", "Camp 4"])]
#[case(&[("name", "Camp 2")], &["Camp 2"])]
#[case(&[("location.city", "Boston"), ("sort", "-name"), ("limit", "2")], &["Camp 4", "Camp 3"])]
#[case(&[("missing", "anything")], &[])]
fn filters_match_the_memory_store(
    store_context: Option<StoreContext>,
    #[case] raw: &[(&str, &str)],
    #[case] expected: &[&str],
) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: filters_match_the_memory_store skipped");
        return;
    };
    seed_five(&context, None);

    let envelope = list(&context, raw);

    assert_eq!(names(&envelope), expected);
    assert_eq!(envelope.count, expected.len());
}

#[rstest]
fn radius_search_uses_the_spherical_cap(store_context: Option<StoreContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: radius_search_uses_the_spherical_cap skipped");
        return;
    };
    seed_five(&context, None);

    let nearby = context
        .runtime
        .block_on(context.bootcamps.within_radius("02118", "10"))
        .expect("radius search");
    let found: Vec<&str> = nearby.bootcamps.iter().map(|camp| camp.name.as_str()).collect();
    assert_eq!(found, ["Camp 1", "Camp 2", "Camp 3", "Camp 4"]);

    let wide = context
        .runtime
        .block_on(context.bootcamps.within_radius("02118", "250"))
        .expect("radius search");
    assert_eq!(wide.bootcamps.len(), 5);
}

#[rstest]
fn owners_are_populated_without_passwords(store_context: Option<StoreContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: owners_are_populated_without_passwords skipped");
        return;
    };
    let owner = context
        .runtime
        .block_on(context.users.create(UserInput {
            name: Some("Ada".into()),
            email: Some("ada@example.com".into()),
            role: Some("publisher".into()),
            password: Some("123456".into()),
        }))
        .expect("owner");
    seed_five(&context, Some(owner.id));

    let envelope = list(&context, &[("limit", "1")]);

    assert_eq!(
        envelope.data[0]["user"],
        json!({ "id": owner.id.to_string(), "name": "Ada", "email": "ada@example.com" })
    );
}

#[rstest]
fn unique_names_are_enforced(store_context: Option<StoreContext>) {
    let Some(context) = store_context else {
        eprintln!("SKIP-TEST-CLUSTER: unique_names_are_enforced skipped");
        return;
    };
    seed_five(&context, None);

    let error = context
        .runtime
        .block_on(
            context
                .bootcamps
                .create(None, input("Camp 1", "02118", 100.0, &["Business"])),
        )
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Duplicate);
    assert_eq!(error.message(), "Duplicate field value entered");
}
