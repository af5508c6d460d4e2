//! Embedded PostgreSQL for the Diesel repository tests.
//!
//! One cluster is shared per test process. Each test gets its own database
//! cloned from a template that already carries the migrations; the clone is
//! dropped with its [`TemporaryDatabase`] handle.
//!
//! Set `SKIP_TEST_CLUSTER=1` where no cluster can start (no network for the
//! binary download, no permission to run it); the suites then pass vacuously
//! and print a `SKIP-TEST-CLUSTER` marker.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};

use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use taskhub::outbound::persistence::run_pending_migrations;
use uuid::Uuid;

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_PREFIX: &str = "taskhub_template";

fn should_skip() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn cluster() -> Result<&'static ClusterHandle, String> {
    // A data directory left by an earlier run keeps its first password.
    let _password = std::env::var_os("PG_PASSWORD")
        .is_none()
        .then(|| env_lock::lock_env([("PG_PASSWORD", Some("taskhub_embedded_test"))]));
    shared_cluster_handle().map_err(|err| format!("start embedded cluster: {err:?}"))
}

/// Template named after the migrations it carries, created on first use.
fn template(cluster: &ClusterHandle) -> Result<String, String> {
    let _guard = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let name = format!("{TEMPLATE_PREFIX}_{}", hash.get(..8).unwrap_or(&hash));

    let exists = cluster
        .database_exists(name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        run_pending_migrations(&cluster.connection().database_url(&name))
            .map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(name)
}

fn provision() -> Result<TemporaryDatabase, String> {
    let cluster = cluster()?;
    let template = template(cluster)?;
    let name = format!("taskhub_test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(name.as_str(), template.as_str())
        .map_err(|err| format!("clone template: {err:?}"))
}

/// Fresh migrated database.
///
/// Returns `None` only when provisioning failed and `SKIP_TEST_CLUSTER` is
/// set; otherwise a failure panics so CI breakage is not masked.
pub fn temporary_database() -> Option<TemporaryDatabase> {
    match provision() {
        Ok(database) => Some(database),
        Err(reason) if should_skip() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("embedded PostgreSQL unavailable: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
    }
}
