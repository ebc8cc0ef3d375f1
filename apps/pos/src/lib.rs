//! # kopi-pos: Sudut Kopi POS Orchestration
//!
//! The layer the web front end talks to: sessions and their carts,
//! checkout, order management, reports and tables.
//!
//! ## Module Organization
//! ```text
//! kopi_pos/
//! ├── lib.rs          ◄─── You are here (PosContext, logging)
//! ├── config.rs       ◄─── pos.toml + KOPI_* environment
//! ├── error.rs        ◄─── PosError and the ApiError shape
//! ├── state/
//! │   ├── cart.rs     ◄─── CartState (Arc<Mutex<Cart>>)
//! │   └── session.rs  ◄─── Session: cart + channel + table + staff
//! └── commands/
//!     ├── cart.rs     ◄─── add/update/remove cart lines, estimate
//!     ├── checkout.rs ◄─── cart → order + items + payment → receipt
//!     ├── orders.rs   ◄─── order list, detail, status changes
//!     ├── reports.rs  ◄─── daily report, close day, dashboard
//!     └── tables.rs   ◄─── table CRUD, QR binding
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()          RUST_LOG or "info,kopi=debug,sqlx=warn"     │
//! │  2. PosConfig::load()       pos.toml → KOPI_* → validate                │
//! │  3. PosContext::open(cfg)   database path → pool → migrations           │
//! │  4. Session::new(channel)   one per terminal / customer                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod state;

use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kopi_core::{OrderChannel, TaxRate};
use kopi_db::{Database, DbConfig};

pub use config::PosConfig;
pub use error::{ApiError, ErrorCode, PosError, PosResult};
pub use state::{CartState, Session, SessionInfo};

/// Shared handles every command needs.
///
/// Cheap to clone.
#[derive(Debug, Clone)]
pub struct PosContext {
    pub db: Database,
    pub config: PosConfig,
}

impl PosContext {
    pub fn new(db: Database, config: PosConfig) -> Self {
        PosContext { db, config }
    }

    /// Opens the configured database and runs migrations.
    pub async fn open(config: PosConfig) -> PosResult<Self> {
        let path = config.database_path()?;
        info!(path = %path.display(), "Opening POS database");

        let db = Database::new(DbConfig::new(path)).await?;
        let ctx = PosContext { db, config };

        let health = ctx.health().await?;
        if !health.is_ready() {
            warn!(
                database_ok = health.database_ok,
                applied = health.migrations_applied,
                total = health.migrations_total,
                "POS database not ready"
            );
        }
        Ok(ctx)
    }

    /// Database reachability and migration state, for the admin status view.
    pub async fn health(&self) -> PosResult<HealthReport> {
        let database_ok = self.db.health_check().await;
        let (migrations_total, migrations_applied) = self.db.migration_status().await?;
        Ok(HealthReport {
            database_ok,
            migrations_total,
            migrations_applied,
        })
    }

    /// Isolated in-memory database with migrations applied.
    pub async fn in_memory(config: PosConfig) -> PosResult<Self> {
        let db = Database::new(DbConfig::in_memory()).await?;
        Ok(PosContext { db, config })
    }

    pub fn tax_rate(&self, channel: OrderChannel) -> TaxRate {
        self.config.tax_rate(channel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub database_ok: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
}

impl HealthReport {
    pub fn is_ready(&self) -> bool {
        self.database_ok && self.migrations_applied == self.migrations_total
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kopi=trace` - Show trace for kopi crates only
/// - Default: `info,kopi=debug,sqlx=warn`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,kopi=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
