//! # Configuration
//!
//! Terminal configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KOPI_*`)
//! 2. Config file (`pos.toml` in the platform config dir, or an explicit path)
//! 3. Defaults (this file)
//!
//! ## Example `pos.toml`
//! ```toml
//! [store]
//! name = "SUDUT KOPI"
//! address_lines = ["Jl. Kopi No. 123"]
//!
//! [tax]
//! pos_rate_bps = 1100
//! customer_rate_bps = 800
//!
//! [pos]
//! origin = "https://kopi.example"
//! complete_on_payment = false
//! receipt_width = 32
//!
//! [reports]
//! top_products = 5
//! recent_orders_limit = 50
//!
//! [database]
//! path = "/var/lib/kopi/kopi.db"
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after loading, so no mutex is needed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use kopi_core::receipt::MIN_RECEIPT_WIDTH;
use kopi_core::{OrderChannel, StoreHeader, TaxRate};

use crate::error::{PosError, PosResult};

const CONFIG_FILE: &str = "pos.toml";
const DATABASE_FILE: &str = "kopi.db";

// =============================================================================
// Sections
// =============================================================================

/// `[store]`: printed on receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: Option<String>,
    pub footer_lines: Vec<String>,
    pub currency_symbol: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let header = StoreHeader::default();
        StoreConfig {
            name: header.name,
            address_lines: header.address_lines,
            phone: header.phone,
            footer_lines: header.footer_lines,
            currency_symbol: header.currency_symbol,
        }
    }
}

/// `[tax]`: one rate per order channel, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxConfig {
    /// Counter sales. Default 1100 (11%)
    pub pos_rate_bps: u32,
    /// Customer self-ordering. Default 800 (8%)
    pub customer_rate_bps: u32,
}

impl Default for TaxConfig {
    fn default() -> Self {
        TaxConfig {
            pos_rate_bps: 1100,
            customer_rate_bps: 800,
        }
    }
}

/// `[pos]`: terminal behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Base of table QR payloads (`{origin}/pos?table=N`).
    pub origin: String,
    /// Write counter sales directly as `completed`.
    pub complete_on_payment: bool,
    /// Receipt text width in columns. 32 fits 58 mm paper.
    pub receipt_width: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            origin: "http://localhost:8080".to_string(),
            complete_on_payment: false,
            receipt_width: 32,
        }
    }
}

/// `[reports]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub top_products: usize,
    pub recent_orders_limit: u32,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        ReportsConfig {
            top_products: 5,
            recent_orders_limit: 50,
        }
    }
}

/// `[database]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// Defaults to `kopi.db` in the platform data directory.
    pub path: Option<PathBuf>,
}

// =============================================================================
// PosConfig
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PosConfig {
    pub store: StoreConfig,
    pub tax: TaxConfig,
    pub pos: TerminalConfig,
    pub reports: ReportsConfig,
    pub database: DatabaseSection,
}

impl PosConfig {
    /// Loads `pos.toml` from the platform config directory (defaults when
    /// absent), applies `KOPI_*` overrides, then validates.
    pub fn load() -> PosResult<Self> {
        let mut config = match project_dirs() {
            Some(dirs) => {
                let path = dirs.config_dir().join(CONFIG_FILE);
                if path.exists() {
                    Self::read_file(&path)?
                } else {
                    debug!(path = %path.display(), "No config file, using defaults");
                    PosConfig::default()
                }
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                PosConfig::default()
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Loads an explicit config file, applies `KOPI_*` overrides, validates.
    pub fn load_from(path: &Path) -> PosResult<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> PosResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PosError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parses TOML. Missing sections and keys take their defaults.
    pub fn from_toml_str(text: &str) -> PosResult<Self> {
        toml::from_str(text).map_err(|e| PosError::Config(e.to_string()))
    }

    /// Applies process environment overrides.
    ///
    /// ## Environment Variables
    /// - `KOPI_STORE_NAME`
    /// - `KOPI_POS_TAX_RATE`, `KOPI_CUSTOMER_TAX_RATE`: percent, e.g. `"11"` or `"8.25"`
    /// - `KOPI_ORIGIN`
    /// - `KOPI_DB_PATH`
    /// - `KOPI_COMPLETE_ON_PAYMENT`: `true`/`false`/`1`/`0`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Same as [`apply_env`](Self::apply_env) with a custom lookup.
    /// Unparseable values are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(name) = lookup("KOPI_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(raw) = lookup("KOPI_POS_TAX_RATE") {
            match parse_percent(&raw) {
                Some(bps) => self.tax.pos_rate_bps = bps,
                None => warn!(value = %raw, "Ignoring invalid KOPI_POS_TAX_RATE"),
            }
        }

        if let Some(raw) = lookup("KOPI_CUSTOMER_TAX_RATE") {
            match parse_percent(&raw) {
                Some(bps) => self.tax.customer_rate_bps = bps,
                None => warn!(value = %raw, "Ignoring invalid KOPI_CUSTOMER_TAX_RATE"),
            }
        }

        if let Some(origin) = lookup("KOPI_ORIGIN") {
            self.pos.origin = origin;
        }

        if let Some(path) = lookup("KOPI_DB_PATH") {
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("KOPI_COMPLETE_ON_PAYMENT") {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.pos.complete_on_payment = true,
                "0" | "false" | "no" => self.pos.complete_on_payment = false,
                _ => warn!(value = %raw, "Ignoring invalid KOPI_COMPLETE_ON_PAYMENT"),
            }
        }
    }

    pub fn validate(&self) -> PosResult<()> {
        for (key, bps) in [
            ("tax.pos_rate_bps", self.tax.pos_rate_bps),
            ("tax.customer_rate_bps", self.tax.customer_rate_bps),
        ] {
            if bps > 10_000 {
                return Err(PosError::Config(format!("{} must be at most 10000, got {}", key, bps)));
            }
        }

        let origin = self.pos.origin.trim();
        if !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(PosError::Config(format!(
                "pos.origin must start with http:// or https://, got '{}'",
                origin
            )));
        }

        if self.pos.receipt_width < MIN_RECEIPT_WIDTH {
            return Err(PosError::Config(format!(
                "pos.receipt_width must be at least {}",
                MIN_RECEIPT_WIDTH
            )));
        }

        if self.reports.top_products == 0 {
            return Err(PosError::Config("reports.top_products must be positive".to_string()));
        }

        Ok(())
    }

    /// Tax rate applied to orders from `channel`.
    pub fn tax_rate(&self, channel: OrderChannel) -> TaxRate {
        match channel {
            OrderChannel::Pos => TaxRate::from_bps(self.tax.pos_rate_bps),
            OrderChannel::Customer => TaxRate::from_bps(self.tax.customer_rate_bps),
        }
    }

    pub fn store_header(&self) -> StoreHeader {
        StoreHeader {
            name: self.store.name.clone(),
            address_lines: self.store.address_lines.clone(),
            phone: self.store.phone.clone(),
            footer_lines: self.store.footer_lines.clone(),
            currency_symbol: self.store.currency_symbol.clone(),
        }
    }

    /// Configured database path, or `kopi.db` in the platform data directory
    /// (created if missing).
    pub fn database_path(&self) -> PosResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = project_dirs()
            .ok_or_else(|| PosError::Config("Could not determine app data directory".to_string()))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .map_err(|e| PosError::Config(format!("{}: {}", data_dir.display(), e)))?;

        Ok(data_dir.join(DATABASE_FILE))
    }
}

/// Platform directories:
/// - **macOS**: `~/Library/Application Support/com.sudutkopi.pos`
/// - **Windows**: `%APPDATA%\sudutkopi\pos`
/// - **Linux**: `~/.config/pos`, `~/.local/share/pos`
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sudutkopi", "pos")
}

/// `"11"` → 1100, `"8.25"` → 825.
fn parse_percent(raw: &str) -> Option<u32> {
    let pct: f64 = raw.trim().parse().ok()?;
    if !(0.0..=100.0).contains(&pct) {
        return None;
    }
    Some(TaxRate::from_percentage(pct).bps())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = PosConfig::default();
        config.validate().unwrap();
        assert_eq!(config.tax_rate(OrderChannel::Pos).bps(), 1100);
        assert_eq!(config.tax_rate(OrderChannel::Customer).bps(), 800);
        assert_eq!(config.pos.receipt_width, 32);
        assert_eq!(config.reports.top_products, 5);
        assert!(!config.pos.complete_on_payment);
        assert_eq!(config.store_header(), StoreHeader::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = PosConfig::from_toml_str(
            r#"
            [store]
            name = "KOPI KITA"

            [tax]
            pos_rate_bps = 1000

            [pos]
            complete_on_payment = true
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "KOPI KITA");
        assert_eq!(config.store.currency_symbol, "$");
        assert_eq!(config.tax.pos_rate_bps, 1000);
        assert_eq!(config.tax.customer_rate_bps, 800);
        assert!(config.pos.complete_on_payment);
        assert_eq!(config.pos.origin, "http://localhost:8080");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = PosConfig::from_toml_str("[tax\npos_rate_bps = ").unwrap_err();
        assert!(matches!(err, PosError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("KOPI_STORE_NAME", "Kopi Pagi"),
            ("KOPI_POS_TAX_RATE", "10"),
            ("KOPI_CUSTOMER_TAX_RATE", "8.25"),
            ("KOPI_ORIGIN", "https://kopi.example"),
            ("KOPI_DB_PATH", "/tmp/kopi-test.db"),
            ("KOPI_COMPLETE_ON_PAYMENT", "1"),
        ]
        .into_iter()
        .collect();

        let mut config = PosConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.store.name, "Kopi Pagi");
        assert_eq!(config.tax.pos_rate_bps, 1000);
        assert_eq!(config.tax.customer_rate_bps, 825);
        assert_eq!(config.pos.origin, "https://kopi.example");
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/kopi-test.db"));
        assert!(config.pos.complete_on_payment);
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = PosConfig::default();
        config.apply_overrides(|key| match key {
            "KOPI_POS_TAX_RATE" => Some("eleven".to_string()),
            "KOPI_COMPLETE_ON_PAYMENT" => Some("maybe".to_string()),
            _ => None,
        });
        assert_eq!(config.tax.pos_rate_bps, 1100);
        assert!(!config.pos.complete_on_payment);
    }

    #[test]
    fn test_validation_rules() {
        let mut config = PosConfig::default();
        config.tax.customer_rate_bps = 10_001;
        assert!(config.validate().is_err());

        let mut config = PosConfig::default();
        config.pos.origin = "kopi.example".to_string();
        assert!(config.validate().is_err());

        let mut config = PosConfig::default();
        config.pos.receipt_width = 20;
        assert!(config.validate().is_err());

        let mut config = PosConfig::default();
        config.reports.top_products = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("kopi-pos-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[reports]\ntop_products = 3\n").unwrap();

        let config = PosConfig::load_from(&path).unwrap();
        assert_eq!(config.reports.top_products, 3);

        std::fs::remove_file(&path).unwrap();
    }
}
