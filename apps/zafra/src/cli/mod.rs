//! # Zafra CLI Module
//!
//! This module implements the command-line interface for Zafra.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `status` - Show record counts
//! - `parcel|supplier|carrier add|edit|remove|list` - Manage master data
//! - `freight|transaction|harvest add|remove|list` - Manage linked records
//! - `totals` - Show aggregate views
//! - `export` - Write a report table as text or JSON
//! - `backup` / `restore` - Whole-ledger archive, optionally digest-checked
//! - `compact` - Reclaim unused database space
//! - `init` - Initialize a new database
//! - `hash` - BLAKE3 digest of the current backup archive

mod commands;
mod fields;

use crate::config::{Backend, ConfigFile, HttpSettings, StorageSettings};
use crate::report::{ExportFormat, ReportKind, ReportScope};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use zafra_core::LedgerError;

pub use commands::*;
pub use fields::{
    CarrierArgs, FreightArgs, HarvestArgs, HarvestDims, NumberPolicy, ParcelArgs, SupplierArgs,
    TransactionArgs,
};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Zafra - farm-logistics ledger
///
/// Land parcels, suppliers, carriers, freight, transactions and harvest
/// intake, with per-parent totals and exportable reports.
#[derive(Parser, Debug)]
#[command(name = "zafra")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the database (redb file or file-backend directory)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Config file (default: ./zafra.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Reject numeric input that is not a complete number instead of
    /// storing NaN
    #[arg(long, global = true)]
    pub strict_numbers: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to (default: 127.0.0.1)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (default: 8080)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show record counts
    Status,

    /// Manage land parcels
    Parcel {
        #[command(subcommand)]
        action: ParcelAction,
    },

    /// Manage suppliers
    Supplier {
        #[command(subcommand)]
        action: SupplierAction,
    },

    /// Manage carriers
    Carrier {
        #[command(subcommand)]
        action: CarrierAction,
    },

    /// Manage freight trips
    Freight {
        #[command(subcommand)]
        action: FreightAction,
    },

    /// Manage financial transactions
    Transaction {
        #[command(subcommand)]
        action: TransactionAction,
    },

    /// Manage harvest intake
    Harvest {
        #[command(subcommand)]
        action: HarvestAction,
    },

    /// Show an aggregate view
    Totals {
        #[arg(value_enum)]
        view: TotalsView,
    },

    /// Export a report table
    Export {
        /// What to export
        #[arg(value_enum)]
        kind: ReportKind,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 't', long, value_enum, default_value_t = ExportFormat::Text)]
        format: ExportFormat,

        /// Substring search for collection reports
        #[arg(short, long)]
        search: Option<String>,

        /// Dimensions narrowing the harvest report
        #[command(flatten)]
        dims: HarvestDims,
    },

    /// Write a backup archive of the whole ledger
    Backup {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replace the whole ledger with a backup archive
    Restore {
        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Expected BLAKE3 hex digest, as printed by `backup` or `hash`
        #[arg(long)]
        digest: Option<String>,
    },

    /// Reclaim unused space in the database
    Compact,

    /// Initialize a new empty database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Compute the BLAKE3 digest of the ledger's backup archive
    Hash,
}

/// Aggregate views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TotalsView {
    /// Freight sums per carrier
    Freight,
    /// Payments, credits, VAT and balance per supplier
    Transactions,
    /// Grand total over all harvest intake
    Harvest,
}

/// Actions on parcels.
#[derive(Subcommand, Debug)]
pub enum ParcelAction {
    /// Add a parcel
    Add(ParcelArgs),
    /// Change fields of a parcel; omitted fields keep their value
    Edit {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        fields: ParcelArgs,
    },
    /// Remove a parcel
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List parcels
    List {
        /// Substring search on name, tenant and partnership
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Actions on suppliers.
#[derive(Subcommand, Debug)]
pub enum SupplierAction {
    /// Add a supplier
    Add(SupplierArgs),
    /// Change fields of a supplier; omitted fields keep their value
    Edit {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        fields: SupplierArgs,
    },
    /// Remove a supplier
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List suppliers
    List {
        /// Substring search on name, location and tax id
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Actions on carriers.
#[derive(Subcommand, Debug)]
pub enum CarrierAction {
    /// Add a carrier
    Add(CarrierArgs),
    /// Change fields of a carrier; omitted fields keep their value
    Edit {
        #[arg(long)]
        id: u64,
        #[command(flatten)]
        fields: CarrierArgs,
    },
    /// Remove a carrier
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List carriers
    List {
        /// Substring search on name, plate and company
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Actions on freight trips.
#[derive(Subcommand, Debug)]
pub enum FreightAction {
    /// Add a freight trip
    Add(FreightArgs),
    /// Remove a freight trip
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List freight trips
    List {
        /// Substring search on product and carrier name
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Actions on transactions.
#[derive(Subcommand, Debug)]
pub enum TransactionAction {
    /// Add a transaction
    Add(TransactionArgs),
    /// Remove a transaction
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List transactions
    List {
        /// Substring search on supplier name, description and buyer
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// Actions on harvest intake.
#[derive(Subcommand, Debug)]
pub enum HarvestAction {
    /// Add a harvest intake entry
    Add(HarvestArgs),
    /// Remove a harvest intake entry
    Remove {
        #[arg(long)]
        id: u64,
    },
    /// List harvest intake, narrowed by dimension
    List(HarvestDims),
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Settings every command runs with.
#[derive(Debug, Clone)]
pub struct Context {
    pub storage: StorageSettings,
    pub config: ConfigFile,
    pub json_mode: bool,
    pub numbers: NumberPolicy,
}

impl Context {
    /// Merge the config file with the global flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, LedgerError> {
        let config = ConfigFile::load(cli.config.as_deref())?;
        let storage = StorageSettings::resolve(&config.storage, cli.backend, cli.database.clone());
        Ok(Self {
            storage,
            config,
            json_mode: cli.json_mode,
            numbers: NumberPolicy {
                strict: cli.strict_numbers,
            },
        })
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), LedgerError> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let host = host
                .or_else(|| ctx.config.server.host.clone())
                .unwrap_or_else(|| "127.0.0.1".to_string());
            let port = port.or(ctx.config.server.port).unwrap_or(8080);
            let settings = HttpSettings::resolve(&ctx.config.http);
            cmd_serve(&ctx, &host, port, settings).await
        }
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::Parcel { action }) => cmd_parcel(&ctx, action),
        Some(Commands::Supplier { action }) => cmd_supplier(&ctx, action),
        Some(Commands::Carrier { action }) => cmd_carrier(&ctx, action),
        Some(Commands::Freight { action }) => cmd_freight(&ctx, action),
        Some(Commands::Transaction { action }) => cmd_transaction(&ctx, action),
        Some(Commands::Harvest { action }) => cmd_harvest(&ctx, action),
        Some(Commands::Totals { view }) => cmd_totals(&ctx, view),
        Some(Commands::Export {
            kind,
            output,
            format,
            search,
            dims,
        }) => {
            let scope = ReportScope::search(search.unwrap_or_default()).with_harvest(dims.to_filter());
            cmd_export(&ctx, kind, output.as_deref(), format, &scope)
        }
        Some(Commands::Backup { output }) => cmd_backup(&ctx, &output),
        Some(Commands::Restore { input, digest }) => cmd_restore(&ctx, &input, digest.as_deref()),
        Some(Commands::Compact) => cmd_compact(&ctx),
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Hash) => cmd_hash(&ctx),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_parcel_add() {
        let cli = Cli::try_parse_from([
            "zafra", "-B", "memory", "parcel", "add", "--name", "La Loma", "--area", "120",
        ])
        .expect("parse");

        assert_eq!(cli.backend, Some(Backend::Memory));
        assert!(matches!(
            cli.command,
            Some(Commands::Parcel { action: ParcelAction::Add(ref args) })
                if args.name.as_deref() == Some("La Loma") && args.area.as_deref() == Some("120")
        ));
    }

    #[test]
    fn parses_export_kind() {
        let cli = Cli::try_parse_from(["zafra", "export", "freight-totals", "-t", "json"])
            .expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Export {
                kind: ReportKind::FreightTotals,
                format: ExportFormat::Json,
                ..
            })
        ));
    }

    #[test]
    fn parses_export_harvest_dimensions() {
        let cli = Cli::try_parse_from([
            "zafra", "export", "harvest", "--parcel", "3", "--product", "Soja",
        ])
        .expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Export { kind: ReportKind::Harvest, ref dims, .. })
                if dims.parcel == Some(3) && dims.product.as_deref() == Some("Soja")
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["zafra", "status", "--json-mode", "--strict-numbers"])
            .expect("parse");
        assert!(cli.json_mode);
        assert!(cli.strict_numbers);
    }

    #[test]
    fn unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["zafra", "-B", "sqlite", "status"]).is_err());
    }
}
