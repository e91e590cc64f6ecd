//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::fields::{carrier_draft, parcel_draft, supplier_draft};
use super::{
    CarrierAction, Context, FreightAction, HarvestAction, ParcelAction, SupplierAction,
    TotalsView, TransactionAction,
};
use crate::api;
use crate::config::{Backend, HttpSettings};
use crate::report::{self, ExportFormat, JsonSink, ReportKind, ReportScope, TextSink};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use zafra_core::{
    Carrier, ExportTable, FreightRecord, HarvestIntake, LandParcel, Ledger, LedgerCollection,
    LedgerError, PrintSink, RecordId, Supplier, Transaction,
    formats::{archive_digest, verify_archive_digest},
    primitives::MAX_ARCHIVE_SIZE,
};

// =============================================================================
// FILE VALIDATION
// =============================================================================

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), LedgerError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| LedgerError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(LedgerError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path: it must exist and be a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, LedgerError> {
    let canonical = path.canonicalize().map_err(|e| {
        LedgerError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(LedgerError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: its parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, LedgerError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        LedgerError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(LedgerError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| LedgerError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), LedgerError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

/// Print rows as a JSON array or as an aligned table including ids.
fn print_rows<T: Serialize>(ctx: &Context, title: &str, rows: &[T]) -> Result<(), LedgerError> {
    if ctx.json_mode {
        return print_json(rows);
    }
    let table = ExportTable::listing(title, rows)?;
    TextSink::new(std::io::stdout().lock()).print(&table)
}

fn report_added(ctx: &Context, kind: &str, id: RecordId) -> Result<(), LedgerError> {
    if ctx.json_mode {
        return print_json(&serde_json::json!({ "success": true, "id": id.value() }));
    }
    println!("{} added with id {}", kind, id);
    Ok(())
}

/// Report the outcome of an edit or removal; an unknown id is an error.
fn report_changed(ctx: &Context, kind: &str, id: u64, changed: bool, verb: &str) -> Result<(), LedgerError> {
    if !changed {
        return Err(LedgerError::InvalidRecord(format!("{} {} not found", kind, id)));
    }
    if ctx.json_mode {
        return print_json(&serde_json::json!({ "success": true, "id": id }));
    }
    println!("{} {} {}", kind, id, verb);
    Ok(())
}

fn open_ledger(ctx: &Context) -> Result<Ledger, LedgerError> {
    ctx.storage.open()
}

fn remove_record<T: LedgerCollection>(ctx: &Context, ledger: &mut Ledger, id: u64) -> Result<(), LedgerError> {
    let removed = ledger.remove::<T>(RecordId(id));
    report_changed(ctx, T::KIND, id, removed, "removed")
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(
    ctx: &Context,
    host: &str,
    port: u16,
    settings: HttpSettings,
) -> Result<(), LedgerError> {
    let ledger = open_ledger(ctx)?;

    println!("Zafra Ledger Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:     {}", host);
    println!("  Port:     {}", port);
    println!("  Backend:  {}", ctx.storage.backend.name());
    println!("  Database: {:?}", ctx.storage.database);
    println!();
    println!("Endpoints:");
    println!("  GET  /health              - Health check");
    println!("  GET  /status              - Record counts");
    println!("  *    /parcels /suppliers /carriers /freight /transactions /harvest");
    println!("  GET  /totals/{{freight,transactions,harvest}}");
    println!("  POST /export              - Export table");
    println!("  GET  /backup              - Backup archive");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let addr = format!("{}:{}", host, port);
    api::run_server(&addr, ledger, settings).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show record counts.
pub fn cmd_status(ctx: &Context) -> Result<(), LedgerError> {
    let ledger = open_ledger(ctx)?;
    let counts = ledger.counts();

    if ctx.json_mode {
        return print_json(&serde_json::json!({
            "database": ctx.storage.database.to_string_lossy(),
            "backend": ledger.backend_name(),
            "counts": counts,
            "total": counts.total(),
        }));
    }

    println!("Zafra Ledger Status");
    println!("===================");
    println!("Database: {:?}", ctx.storage.database);
    println!("Backend:  {}", ledger.backend_name());
    println!();
    println!("Parcels:        {}", counts.parcels);
    println!("Suppliers:      {}", counts.suppliers);
    println!("Carriers:       {}", counts.carriers);
    println!("Freight trips:  {}", counts.freight);
    println!("Transactions:   {}", counts.transactions);
    println!("Harvest intake: {}", counts.harvest);

    Ok(())
}

// =============================================================================
// MASTER DATA COMMANDS
// =============================================================================

pub fn cmd_parcel(ctx: &Context, action: ParcelAction) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    match action {
        ParcelAction::Add(args) => {
            let draft = args.apply(Default::default(), ctx.numbers)?;
            let parcel = ledger.add_parcel(draft)?;
            report_added(ctx, LandParcel::KIND, parcel.id)
        }
        ParcelAction::Edit { id, fields } => {
            let base = ledger
                .get::<LandParcel>(RecordId(id))
                .map(parcel_draft)
                .ok_or_else(|| LedgerError::InvalidRecord(format!("Parcel {} not found", id)))?;
            let draft = fields.apply(base, ctx.numbers)?;
            let changed = ledger.update::<LandParcel>(RecordId(id), draft)?;
            report_changed(ctx, LandParcel::KIND, id, changed, "updated")
        }
        ParcelAction::Remove { id } => remove_record::<LandParcel>(ctx, &mut ledger, id),
        ParcelAction::List { search } => {
            let rows = ledger.search::<LandParcel>(search.as_deref().unwrap_or_default());
            print_rows(ctx, ReportKind::Parcels.title(), &rows)
        }
    }
}

pub fn cmd_supplier(ctx: &Context, action: SupplierAction) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    match action {
        SupplierAction::Add(args) => {
            let supplier = ledger.add_supplier(args.apply(Default::default())?)?;
            report_added(ctx, Supplier::KIND, supplier.id)
        }
        SupplierAction::Edit { id, fields } => {
            let base = ledger
                .get::<Supplier>(RecordId(id))
                .map(supplier_draft)
                .ok_or_else(|| LedgerError::InvalidRecord(format!("Supplier {} not found", id)))?;
            let changed = ledger.update::<Supplier>(RecordId(id), fields.apply(base)?)?;
            report_changed(ctx, Supplier::KIND, id, changed, "updated")
        }
        SupplierAction::Remove { id } => remove_record::<Supplier>(ctx, &mut ledger, id),
        SupplierAction::List { search } => {
            let rows = ledger.search::<Supplier>(search.as_deref().unwrap_or_default());
            print_rows(ctx, ReportKind::Suppliers.title(), &rows)
        }
    }
}

pub fn cmd_carrier(ctx: &Context, action: CarrierAction) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    match action {
        CarrierAction::Add(args) => {
            let carrier = ledger.add_carrier(args.apply(Default::default()))?;
            report_added(ctx, Carrier::KIND, carrier.id)
        }
        CarrierAction::Edit { id, fields } => {
            let base = ledger
                .get::<Carrier>(RecordId(id))
                .map(carrier_draft)
                .ok_or_else(|| LedgerError::InvalidRecord(format!("Carrier {} not found", id)))?;
            let changed = ledger.update::<Carrier>(RecordId(id), fields.apply(base))?;
            report_changed(ctx, Carrier::KIND, id, changed, "updated")
        }
        CarrierAction::Remove { id } => remove_record::<Carrier>(ctx, &mut ledger, id),
        CarrierAction::List { search } => {
            let rows = ledger.search::<Carrier>(search.as_deref().unwrap_or_default());
            print_rows(ctx, ReportKind::Carriers.title(), &rows)
        }
    }
}

// =============================================================================
// LINKED RECORD COMMANDS
// =============================================================================

pub fn cmd_freight(ctx: &Context, action: FreightAction) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    match action {
        FreightAction::Add(args) => {
            let trip = ledger.add_freight(args.into_draft(ctx.numbers)?)?;
            if trip.carrier_name.is_none() {
                tracing::warn!(carrier = %trip.carrier_id, "freight carrier not found, name left empty");
            }
            report_added(ctx, FreightRecord::KIND, trip.id)
        }
        FreightAction::Remove { id } => remove_record::<FreightRecord>(ctx, &mut ledger, id),
        FreightAction::List { search } => {
            let rows = ledger.search::<FreightRecord>(search.as_deref().unwrap_or_default());
            print_rows(ctx, ReportKind::Freight.title(), &rows)
        }
    }
}

pub fn cmd_transaction(ctx: &Context, action: TransactionAction) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    match action {
        TransactionAction::Add(args) => {
            let tx = ledger.add_transaction(args.into_draft(ctx.numbers)?)?;
            if tx.supplier_name.is_none() {
                tracing::warn!(supplier = %tx.supplier_id, "transaction supplier not found, name left empty");
            }
            report_added(ctx, Transaction::KIND, tx.id)
        }
        TransactionAction::Remove { id } => remove_record::<Transaction>(ctx, &mut ledger, id),
        TransactionAction::List { search } => {
            let rows = ledger.search::<Transaction>(search.as_deref().unwrap_or_default());
            print_rows(ctx, ReportKind::Transactions.title(), &rows)
        }
    }
}

pub fn cmd_harvest(ctx: &Context, action: HarvestAction) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    match action {
        HarvestAction::Add(args) => {
            let intake = ledger.add_harvest(args.into_draft(ctx.numbers)?)?;
            report_added(ctx, HarvestIntake::KIND, intake.id)
        }
        HarvestAction::Remove { id } => remove_record::<HarvestIntake>(ctx, &mut ledger, id),
        HarvestAction::List(dims) => {
            let rows = ledger.harvest_filtered(&dims.to_filter());
            if ctx.json_mode {
                return print_json(&serde_json::json!({
                    "rows": rows,
                    "grandTotal": ledger.harvest_totals(),
                }));
            }
            print_rows(ctx, ReportKind::Harvest.title(), &rows)?;
            println!();
            let totals = ExportTable::from_rows(
                ReportKind::HarvestTotals.title(),
                &[ledger.harvest_totals()],
            )?;
            TextSink::new(std::io::stdout().lock()).print(&totals)
        }
    }
}

// =============================================================================
// TOTALS COMMAND
// =============================================================================

/// Show an aggregate view.
pub fn cmd_totals(ctx: &Context, view: TotalsView) -> Result<(), LedgerError> {
    let ledger = open_ledger(ctx)?;
    let kind = match view {
        TotalsView::Freight => ReportKind::FreightTotals,
        TotalsView::Transactions => ReportKind::TransactionTotals,
        TotalsView::Harvest => ReportKind::HarvestTotals,
    };

    if ctx.json_mode {
        return match view {
            TotalsView::Freight => print_json(&ledger.freight_totals()),
            TotalsView::Transactions => print_json(&ledger.transaction_totals()),
            TotalsView::Harvest => print_json(&ledger.harvest_totals()),
        };
    }

    let mut sink = TextSink::new(std::io::stdout().lock());
    report::export_report(&mut sink, &ledger, kind, &ReportScope::all())?;
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export a report table to a file or stdout.
pub fn cmd_export(
    ctx: &Context,
    kind: ReportKind,
    output: Option<&Path>,
    format: ExportFormat,
    scope: &ReportScope,
) -> Result<(), LedgerError> {
    let ledger = open_ledger(ctx)?;

    let Some(output) = output else {
        let stdout = std::io::stdout().lock();
        return match format {
            ExportFormat::Text => report::export_report(&mut TextSink::new(stdout), &ledger, kind, scope),
            ExportFormat::Json => report::export_report(&mut JsonSink::new(stdout), &ledger, kind, scope),
        }
        .map(|_| ());
    };

    let validated_output = validate_output_path(output)?;
    let file = File::create(&validated_output)
        .map_err(|e| LedgerError::IoError(format!("Create file: {}", e)))?;
    let writer = BufWriter::new(file);

    let (table, mut writer) = match format {
        ExportFormat::Text => {
            let mut sink = TextSink::new(writer);
            let table = report::export_report(&mut sink, &ledger, kind, scope)?;
            (table, sink.into_inner())
        }
        ExportFormat::Json => {
            let mut sink = JsonSink::new(writer);
            let table = report::export_report(&mut sink, &ledger, kind, scope)?;
            (table, sink.into_inner())
        }
    };
    writer
        .flush()
        .map_err(|e| LedgerError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} rows to {:?}", table.len(), validated_output);
    Ok(())
}

// =============================================================================
// BACKUP / RESTORE COMMANDS
// =============================================================================

/// Write a backup archive of the whole ledger.
pub fn cmd_backup(ctx: &Context, output: &Path) -> Result<(), LedgerError> {
    let validated_output = validate_output_path(output)?;
    let ledger = open_ledger(ctx)?;
    let bytes = ledger.backup()?;

    std::fs::write(&validated_output, &bytes)
        .map_err(|e| LedgerError::IoError(format!("Write file: {}", e)))?;

    let digest = archive_digest(&bytes);
    if ctx.json_mode {
        return print_json(&serde_json::json!({
            "output": validated_output.to_string_lossy(),
            "bytes": bytes.len(),
            "blake3": digest,
        }));
    }
    println!("Backed up {} records ({} bytes) to {:?}", ledger.counts().total(), bytes.len(), validated_output);
    println!("BLAKE3: {}", digest);
    Ok(())
}

/// Replace the whole ledger with a backup archive.
pub fn cmd_restore(ctx: &Context, input: &Path, digest: Option<&str>) -> Result<(), LedgerError> {
    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_ARCHIVE_SIZE as u64)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| LedgerError::IoError(format!("Read file: {}", e)))?;

    if let Some(expected) = digest {
        if !verify_archive_digest(&data, expected) {
            return Err(LedgerError::InvalidRecord(format!(
                "Archive digest mismatch: expected {}, got {}",
                expected,
                archive_digest(&data)
            )));
        }
        tracing::debug!("archive digest verified");
    }

    let mut ledger = open_ledger(ctx)?;
    let counts = ledger.restore(&data)?;

    if ctx.json_mode {
        return print_json(&counts);
    }
    println!(
        "Restored {} records: {} parcels, {} suppliers, {} carriers, {} freight, {} transactions, {} harvest",
        counts.total(),
        counts.parcels,
        counts.suppliers,
        counts.carriers,
        counts.freight,
        counts.transactions,
        counts.harvest
    );
    Ok(())
}

// =============================================================================
// COMPACT COMMAND
// =============================================================================

/// Reclaim unused space in the database.
pub fn cmd_compact(ctx: &Context) -> Result<(), LedgerError> {
    let mut ledger = open_ledger(ctx)?;
    let reclaimed = ledger.compact()?;

    if ctx.json_mode {
        return print_json(&serde_json::json!({
            "backend": ledger.backend_name(),
            "reclaimed": reclaimed,
        }));
    }
    if reclaimed {
        println!("Compacted {} database", ledger.backend_name());
    } else {
        println!("Nothing to compact in {} database", ledger.backend_name());
    }
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty database.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), LedgerError> {
    let storage = &ctx.storage;
    let path = &storage.database;

    if storage.backend == Backend::Memory {
        println!("Memory backend keeps nothing on disk; nothing to initialize");
        return Ok(());
    }

    if path.exists() {
        if !force {
            return Err(LedgerError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        let removed = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        removed.map_err(|e| LedgerError::IoError(format!("Remove existing database: {}", e)))?;
        tracing::info!(path = %path.display(), "existing database removed");
    }

    let ledger = storage.open()?;
    println!(
        "Initialized new {} database at {:?}",
        ledger.backend_name(),
        path
    );
    Ok(())
}

// =============================================================================
// HASH COMMAND
// =============================================================================

/// Print the BLAKE3 digest of the ledger's backup archive.
pub fn cmd_hash(ctx: &Context) -> Result<(), LedgerError> {
    let ledger = open_ledger(ctx)?;
    let digest = archive_digest(&ledger.backup()?);

    if ctx.json_mode {
        return print_json(&serde_json::json!({ "blake3": digest }));
    }
    println!("BLAKE3: {}", digest);
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
