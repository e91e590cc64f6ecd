//! # Reports
//!
//! Turns ledger collections and aggregates into export tables, and renders
//! tables as aligned text or JSON.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::io::Write;
use zafra_core::{
    Carrier, ExportTable, FreightRecord, HarvestFilter, LandParcel, Ledger, LedgerError,
    PrintSink, Supplier, Transaction, export_rows,
};

// =============================================================================
// REPORT KINDS
// =============================================================================

/// What a report lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    Parcels,
    Suppliers,
    Carriers,
    Freight,
    Transactions,
    Harvest,
    FreightTotals,
    TransactionTotals,
    HarvestTotals,
}

impl ReportKind {
    /// Table title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Parcels => "Land parcels",
            Self::Suppliers => "Suppliers",
            Self::Carriers => "Carriers",
            Self::Freight => "Freight",
            Self::Transactions => "Transactions",
            Self::Harvest => "Harvest intake",
            Self::FreightTotals => "Freight totals by carrier",
            Self::TransactionTotals => "Balance by supplier",
            Self::HarvestTotals => "Harvest grand total",
        }
    }
}

/// What narrows a report.
///
/// `search` applies to the five searchable collections, `harvest` to the
/// harvest listing. Totals reports ignore both.
#[derive(Debug, Clone, Default)]
pub struct ReportScope {
    pub search: String,
    pub harvest: HarvestFilter,
}

impl ReportScope {
    /// No narrowing at all.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Narrow collection reports by a free-text term.
    #[must_use]
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: term.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_harvest(mut self, filter: HarvestFilter) -> Self {
        self.harvest = filter;
        self
    }
}

/// Export the report `kind`, narrowed by `scope`, to `sink`.
pub fn export_report(
    sink: &mut dyn PrintSink,
    ledger: &Ledger,
    kind: ReportKind,
    scope: &ReportScope,
) -> Result<ExportTable, LedgerError> {
    let term = scope.search.as_str();
    let title = kind.title();
    match kind {
        ReportKind::Parcels => export_rows(sink, title, &ledger.search::<LandParcel>(term)),
        ReportKind::Suppliers => export_rows(sink, title, &ledger.search::<Supplier>(term)),
        ReportKind::Carriers => export_rows(sink, title, &ledger.search::<Carrier>(term)),
        ReportKind::Freight => export_rows(sink, title, &ledger.search::<FreightRecord>(term)),
        ReportKind::Transactions => {
            export_rows(sink, title, &ledger.search::<Transaction>(term))
        }
        ReportKind::Harvest => {
            export_rows(sink, title, &ledger.harvest_filtered(&scope.harvest))
        }
        ReportKind::FreightTotals => export_rows(sink, title, &ledger.freight_totals()),
        ReportKind::TransactionTotals => export_rows(sink, title, &ledger.transaction_totals()),
        ReportKind::HarvestTotals => export_rows(sink, title, &[ledger.harvest_totals()]),
    }
}

/// Build the report table without printing it anywhere.
pub fn build_table(
    ledger: &Ledger,
    kind: ReportKind,
    scope: &ReportScope,
) -> Result<ExportTable, LedgerError> {
    let mut kept: Vec<ExportTable> = Vec::new();
    export_report(&mut kept, ledger, kind, scope)
}

// =============================================================================
// SINKS
// =============================================================================

/// Output format of a rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
}

/// Renders tables as aligned plain-text columns.
#[derive(Debug)]
pub struct TextSink<W: Write> {
    out: W,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PrintSink for TextSink<W> {
    fn print(&mut self, table: &ExportTable) -> Result<(), LedgerError> {
        let text = render_text(table);
        self.out
            .write_all(text.as_bytes())
            .map_err(|e| LedgerError::IoError(format!("Cannot write table: {}", e)))
    }
}

/// Renders each table as one pretty-printed JSON document.
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> PrintSink for JsonSink<W> {
    fn print(&mut self, table: &ExportTable) -> Result<(), LedgerError> {
        serde_json::to_writer_pretty(&mut self.out, table)
            .map_err(|e| LedgerError::SerializationError(e.to_string()))?;
        writeln!(self.out).map_err(|e| LedgerError::IoError(e.to_string()))
    }
}

/// Render a table as title, underline, header and rows.
#[must_use]
pub fn render_text(table: &ExportTable) -> String {
    let mut widths: Vec<usize> = table.columns.iter().map(|c| c.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&table.title);
    out.push('\n');
    out.push_str(&"=".repeat(table.title.chars().count()));
    out.push('\n');

    if table.is_empty() {
        out.push_str("(no records)\n");
        return out;
    }

    out.push_str(&line(table.columns.as_slice()));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row.as_slice()));
        out.push('\n');
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use zafra_core::{
        CarrierDraft, FreightDraft, HarvestDraft, RecordId, SupplierDraft, TransactionDraft,
    };

    fn ledger() -> Ledger {
        let mut ledger = Ledger::in_memory();
        let carrier = ledger
            .add_carrier(CarrierDraft {
                name: "Transportes Sur".into(),
                plate: "SBA 1234".into(),
                ..CarrierDraft::default()
            })
            .expect("carrier");
        ledger
            .add_carrier(CarrierDraft {
                name: "Fletes Norte".into(),
                ..CarrierDraft::default()
            })
            .expect("carrier");
        ledger
            .add_freight(FreightDraft {
                product: "Soja".into(),
                distance_km: 100.0,
                rate_per_km: 2.0,
                carrier_id: carrier.id,
                ..FreightDraft::default()
            })
            .expect("freight");
        ledger
    }

    #[test]
    fn search_narrows_collection_reports() {
        let ledger = ledger();
        let table = build_table(&ledger, ReportKind::Carriers, &ReportScope::search("norte")).expect("report");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][0], "Fletes Norte");
        assert!(!table.columns.contains(&"id".to_string()));
    }

    #[test]
    fn totals_report_skips_empty_parents() {
        let ledger = ledger();
        let table = build_table(&ledger, ReportKind::FreightTotals, &ReportScope::search("ignored")).expect("report");
        assert_eq!(table.len(), 1);
        assert_eq!(table.title, "Freight totals by carrier");
    }

    #[test]
    fn harvest_totals_is_one_row() {
        let ledger = Ledger::in_memory();
        let table = build_table(&ledger, ReportKind::HarvestTotals, &ReportScope::all()).expect("report");
        assert_eq!(table.len(), 1);
        assert!(table.rows[0].iter().all(|cell| cell == "0"));
    }

    #[test]
    fn harvest_report_follows_dimensions_but_totals_do_not() {
        let mut ledger = Ledger::in_memory();
        for (parcel, weight) in [(1, 1000.0), (2, 4000.0)] {
            ledger
                .add_harvest(HarvestDraft {
                    parcel_id: RecordId(parcel),
                    supplier_id: RecordId(10),
                    carrier_id: RecordId(20),
                    product: "Soja".into(),
                    incoming_weight_kg: weight,
                    ..HarvestDraft::default()
                })
                .expect("harvest");
        }
        let scope = ReportScope::all().with_harvest(HarvestFilter::any().parcel(RecordId(2)));

        let listing = build_table(&ledger, ReportKind::Harvest, &scope).expect("report");
        let weight = listing
            .columns
            .iter()
            .position(|c| c == "incomingWeightKg")
            .expect("column");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.rows[0][weight], "4000");

        let totals = build_table(&ledger, ReportKind::HarvestTotals, &scope).expect("report");
        let total = totals
            .columns
            .iter()
            .position(|c| c == "totalIncomingWeightKg")
            .expect("column");
        assert_eq!(totals.rows[0][total], "5000");
    }

    #[test]
    fn balance_report_lists_supplier() {
        let mut ledger = Ledger::in_memory();
        let supplier = ledger
            .add_supplier(SupplierDraft {
                name: "Agro Insumos".into(),
                ..SupplierDraft::default()
            })
            .expect("supplier");
        ledger
            .add_transaction(TransactionDraft {
                supplier_id: supplier.id,
                credits: 100.0,
                payments: 30.0,
                ..TransactionDraft::default()
            })
            .expect("transaction");

        let table = build_table(&ledger, ReportKind::TransactionTotals, &ReportScope::all()).expect("report");
        let balance = table.columns.iter().position(|c| c == "balance").expect("column");
        assert_eq!(table.rows[0][balance], "70");
    }

    #[test]
    fn text_sink_aligns_columns() {
        let table = ExportTable {
            title: "Carriers".into(),
            columns: vec!["name".into(), "plate".into()],
            rows: vec![
                vec!["A".into(), "X1".into()],
                vec!["Longer".into(), "".into()],
            ],
        };
        let mut sink = TextSink::new(Vec::new());
        sink.print(&table).expect("print");
        let text = String::from_utf8(sink.into_inner()).expect("utf8");

        assert_eq!(
            text,
            "Carriers\n========\nname    plate\nA       X1\nLonger\n"
        );
    }

    #[test]
    fn text_sink_marks_empty_tables() {
        let table = ExportTable {
            title: "Harvest intake".into(),
            columns: vec![],
            rows: vec![],
        };
        assert!(render_text(&table).ends_with("(no records)\n"));
    }

    #[test]
    fn json_sink_writes_table() {
        let ledger = ledger();
        let mut sink = JsonSink::new(Vec::new());
        export_report(&mut sink, &ledger, ReportKind::Freight, &ReportScope::all()).expect("export");

        let value: serde_json::Value =
            serde_json::from_slice(&sink.into_inner()).expect("valid json");
        assert_eq!(value["title"], "Freight");
        assert_eq!(value["rows"][0][0], "Soja");
    }

    #[test]
    fn kinds_use_kebab_case() {
        let kind: ReportKind = serde_json::from_str("\"freight-totals\"").expect("kind");
        assert_eq!(kind, ReportKind::FreightTotals);
    }
}
