//! CSV-backed lead store
//!
//! Provides the single data access path for lead records: load everything,
//! append one. The backing file is an append-only table in insertion order;
//! every append is a read-modify-rewrite of the whole file, serialized
//! through an in-process writer lock so concurrent handlers cannot
//! interleave. Cross-process writers are not coordinated.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;
use tokio::task;

use crate::errors::{AppError, Result};
use crate::leads::Lead;
use crate::metrics;

/// Column header row of the persisted table
pub const CSV_HEADER: [&str; 6] = [
    "Date",
    "Company_Name",
    "Material_Category",
    "Quantity_Kg",
    "Contact_Info",
    "Status",
];

/// Repository for lead records persisted as a flat CSV table.
#[derive(Clone)]
pub struct LeadStore {
    path: Arc<PathBuf>,
    // Writer lock: append is read-modify-rewrite, so writers must serialize.
    write_lock: Arc<Mutex<()>>,
}

impl LeadStore {
    /// Create a store over the given data file path.
    ///
    /// The file is not created until the first append; a missing file reads
    /// as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all leads in insertion order.
    ///
    /// Returns an empty vector when the backing file does not exist, and a
    /// store error when the file exists but cannot be parsed under the
    /// expected schema.
    pub async fn load_all(&self) -> Result<Vec<Lead>> {
        let path = self.path.clone();
        task::spawn_blocking(move || read_records(&path))
            .await
            .map_err(|e| AppError::Internal {
                message: format!("store read task failed: {e}"),
            })?
    }

    /// Number of leads currently in the store
    pub async fn count(&self) -> Result<usize> {
        Ok(self.load_all().await?.len())
    }

    /// Append one lead, rewriting the whole store.
    ///
    /// Loads the current records, pushes the new one, and rewrites the file
    /// through a temp file and rename. Holding the writer lock across the
    /// read and the rewrite is what removes the lost-append race between
    /// concurrent handlers.
    pub async fn append(&self, lead: Lead) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let path = self.path.clone();
        let start = Instant::now();
        let total = task::spawn_blocking(move || -> Result<usize> {
            let mut records = read_records(&path)?;
            records.push(lead);
            write_records(&path, &records)?;
            Ok(records.len())
        })
        .await
        .map_err(|e| AppError::Internal {
            message: format!("store write task failed: {e}"),
        })??;

        metrics::record_store_rewrite(start.elapsed().as_secs_f64(), total);
        tracing::debug!(total, "Lead store rewritten");
        Ok(())
    }
}

/// Read every record from the backing file; missing file is an empty store.
fn read_records(path: &Path) -> Result<Vec<Lead>> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Serialize leads to the persisted representation: header row plus one row
/// per lead, values quoted as needed, UTF-8.
///
/// The CSV export endpoint reuses this, so export and persistence cannot
/// drift apart.
pub fn to_csv_bytes(records: &[Lead]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.into_inner().map_err(|e| AppError::Internal {
        message: format!("csv buffer flush failed: {e}"),
    })
}

/// Rewrite the backing file from scratch.
///
/// Writes to a sibling temp file and renames it over the target so readers
/// never observe a half-written table.
fn write_records(path: &Path, records: &[Lead]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, to_csv_bytes(records)?)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leads::{LeadStatus, MaterialCategory};
    use uuid::Uuid;

    fn temp_store() -> (LeadStore, PathBuf) {
        let path = std::env::temp_dir().join(format!("rawmat-store-{}.csv", Uuid::new_v4()));
        (LeadStore::new(&path), path)
    }

    fn sample_lead(company: &str, category: MaterialCategory, quantity: f64) -> Lead {
        Lead {
            date: "2026-08-07 09:30".to_string(),
            company_name: company.to_string(),
            material_category: category,
            quantity_kg: quantity,
            contact_info: "buyer@example.com".to_string(),
            status: LeadStatus::New,
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let (store, path) = temp_store();
        assert!(!path.exists());
        let leads = store.load_all().await.unwrap();
        assert!(leads.is_empty());
    }

    #[tokio::test]
    async fn test_append_then_load_roundtrip() {
        let (store, path) = temp_store();

        let lead = sample_lead("Acme", MaterialCategory::IndustrialMetals, 500.0);
        store.append(lead.clone()).await.unwrap();

        let leads = store.load_all().await.unwrap();
        assert_eq!(leads, vec![lead]);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_append_preserves_prior_rows_and_order() {
        let (store, path) = temp_store();

        store
            .append(sample_lead("First Co", MaterialCategory::Polymers, 10.0))
            .await
            .unwrap();
        store
            .append(sample_lead("Second Co", MaterialCategory::Other, 0.0))
            .await
            .unwrap();
        store
            .append(sample_lead("Third Co", MaterialCategory::Polymers, 25.5))
            .await
            .unwrap();

        let leads = store.load_all().await.unwrap();
        let companies: Vec<&str> = leads.iter().map(|l| l.company_name.as_str()).collect();
        assert_eq!(companies, vec!["First Co", "Second Co", "Third Co"]);
        assert_eq!(store.count().await.unwrap(), 3);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_quoted_fields_roundtrip() {
        let (store, path) = temp_store();

        let mut lead = sample_lead("Acme, Inc.", MaterialCategory::SpecialtyChemicals, 42.0);
        lead.contact_info = "ops@acme.example, +1 555 0100".to_string();
        store.append(lead.clone()).await.unwrap();

        let leads = store.load_all().await.unwrap();
        assert_eq!(leads[0].company_name, "Acme, Inc.");
        assert_eq!(leads[0].contact_info, "ops@acme.example, +1 555 0100");

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_header_row_written() {
        let (store, path) = temp_store();
        store
            .append(sample_lead("Acme", MaterialCategory::Other, 1.0))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let header = raw.lines().next().unwrap();
        assert_eq!(
            header,
            "Date,Company_Name,Material_Category,Quantity_Kg,Contact_Info,Status"
        );

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_empty_export_still_carries_header() {
        let bytes = to_csv_bytes(&[]).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "Date,Company_Name,Material_Category,Quantity_Kg,Contact_Info,Status\n"
        );
    }

    #[tokio::test]
    async fn test_unparseable_file_is_a_store_error() {
        let (store, path) = temp_store();
        std::fs::write(
            &path,
            "Date,Company_Name,Material_Category,Quantity_Kg,Contact_Info,Status\n\
             2026-08-07 09:30,Acme,Industrial Metals,lots,a@x.com,New\n",
        )
        .unwrap();

        let err = store.load_all().await.unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::StoreParse);

        std::fs::remove_file(path).unwrap();
    }

    #[tokio::test]
    async fn test_unknown_category_is_a_store_error() {
        let (store, path) = temp_store();
        std::fs::write(
            &path,
            "Date,Company_Name,Material_Category,Quantity_Kg,Contact_Info,Status\n\
             2026-08-07 09:30,Acme,Unobtainium,5,a@x.com,New\n",
        )
        .unwrap();

        assert!(store.load_all().await.is_err());

        std::fs::remove_file(path).unwrap();
    }
}
