//! Batch assembly: raw records in, typed batch out

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use super::config::PipelineConfig;
use super::error::{PipelineError, PipelineResult};
use super::keys::{KeyPaths, partition_dates};
use crate::catalog::SchemaCatalog;
use crate::coercion::{Batch, CoercionReport, Column, SchemaCoercer, Value};
use crate::flatten::{FlatRecord, Flattener, RawRecord, RawTable, decode_stream_event};
use crate::inference::{InferredSchema, SchemaInferrer};
use crate::naming::{NameNormalizer, prune_table, reconcile_schema};
use crate::schema::{Schema, TypeTag};

/// Partition column derived from the updated-at attribute
pub const DATE_COLUMN: &str = "date";
/// Processing instant of the batch
pub const TIMESTAMP_EXTRACTED_COLUMN: &str = "timestamp_extracted";
/// Optional origin tag
pub const EVENT_SOURCE_COLUMN: &str = "event_source";

/// Stages of batch assembly, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyStage {
    Flatten,
    Normalize,
    Prune,
    Schema,
    Coerce,
    Bookkeeping,
}

impl AssemblyStage {
    pub fn name(&self) -> &'static str {
        match self {
            AssemblyStage::Flatten => "flatten",
            AssemblyStage::Normalize => "normalize",
            AssemblyStage::Prune => "prune",
            AssemblyStage::Schema => "schema",
            AssemblyStage::Coerce => "coerce",
            AssemblyStage::Bookkeeping => "bookkeeping",
        }
    }
}

/// Where the batch schema came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    Catalog,
    Inferred,
    /// Nothing to type: the batch had no records
    Empty,
}

/// A typed batch ready for a columnar sink
#[derive(Debug, Clone)]
pub struct AssembledBatch {
    pub batch_id: Uuid,
    pub table_name: String,
    pub batch: Batch,
    /// Effective schema, including bookkeeping columns
    pub schema: Schema,
    pub schema_source: SchemaSource,
    /// Per-column inference detail in auto-schema mode
    pub inference: Option<InferredSchema>,
    pub report: CoercionReport,
    pub processed_at: DateTime<Utc>,
}

impl AssembledBatch {
    pub fn row_count(&self) -> usize {
        self.batch.row_count()
    }
}

/// Drives flatten, normalise, prune, schema and coerce for one batch
pub struct BatchAssembler {
    config: PipelineConfig,
    catalog: Arc<dyn SchemaCatalog>,
    flattener: Flattener,
    normalizer: NameNormalizer,
    inferrer: SchemaInferrer,
    coercer: SchemaCoercer,
    key_paths: KeyPaths,
}

impl BatchAssembler {
    /// Create an assembler after validating the configuration
    pub fn new(config: PipelineConfig, catalog: impl SchemaCatalog + 'static) -> PipelineResult<Self> {
        Self::with_shared_catalog(config, Arc::new(catalog))
    }

    /// Create an assembler over a catalog shared with other assemblers
    pub fn with_shared_catalog(
        config: PipelineConfig,
        catalog: Arc<dyn SchemaCatalog>,
    ) -> PipelineResult<Self> {
        config.validate().map_err(PipelineError::Config)?;
        let separator = config
            .separator_char()
            .ok_or_else(|| PipelineError::Config("Separator must be a single character".into()))?;

        let sep = config.flatten.separator.as_str();
        let key_paths = KeyPaths {
            image_prefix: format!("{}{}", config.flatten.prefix, config.layout.image_prefix(sep)),
            keys_prefix: format!("{}{}", config.flatten.prefix, config.layout.keys_prefix(sep)),
            separator: sep.to_string(),
        };

        Ok(Self {
            flattener: Flattener::with_config(config.flatten.clone()),
            normalizer: NameNormalizer::with_separator(separator),
            inferrer: SchemaInferrer::with_config(config.inference.clone()),
            coercer: SchemaCoercer::new(),
            key_paths,
            catalog,
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Assemble a batch, stamping it with the current time
    pub fn assemble(&self, records: &[RawRecord]) -> PipelineResult<AssembledBatch> {
        self.assemble_at(records, Utc::now())
    }

    /// Decode a Kinesis-style event and assemble its records
    pub fn assemble_stream_event(&self, event: &serde_json::Value) -> PipelineResult<AssembledBatch> {
        let records = decode_stream_event(event)?;
        self.assemble(&records)
    }

    /// Assemble a batch with an explicit processing instant
    pub fn assemble_at(
        &self,
        records: &[RawRecord],
        processed_at: DateTime<Utc>,
    ) -> PipelineResult<AssembledBatch> {
        let batch_id = Uuid::new_v4();
        let _span = info_span!(
            "assemble_batch",
            batch_id = %batch_id,
            table = %self.config.table_name
        )
        .entered();
        let start = Instant::now();

        info!(records = records.len(), "Starting batch assembly");

        if records.is_empty() {
            info!("Empty batch, nothing to assemble");
            return Ok(AssembledBatch {
                batch_id,
                table_name: self.config.table_name.clone(),
                batch: Batch::new(0),
                schema: Schema::new(),
                schema_source: SchemaSource::Empty,
                inference: None,
                report: CoercionReport::default(),
                processed_at,
            });
        }

        let flat = self.flatten_records(records)?;

        debug!(stage = AssemblyStage::Normalize.name(), "Normalising column names");
        let mut table = RawTable::from_records(&flat);
        self.normalizer.normalize_table(&mut table);
        let updated_at_key = format!(
            "{}{}",
            self.key_paths.image_prefix, self.config.updated_at_attribute
        );
        let dates = partition_dates(
            &table,
            &self.normalizer,
            &updated_at_key,
            processed_at.date_naive(),
        );

        debug!(stage = AssemblyStage::Prune.name(), "Pruning columns");
        let mut pruning = prune_table(&mut table, &self.normalizer, self.config.drop_empty_columns);

        debug!(stage = AssemblyStage::Schema.name(), "Resolving schema");
        let (schema, schema_source, inference) = self.resolve_schema(&table)?;
        let schema = reconcile_schema(&schema, &table, &mut pruning);

        debug!(stage = AssemblyStage::Coerce.name(), "Coercing columns");
        let (mut batch, mut report) = self.coercer.coerce(&table, &schema);
        report.pruning = pruning;

        debug!(stage = AssemblyStage::Bookkeeping.name(), "Appending bookkeeping columns");
        self.append_bookkeeping(&mut batch, dates, processed_at);
        report.missing_columns.retain(|name| !batch.contains(name));

        let schema = batch.schema();
        info!(
            rows = batch.row_count(),
            columns = batch.column_count(),
            schema_source = ?schema_source,
            degraded = report.degraded_columns.len(),
            defaulted = report.total_defaulted(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Batch assembled"
        );

        Ok(AssembledBatch {
            batch_id,
            table_name: self.config.table_name.clone(),
            batch,
            schema,
            schema_source,
            inference,
            report,
            processed_at,
        })
    }

    /// Assemble independent pages concurrently
    #[cfg(feature = "parallel")]
    pub fn assemble_many(&self, pages: &[Vec<RawRecord>]) -> Vec<PipelineResult<AssembledBatch>> {
        use rayon::prelude::*;

        let processed_at = Utc::now();
        pages
            .par_iter()
            .map(|page| self.assemble_at(page, processed_at))
            .collect()
    }

    /// Assemble independent pages one after another
    #[cfg(not(feature = "parallel"))]
    pub fn assemble_many(&self, pages: &[Vec<RawRecord>]) -> Vec<PipelineResult<AssembledBatch>> {
        let processed_at = Utc::now();
        pages
            .iter()
            .map(|page| self.assemble_at(page, processed_at))
            .collect()
    }

    fn flatten_records(&self, records: &[RawRecord]) -> PipelineResult<Vec<FlatRecord>> {
        debug!(stage = AssemblyStage::Flatten.name(), "Flattening records");
        let partition_key = self.config.partition_key.as_str();
        let mut with_key = 0;
        let flat: Vec<FlatRecord> = records
            .iter()
            .map(|record| {
                let mut flat = self.flattener.flatten_source(&self.config.layout, record);
                if self.key_paths.copy_partition_key(&mut flat, partition_key) {
                    with_key += 1;
                }
                flat
            })
            .collect();

        if with_key == 0 {
            return Err(PipelineError::MissingPartitionKey {
                partition_key: partition_key.to_string(),
                records: records.len(),
            });
        }
        if with_key < records.len() {
            warn!(
                partition_key,
                missing = records.len() - with_key,
                "Some records lack the partition key"
            );
        }
        Ok(flat)
    }

    fn resolve_schema(
        &self,
        table: &RawTable,
    ) -> PipelineResult<(Schema, SchemaSource, Option<InferredSchema>)> {
        let table_name = &self.config.table_name;
        match self.catalog.get_schema(table_name)? {
            Some(declared) => {
                debug!(columns = declared.len(), "Using catalog schema");
                Ok((
                    self.normalizer.normalize_schema(&declared),
                    SchemaSource::Catalog,
                    None,
                ))
            }
            None if self.config.auto_schema => {
                info!(table = %table_name, "No catalog schema, inferring from batch");
                let inferred = self.inferrer.infer_table(table);
                Ok((inferred.schema.clone(), SchemaSource::Inferred, Some(inferred)))
            }
            None => Err(PipelineError::SchemaNotFound(table_name.clone())),
        }
    }

    fn append_bookkeeping(
        &self,
        batch: &mut Batch,
        dates: Vec<chrono::NaiveDate>,
        processed_at: DateTime<Utc>,
    ) {
        let rows = batch.row_count();

        if batch.contains(DATE_COLUMN) {
            debug!("Batch already has a date column, keeping it as partition value");
        } else {
            batch.push_column(Column::new(
                DATE_COLUMN,
                TypeTag::Date,
                dates.into_iter().map(Value::Date).collect(),
            ));
        }

        batch.push_column(Column::new(
            TIMESTAMP_EXTRACTED_COLUMN,
            TypeTag::Timestamp,
            vec![Value::Timestamp(processed_at); rows],
        ));

        if let Some(source) = &self.config.event_source {
            batch.push_column(Column::new(
                EVENT_SOURCE_COLUMN,
                TypeTag::String,
                vec![Value::String(source.clone()); rows],
            ));
        }
    }
}
