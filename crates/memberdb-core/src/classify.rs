// LLM-backed column classification

use std::collections::BTreeMap;
use std::sync::Arc;

use memberdb_commons::{AppError, AppResult, ColumnId, Membership, MetadataId};

use crate::repos::MetadataRepository;
use crate::tenant::TenantConnector;

/// Classification result: class label to the sample strings it covers.
pub type GroupedLabels = BTreeMap<String, Vec<String>>;

/// Samples drawn per classification request unless the caller asks
/// otherwise.
pub const DEFAULT_SAMPLE_COUNT: u32 = 10;

/// Hard cap on caller-requested sample counts.
pub const MAX_SAMPLE_COUNT: u32 = 100;

/// The opaque classification capability. Takes a finished prompt, returns
/// the structured grouping. The production implementation in
/// [`crate::oracle`] speaks an OpenAI-compatible completion API.
#[async_trait::async_trait]
pub trait ClassificationOracle: Send + Sync {
    async fn classify(&self, prompt: &str) -> AppResult<GroupedLabels>;
}

/// Resolves a snapshot column, samples its live values and forwards them
/// to the classification oracle.
pub struct ClassificationBridge {
    metadata: Arc<dyn MetadataRepository>,
    connector: Arc<dyn TenantConnector>,
    oracle: Arc<dyn ClassificationOracle>,
}

impl ClassificationBridge {
    pub fn new(
        metadata: Arc<dyn MetadataRepository>,
        connector: Arc<dyn TenantConnector>,
        oracle: Arc<dyn ClassificationOracle>,
    ) -> Self {
        Self {
            metadata,
            connector,
            oracle,
        }
    }

    /// Classify up to `sample_count` live values of the column identified
    /// by `column_id` within `metadata_id`'s snapshot.
    ///
    /// The oracle's grouping is returned unmodified; oracle failures are
    /// not retried here; retry policy belongs to the deployment layer.
    pub async fn classify(
        &self,
        metadata_id: MetadataId,
        column_id: ColumnId,
        owner: &Membership,
        sample_count: Option<u32>,
    ) -> AppResult<GroupedLabels> {
        let count = sample_count
            .unwrap_or(DEFAULT_SAMPLE_COUNT)
            .clamp(1, MAX_SAMPLE_COUNT);

        let (snapshot, db) = self
            .metadata
            .get_owned_with_db(metadata_id, owner.id)
            .await?
            .ok_or(AppError::MetadataNotFound)?;

        let (table, column) = snapshot
            .find_column(column_id)
            .ok_or(AppError::ColumnNotFound)?;

        let samples = self
            .connector
            .sample_column(&db, &table.table_name, &column.name, count)
            .await?;

        let prompt = build_prompt(&column.name, &column.data_type, &samples);
        self.oracle.classify(&prompt).await
    }
}

/// Renders the classification prompt around the sampled values.
fn build_prompt(column_name: &str, data_type: &str, samples: &[String]) -> String {
    let mut prompt = format!(
        "Classify the content of the database column \"{column_name}\" (declared type: {data_type}).\n\
         Group the sample values below into descriptive classes.\n\
         Respond with a JSON object mapping each class label to the list of sample strings that belong to it.\n\
         Every sample must appear in exactly one class.\n\nSamples:\n"
    );
    for sample in samples {
        prompt.push_str("- ");
        prompt.push_str(sample);
        prompt.push('\n');
    }
    prompt
}
