//! Price-feed contract schema
//!
//! Documents hold a `contracts` object keyed by contract address. Each
//! contract carries top-level settings plus `billing`, `config` and
//! `marketing` sections; the mapping below flattens them into snake_case
//! fields. Missing values are kept as JSON null so that a field appearing or
//! disappearing is itself a change.

use serde_json::Value;

use crate::document::{value_or_null, Document};
use crate::extract::EntityExtractor;
use crate::models::{Commit, EntityFields, EntitySnapshot};

/// Output field name and its path inside a contract object
const CONTRACT_FIELDS: &[(&str, &[&str])] = &[
    ("status", &["status"]),
    ("contract_version", &["contractVersion"]),
    ("max_gas_price_per_gwei", &["billing", "maxGasPriceGwei"]),
    ("micro_link_per_eth", &["billing", "microLinkPerEth"]),
    ("observation_payment_link_gwei", &["billing", "observationPaymentLinkGwei"]),
    ("reasonable_gas_price_gwei", &["billing", "reasonableGasPriceGwei"]),
    ("transmission_payment_link_gwei", &["billing", "transmissionPaymentLinkGwei"]),
    ("bad_epoch_timeout", &["config", "badEpochTimeout"]),
    ("max_contract_value_age", &["config", "maxContractValueAge"]),
    ("max_faulty_node_count", &["config", "maxFaultyNodeCount"]),
    ("max_round_count", &["config", "maxRoundCount"]),
    ("observation_grace_period", &["config", "observationGracePeriod"]),
    ("relative_deviation_threshold_ppb", &["config", "relativeDeviationThresholdPPB"]),
    ("resend_interval", &["config", "resendInterval"]),
    ("round_interval", &["config", "roundInterval"]),
    ("transmission_stage_timeout", &["config", "transmissionStageTimeout"]),
    ("transmission_stages", &["config", "transmissionStages"]),
    ("decimals", &["decimals"]),
    ("marketing_category", &["marketing", "category"]),
    ("marketing_history", &["marketing", "history"]),
    ("marketing_path", &["marketing", "path"]),
    ("min_submission_value", &["minSubmissionValue"]),
    ("max_submission_value", &["maxSubmissionValue"]),
    ("deviation_threshold", &["deviationThreshold"]),
    ("heartbeat", &["heartbeat"]),
    ("minimum_answers", &["minimumAnswers"]),
    ("payment", &["payment"]),
];

/// Extractor for the `contracts` schema
#[derive(Debug, Clone, Copy, Default)]
pub struct ContractExtractor;

impl ContractExtractor {
    /// Maps a single contract object to its fields
    pub fn contract_fields(config: &Value) -> EntityFields {
        let mut fields = EntityFields::new();

        // Feed names use " / " in the source; the display name uses "-"
        let github_name = value_or_null(config, &["name"]);
        let name = match github_name.as_str() {
            Some(raw) => Value::String(raw.replace(" / ", "-")),
            None => Value::Null,
        };
        fields.insert("name".to_string(), name);
        fields.insert("github_name".to_string(), github_name);

        for (field, path) in CONTRACT_FIELDS {
            fields.insert(field.to_string(), value_or_null(config, path));
        }
        fields
    }
}

impl EntityExtractor for ContractExtractor {
    fn extract(&self, document: &Document, commit: &Commit) -> Vec<EntitySnapshot> {
        let Some(contracts) = document.object_at(&["contracts"]) else {
            return Vec::new();
        };

        contracts
            .iter()
            .map(|(address, config)| {
                EntitySnapshot::new(address.clone(), Self::contract_fields(config), commit.clone())
            })
            .collect()
    }
}
