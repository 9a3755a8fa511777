//! Request and response bodies.

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::ApiError;

pub const GREETING: &str = "Hello from the Enrichment API!";

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct IndexResponse<'a> {
    pub message: &'static str,
    pub version: &'a str,
}

/// Body of `POST /enrich`.
///
/// Only a JSON object is accepted; arrays and scalars fail as data errors.
/// Unknown keys are ignored.
#[derive(Debug, Default)]
pub struct EnrichmentRequest {
    pub transaction_id: Option<String>,
}

impl<'de> Deserialize<'de> for EnrichmentRequest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EnrichmentRequestVisitor)
    }
}

struct EnrichmentRequestVisitor;

impl<'de> Visitor<'de> for EnrichmentRequestVisitor {
    type Value = EnrichmentRequest;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object with a transactionId")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut request = EnrichmentRequest::default();
        while let Some(key) = map.next_key::<String>()? {
            if key == "transactionId" {
                request.transaction_id = map.next_value::<Option<String>>()?;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(request)
    }
}

/// Successful `POST /enrich` response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub enriched_transaction: String,
}

impl EnrichmentResult {
    pub fn for_transaction(transaction_id: &str) -> Self {
        Self {
            enriched_transaction: format!("Enriched transaction {transaction_id}"),
        }
    }
}
