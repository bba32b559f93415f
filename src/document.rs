// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Registry document model.
//!
//! Field names follow the registry's wire format, which mixes snake_case
//! with a few camelCase keys (`importRequest`, `participantInn`).

use serde::{Deserialize, Serialize};

/// Document submitted to the registry's creation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: String,
    pub doc_status: String,
    pub doc_type: String,
    #[serde(rename = "importRequest")]
    pub import_request: bool,
    pub owner_inn: String,
    pub participant_inn: String,
    pub producer_inn: String,
    pub production_date: String,
    pub production_type: String,
    pub reg_date: String,
    pub reg_number: String,
    pub description: Description,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(rename = "participantInn")]
    pub participant_inn: String,
}

/// A product line of a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub certificate_document: String,
    pub certificate_document_date: String,
    pub certificate_document_number: String,
    pub owner_inn: String,
    pub producer_inn: String,
    pub production_date: String,
    pub tnved_code: String,
    pub uit_code: String,
    pub uitu_code: String,
}
