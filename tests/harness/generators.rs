// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators.

use registry_rate_gate::{Description, Document, Product};

/// Generate a document whose identifiers are derived from `i`.
pub fn generate_document(i: usize) -> Document {
    let inn = format!("77{:08}", i);
    Document {
        doc_id: format!("doc-{}", i),
        doc_status: "NEW".to_string(),
        doc_type: "LP_INTRODUCE_GOODS".to_string(),
        import_request: i % 2 == 0,
        owner_inn: inn.clone(),
        participant_inn: inn.clone(),
        producer_inn: inn.clone(),
        production_date: "2023-01-01".to_string(),
        production_type: "OWN_PRODUCTION".to_string(),
        reg_date: "2023-01-02".to_string(),
        reg_number: format!("reg-{}", i),
        description: Description {
            participant_inn: inn.clone(),
        },
        products: vec![Product {
            certificate_document: "CONFORMITY_CERTIFICATE".to_string(),
            certificate_document_date: "2022-12-01".to_string(),
            certificate_document_number: format!("cert-{}", i),
            owner_inn: inn.clone(),
            producer_inn: inn,
            production_date: "2023-01-01".to_string(),
            tnved_code: "6401100000".to_string(),
            uit_code: format!("uit-{}", i),
            uitu_code: format!("uitu-{}", i),
        }],
    }
}

/// Generate a batch of distinct documents.
pub fn generate_documents(count: usize) -> Vec<Document> {
    (0..count).map(generate_document).collect()
}
