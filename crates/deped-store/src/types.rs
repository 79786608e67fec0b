//! Data types for stored documents.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// DepEd issuance category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    MemoCircular,
    DepartmentOrder,
    Policy,
    Guidelines,
    #[default]
    Other,
}

impl DocumentType {
    pub const ALL: [DocumentType; 5] = [
        DocumentType::MemoCircular,
        DocumentType::DepartmentOrder,
        DocumentType::Policy,
        DocumentType::Guidelines,
        DocumentType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemoCircular => "memo_circular",
            Self::DepartmentOrder => "department_order",
            Self::Policy => "policy",
            Self::Guidelines => "guidelines",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("unknown document type: {}", s))
    }
}

/// Whether a stored document is eligible for indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Active,
    Archived,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub(crate) fn from_column(s: &str) -> Self {
        match s {
            "archived" => Self::Archived,
            _ => Self::Active,
        }
    }
}

/// A document row from the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub document_type: DocumentType,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl StoredDocument {
    /// Parse metadata JSON into a map.
    pub fn metadata_map(&self) -> HashMap<String, serde_json::Value> {
        match &self.metadata {
            Some(v) => serde_json::from_value(v.clone()).unwrap_or_default(),
            None => HashMap::new(),
        }
    }
}

/// Ingestion input: text has already been extracted from its source format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub document_type: DocumentType,
}

/// Options for adding a document.
#[derive(Debug, Clone, Default)]
pub struct AddDocumentOptions {
    pub metadata: Option<serde_json::Value>,
    pub content_hash: Option<String>,
    pub created_at: Option<i64>,
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_documents: i64,
    pub active_documents: i64,
    pub documents_by_type: Vec<TypeCount>,
    pub db_path: String,
    pub db_size_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeCount {
    pub document_type: DocumentType,
    pub count: i64,
}
