//! Generic CRUD API for admin resources.

use serde_json::Value;

use crate::client::CampusClient;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::types::{Envelope, PageQuery};

/// Resources managed through the admin dashboard.
pub const ADMIN_RESOURCES: [&str; 9] = [
    "Course",
    "Lesson",
    "Quiz",
    "Question",
    "Answer",
    "Enrollment",
    "Attendance",
    "Employee",
    "Progress",
];

/// CRUD client for one resource path, e.g. `Course`.
///
/// Payloads stay as raw JSON; field mapping is left to the caller.
pub struct ResourceApi {
    client: CampusClient,
    name: String,
}

impl ResourceApi {
    pub(crate) fn new(client: CampusClient, name: String) -> Self {
        let name = name.trim_matches('/').to_string();
        Self { client, name }
    }

    /// Resource path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// List one page of records.
    pub async fn list(&self, query: &PageQuery) -> Result<Envelope<Value>> {
        let request = ApiRequest::get(&self.name).query_pairs(query.to_pairs());
        self.client.send(request).await?.envelope()
    }

    /// Get a record by ID.
    pub async fn get(&self, id: &str) -> Result<Envelope<Value>> {
        self.client.get(&self.item_path(id)).await
    }

    /// Create a record.
    pub async fn create(&self, body: &Value) -> Result<Envelope<Value>> {
        self.client.post(&self.name, body).await
    }

    /// Update a record.
    pub async fn update(&self, id: &str, body: &Value) -> Result<Envelope<Value>> {
        self.client.put(&self.item_path(id), body).await
    }

    /// Delete a record.
    pub async fn delete(&self, id: &str) -> Result<Envelope<Value>> {
        self.client.delete(&self.item_path(id)).await
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.name, id)
    }
}
