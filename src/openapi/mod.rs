//! OpenAPI description download and reduction, plus the agent that drives
//! the described API.
//!
//! The reduced form keeps only what a planner needs to choose calls: the
//! base URL, the service description, and one entry per operation. `$ref`
//! values are left untouched so the reduced form stays small.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use crate::config::OPENAPI_PATH;
use crate::error::ClientError;

mod agent;
mod requests;

pub use agent::{OpenApiAgent, OpenApiAgentBuilder};
pub use requests::{request_tool, RequestsWrapper};

/// HTTP verbs the agent may be allowed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get    => "GET",
            HttpMethod::Post   => "POST",
            HttpMethod::Put    => "PUT",
            HttpMethod::Patch  => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Name of the agent tool that issues this method.
    pub fn tool_name(&self) -> String {
        format!("requests_{}", self.as_str().to_ascii_lowercase())
    }

    /// Case-insensitive; `None` for verbs outside the allow-list
    /// (`head`, `options`, `trace`) and non-verb path item keys.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get"    => Some(HttpMethod::Get),
            "post"   => Some(HttpMethod::Post),
            "put"    => Some(HttpMethod::Put),
            "patch"  => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _        => None,
        }
    }

    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get    => reqwest::Method::GET,
            HttpMethod::Post   => reqwest::Method::POST,
            HttpMethod::Put    => reqwest::Method::PUT,
            HttpMethod::Patch  => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of the described API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub method:  HttpMethod,
    pub path:    String,
    pub summary: Option<String>,
    /// Reduced operation object: description, required parameters,
    /// request body and the 200 response.
    pub docs:    Value,
}

impl OperationDescriptor {
    /// `"GET /tickets"`
    pub fn name(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

impl std::fmt::Display for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.summary {
            Some(summary) => write!(f, "{}: {}", self.name(), summary),
            None          => write!(f, "{}", self.name()),
        }
    }
}

/// Reduced, read-only API description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescription {
    pub servers:     Vec<String>,
    pub description: String,
    pub endpoints:   Vec<OperationDescriptor>,
}

impl ServiceDescription {
    /// First declared server.
    pub fn base_url(&self) -> Option<&str> {
        self.servers.first().map(|s| s.as_str())
    }

    pub fn endpoint(&self, method: HttpMethod, path: &str) -> Option<&OperationDescriptor> {
        self.endpoints.iter().find(|e| e.method == method && e.path == path)
    }
}

/// Reduces a raw OpenAPI document. Paths and methods keep document order.
pub fn reduce_openapi_spec(spec: &Value) -> Result<ServiceDescription, ClientError> {
    let paths = spec.get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| ClientError::InvalidDescription("document has no `paths` object".to_string()))?;

    let servers = spec.get("servers")
        .and_then(Value::as_array)
        .map(|servers| {
            servers.iter()
                .filter_map(|s| s.get("url").and_then(Value::as_str))
                .map(|s| s.trim_end_matches('/').to_string())
                .collect()
        })
        .unwrap_or_default();

    let description = spec.pointer("/info/description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let mut endpoints = Vec::new();
    for (route, item) in paths {
        let Some(item) = item.as_object() else { continue };
        for (key, operation) in item {
            let Some(method) = HttpMethod::parse(key) else { continue };
            let summary = operation.get("description")
                .or_else(|| operation.get("summary"))
                .and_then(Value::as_str)
                .map(str::to_string);
            endpoints.push(OperationDescriptor {
                method,
                path: route.clone(),
                summary,
                docs: reduce_endpoint_docs(operation),
            });
        }
    }

    Ok(ServiceDescription { servers, description, endpoints })
}

fn reduce_endpoint_docs(operation: &Value) -> Value {
    let mut out = Map::new();

    if let Some(description) = operation.get("description").filter(|d| is_present(d)) {
        out.insert("description".to_string(), description.clone());
    }

    if let Some(parameters) = operation.get("parameters").and_then(Value::as_array) {
        let required: Vec<Value> = parameters.iter()
            .filter(|p| p.get("required").and_then(Value::as_bool).unwrap_or(false))
            .cloned()
            .collect();
        if !parameters.is_empty() {
            out.insert("parameters".to_string(), Value::Array(required));
        }
    }

    if let Some(ok) = operation.pointer("/responses/200") {
        out.insert("responses".to_string(), ok.clone());
    }

    if let Some(body) = operation.get("requestBody").filter(|b| is_present(b)) {
        out.insert("requestBody".to_string(), body.clone());
    }

    Value::Object(out)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null      => false,
        Value::String(s) => !s.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Array(a)  => !a.is_empty(),
        _                => true,
    }
}

/// Downloads `<root>/api/docs/openapi.json`, replaces its server list with
/// `root`, and reduces it.
pub async fn fetch_service_description(
    http_client: &reqwest::Client,
    root:        &str,
) -> Result<ServiceDescription, ClientError> {
    let root = root.trim_end_matches('/');
    let url = format!("{}{}", root, OPENAPI_PATH);
    tracing::info!(url = %url, "downloading API description");

    let resp = http_client.get(&url).send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Server { status: status.as_u16(), body });
    }

    let mut document: Value = resp.json().await?;
    let Some(object) = document.as_object_mut() else {
        return Err(ClientError::InvalidDescription("document is not a JSON object".to_string()));
    };
    object.insert("servers".to_string(), json!([{ "url": root }]));

    let description = reduce_openapi_spec(&document)?;
    tracing::info!(
        base_url  = %root,
        endpoints = description.endpoints.len(),
        "API description reduced"
    );
    Ok(description)
}
