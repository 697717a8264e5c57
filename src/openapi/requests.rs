use std::collections::HashMap;
use std::sync::Arc;
use serde_json::{json, Value};
use crate::openapi::HttpMethod;
use crate::tools::{tool_fn, Tool};

/// Thin HTTP wrapper bound to one base URL. Every request the agent makes
/// goes through here, so nothing can be sent outside the described service.
#[derive(Debug, Clone)]
pub struct RequestsWrapper {
    http_client: reqwest::Client,
    base_url:    String,
}

impl RequestsWrapper {
    pub fn new(http_client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Relative paths are joined onto the base URL; absolute URLs must
    /// already point inside it.
    pub fn resolve_url(&self, path: &str) -> Result<String, String> {
        let path = path.trim();
        if path.starts_with("http://") || path.starts_with("https://") {
            let inside = path == self.base_url
                || path.strip_prefix(&self.base_url)
                    .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'));
            if inside {
                Ok(path.to_string())
            } else {
                Err(format!("URL '{}' is outside the API base URL {}", path, self.base_url))
            }
        } else if path.is_empty() {
            Err("missing 'path' argument".to_string())
        } else {
            Ok(format!("{}/{}", self.base_url, path.trim_start_matches('/')))
        }
    }

    pub async fn send(
        &self,
        method: HttpMethod,
        path:   &str,
        params: Option<&Value>,
        data:   Option<&Value>,
    ) -> Result<String, String> {
        let url = self.resolve_url(path)?;
        tracing::info!(method = %method, url = %url, "agent HTTP request");

        let mut request = self.http_client.request(method.to_reqwest(), &url);

        if let Some(params) = params.and_then(Value::as_object) {
            let query: Vec<(String, String)> = params.iter()
                .map(|(k, v)| (k.clone(), match v {
                    Value::String(s) => s.clone(),
                    other            => other.to_string(),
                }))
                .collect();
            request = request.query(&query);
        }

        if method.has_body() {
            if let Some(body) = data.filter(|d| !d.is_null()) {
                request = request.json(body);
            }
        }

        let resp = request.send().await
            .map_err(|e| format!("request to {} failed: {}", url, e))?;
        let status = resp.status();
        let body = resp.text().await
            .map_err(|e| format!("failed to read response from {}: {}", url, e))?;

        tracing::debug!(
            method = %method,
            url    = %url,
            status = status.as_u16(),
            body   = %body.chars().take(200).collect::<String>(),
            "agent HTTP response"
        );

        if status.is_success() {
            Ok(if body.is_empty() { format!("{} {}", status.as_u16(), status.canonical_reason().unwrap_or("OK")) } else { body })
        } else {
            Err(format!("{} {} returned {}: {}", method, url, status.as_u16(), body))
        }
    }
}

/// Builds the `requests_<verb>` tool for one HTTP method.
pub fn request_tool(wrapper: Arc<RequestsWrapper>, method: HttpMethod) -> Tool {
    let name = method.tool_name();

    let mut properties = json!({
        "path": {
            "type": "string",
            "description": "Endpoint path relative to the API base URL, with path parameters filled in, e.g. /api/tickets/123"
        },
        "params": {
            "type": "object",
            "description": "Optional query string parameters"
        }
    });
    if method.has_body() {
        properties["data"] = json!({
            "type": "object",
            "description": "JSON request body"
        });
    }

    let description = format!(
        "Send an HTTP {} request to the API at {} and return the response body.",
        method,
        wrapper.base_url()
    );

    let schema = json!({
        "type": "object",
        "properties": properties,
        "required": ["path"]
    });

    Tool::new(name, description, schema, tool_fn(move |args: HashMap<String, Value>| {
        let wrapper = Arc::clone(&wrapper);
        async move {
            let path = args.get("path")
                .and_then(Value::as_str)
                .ok_or_else(|| "missing 'path' argument".to_string())?;
            wrapper.send(method, path, args.get("params"), args.get("data")).await
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper() -> RequestsWrapper {
        RequestsWrapper::new(reqwest::Client::new(), "http://localhost:3000/")
    }

    #[test]
    fn joins_relative_paths() {
        let w = wrapper();
        assert_eq!(w.resolve_url("/api/tickets").unwrap(), "http://localhost:3000/api/tickets");
        assert_eq!(w.resolve_url("api/tickets").unwrap(), "http://localhost:3000/api/tickets");
    }

    #[test]
    fn rejects_foreign_hosts() {
        let w = wrapper();
        assert!(w.resolve_url("http://localhost:3000/api/tickets?x=1").is_ok());
        assert!(w.resolve_url("http://localhost:30001/api").is_err());
        assert!(w.resolve_url("https://evil.example/api").is_err());
        assert!(w.resolve_url("  ").is_err());
    }

    #[test]
    fn body_tools_advertise_data() {
        let w = Arc::new(wrapper());
        let post = request_tool(Arc::clone(&w), HttpMethod::Post);
        assert_eq!(post.name(), "requests_post");
        assert!(post.schema.input_schema["properties"].get("data").is_some());

        let get = request_tool(w, HttpMethod::Get);
        assert_eq!(get.name(), "requests_get");
        assert!(get.schema.input_schema["properties"].get("data").is_none());
    }
}
