//! Jira Cloud REST v3 access.
//!
//! [`TrackerApi`] is the narrow surface the provisioning logic needs. The
//! production implementation is [`JiraClient`], a blocking `reqwest` client
//! with basic auth and a fixed per-call timeout. Every non-2xx response is
//! turned into [`SetupError::Http`]; the only status given special meaning is
//! 404 on a project lookup, which becomes [`SetupError::ProjectNotFound`].

use crate::adf::Document;
use crate::config::Credentials;
use crate::error::{Result, SetupError};
use crate::query::{IssueKind, IssueQuery};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{header, StatusCode};
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const API_PREFIX: &str = "rest/api/3";
const SEARCH_FIELDS: &[&str] = &["summary", "issuetype", "parent"];
const PROJECT_TYPE_KEY: &str = "software";
const PROJECT_TEMPLATE_KEY: &str = "com.pyxis.greenhopper.jira:gh-simplified-kanban-classic";
const PROJECT_ASSIGNEE_TYPE: &str = "UNASSIGNED";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRef {
    pub id: String,
    pub key: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRef {
    pub id: String,
    pub key: String,
}

/// An issue as returned by search. `kind` is the raw issue type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteIssue {
    pub id: String,
    pub key: String,
    pub summary: String,
    pub kind: Option<String>,
    pub parent_key: Option<String>,
}

impl RemoteIssue {
    pub fn to_issue_ref(&self) -> IssueRef {
        IssueRef {
            id: self.id.clone(),
            key: self.key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub key: String,
    pub name: String,
    pub description: String,
    pub lead_account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub project_key: String,
    pub kind: IssueKind,
    pub summary: String,
    pub description: Document,
    pub parent_key: Option<String>,
}

// ---------------------------------------------------------------------------
// TrackerApi
// ---------------------------------------------------------------------------

pub trait TrackerApi {
    /// Fetch a project by key. A missing project is `Err(ProjectNotFound)`.
    fn get_project(&self, key: &str) -> Result<ProjectRef>;

    fn create_project(&self, project: &NewProject) -> Result<ProjectRef>;

    /// Account id of the credential owner.
    fn current_account_id(&self) -> Result<String>;

    fn search(&self, query: &IssueQuery) -> Result<Vec<RemoteIssue>>;

    fn create_issue(&self, issue: &NewIssue) -> Result<IssueRef>;

    fn transitions(&self, issue_key: &str) -> Result<Vec<Transition>>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Jira returns ids as strings almost everywhere, but project creation
/// answers with a bare number.
fn id_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

#[derive(Deserialize)]
struct ProjectWire {
    #[serde(deserialize_with = "id_string")]
    id: String,
    key: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyselfWire {
    account_id: String,
}

#[derive(Deserialize)]
struct SearchWire {
    #[serde(default)]
    issues: Vec<IssueWire>,
}

#[derive(Deserialize)]
struct IssueWire {
    #[serde(deserialize_with = "id_string")]
    id: String,
    key: String,
    #[serde(default)]
    fields: IssueFieldsWire,
}

#[derive(Default, Deserialize)]
struct IssueFieldsWire {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    issuetype: Option<NamedWire>,
    #[serde(default)]
    parent: Option<KeyedWire>,
}

#[derive(Deserialize)]
struct NamedWire {
    name: String,
}

#[derive(Deserialize)]
struct KeyedWire {
    key: String,
}

#[derive(Deserialize)]
struct CreatedIssueWire {
    #[serde(deserialize_with = "id_string")]
    id: String,
    key: String,
}

#[derive(Deserialize)]
struct TransitionsWire {
    #[serde(default)]
    transitions: Vec<TransitionWire>,
}

#[derive(Deserialize)]
struct TransitionWire {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
}

impl From<IssueWire> for RemoteIssue {
    fn from(wire: IssueWire) -> Self {
        RemoteIssue {
            id: wire.id,
            key: wire.key,
            summary: wire.fields.summary,
            kind: wire.fields.issuetype.map(|t| t.name),
            parent_key: wire.fields.parent.map(|p| p.key),
        }
    }
}

// ---------------------------------------------------------------------------
// JiraClient
// ---------------------------------------------------------------------------

pub struct JiraClient {
    credentials: Credentials,
    http: Client,
}

impl JiraClient {
    pub fn new(credentials: Credentials) -> Result<Self> {
        Self::with_timeout(credentials, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(credentials: Credentials, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .user_agent(concat!("jira-setup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { credentials, http })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{API_PREFIX}/{}",
            self.credentials.base_url,
            path.trim_start_matches('/')
        )
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.credentials.email, Some(&self.credentials.api_token))
    }

    /// Send a request and return its status and body. Transport failures are
    /// errors; HTTP error statuses are not, so callers can special-case them.
    fn send(
        &self,
        method: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<(StatusCode, String)> {
        debug!(method, url, "jira request");
        let response = self.authed(request).send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(method, url, status = status.as_u16(), "jira response");
        Ok((status, body))
    }

    fn decode<T: DeserializeOwned>(
        method: &'static str,
        url: &str,
        status: StatusCode,
        body: &str,
    ) -> Result<T> {
        if !status.is_success() {
            return Err(SetupError::http(method, url, status.as_u16(), body));
        }
        serde_json::from_str(body).map_err(|source| SetupError::Malformed {
            context: format!("{method} {url}"),
            source,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let (status, body) = self.send("GET", &url, self.http.get(&url))?;
        Self::decode("GET", &url, status, &body)
    }

    fn post_json<T: DeserializeOwned>(&self, path: &str, payload: &Value) -> Result<T> {
        let url = self.endpoint(path);
        let (status, body) = self.send("POST", &url, self.http.post(&url).json(payload))?;
        Self::decode("POST", &url, status, &body)
    }
}

impl TrackerApi for JiraClient {
    fn get_project(&self, key: &str) -> Result<ProjectRef> {
        let url = self.endpoint(&format!("project/{key}"));
        let (status, body) = self.send("GET", &url, self.http.get(&url))?;
        if status == StatusCode::NOT_FOUND {
            return Err(SetupError::ProjectNotFound(key.to_string()));
        }
        let wire: ProjectWire = Self::decode("GET", &url, status, &body)?;
        Ok(ProjectRef {
            id: wire.id,
            key: wire.key,
            name: wire.name,
        })
    }

    fn create_project(&self, project: &NewProject) -> Result<ProjectRef> {
        let payload = json!({
            "key": project.key,
            "name": project.name,
            "description": project.description,
            "projectTypeKey": PROJECT_TYPE_KEY,
            "projectTemplateKey": PROJECT_TEMPLATE_KEY,
            "leadAccountId": project.lead_account_id,
            "assigneeType": PROJECT_ASSIGNEE_TYPE,
        });
        let wire: ProjectWire = self.post_json("project", &payload)?;
        Ok(ProjectRef {
            id: wire.id,
            key: wire.key,
            name: wire.name.or_else(|| Some(project.name.clone())),
        })
    }

    fn current_account_id(&self) -> Result<String> {
        let me: MyselfWire = self.get_json("myself")?;
        Ok(me.account_id)
    }

    fn search(&self, query: &IssueQuery) -> Result<Vec<RemoteIssue>> {
        let payload = json!({
            "jql": query.to_jql(),
            "fields": SEARCH_FIELDS,
            "maxResults": query.max_results,
        });
        let result: SearchWire = self.post_json("search/jql", &payload)?;
        Ok(result.issues.into_iter().map(RemoteIssue::from).collect())
    }

    fn create_issue(&self, issue: &NewIssue) -> Result<IssueRef> {
        let mut fields = json!({
            "project": { "key": issue.project_key },
            "summary": issue.summary,
            "description": issue.description,
            "issuetype": { "name": issue.kind.as_str() },
        });
        if let Some(parent) = &issue.parent_key {
            fields["parent"] = json!({ "key": parent });
        }
        let created: CreatedIssueWire = self.post_json("issue", &json!({ "fields": fields }))?;
        Ok(IssueRef {
            id: created.id,
            key: created.key,
        })
    }

    fn transitions(&self, issue_key: &str) -> Result<Vec<Transition>> {
        let wire: TransitionsWire = self.get_json(&format!("issue/{issue_key}/transitions"))?;
        Ok(wire
            .transitions
            .into_iter()
            .map(|t| Transition {
                id: t.id,
                name: t.name,
            })
            .collect())
    }
}
