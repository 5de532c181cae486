use std::{collections::HashMap, str::FromStr, sync::Arc};

use anyhow::{anyhow, Context, Result};
use axum::{http::Uri, routing::get, Extension, Json, Router};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};

/// Identity provider parameters handed to the browser application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Auth0Settings {
    /// Tenant domain prefix, e.g. `dev-cafe.eu`. Not a full url.
    pub(crate) url: String,
    pub(crate) audience: String,
    pub(crate) client_id: String,
    #[serde(rename = "callbackURL")]
    pub(crate) callback_url: String,
}

/// Runtime environment record for the ordering frontend. Constructed once
/// at startup, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Environment {
    pub(crate) production: bool,
    pub(crate) api_server_url: String,
    pub(crate) auth0: Auth0Settings,
}

pub(crate) fn production_flag(value: Option<String>) -> bool {
    match value.as_deref().map(|s| s.to_lowercase()).as_deref() {
        Some("1") | Some("true") => true,
        _ => false,
    }
}

fn url_fault(value: &str) -> Option<String> {
    match Uri::from_str(value) {
        Ok(uri) if uri.host().is_some() => None,
        Ok(_) => Some(format!("`{value}` has no host")),
        Err(e) => Some(format!("`{value}` is not a valid url: {e}")),
    }
}

impl Environment {
    pub(crate) fn try_from_env() -> Result<Self> {
        let production = production_flag(dotenvy::var("CAFENV_PRODUCTION").ok());
        let api_server_url =
            dotenvy::var("CAFENV_API_SERVER_URL").context("missing CAFENV_API_SERVER_URL")?;
        let auth0 = Auth0Settings {
            url: dotenvy::var("CAFENV_AUTH0_URL").context("missing CAFENV_AUTH0_URL")?,
            audience: dotenvy::var("CAFENV_AUTH0_AUDIENCE")
                .context("missing CAFENV_AUTH0_AUDIENCE")?,
            client_id: dotenvy::var("CAFENV_AUTH0_CLIENT_ID")
                .context("missing CAFENV_AUTH0_CLIENT_ID")?,
            callback_url: dotenvy::var("CAFENV_AUTH0_CALLBACK_URL")
                .context("missing CAFENV_AUTH0_CALLBACK_URL")?,
        };

        let environment = Self {
            production,
            api_server_url,
            auth0,
        };
        environment.ensure_valid()?;
        Ok(environment)
    }

    /// Per-field validation results, keyed by the serialized field name.
    pub(crate) fn faults(&self) -> HashMap<String, String> {
        let mut faults = HashMap::new();
        if let Some(fault) = url_fault(&self.api_server_url) {
            faults.insert("apiServerUrl".to_string(), fault);
        }
        if self.auth0.url.is_empty() {
            faults.insert("auth0.url".to_string(), "must not be empty".to_string());
        } else if let Some(fault) = url_fault(&format!("https://{}", self.auth0.url)) {
            faults.insert("auth0.url".to_string(), fault);
        }
        if self.auth0.audience.is_empty() {
            faults.insert(
                "auth0.audience".to_string(),
                "must not be empty".to_string(),
            );
        }
        if self.auth0.client_id.is_empty() {
            faults.insert(
                "auth0.clientId".to_string(),
                "must not be empty".to_string(),
            );
        }
        if let Some(fault) = url_fault(&self.auth0.callback_url) {
            faults.insert("auth0.callbackURL".to_string(), fault);
        }
        faults
    }

    fn ensure_valid(&self) -> Result<()> {
        let faults = self.faults();
        if faults.is_empty() {
            return Ok(());
        }
        Err(anyhow!("environment record is invalid: {:?}", faults))
    }
}

#[debug_handler]
async fn environment(Extension(record): Extension<Arc<Environment>>) -> Json<Environment> {
    Json(record.as_ref().clone())
}

pub(crate) fn environment_routes(record: Arc<Environment>) -> Router {
    Router::new().route("/", get(environment).layer(Extension(record)))
}
