use async_trait::async_trait;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::domain::Concept;

use super::{ConceptDirectory, LookupError};

const CONCEPT_RESOURCE: &str = "ws/rest/v1/concept";
const CONCEPT_VIEW: &str = "custom:(uuid,display,datatype:(uuid,name),answers:(uuid,display))";

#[derive(Debug, Clone)]
pub struct RestDirectoryConfig {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RestDirectoryConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    fn concept_url(&self, id: &str) -> String {
        let encoded = utf8_percent_encode(id, NON_ALPHANUMERIC);
        format!(
            "{}/{CONCEPT_RESOURCE}/{encoded}",
            self.base_url.trim_end_matches('/')
        )
    }
}

/// Concept directory served over the OpenMRS REST concept resource.
#[derive(Debug, Clone)]
pub struct RestDirectory {
    client: Client,
    config: RestDirectoryConfig,
}

impl RestDirectory {
    pub fn new(config: RestDirectoryConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl ConceptDirectory for RestDirectory {
    async fn lookup_concept(&self, id: &str) -> Result<Concept, LookupError> {
        let url = self.config.concept_url(id);
        debug!(%url, "looking up concept");
        let mut request = self.client.get(&url).query(&[("v", CONCEPT_VIEW)]);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(LookupError::NotFound(id.to_string())),
            status if !status.is_success() => {
                Err(LookupError::Transport(format!("{url} answered {status}")))
            }
            _ => response
                .json::<Concept>()
                .await
                .map_err(|err| LookupError::Decode(err.to_string())),
        }
    }
}
