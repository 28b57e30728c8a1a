// src/workspace/remote.rs

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use super::record::Record;

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("falha de comunicação: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("servidor respondeu {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

/// Onde as listas são persistidas. A implementação real fala com a API;
/// nos testes entra uma versão em memória.
#[async_trait]
pub trait RemoteStore<T: Record>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, RemoteError>;

    /// Devolve a versão gravada (com campos preenchidos pelo servidor).
    async fn insert(&self, record: &T) -> Result<T, RemoteError>;

    async fn update(&self, record: &T) -> Result<T, RemoteError>;

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError>;
}

// Corpo de erro devolvido pela API
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: Option<String>,
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Autentica e devolve um cliente com o token da sessão.
    pub async fn login(base_url: &str, email: &str, password: &str) -> Result<Self, RemoteError> {
        let remote = Self::new(base_url, "");
        let response = remote
            .client
            .post(format!("{}/api/auth/login", remote.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let body: TokenBody = Self::parse_response(response).await?;
        Ok(Self { token: body.token, ..remote })
    }

    fn url<T: Record>(&self) -> String {
        format!("{}/api/{}", self.base_url, T::RESOURCE)
    }

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let (message, code) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.error, body.code),
            Err(_) => (text, None),
        };

        Err(RemoteError::Api { status: status.as_u16(), code, message })
    }

    async fn parse_response<R: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<R, RemoteError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<R>().await?)
    }
}

#[async_trait]
impl<T: Record> RemoteStore<T> for HttpRemote {
    async fn list(&self) -> Result<Vec<T>, RemoteError> {
        let response = self.client.get(self.url::<T>()).bearer_auth(&self.token).send().await?;
        Self::parse_response(response).await
    }

    async fn insert(&self, record: &T) -> Result<T, RemoteError> {
        let response = self
            .client
            .post(self.url::<T>())
            .bearer_auth(&self.token)
            .json(record)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn update(&self, record: &T) -> Result<T, RemoteError> {
        let response = self
            .client
            .put(format!("{}/{}", self.url::<T>(), record.id()))
            .bearer_auth(&self.token)
            .json(record)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.url::<T>(), id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::crm::GeneralNote;
    use assert_matches::assert_matches;
    use axum::{
        http::{header, HeaderMap, StatusCode},
        response::IntoResponse,
        routing::{get, put},
        Json, Router,
    };
    use chrono::Utc;
    use serde_json::json;
    use tokio::net::TcpListener;

    const TOKEN: &str = "token-de-teste";

    async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
        format!("http://{}", addr)
    }

    fn note(title: &str) -> GeneralNote {
        GeneralNote {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            title: title.into(),
            content: "Pauta da reunião".into(),
            category: Some("Reunião".into()),
            color: None,
            author: "Ana".into(),
            date: Utc::now(),
            company_id: None,
        }
    }

    // API mínima de notas: lista exige o token, criação devolve a versão
    // do servidor, alteração falha com corpo JSON e remoção com texto puro
    fn notes_api(stored: GeneralNote) -> Router {
        Router::new()
            .route(
                "/api/notes",
                get(move |headers: HeaderMap| {
                    let stored = stored.clone();
                    async move {
                        let bearer = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
                        if bearer != Some("Bearer token-de-teste") {
                            let body = json!({ "error": "Sessão expirada ou inválida.", "code": "invalid_token" });
                            return (StatusCode::UNAUTHORIZED, Json(body)).into_response();
                        }
                        Json(vec![stored]).into_response()
                    }
                })
                .post(|Json(note): Json<GeneralNote>| async move {
                    (StatusCode::CREATED, Json(GeneralNote { author: "Servidor".into(), ..note }))
                }),
            )
            .route(
                "/api/notes/{id}",
                put(|| async {
                    let body = json!({ "error": "Um ou mais campos são inválidos.", "code": "validation_error" });
                    (StatusCode::BAD_REQUEST, Json(body))
                })
                .delete(|| async { (StatusCode::BAD_GATEWAY, "proxy fora do ar") }),
            )
    }

    #[tokio::test]
    async fn list_reads_the_resource_with_bearer_token() {
        let stored = note("Reunião semanal");
        let base = serve(notes_api(stored.clone())).await;

        let remote = HttpRemote::new(format!("{}/", base), TOKEN);
        let notes = <HttpRemote as RemoteStore<GeneralNote>>::list(&remote).await.unwrap();
        assert_eq!(notes, vec![stored]);

        let stranger = HttpRemote::new(base, "outro-token");
        assert_matches!(
            <HttpRemote as RemoteStore<GeneralNote>>::list(&stranger).await,
            Err(RemoteError::Api { status: 401, code: Some(code), .. }) if code == "invalid_token"
        );
    }

    #[tokio::test]
    async fn insert_returns_the_server_version() {
        let base = serve(notes_api(note("x"))).await;
        let remote = HttpRemote::new(base, TOKEN);
        let draft = note("Nova");

        let saved = remote.insert(&draft).await.unwrap();

        assert_eq!(saved.id, draft.id);
        assert_eq!(saved.author, "Servidor");
    }

    #[tokio::test]
    async fn api_error_body_is_parsed() {
        let base = serve(notes_api(note("x"))).await;
        let remote = HttpRemote::new(base, TOKEN);

        let err = remote.update(&note("Editada")).await.unwrap_err();

        assert_matches!(
            err,
            RemoteError::Api { status: 400, code: Some(code), message }
                if code == "validation_error" && message == "Um ou mais campos são inválidos."
        );
    }

    #[tokio::test]
    async fn plain_text_error_is_kept_as_message() {
        let base = serve(notes_api(note("x"))).await;
        let remote = HttpRemote::new(base, TOKEN);

        let err = <HttpRemote as RemoteStore<GeneralNote>>::delete(&remote, Uuid::new_v4())
            .await
            .unwrap_err();

        assert_matches!(
            err,
            RemoteError::Api { status: 502, code: None, message } if message == "proxy fora do ar"
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let remote = HttpRemote::new(format!("http://{}", addr), TOKEN);
        assert_matches!(
            <HttpRemote as RemoteStore<GeneralNote>>::list(&remote).await,
            Err(RemoteError::Transport(_))
        );
    }
}
