//! Storefront REST gateway
//!
//! Blocking HTTP implementation of [`StoreApi`]. One request per call, the
//! bearer token read from the [`SessionStore`] before anything goes on the
//! wire, and every call wrapped in a telemetry span whose ids are propagated
//! with B3 headers.

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Credentials, LoginResponse, Product, ProductDraft, ProductId, ProductImage, Registration,
    SessionToken, User, UserDraft, UserId,
};
use crate::ports::{SessionStore, StoreApi};
use crate::telemetry::{SpanGuard, Tracer};

/// HTTP client for the storefront backend
pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout_secs: u64,
    session: Arc<dyn SessionStore>,
    tracer: Arc<Tracer>,
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HttpGateway {
    /// Create a gateway for the configured API URL
    pub fn new(
        config: &Config,
        session: Arc<dyn SessionStore>,
        tracer: Arc<Tracer>,
    ) -> Result<Self> {
        Self::new_with_base_url(&config.api_url, config.timeout_secs, session, tracer)
    }

    /// Create a gateway against an explicit base URL (e.g. `http://localhost:8080/api`)
    pub fn new_with_base_url(
        base_url: &str,
        timeout_secs: u64,
        session: Arc<dyn SessionStore>,
        tracer: Arc<Tracer>,
    ) -> Result<Self> {
        if base_url.trim().is_empty() {
            return Err(Error::Config("API URL cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            timeout_secs,
            session,
            tracer,
        })
    }

    /// Stored token, or `NotAuthenticated` without touching the network
    fn token(&self) -> Result<SessionToken> {
        self.session.load()?.ok_or(Error::NotAuthenticated)
    }

    /// Build a request and record its method and URL on the span
    fn request(
        &self,
        span: &mut SpanGuard<'_>,
        method: Method,
        path: &str,
        token: Option<&SessionToken>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        span.set_attribute("http.method", method.as_str());
        span.set_attribute("http.url", &url);

        let mut builder = self.client.request(method, &url);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }
        for (name, value) in span.b3_headers() {
            builder = builder.header(name, value);
        }
        builder
    }

    /// Send and turn non-2xx answers into `Error::Api`
    fn send(&self, span: &mut SpanGuard<'_>, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        span.set_attribute("http.status_code", status.as_u16());
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::api(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Map reqwest errors to user-friendly transport messages
    fn map_request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::transport(format!(
                "Request timed out after {} seconds",
                self.timeout_secs
            ))
        } else if e.is_connect() {
            Error::transport(format!("Unable to connect to {}", self.base_url))
        } else {
            Error::transport(format!("Request failed: {}", e))
        }
    }

    fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        response
            .json()
            .map_err(|e| Error::transport(format!("Failed to parse {} response: {}", what, e)))
    }

    /// Authenticated GET returning a JSON body
    fn get_json<T: DeserializeOwned>(&self, span_name: &str, path: &str, what: &str) -> Result<T> {
        self.tracer
            .in_span(span_name, &[("action", "list".to_string())], |span| {
                let token = self.token()?;
                let builder = self.request(span, Method::GET, path, Some(&token));
                let response = self.send(span, builder)?;
                Self::decode(response, what)
            })
    }

    /// Authenticated call whose response body is ignored
    fn execute(
        &self,
        span_name: &str,
        action: &str,
        entity_id: Option<i64>,
        method: Method,
        path: &str,
        body: impl FnOnce(RequestBuilder) -> Result<RequestBuilder>,
    ) -> Result<()> {
        let mut attributes = vec![("action", action.to_string())];
        if let Some(id) = entity_id {
            attributes.push(("entity.id", id.to_string()));
        }

        self.tracer.in_span(span_name, &attributes, |span| {
            let token = self.token()?;
            let builder = body(self.request(span, method, path, Some(&token)))?;
            self.send(span, builder)?;
            Ok(())
        })
    }

    fn product_form(draft: &ProductDraft) -> Result<multipart::Form> {
        let mut form = multipart::Form::new()
            .text("name", draft.name.clone())
            .text("price", draft.price.to_string())
            .text("expirationDate", draft.expiration_date_field());

        if let Some(image) = &draft.image {
            let part = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)
                .map_err(|e| {
                    Error::validation(format!("Invalid image type '{}': {}", image.mime, e))
                })?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

impl StoreApi for HttpGateway {
    fn login(&self, credentials: &Credentials) -> Result<SessionToken> {
        self.tracer
            .in_span("auth.login", &[("action", "login".to_string())], |span| {
                let builder = self
                    .request(span, Method::POST, "/auth/login", None)
                    .json(credentials);
                let response = self.send(span, builder)?;
                let body: LoginResponse = Self::decode(response, "login")?;
                if body.token.trim().is_empty() {
                    return Err(Error::transport("Login response did not include a token"));
                }
                Ok(SessionToken::new(body.token))
            })
    }

    fn register(&self, registration: &Registration) -> Result<()> {
        self.tracer
            .in_span("auth.register", &[("action", "register".to_string())], |span| {
                let builder = self
                    .request(span, Method::POST, "/auth/register", None)
                    .json(registration);
                self.send(span, builder)?;
                Ok(())
            })
    }

    fn list_products(&self) -> Result<Vec<Product>> {
        self.get_json("products.list", "/products", "products")
    }

    fn create_product(&self, draft: &ProductDraft) -> Result<()> {
        let form = Self::product_form(draft)?;
        self.execute("products.create", "create", None, Method::POST, "/products", |b| {
            Ok(b.multipart(form))
        })
    }

    fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<()> {
        let form = Self::product_form(draft)?;
        let path = format!("/products/{}", id);
        self.execute("products.update", "update", Some(id), Method::PUT, &path, |b| {
            Ok(b.multipart(form))
        })
    }

    fn delete_product(&self, id: ProductId) -> Result<()> {
        let path = format!("/products/{}", id);
        self.execute("products.delete", "delete", Some(id), Method::DELETE, &path, Ok)
    }

    fn product_image(&self, id: ProductId) -> Result<ProductImage> {
        let attributes = [("action", "image".to_string()), ("entity.id", id.to_string())];
        self.tracer.in_span("products.image", &attributes, |span| {
            let token = self.token()?;
            let path = format!("/products/{}/image", id);
            let builder = self.request(span, Method::GET, &path, Some(&token));
            let response = self.send(span, builder)?;

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = response
                .bytes()
                .map_err(|e| self.map_request_error(e))?
                .to_vec();
            span.set_attribute("http.response_content_length", bytes.len());

            Ok(ProductImage {
                content_type,
                bytes,
            })
        })
    }

    fn list_users(&self) -> Result<Vec<User>> {
        self.get_json("users.list", "/users", "users")
    }

    fn create_user(&self, draft: &UserDraft) -> Result<()> {
        self.execute("users.create", "create", None, Method::POST, "/users", |b| {
            Ok(b.json(draft))
        })
    }

    fn update_user(&self, id: UserId, draft: &UserDraft) -> Result<()> {
        let path = format!("/users/{}", id);
        self.execute("users.update", "update", Some(id), Method::PUT, &path, |b| {
            Ok(b.json(draft))
        })
    }

    fn delete_user(&self, id: UserId) -> Result<()> {
        let path = format!("/users/{}", id);
        self.execute("users.delete", "delete", Some(id), Method::DELETE, &path, Ok)
    }
}
