//! Per-request view of who is asking.
//!
//! [`ClientCtx`] is both a middleware, which resolves the session's user once
//! per request, and an extractor handing that result to route functions and
//! templates.

use crate::constants::GUEST_USERNAME;
use crate::middleware::csrf::get_or_create_csrf_token;
use crate::session::{get_user_id, logout_user};
use crate::user::Profile;
use actix_session::{Session, SessionExt};
use actix_web::dev::{self, Extensions, Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{error, web::Data, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures::future::{ready, LocalBoxFuture, Ready};
use sea_orm::DatabaseConnection;
use std::rc::Rc;
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct ClientCtxInner {
    /// None for guests.
    pub student: Option<Profile>,
    pub csrf_token: String,
    pub started: Instant,
}

impl Default for ClientCtxInner {
    fn default() -> Self {
        Self {
            student: None,
            csrf_token: String::new(),
            started: Instant::now(),
        }
    }
}

impl ClientCtxInner {
    pub async fn from_session(db: &DatabaseConnection, session: &Session) -> Self {
        let started = Instant::now();

        let student = match get_user_id(session) {
            None => None,
            Some(user_id) => match Profile::get_by_id(db, user_id).await {
                Ok(Some(profile)) => Some(profile),
                Ok(None) => {
                    // Account vanished under a live cookie.
                    log::debug!("session refers to missing user_id={}", user_id);
                    logout_user(session);
                    None
                }
                Err(e) => {
                    log::error!("ClientCtxInner::from_session: {}", e);
                    None
                }
            },
        };

        let csrf_token = match get_or_create_csrf_token(session) {
            Ok(token) => token,
            Err(e) => {
                log::error!("ClientCtxInner::from_session: csrf token: {}", e);
                String::new()
            }
        };

        Self {
            student,
            csrf_token,
            started,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientCtx(Data<ClientCtxInner>);

impl Default for ClientCtx {
    fn default() -> Self {
        Self(Data::new(ClientCtxInner::default()))
    }
}

impl ClientCtx {
    /// The context the middleware stored, or a guest context stored now.
    pub fn get_or_default_from_extensions(extensions: &mut Extensions) -> Self {
        if let Some(inner) = extensions.get::<Data<ClientCtxInner>>() {
            return Self(inner.clone());
        }
        let inner = Data::new(ClientCtxInner::default());
        extensions.insert(inner.clone());
        Self(inner)
    }

    pub fn is_user(&self) -> bool {
        self.0.student.is_some()
    }

    pub fn get_name(&self) -> &str {
        self.0
            .student
            .as_ref()
            .map_or(GUEST_USERNAME, |s| s.name.as_str())
    }

    pub fn get_csrf_token(&self) -> &str {
        &self.0.csrf_token
    }

    pub fn request_time_as_string(&self) -> String {
        let us = self.0.started.elapsed().as_micros();
        if us > 5000 {
            format!("{}ms", us / 1000)
        } else {
            format!("{}μs", us)
        }
    }

    /// The logged-in student, or an error that answers with a redirect to /login.
    pub fn require_login(&self) -> Result<&Profile, Error> {
        match &self.0.student {
            Some(student) => Ok(student),
            None => {
                let to_login = HttpResponse::Found()
                    .append_header((header::LOCATION, "/login"))
                    .finish();
                Err(error::InternalError::from_response("Login required", to_login).into())
            }
        }
    }
}

impl FromRequest for ClientCtx {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Self::get_or_default_from_extensions(
            &mut req.extensions_mut(),
        )))
    }
}

impl<S: 'static, B> Transform<S, ServiceRequest> for ClientCtx
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ClientCtxMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ClientCtxMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ClientCtxMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ClientCtxMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // Without a database there is nobody to resolve; handlers see a guest.
            if let Some(db) = req.app_data::<Data<DatabaseConnection>>() {
                let inner = ClientCtxInner::from_session(db, &req.get_session()).await;
                req.extensions_mut().insert(Data::new(inner));
            }
            service.call(req).await
        })
    }
}
