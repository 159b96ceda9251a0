use std::rc::Rc;

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::{debug, trace};

use crate::{
    config::IdentityConfig,
    errors::AppError,
    models::{Principal, RequestAttributes},
    services::{IdentityResolver, VisitorExchange},
};

/// Attributes of the cookie issued to newly identified visitors
#[derive(Debug, Clone)]
pub struct IdentityCookie {
    path: String,
    max_age: Duration,
    http_only: bool,
    secure: bool,
}

impl IdentityCookie {
    fn build(&self, name: &str, value: String) -> Cookie<'static> {
        Cookie::build(name.to_string(), value)
            .path(self.path.clone())
            .max_age(self.max_age)
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish()
    }
}

impl From<&IdentityConfig> for IdentityCookie {
    fn from(config: &IdentityConfig) -> Self {
        Self {
            path: config.cookie_path.clone(),
            max_age: Duration::days(config.cookie_max_age_days),
            http_only: config.cookie_http_only,
            secure: config.cookie_secure,
        }
    }
}

/// Resolves the visitor identity of every request before it reaches a handler
pub struct VisitorIdentity {
    resolver: IdentityResolver,
    cookie: IdentityCookie,
}

impl VisitorIdentity {
    pub fn new(resolver: IdentityResolver, cookie: IdentityCookie) -> Self {
        Self { resolver, cookie }
    }
}

impl<S, B> Transform<S, ServiceRequest> for VisitorIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = VisitorIdentityMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(VisitorIdentityMiddleware {
            service: Rc::new(service),
            resolver: self.resolver.clone(),
            cookie: Rc::new(self.cookie.clone()),
        })
    }
}

pub struct VisitorIdentityMiddleware<S> {
    service: Rc<S>,
    resolver: IdentityResolver,
    cookie: Rc<IdentityCookie>,
}

impl<S, B> Service<ServiceRequest> for VisitorIdentityMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let resolver = self.resolver.clone();
        let cookie = self.cookie.clone();

        Box::pin(async move {
            let pending_cookies = {
                let mut exchange = RequestExchange::new(&req, &cookie);
                let resolved = resolver.resolve(&mut exchange).map_err(AppError::from)?;
                debug!(
                    "{} {} visitor '{}' ({})",
                    req.method(),
                    req.path(),
                    resolved.visitor_id,
                    resolved.source
                );
                req.extensions_mut().insert(resolved);
                exchange.pending_cookies
            };

            let mut res = service.call(req).await?;
            for cookie in &pending_cookies {
                res.response_mut().add_cookie(cookie)?;
            }
            Ok(res)
        })
    }
}

/// Actix view of a request/response pair for the identity resolver
///
/// Response cookies are buffered until the inner service has produced the response.
struct RequestExchange<'a> {
    req: &'a ServiceRequest,
    cookie: &'a IdentityCookie,
    pending_cookies: Vec<Cookie<'static>>,
}

impl<'a> RequestExchange<'a> {
    fn new(req: &'a ServiceRequest, cookie: &'a IdentityCookie) -> Self {
        Self {
            req,
            cookie,
            pending_cookies: Vec::new(),
        }
    }
}

impl VisitorExchange for RequestExchange<'_> {
    fn principal_name(&self) -> Option<String> {
        self.req
            .extensions()
            .get::<Principal>()
            .map(|principal| principal.name().to_string())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        match self.req.cookies() {
            // Repeated names: the last occurrence wins
            Ok(cookies) => cookies
                .iter()
                .filter(|cookie| cookie.name() == name)
                .last()
                .map(|cookie| cookie.value().to_string()),
            Err(e) => {
                // Unparseable cookie header: same as sending none
                trace!("Ignoring request cookies: {}", e);
                None
            }
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.req
            .extensions()
            .get::<RequestAttributes>()
            .and_then(|attributes| attributes.get(name).map(str::to_string))
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        let mut extensions = self.req.extensions_mut();
        match extensions.get_mut::<RequestAttributes>() {
            Some(attributes) => attributes.insert(name, value),
            None => {
                let mut attributes = RequestAttributes::default();
                attributes.insert(name, value);
                extensions.insert(attributes);
            }
        }
    }

    fn add_cookie(&mut self, name: &str, value: String) {
        self.pending_cookies.push(self.cookie.build(name, value));
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{
        dev::Service as _,
        http::{header, StatusCode},
        test, web, App, HttpRequest, HttpResponse,
    };

    use super::*;
    use crate::{
        models::VisitorId,
        services::{IdentityResolver, MockAnonymousIdGenerator, AUID},
    };

    fn cookie_settings() -> IdentityCookie {
        IdentityCookie::from(&IdentityConfig::default())
    }

    fn resolver_never_generating() -> IdentityResolver {
        let mut generator = MockAnonymousIdGenerator::new();
        generator.expect_generate_anonymous_user_id().never();
        IdentityResolver::new(Arc::new(generator))
    }

    fn resolver_generating(id: &'static str) -> IdentityResolver {
        let mut generator = MockAnonymousIdGenerator::new();
        generator
            .expect_generate_anonymous_user_id()
            .times(1)
            .returning(move || Ok(id.to_string()));
        IdentityResolver::new(Arc::new(generator))
    }

    async fn whoami(visitor: VisitorId, req: HttpRequest) -> HttpResponse {
        let attribute = req
            .extensions()
            .get::<RequestAttributes>()
            .and_then(|attributes| attributes.get(AUID).map(str::to_string));
        HttpResponse::Ok().json(serde_json::json!({
            "visitor_id": visitor.visitor_id,
            "source": visitor.source,
            "attribute": attribute,
        }))
    }

    fn auid_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == AUID)
            .map(|cookie| cookie.into_owned())
    }

    #[actix_web::test]
    async fn test_principal_wins_and_sets_no_cookie() {
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    resolver_never_generating(),
                    cookie_settings(),
                ))
                .wrap_fn(|req, srv| {
                    req.extensions_mut().insert(Principal::new("alice"));
                    srv.call(req)
                })
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(AUID, "bob123"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(auid_cookie(&res).is_none());
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["visitor_id"], "alice");
        assert_eq!(body["source"], "principal");
    }

    #[actix_web::test]
    async fn test_cookie_identifies_visitor() {
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    resolver_never_generating(),
                    cookie_settings(),
                ))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .cookie(Cookie::new(AUID, "bob123"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert!(auid_cookie(&res).is_none());
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["visitor_id"], "bob123");
        assert_eq!(body["source"], "cookie");
    }

    #[actix_web::test]
    async fn test_last_of_repeated_cookies_wins() {
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    resolver_never_generating(),
                    cookie_settings(),
                ))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::COOKIE, "auid=first; theme=dark; auid=second"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert!(auid_cookie(&res).is_none());
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["visitor_id"], "second");
        assert_eq!(body["source"], "cookie");
    }

    #[actix_web::test]
    async fn test_upstream_attribute_identifies_visitor() {
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    resolver_never_generating(),
                    cookie_settings(),
                ))
                .wrap_fn(|req, srv| {
                    let mut attributes = RequestAttributes::default();
                    attributes.insert(AUID, "carol");
                    req.extensions_mut().insert(attributes);
                    srv.call(req)
                })
                .route("/", web::get().to(whoami)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert!(auid_cookie(&res).is_none());
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["visitor_id"], "carol");
        assert_eq!(body["source"], "attribute");
    }

    #[actix_web::test]
    async fn test_new_visitor_gets_cookie_and_attribute() {
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    resolver_generating("gen-0001"),
                    cookie_settings(),
                ))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        let cookie = auid_cookie(&res).expect("auid cookie");
        assert_eq!(cookie.value(), "gen-0001");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::days(365)));

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["visitor_id"], "gen-0001");
        assert_eq!(body["source"], "generated");
        assert_eq!(body["attribute"], "gen-0001");
    }

    #[actix_web::test]
    async fn test_malformed_cookie_header_counts_as_no_cookies() {
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    resolver_generating("gen-0002"),
                    cookie_settings(),
                ))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::COOKIE, "%%%"))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(auid_cookie(&res).unwrap().value(), "gen-0002");
    }

    #[actix_web::test]
    async fn test_generator_failure_fails_the_request() {
        let mut generator = MockAnonymousIdGenerator::new();
        generator.expect_generate_anonymous_user_id().returning(|| {
            Err(crate::errors::IdentityError::MissingCollaborator(
                "user manager offline".to_string(),
            ))
        });
        let app = test::init_service(
            App::new()
                .wrap(VisitorIdentity::new(
                    IdentityResolver::new(Arc::new(generator)),
                    cookie_settings(),
                ))
                .route("/", web::get().to(whoami)),
        )
        .await;

        let res = app
            .call(test::TestRequest::get().uri("/").to_request())
            .await;

        let err = match res {
            Ok(_) => panic!("request should fail without a visitor id"),
            Err(err) => err,
        };
        assert_eq!(
            err.as_response_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_extractor_without_middleware_is_an_error() {
        let app = test::init_service(App::new().route("/", web::get().to(whoami))).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
