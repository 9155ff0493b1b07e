use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::time::Instant;

/// Request logging middleware
/// Logs method, path, status and latency for every request. Query strings
/// and headers stay out of the log since they can carry credentials.
pub struct LoggerMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let method = req.method().to_string();
        let path = req.path().to_string();

        tracing::info!(request_id = %request_id, method = %method, path = %path, "Request started");

        let service = self.service.clone();

        Box::pin(async move {
            let result = service.call(req).await;
            let elapsed_ms = start_time.elapsed().as_millis() as u64;

            // Errors returned by inner middleware (e.g. the access gate) are
            // rendered into responses later, so log their status here
            let status = match &result {
                Ok(res) => res.status().as_u16(),
                Err(err) => err.as_response_error().status_code().as_u16(),
            };

            tracing::info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status,
                elapsed_ms,
                "Request completed"
            );

            result
        })
    }
}
