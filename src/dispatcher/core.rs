use super::binding::BindingPlan;
use crate::server::{Context, RawRequest, ResponseWriter};
use crate::typed::{Handler, HandlerSignature, RequestRecord, ResponseRecord};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

/// A mounted route's request adapter, independent of its record types.
pub trait Endpoint: Send + Sync {
    /// Slots of the wrapped handler.
    fn signature(&self) -> HandlerSignature;

    /// Binding plan computed at registration.
    fn plan(&self) -> &BindingPlan;

    /// Bind, invoke and render one request.
    fn dispatch(&self, ctx: &Context, raw: &dyn RawRequest, out: &mut dyn ResponseWriter);
}

/// [`Endpoint`] over a typed [`Handler`].
pub struct TypedEndpoint<Req, Resp> {
    handler: Handler<Req, Resp>,
    plan: BindingPlan,
    failure_status: u16,
}

impl<Req: RequestRecord, Resp: ResponseRecord> TypedEndpoint<Req, Resp> {
    #[must_use]
    pub fn new(handler: Handler<Req, Resp>, plan: BindingPlan, failure_status: u16) -> Self {
        Self {
            handler,
            plan,
            failure_status,
        }
    }

    /// Bind the request and run the handler.
    ///
    /// `Ok(None)` means the handler wrote its own output.
    ///
    /// # Errors
    ///
    /// Returns binding errors and handler errors alike.
    pub fn invoke(
        &self,
        ctx: &Context,
        raw: &dyn RawRequest,
        out: &mut dyn ResponseWriter,
    ) -> anyhow::Result<Option<Resp>> {
        let req: Req = self.plan.bind(ctx, raw)?;
        self.handler.call(ctx, req, raw, out)
    }
}

impl<Req: RequestRecord, Resp: ResponseRecord> Endpoint for TypedEndpoint<Req, Resp> {
    fn signature(&self) -> HandlerSignature {
        self.handler.signature()
    }

    fn plan(&self) -> &BindingPlan {
        &self.plan
    }

    fn dispatch(&self, ctx: &Context, raw: &dyn RawRequest, out: &mut dyn ResponseWriter) {
        let request_id = ctx.request_id();
        debug!(
            request_id = %request_id,
            method = %raw.method(),
            path = %raw.path(),
            "dispatching request"
        );
        match self.invoke(ctx, raw, out) {
            Ok(Some(resp)) => {
                if let Err(e) = render_json(out, 200, &resp) {
                    warn!(request_id = %request_id, error = %e, "failed to encode response");
                    render_error(out, self.failure_status, &e.to_string());
                }
            }
            Ok(None) => {}
            Err(e) => {
                let description = format!("{e:#}");
                warn!(
                    request_id = %request_id,
                    path = %raw.path(),
                    error = %description,
                    "request failed"
                );
                render_error(out, self.failure_status, &description);
            }
        }
    }
}

/// Write `value` as a JSON response.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized; nothing is written then.
pub fn render_json<T: Serialize + ?Sized>(
    out: &mut dyn ResponseWriter,
    status: u16,
    value: &T,
) -> serde_json::Result<()> {
    let body = serde_json::to_vec(value)?;
    out.set_status(status);
    out.set_header("content-type", "application/json".to_string());
    out.write_body(&body);
    Ok(())
}

/// Write the `{"error": description}` failure body.
pub fn render_error(out: &mut dyn ResponseWriter, status: u16, description: &str) {
    let body = json!({ "error": description });
    out.set_status(status);
    out.set_header("content-type", "application/json".to_string());
    out.write_body(body.to_string().as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Describe;
    use crate::server::{BufferedResponse, HttpRequest};
    use crate::typed::{EmptyRequest, EmptyResponse, ErrorResult};
    use http::Method;

    fn endpoint<Resp: ResponseRecord>(handler: Handler<EmptyRequest, Resp>) -> TypedEndpoint<EmptyRequest, Resp> {
        let plan = BindingPlan::new(&Method::GET, "/ping", &EmptyRequest::describe(), 0);
        TypedEndpoint::new(handler, plan, 500)
    }

    #[test]
    fn test_record_success_renders_json() {
        let ep = endpoint(Handler::record(|_, _: EmptyRequest| Ok(EmptyResponse {})));
        let mut out = BufferedResponse::new();
        ep.dispatch(&Context::new(), &HttpRequest::new(Method::GET, "/ping"), &mut out);
        assert_eq!(out.status, 200);
        assert_eq!(out.get_header("Content-Type"), Some("application/json"));
        assert_eq!(out.body, b"{}");
    }

    #[test]
    fn test_handler_error_uses_failure_status() {
        let ep = endpoint(Handler::<EmptyRequest, EmptyResponse>::record(|_, _| {
            Err(ErrorResult::new(404, "missing").into())
        }));
        let mut out = BufferedResponse::new();
        ep.dispatch(&Context::new(), &HttpRequest::new(Method::GET, "/ping"), &mut out);
        assert_eq!(out.status, 500);
        let body = out.json().unwrap_or_default();
        assert_eq!(body["error"], r#"Status: 404, Message: "missing""#);
    }

    #[test]
    fn test_cancelled_context_short_circuits() {
        let ep = endpoint(Handler::error_only(|_, _: EmptyRequest| {
            panic!("handler must not run")
        }));
        let ctx = Context::new();
        ctx.cancel();
        let mut out = BufferedResponse::new();
        ep.dispatch(&ctx, &HttpRequest::new(Method::GET, "/ping"), &mut out);
        assert_eq!(out.status, 500);
        assert_eq!(out.json().unwrap_or_default()["error"], "context cancelled");
    }
}
