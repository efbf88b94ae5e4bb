use crate::describe::{Describe, TypeDescriptor};
use crate::dispatcher::BindFiles;
use crate::server::{Context, RawRequest, ResponseWriter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

type ErrorOnlyFn<Req> = Box<dyn Fn(&Context, Req) -> anyhow::Result<()> + Send + Sync>;
type ErrorOnlyWithRequestFn<Req> =
    Box<dyn Fn(&Context, Req, &dyn RawRequest) -> anyhow::Result<()> + Send + Sync>;
type ErrorOnlyWithWriterFn<Req> = Box<
    dyn Fn(&Context, Req, &dyn RawRequest, &mut dyn ResponseWriter) -> anyhow::Result<()>
        + Send
        + Sync,
>;
type RecordFn<Req, Resp> = Box<dyn Fn(&Context, Req) -> anyhow::Result<Resp> + Send + Sync>;
type RecordWithRequestFn<Req, Resp> =
    Box<dyn Fn(&Context, Req, &dyn RawRequest) -> anyhow::Result<Resp> + Send + Sync>;
type RecordWithWriterFn<Req, Resp> = Box<
    dyn Fn(&Context, Req, &dyn RawRequest, &mut dyn ResponseWriter) -> anyhow::Result<Resp>
        + Send
        + Sync,
>;

/// Bounds every request record satisfies.
///
/// Implemented automatically for types deriving `Describe`, `Default`,
/// `Serialize` and `Deserialize`.
pub trait RequestRecord: Describe + BindFiles + DeserializeOwned + Serialize + Default + Send + 'static {}

impl<T> RequestRecord for T where
    T: Describe + BindFiles + DeserializeOwned + Serialize + Default + Send + 'static
{
}

/// Bounds every response record satisfies.
pub trait ResponseRecord: Describe + Serialize + Send + 'static {}

impl<T> ResponseRecord for T where T: Describe + Serialize + Send + 'static {}

/// A request handler in one of the supported shapes.
pub enum Handler<Req, Resp = EmptyResponse> {
    ErrorOnly(ErrorOnlyFn<Req>),
    ErrorOnlyWithRequest(ErrorOnlyWithRequestFn<Req>),
    ErrorOnlyWithWriter(ErrorOnlyWithWriterFn<Req>),
    Record(RecordFn<Req, Resp>),
    RecordWithRequest(RecordWithRequestFn<Req, Resp>),
    RecordWithWriter(RecordWithWriterFn<Req, Resp>),
}

impl<Req: RequestRecord> Handler<Req, EmptyResponse> {
    pub fn error_only<F>(f: F) -> Self
    where
        F: Fn(&Context, Req) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Handler::ErrorOnly(Box::new(f))
    }

    pub fn error_only_with_request<F>(f: F) -> Self
    where
        F: Fn(&Context, Req, &dyn RawRequest) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Handler::ErrorOnlyWithRequest(Box::new(f))
    }

    /// Handler that writes its own response body.
    pub fn error_only_with_writer<F>(f: F) -> Self
    where
        F: Fn(&Context, Req, &dyn RawRequest, &mut dyn ResponseWriter) -> anyhow::Result<()>
            + Send
            + Sync
            + 'static,
    {
        Handler::ErrorOnlyWithWriter(Box::new(f))
    }
}

impl<Req: RequestRecord, Resp: ResponseRecord> Handler<Req, Resp> {
    pub fn record<F>(f: F) -> Self
    where
        F: Fn(&Context, Req) -> anyhow::Result<Resp> + Send + Sync + 'static,
    {
        Handler::Record(Box::new(f))
    }

    pub fn record_with_request<F>(f: F) -> Self
    where
        F: Fn(&Context, Req, &dyn RawRequest) -> anyhow::Result<Resp> + Send + Sync + 'static,
    {
        Handler::RecordWithRequest(Box::new(f))
    }

    pub fn record_with_writer<F>(f: F) -> Self
    where
        F: Fn(&Context, Req, &dyn RawRequest, &mut dyn ResponseWriter) -> anyhow::Result<Resp>
            + Send
            + Sync
            + 'static,
    {
        Handler::RecordWithWriter(Box::new(f))
    }

    /// Input and output slots of this handler.
    #[must_use]
    pub fn signature(&self) -> HandlerSignature {
        let mut inputs = vec![InputSlot::Context, InputSlot::Request(Req::describe())];
        match self {
            Handler::ErrorOnlyWithRequest(_) | Handler::RecordWithRequest(_) => {
                inputs.push(InputSlot::RawRequest);
            }
            Handler::ErrorOnlyWithWriter(_) | Handler::RecordWithWriter(_) => {
                inputs.push(InputSlot::RawRequest);
                inputs.push(InputSlot::ResponseWriter);
            }
            Handler::ErrorOnly(_) | Handler::Record(_) => {}
        }
        let outputs = match self {
            Handler::ErrorOnly(_)
            | Handler::ErrorOnlyWithRequest(_)
            | Handler::ErrorOnlyWithWriter(_) => vec![OutputSlot::Error],
            Handler::Record(_) | Handler::RecordWithRequest(_) | Handler::RecordWithWriter(_) => {
                vec![OutputSlot::Record(Resp::describe()), OutputSlot::Error]
            }
        };
        HandlerSignature { inputs, outputs }
    }

    /// Call the handler.
    ///
    /// Error-only handlers yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns whatever error the handler reports.
    pub fn call(
        &self,
        ctx: &Context,
        req: Req,
        raw: &dyn RawRequest,
        out: &mut dyn ResponseWriter,
    ) -> anyhow::Result<Option<Resp>> {
        match self {
            Handler::ErrorOnly(f) => f(ctx, req).map(|()| None),
            Handler::ErrorOnlyWithRequest(f) => f(ctx, req, raw).map(|()| None),
            Handler::ErrorOnlyWithWriter(f) => f(ctx, req, raw, out).map(|()| None),
            Handler::Record(f) => f(ctx, req).map(Some),
            Handler::RecordWithRequest(f) => f(ctx, req, raw).map(Some),
            Handler::RecordWithWriter(f) => f(ctx, req, raw, out).map(Some),
        }
    }
}

impl<Req, Resp> fmt::Debug for Handler<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let variant = match self {
            Handler::ErrorOnly(_) => "ErrorOnly",
            Handler::ErrorOnlyWithRequest(_) => "ErrorOnlyWithRequest",
            Handler::ErrorOnlyWithWriter(_) => "ErrorOnlyWithWriter",
            Handler::Record(_) => "Record",
            Handler::RecordWithRequest(_) => "RecordWithRequest",
            Handler::RecordWithWriter(_) => "RecordWithWriter",
        };
        f.debug_tuple("Handler").field(&variant).finish()
    }
}

/// One parameter position of a handler.
#[derive(Debug, Clone)]
pub enum InputSlot {
    Context,
    Request(TypeDescriptor),
    RawRequest,
    ResponseWriter,
    /// Anything else, by name
    Other(String),
}

impl InputSlot {
    fn name(&self) -> String {
        match self {
            InputSlot::Context => "Context".to_string(),
            InputSlot::Request(desc) => desc.display_name(),
            InputSlot::RawRequest => "RawRequest".to_string(),
            InputSlot::ResponseWriter => "ResponseWriter".to_string(),
            InputSlot::Other(name) => name.clone(),
        }
    }
}

/// One return position of a handler.
#[derive(Debug, Clone)]
pub enum OutputSlot {
    Record(TypeDescriptor),
    Error,
    Other(String),
}

impl OutputSlot {
    fn name(&self) -> String {
        match self {
            OutputSlot::Record(desc) => desc.display_name(),
            OutputSlot::Error => "error".to_string(),
            OutputSlot::Other(name) => name.clone(),
        }
    }
}

/// Parameter and return slots of a handler, in order.
#[derive(Debug, Clone)]
pub struct HandlerSignature {
    pub inputs: Vec<InputSlot>,
    pub outputs: Vec<OutputSlot>,
}

impl HandlerSignature {
    pub(crate) fn input_name(&self, index: usize) -> String {
        self.inputs
            .get(index)
            .map_or_else(|| "nothing".to_string(), InputSlot::name)
    }

    pub(crate) fn output_name(&self, index: usize) -> String {
        self.outputs
            .get(index)
            .map_or_else(|| "nothing".to_string(), OutputSlot::name)
    }
}

/// Request record without fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, crate::Describe)]
pub struct EmptyRequest {}

/// Response record without fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, crate::Describe)]
pub struct EmptyResponse {}

/// Handler error carrying a status and a JSON message.
///
/// The status is informational: every handler error is rendered with the
/// configured failure status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub status: u16,
    pub message: serde_json::Value,
}

impl ErrorResult {
    pub fn new(status: u16, message: impl Serialize) -> Self {
        let message = serde_json::to_value(message)
            .unwrap_or_else(|e| serde_json::Value::String(e.to_string()));
        Self { status, message }
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.message) {
            Ok(message) => write!(f, "Status: {}, Message: {}", self.status, message),
            Err(e) => write!(f, "internal error processing error message: {}", e),
        }
    }
}

impl std::error::Error for ErrorResult {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{BufferedResponse, HttpRequest};
    use http::Method;

    #[test]
    fn test_signature_slots_follow_variant() {
        let h: Handler<EmptyRequest, EmptyResponse> =
            Handler::record_with_writer(|_, _, _, _| Ok(EmptyResponse {}));
        let sig = h.signature();
        assert_eq!(sig.inputs.len(), 4);
        assert!(matches!(sig.inputs[3], InputSlot::ResponseWriter));
        assert_eq!(sig.outputs.len(), 2);

        let h = Handler::error_only(|_, _: EmptyRequest| Ok(()));
        let sig = h.signature();
        assert_eq!(sig.inputs.len(), 2);
        assert!(matches!(sig.outputs.as_slice(), [OutputSlot::Error]));
    }

    #[test]
    fn test_call_error_only_writer_uses_writer() {
        let h = Handler::error_only_with_writer(|_, _: EmptyRequest, _, out| {
            out.set_header("content-type", "image/png".to_string());
            out.write_body(b"png");
            Ok(())
        });
        let raw = HttpRequest::new(Method::GET, "/avatar");
        let mut out = BufferedResponse::new();
        let result = h.call(&Context::new(), EmptyRequest {}, &raw, &mut out);
        assert!(matches!(result, Ok(None)));
        assert_eq!(out.body, b"png");
    }

    #[test]
    fn test_error_result_description() {
        let err = ErrorResult::new(404, "user not found");
        assert_eq!(err.to_string(), r#"Status: 404, Message: "user not found""#);
    }
}
