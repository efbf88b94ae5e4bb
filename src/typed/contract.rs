use super::core::{HandlerSignature, InputSlot, OutputSlot};
use crate::describe::TypeDescriptor;
use std::fmt;

/// Validated handler shape, built once at registration.
#[derive(Debug, Clone)]
pub struct HandlerContract {
    pub request: TypeDescriptor,
    /// Declared response record; `None` for error-only handlers
    pub response: Option<TypeDescriptor>,
}

/// Handler signature problems found at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    /// Handler takes fewer than 2 or more than 4 parameters
    InputArity { count: usize },
    /// First parameter is not the request context
    ContextParameter { found: String },
    /// Second parameter is not a record
    RequestNotRecord { found: String },
    /// Third parameter is not the raw request accessor
    RawRequestParameter { found: String },
    /// Fourth parameter is not a response writer
    ResponseWriterParameter { found: String },
    /// Handler returns neither 1 nor 2 values
    OutputArity { count: usize },
    /// First of two return values is not a record
    ResponseNotRecord { found: String },
    /// Last return value is not an error
    ErrorSlot { position: usize, found: String },
}

impl ContractError {
    /// Whether registration must be aborted.
    ///
    /// Malformed return shapes are fatal. Everything else leaves the route
    /// mounted but undocumented.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ContractError::ResponseNotRecord { .. } | ContractError::ErrorSlot { .. }
        )
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractError::InputArity { count } => write!(
                f,
                "cannot register handler: unsupported input params count: {}",
                count
            ),
            ContractError::ContextParameter { found } => write!(
                f,
                "cannot register handler: first parameter must be Context, have {}",
                found
            ),
            ContractError::RequestNotRecord { found } => write!(
                f,
                "cannot register handler: second parameter must be a record, have {}",
                found
            ),
            ContractError::RawRequestParameter { found } => write!(
                f,
                "cannot register handler: third parameter must be RawRequest, have {}",
                found
            ),
            ContractError::ResponseWriterParameter { found } => write!(
                f,
                "cannot register handler: fourth parameter must implement ResponseWriter, have {}",
                found
            ),
            ContractError::OutputArity { count } => write!(
                f,
                "cannot register handler: unsupported out params count {}",
                count
            ),
            ContractError::ResponseNotRecord { found } => write!(
                f,
                "invalid handler: first return value must be a record, have {}",
                found
            ),
            ContractError::ErrorSlot { position, found } => write!(
                f,
                "invalid handler: return value {} must be an error, have {}",
                position, found
            ),
        }
    }
}

impl std::error::Error for ContractError {}

/// Check a handler signature against the supported shapes.
///
/// # Errors
///
/// Returns the first [`ContractError`] found; input slots are checked before
/// output slots.
pub fn validate(signature: &HandlerSignature) -> Result<HandlerContract, ContractError> {
    let inputs = &signature.inputs;
    if !(2..=4).contains(&inputs.len()) {
        return Err(ContractError::InputArity {
            count: inputs.len(),
        });
    }
    if !matches!(inputs[0], InputSlot::Context) {
        return Err(ContractError::ContextParameter {
            found: signature.input_name(0),
        });
    }
    let request = match &inputs[1] {
        InputSlot::Request(desc) if desc.is_record() => desc.clone(),
        _ => {
            return Err(ContractError::RequestNotRecord {
                found: signature.input_name(1),
            })
        }
    };
    if inputs.len() > 2 && !matches!(inputs[2], InputSlot::RawRequest) {
        return Err(ContractError::RawRequestParameter {
            found: signature.input_name(2),
        });
    }
    if inputs.len() > 3 && !matches!(inputs[3], InputSlot::ResponseWriter) {
        return Err(ContractError::ResponseWriterParameter {
            found: signature.input_name(3),
        });
    }

    let response = match signature.outputs.as_slice() {
        [OutputSlot::Error] => None,
        [_] => {
            return Err(ContractError::ErrorSlot {
                position: 0,
                found: signature.output_name(0),
            })
        }
        [first, second] => {
            let response = match first {
                OutputSlot::Record(desc) if desc.is_record() => desc.clone(),
                _ => {
                    return Err(ContractError::ResponseNotRecord {
                        found: signature.output_name(0),
                    })
                }
            };
            if !matches!(second, OutputSlot::Error) {
                return Err(ContractError::ErrorSlot {
                    position: 1,
                    found: signature.output_name(1),
                });
            }
            Some(response)
        }
        other => {
            return Err(ContractError::OutputArity { count: other.len() });
        }
    };

    Ok(HandlerContract { request, response })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Describe;
    use crate::typed::{EmptyRequest, EmptyResponse, Handler};

    fn sig(inputs: Vec<InputSlot>, outputs: Vec<OutputSlot>) -> HandlerSignature {
        HandlerSignature { inputs, outputs }
    }

    fn request() -> InputSlot {
        InputSlot::Request(EmptyRequest::describe())
    }

    #[test]
    fn test_record_handler_contract() {
        let h: Handler<EmptyRequest, EmptyResponse> = Handler::record(|_, _| Ok(EmptyResponse {}));
        let contract = validate(&h.signature()).ok();
        assert!(contract.is_some_and(|c| c.response.is_some()));
    }

    #[test]
    fn test_error_only_handler_has_no_response() {
        let h: Handler<EmptyRequest, EmptyResponse> =
            Handler::error_only_with_writer(|_, _, _, _| Ok(()));
        let contract = validate(&h.signature()).ok();
        assert!(contract.is_some_and(|c| c.response.is_none() && c.request.is_record()));
    }

    #[test]
    fn test_input_errors_are_soft() {
        let err = validate(&sig(vec![InputSlot::Context], vec![OutputSlot::Error]));
        assert_eq!(err.as_ref().err(), Some(&ContractError::InputArity { count: 1 }));
        assert!(err.err().is_some_and(|e| !e.is_fatal()));

        let not_record = sig(
            vec![InputSlot::Context, InputSlot::Request(String::describe())],
            vec![OutputSlot::Error],
        );
        let err = validate(&not_record).err();
        assert_eq!(
            err,
            Some(ContractError::RequestNotRecord {
                found: "string".to_string()
            })
        );

        let swapped = sig(
            vec![request(), InputSlot::Context],
            vec![OutputSlot::Error],
        );
        assert!(matches!(
            validate(&swapped),
            Err(ContractError::ContextParameter { .. })
        ));

        let writer_first = sig(
            vec![InputSlot::Context, request(), InputSlot::ResponseWriter],
            vec![OutputSlot::Error],
        );
        assert!(matches!(
            validate(&writer_first),
            Err(ContractError::RawRequestParameter { .. })
        ));
    }

    #[test]
    fn test_output_shape_errors_are_fatal() {
        let bad_response = sig(
            vec![InputSlot::Context, request()],
            vec![OutputSlot::Record(u64::describe()), OutputSlot::Error],
        );
        let err = validate(&bad_response).err();
        assert!(err.as_ref().is_some_and(ContractError::is_fatal));

        let missing_error = sig(
            vec![InputSlot::Context, request()],
            vec![OutputSlot::Record(EmptyResponse::describe()), OutputSlot::Other("bool".into())],
        );
        assert_eq!(
            validate(&missing_error).err(),
            Some(ContractError::ErrorSlot {
                position: 1,
                found: "bool".to_string()
            })
        );

        let too_many = sig(vec![InputSlot::Context, request()], vec![]);
        assert!(validate(&too_many).err().is_some_and(|e| !e.is_fatal()));
    }
}
