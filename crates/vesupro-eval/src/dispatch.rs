//! Reference dispatcher.
//!
//! [`Dispatcher`] walks the same steps as a generated `Dispatch` method:
//! find the method, then validate and convert each argument in order,
//! stopping at the first failure. The result is an [`Invocation`] carrying
//! every argument already cast to its declared type.

use log::debug;
use vesupro_types::{ApiModel, MethodSpec, ParameterSpec, ResultShape, TypeRule, WireKind, WireToken};

use crate::convert::{parse_float, parse_int, parse_uint};
use crate::error::{DispatchError, DispatchResult};
use crate::tokens::TokenSource;
use crate::value::{Argument, Invocation, Value};

/// Decodes an aggregate from its raw payload, like `UnmarshalJSON`.
pub trait AggregateDecoder {
    fn decode(&self, type_name: &str, raw: &str) -> Result<serde_json::Value, String>;
}

/// Decodes aggregates as JSON objects. `null` decodes to an empty value.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl AggregateDecoder for JsonDecoder {
    fn decode(&self, type_name: &str, raw: &str) -> Result<serde_json::Value, String> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        match value {
            serde_json::Value::Object(_) | serde_json::Value::Null => Ok(value),
            other => Err(format!(
                "json: cannot unmarshal {} into Go value of type {type_name}",
                json_kind(&other)
            )),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A local object that can execute validated invocations.
pub trait Receiver {
    /// Receiver type name as it appears in the model.
    fn receiver_type(&self) -> &str;

    /// Run the method. An `Err` is the method's own error.
    fn call(&mut self, invocation: &Invocation) -> Result<Option<Value>, String>;
}

/// Dispatches calls against the methods of one model.
#[derive(Debug)]
pub struct Dispatcher<'m, D = JsonDecoder> {
    model: &'m ApiModel,
    decoder: D,
}

impl<'m> Dispatcher<'m, JsonDecoder> {
    pub fn new(model: &'m ApiModel) -> Self {
        Self {
            model,
            decoder: JsonDecoder,
        }
    }
}

impl<'m, D: AggregateDecoder> Dispatcher<'m, D> {
    pub fn with_decoder(model: &'m ApiModel, decoder: D) -> Self {
        Self { model, decoder }
    }

    fn lookup(&self, receiver: &str, method: &str) -> DispatchResult<&'m MethodSpec> {
        let entry = self
            .model
            .entry(receiver)
            .filter(|e| !e.methods.is_empty())
            .ok_or_else(|| DispatchError::UnknownReceiver {
                receiver: receiver.to_string(),
            })?;
        entry.method(method).ok_or_else(|| DispatchError::UnknownMethod {
            method: method.to_string(),
        })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Streamed
    // ══════════════════════════════════════════════════════════════════════

    /// Read the arguments of `receiver.method` from a token stream.
    ///
    /// Tokens after the last argument are left unread.
    pub fn dispatch_streamed(
        &self,
        receiver: &str,
        method: &str,
        source: &mut impl TokenSource,
    ) -> DispatchResult<Invocation> {
        let spec = self.lookup(receiver, method)?;
        debug!("dispatching {receiver}.{method} from token stream");

        let mut arguments = Vec::with_capacity(spec.arity());
        for param in &spec.parameters {
            if param.position > 0 {
                let found = source.scan();
                if found != WireKind::Separator {
                    return Err(DispatchError::SeparatorMismatch {
                        method: spec.name.clone(),
                        position: param.position,
                        found,
                    });
                }
            }

            let kind = source.scan();
            if !param.is_aggregate() {
                check_kind(spec, param, kind)?;
            }
            let value = self.convert(spec, param, kind, source.current_token())?;
            arguments.push(argument(param, value));
        }

        Ok(invocation(receiver, spec, arguments))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Listed
    // ══════════════════════════════════════════════════════════════════════

    /// Convert an already split argument list for `receiver.method`.
    ///
    /// The count is checked before any argument is looked at.
    pub fn dispatch_listed(&self, receiver: &str, method: &str, args: &[WireToken]) -> DispatchResult<Invocation> {
        let spec = self.lookup(receiver, method)?;
        debug!("dispatching {receiver}.{method} with {} listed arguments", args.len());

        if args.len() != spec.arity() {
            return Err(DispatchError::ArityMismatch {
                method: spec.name.clone(),
                expected: spec.arity(),
                found: args.len(),
            });
        }

        let mut arguments = Vec::with_capacity(spec.arity());
        for (param, token) in spec.parameters.iter().zip(args) {
            if !param.is_aggregate() {
                check_kind(spec, param, token.kind)?;
            }
            let value = self.convert(spec, param, token.kind, &token.text)?;
            arguments.push(argument(param, value));
        }

        Ok(invocation(receiver, spec, arguments))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Invocation
    // ══════════════════════════════════════════════════════════════════════

    /// Hand a validated invocation to `target`.
    ///
    /// Methods without a value result always yield `None`.
    pub fn invoke(&self, target: &mut impl Receiver, invocation: &Invocation) -> DispatchResult<Option<Value>> {
        let outcome = target
            .call(invocation)
            .map_err(|message| DispatchError::MethodFailure {
                method: invocation.method.clone(),
                message,
            })?;
        Ok(match invocation.results {
            ResultShape::Value | ResultShape::ValueAndError => outcome,
            ResultShape::None | ResultShape::Error => None,
        })
    }

    /// Streamed dispatch followed by [`invoke`](Self::invoke).
    pub fn invoke_streamed(
        &self,
        target: &mut impl Receiver,
        method: &str,
        source: &mut impl TokenSource,
    ) -> DispatchResult<Option<Value>> {
        let invocation = self.dispatch_streamed(target.receiver_type(), method, source)?;
        self.invoke(target, &invocation)
    }

    /// Listed dispatch followed by [`invoke`](Self::invoke).
    pub fn invoke_listed(
        &self,
        target: &mut impl Receiver,
        method: &str,
        args: &[WireToken],
    ) -> DispatchResult<Option<Value>> {
        let invocation = self.dispatch_listed(target.receiver_type(), method, args)?;
        self.invoke(target, &invocation)
    }

    /// Convert one token and apply the call-site cast.
    fn convert(&self, spec: &MethodSpec, param: &ParameterSpec, kind: WireKind, text: &str) -> DispatchResult<Value> {
        let failure = |reason: String| DispatchError::ConversionFailure {
            method: spec.name.clone(),
            position: param.position,
            type_name: param.type_name.clone(),
            text: text.to_string(),
            reason,
        };

        Ok(match param.rule {
            TypeRule::Unsigned { bits } => Value::Uint(parse_uint(text, bits).map_err(|e| failure(e.to_string()))?),
            TypeRule::Signed { bits } => Value::Int(parse_int(text, bits).map_err(|e| failure(e.to_string()))?),
            TypeRule::Float { bits } => Value::Float(parse_float(text, bits).map_err(|e| failure(e.to_string()))?),
            TypeRule::Complex { bits } => {
                let real = parse_float(text, 64).map_err(|e| failure(e.to_string()))?;
                // complex64 holds a float32 real part
                let real = if bits == 64 { f64::from(real as f32) } else { real };
                Value::Complex(real, 0.0)
            }
            TypeRule::Bool => Value::Bool(kind == WireKind::True),
            TypeRule::Str => Value::Str(text.to_string()),
            TypeRule::Aggregate => Value::Aggregate(self.decoder.decode(&param.type_name, text).map_err(failure)?),
        })
    }
}

fn check_kind(spec: &MethodSpec, param: &ParameterSpec, found: WireKind) -> DispatchResult<()> {
    if param.accepted.contains(&found) {
        return Ok(());
    }
    Err(DispatchError::TokenKindMismatch {
        method: spec.name.clone(),
        position: param.position,
        type_name: param.type_name.clone(),
        expected: param.accepted.clone(),
        found,
    })
}

fn argument(param: &ParameterSpec, value: Value) -> Argument {
    Argument {
        position: param.position,
        name: param.name.clone(),
        type_name: param.type_name.clone(),
        value,
    }
}

fn invocation(receiver: &str, spec: &MethodSpec, arguments: Vec<Argument>) -> Invocation {
    Invocation {
        receiver: receiver.to_string(),
        method: spec.name.clone(),
        arguments,
        results: spec.results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_decoder_accepts_objects_only() {
        let decoder = JsonDecoder;
        assert!(decoder.decode("Point", r#"{"x": 1}"#).is_ok());
        assert_eq!(decoder.decode("Point", "null"), Ok(serde_json::Value::Null));
        assert_eq!(
            decoder.decode("Point", "42"),
            Err("json: cannot unmarshal number into Go value of type Point".to_string())
        );
        assert!(decoder.decode("Point", "{").is_err());
    }
}
