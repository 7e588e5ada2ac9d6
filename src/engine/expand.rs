//! Recursive value decoding: turns a matched call into an argument tree

use alloy_dyn_abi::DynSolValue;
use futures::future::{join_all, BoxFuture, FutureExt};
use tracing::debug;

use super::context::DecodeContext;
use super::dispatch::Decoder;
use crate::domain::abi::{
    format_dyn_sol_value, Argument, BaseTypeClass, DecodedCall, DecodedValue, MatchedCall,
    ParamSpec, Scalar,
};

impl Decoder {
    /// Expand every argument of a match. Siblings are decoded concurrently,
    /// output keeps declaration order.
    pub(crate) async fn expand_call(&self, matched: MatchedCall, ctx: &DecodeContext) -> DecodedCall {
        let arguments = join_all(
            matched
                .inputs
                .iter()
                .cloned()
                .zip(matched.values.iter().cloned())
                .enumerate()
                .map(|(index, (spec, raw))| self.expand_argument(index, spec, raw, ctx)),
        )
        .await;

        DecodedCall {
            function_name: matched.function_name,
            signature: matched.signature,
            selector: matched.selector,
            source: matched.source,
            raw_args: matched.values,
            arguments,
        }
    }

    fn expand_argument<'a>(
        &'a self,
        index: usize,
        spec: ParamSpec,
        raw: DynSolValue,
        ctx: &'a DecodeContext,
    ) -> BoxFuture<'a, Argument> {
        async move {
            let name = if spec.name.is_empty() {
                format!("arg{index}")
            } else {
                spec.name.clone()
            };
            let base_type = classify(&spec);

            let value = match base_type {
                BaseTypeClass::Integer => DecodedValue::Scalar(Scalar::Integer(integer_string(&raw))),
                BaseTypeClass::Address => DecodedValue::Scalar(Scalar::Address(format_dyn_sol_value(&raw))),
                BaseTypeClass::Boolean => DecodedValue::Scalar(match &raw {
                    DynSolValue::Bool(flag) => Scalar::Bool(*flag),
                    other => Scalar::Text(format_dyn_sol_value(other)),
                }),
                BaseTypeClass::String => DecodedValue::Scalar(Scalar::Text(match &raw {
                    DynSolValue::String(text) => text.clone(),
                    other => format_dyn_sol_value(other),
                })),
                BaseTypeClass::Bytes => DecodedValue::Bytes(self.expand_bytes(&raw, ctx).await),
                BaseTypeClass::Tuple => DecodedValue::Tuple(self.expand_tuple(&spec, &raw, ctx).await),
                BaseTypeClass::Array => DecodedValue::Array(self.expand_array(&name, &spec, &raw, ctx).await),
                BaseTypeClass::Other => DecodedValue::Raw(raw.clone()),
            };

            Argument {
                name,
                declared_type: spec.canonical_type(),
                base_type,
                raw_value: raw,
                value,
            }
        }
        .boxed()
    }

    /// Re-enter the decoder one level deeper, unless that would pass the ceiling
    async fn expand_bytes(&self, raw: &DynSolValue, ctx: &DecodeContext) -> Option<Box<DecodedCall>> {
        let payload = match raw {
            DynSolValue::Bytes(bytes) => bytes.as_slice(),
            DynSolValue::FixedBytes(word, size) => &word.as_slice()[..(*size).min(32)],
            _ => return None,
        };

        let nested = ctx.nested();
        if nested.depth() > self.config().max_depth {
            debug!(
                depth = nested.depth(),
                max_depth = self.config().max_depth,
                "depth ceiling reached, leaving bytes undecoded"
            );
            return None;
        }
        self.decode(payload, &nested).await.map(Box::new)
    }

    async fn expand_tuple(
        &self,
        spec: &ParamSpec,
        raw: &DynSolValue,
        ctx: &DecodeContext,
    ) -> Option<Vec<Argument>> {
        if spec.components.is_empty() {
            return None;
        }
        let DynSolValue::Tuple(members) = raw else {
            return None;
        };

        let children = spec
            .components
            .iter()
            .cloned()
            .zip(members.iter().cloned())
            .enumerate()
            .map(|(index, (component, member))| self.expand_argument(index, component, member, ctx));
        Some(join_all(children).await)
    }

    async fn expand_array(
        &self,
        name: &str,
        spec: &ParamSpec,
        raw: &DynSolValue,
        ctx: &DecodeContext,
    ) -> Vec<Argument> {
        let (Some(element), DynSolValue::Array(items) | DynSolValue::FixedArray(items)) =
            (spec.element(), raw)
        else {
            return Vec::new();
        };

        let children = items.iter().cloned().enumerate().map(|(index, item)| {
            let mut element = element.clone();
            element.name = format!("{name}[{index}]");
            self.expand_argument(index, element, item, ctx)
        });
        join_all(children).await
    }
}

/// Arrays and bare tuples are recognised from the declaration itself, so a
/// tuple with no components still classifies as a tuple.
fn classify(spec: &ParamSpec) -> BaseTypeClass {
    if spec.element().is_some() {
        BaseTypeClass::Array
    } else if spec.kind == "tuple" {
        BaseTypeClass::Tuple
    } else {
        spec.resolve()
            .map_or(BaseTypeClass::Other, |ty| BaseTypeClass::of(&ty))
    }
}

fn integer_string(raw: &DynSolValue) -> String {
    match raw {
        DynSolValue::Int(value, _) => value.to_string(),
        DynSolValue::Uint(value, _) => value.to_string(),
        other => format_dyn_sol_value(other),
    }
}
