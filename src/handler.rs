//! Handler records and the typed adapters that build them.
//!
//! A handler is registered as an ordinary Rust function taking the instrument by
//! `&mut` receiver plus up to four typed arguments. The [`IntoCommandHandler`]
//! adapter erases the function behind a uniform callable and derives its
//! [`Signature`] — the ordered argument type list and reply type — from the
//! function's own type. Submodule accessors get the same treatment through
//! [`IntoSubmoduleAccessor`], except that their result is a mutable borrow of a
//! nested instrument instead of a reply value.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::MockError;
use crate::value::{ArgType, ReplyType, ScpiArg, ScpiReply, ScpiValue};

/// Type-erased handler callable.
///
/// Dispatch hands it the instrument and the already-coerced argument values; it
/// returns the optional reply value.
pub type HandlerFn<S> =
    Arc<dyn Fn(&mut S, &[ScpiValue]) -> Result<Option<ScpiValue>, MockError> + Send + Sync>;

/// Type-erased submodule accessor.
///
/// Resolves a mutable borrow of the nested instrument that the rest of a
/// composed command addresses.
pub type AccessorFn<S, Sub> = Arc<
    dyn for<'a> Fn(&'a mut S, &[ScpiValue]) -> Result<&'a mut Sub, MockError> + Send + Sync,
>;

/// Declared shape of a handler: its argument types in capture-group order and
/// its reply type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    /// Argument types, one per capture group, left to right.
    pub args: Vec<ArgType>,
    /// Declared reply type. Descriptive only; never drives dispatch.
    pub reply: ReplyType,
}

impl Signature {
    /// Coerce captured groups into typed values, left to right.
    pub(crate) fn coerce(
        &self,
        captures: &regex::Captures<'_>,
    ) -> Result<Vec<ScpiValue>, MockError> {
        self.args
            .iter()
            .enumerate()
            .map(|(position, arg_type)| {
                let group = captures.get(position + 1).ok_or_else(|| MockError::Coercion {
                    position,
                    expected: arg_type.label(),
                    value: String::new(),
                })?;
                arg_type.coerce(position, group.as_str())
            })
            .collect()
    }
}

/// One registered command handler: the callable, its signature, and an optional
/// latency override.
///
/// The callable and signature are frozen at registration time. The latency
/// override is the one piece of mutable state: it lives behind a mutex because
/// the record is shared by every instance of the owning instrument type, and
/// `set_call_delay` may adjust it after the table is built.
pub struct HandlerSpec<S> {
    callable: HandlerFn<S>,
    signature: Signature,
    delay: Mutex<Option<Duration>>,
}

impl<S> HandlerSpec<S> {
    pub(crate) fn new(callable: HandlerFn<S>, signature: Signature) -> Self {
        Self {
            callable,
            signature,
            delay: Mutex::new(None),
        }
    }

    /// The declared signature of this handler.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The current latency override, if one has been set.
    pub fn delay(&self) -> Option<Duration> {
        *self.delay.lock().unwrap()
    }

    /// Set or clear the latency override.
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub(crate) fn invoke(
        &self,
        instrument: &mut S,
        values: &[ScpiValue],
    ) -> Result<Option<ScpiValue>, MockError> {
        (self.callable)(instrument, values)
    }

    pub(crate) fn callable(&self) -> HandlerFn<S> {
        Arc::clone(&self.callable)
    }
}

impl<S> fmt::Debug for HandlerSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("signature", &self.signature)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

/// Conversion of typed functions into command handlers.
///
/// Implemented for `Fn(&mut S, A1, .., An) -> R` up to four arguments, where
/// each `Ai: ScpiArg` and `R: ScpiReply`. The `Args` parameter is the tuple of
/// argument types and exists only to keep the blanket impls coherent.
pub trait IntoCommandHandler<S, Args> {
    /// Erase the function and derive its signature.
    fn into_spec(self) -> HandlerSpec<S>;
}

/// Conversion of typed accessor functions into submodule accessors.
///
/// Implemented for `Fn(&mut S, A1, .., An) -> Result<&mut Sub, MockError>` up to
/// four arguments. The borrow returned by the accessor becomes the receiver of
/// the nested handler during composed dispatch.
pub trait IntoSubmoduleAccessor<S, Sub, Args> {
    /// Erase the accessor and derive its argument types.
    fn into_accessor(self) -> (AccessorFn<S, Sub>, Vec<ArgType>);
}

macro_rules! impl_command_handler {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<S, F, R, $($arg,)*> IntoCommandHandler<S, ($($arg,)*)> for F
        where
            S: 'static,
            F: Fn(&mut S $(, $arg)*) -> R + Send + Sync + 'static,
            R: ScpiReply,
            $($arg: ScpiArg,)*
        {
            fn into_spec(self) -> HandlerSpec<S> {
                let signature = Signature {
                    args: vec![$($arg::arg_type()),*],
                    reply: R::reply_type(),
                };
                let callable: HandlerFn<S> = Arc::new(move |instrument: &mut S, values: &[ScpiValue]| {
                    let mut values = values.iter();
                    $(
                        let $arg = values
                            .next()
                            .and_then($arg::from_value)
                            .ok_or_else(|| MockError::Instrument(
                                "handler invoked with mismatched arguments".to_string(),
                            ))?;
                    )*
                    (self)(instrument $(, $arg)*).into_reply()
                });
                HandlerSpec::new(callable, signature)
            }
        }
    };
}

impl_command_handler!();
impl_command_handler!(A1);
impl_command_handler!(A1, A2);
impl_command_handler!(A1, A2, A3);
impl_command_handler!(A1, A2, A3, A4);

macro_rules! impl_submodule_accessor {
    ($($arg:ident),*) => {
        #[allow(non_snake_case, unused_variables, unused_mut)]
        impl<S, Sub, F, $($arg,)*> IntoSubmoduleAccessor<S, Sub, ($($arg,)*)> for F
        where
            S: 'static,
            Sub: 'static,
            F: for<'a> Fn(&'a mut S $(, $arg)*) -> Result<&'a mut Sub, MockError>
                + Send
                + Sync
                + 'static,
            $($arg: ScpiArg,)*
        {
            fn into_accessor(self) -> (AccessorFn<S, Sub>, Vec<ArgType>) {
                let args = vec![$($arg::arg_type()),*];
                let accessor: AccessorFn<S, Sub> =
                    Arc::new(move |instrument: &mut S, values: &[ScpiValue]| {
                        let mut values = values.iter();
                        $(
                            let $arg = values
                                .next()
                                .and_then($arg::from_value)
                                .ok_or_else(|| MockError::Instrument(
                                    "accessor invoked with mismatched arguments".to_string(),
                                ))?;
                        )*
                        (self)(instrument $(, $arg)*)
                    });
                (accessor, args)
            }
        }
    };
}

impl_submodule_accessor!();
impl_submodule_accessor!(A1);
impl_submodule_accessor!(A1, A2);
impl_submodule_accessor!(A1, A2, A3);
impl_submodule_accessor!(A1, A2, A3, A4);

/// Chain a submodule accessor with one of the submodule's own handlers.
///
/// The combined handler's argument list is the accessor's arguments followed by
/// the inner handler's; its callable splits the incoming values at the accessor
/// arity, resolves the submodule borrow, and invokes the inner callable against
/// it. The combined reply type is the inner handler's — the intermediate
/// submodule never appears on the wire. Because the inner handler may itself be
/// a composite, chains of any depth fall out of repeated application.
pub(crate) fn combine<S, Sub>(
    accessor: AccessorFn<S, Sub>,
    accessor_args: Vec<ArgType>,
    inner: &HandlerSpec<Sub>,
) -> HandlerSpec<S>
where
    S: 'static,
    Sub: 'static,
{
    let split = accessor_args.len();
    let inner_fn = inner.callable();
    let callable: HandlerFn<S> = Arc::new(move |instrument: &mut S, values: &[ScpiValue]| {
        let (outer_values, inner_values) = values.split_at(split);
        let submodule = accessor(instrument, outer_values)?;
        inner_fn(submodule, inner_values)
    });

    let mut args = accessor_args;
    args.extend(inner.signature().args.iter().copied());
    HandlerSpec::new(
        callable,
        Signature {
            args,
            reply: inner.signature().reply,
        },
    )
}
