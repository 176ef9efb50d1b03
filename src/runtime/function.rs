//! Callable and constructible objects
//!
//! A function is an ordinary object carrying [`FunctionData`]: native
//! functions hold host closures for call and/or construct, interpreted
//! functions hold a single body closure and get the generic construction
//! protocol (allocate, wire prototype and constructor back-link, run the
//! body with `this` bound, honor an object return value).
//!
//! Property accessors need callables before the Function builtin exists,
//! so [`Callable`] also admits bare closures with no object identity.

use std::rc::Rc;

use crate::context::{BUILTIN_FUNCTION, BUILTIN_OBJECT, Context};
use crate::error::RuntimeError;
use crate::runtime::object::{ObjectRef, new_object};
use crate::value::Value;

/// Host entry point for calling: `(ctx, this, args) -> value`.
pub type CallFn = Rc<dyn Fn(&Context, &Value, &[Value]) -> Result<Value, RuntimeError>>;

/// Host entry point for native construction: `(ctx, callee, args) -> instance`.
pub type ConstructFn = Rc<dyn Fn(&Context, &ObjectRef, &[Value]) -> Result<ObjectRef, RuntimeError>>;

/// What makes an object a function.
#[derive(Clone)]
pub enum FunctionData {
    /// Host-implemented function. Either entry point may be absent: a
    /// class constructor may be construct-only, a method call-only.
    Native {
        call: Option<CallFn>,
        construct: Option<ConstructFn>,
    },
    /// Interpreted function: one body closure serves both invocation and
    /// the generic construction protocol.
    Eval { body: CallFn },
}

/// A callable entry point: either a function object or a bare closure.
///
/// Bare closures back native accessors (such as `__proto__`) that must not
/// allocate a function object per property.
#[derive(Clone)]
pub enum Callable {
    Object(ObjectRef),
    Bare(CallFn),
}

impl Callable {
    /// Wrap a closure as a bare callable.
    pub fn from_fn<F>(f: F) -> Callable
    where
        F: Fn(&Context, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
    {
        Callable::Bare(Rc::new(f))
    }

    /// Invoke with `this` bound to `this`.
    pub fn call(
        &self,
        ctx: &Context,
        this: &Value,
        args: &[Value],
    ) -> Result<Value, RuntimeError> {
        match self {
            Callable::Object(obj) => obj.call(ctx, this, args),
            Callable::Bare(f) => f(ctx, this, args),
        }
    }
}

impl std::fmt::Debug for Callable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Callable::Object(obj) => write!(f, "Callable::{:?}", obj),
            Callable::Bare(_) => write!(f, "Callable::Bare"),
        }
    }
}

impl ObjectRef {
    /// Invoke this object as a function.
    ///
    /// Fails with [`RuntimeError::AbstractMethod`] on a plain object and
    /// [`RuntimeError::NotCallable`] on a construct-only native function.
    pub fn call(&self, ctx: &Context, this: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        let data = self
            .function_data()
            .ok_or(RuntimeError::AbstractMethod("call"))?;
        match data {
            FunctionData::Native { call: Some(f), .. } => f(ctx, this, args),
            FunctionData::Native { call: None, .. } => Err(RuntimeError::NotCallable),
            FunctionData::Eval { body } => body(ctx, this, args),
        }
    }

    /// Invoke this object as a constructor, returning the new instance.
    ///
    /// Native functions delegate entirely to their construct closure.
    /// Interpreted functions run the generic protocol: allocate an
    /// instance, link it to this function's `prototype` property (falling
    /// back to the base Object prototype when that is not an object), set
    /// the constructor back-link, then run the body with `this` bound to
    /// the instance. A body returning an object replaces the allocated
    /// instance; any primitive return is discarded.
    pub fn construct(&self, ctx: &Context, args: &[Value]) -> Result<ObjectRef, RuntimeError> {
        let data = self
            .function_data()
            .ok_or(RuntimeError::AbstractMethod("construct"))?;
        match data {
            FunctionData::Native {
                construct: Some(f), ..
            } => f(ctx, self, args),
            FunctionData::Native {
                construct: None, ..
            } => Err(RuntimeError::NotConstructible),
            FunctionData::Eval { body } => {
                let instance = ObjectRef::new(ctx);
                let proto = match self.prototype_property(ctx)? {
                    Value::Object(p) => Some(p),
                    _ => match ctx.builtin(BUILTIN_OBJECT)?.prototype_property(ctx)? {
                        Value::Object(p) => Some(p),
                        _ => None,
                    },
                };
                instance.set_prototype(proto);
                instance.set_own_constructor_property(ctx, Value::Object(self.clone()));
                let result = body(ctx, &Value::Object(instance.clone()), args)?;
                Ok(match result {
                    Value::Object(replacement) => replacement,
                    _ => instance,
                })
            }
        }
    }
}

/// Create a native function object wired to the Function builtin.
pub fn native_function(
    ctx: &Context,
    call: Option<CallFn>,
    construct: Option<ConstructFn>,
) -> Result<ObjectRef, RuntimeError> {
    init_function(ctx, FunctionData::Native { call, construct })
}

/// Create a call-only native function with no builtin wiring.
///
/// Used during bootstrap and wherever a plain host callback is enough.
pub fn native_function_bare<F>(ctx: &Context, f: F) -> ObjectRef
where
    F: Fn(&Context, &Value, &[Value]) -> Result<Value, RuntimeError> + 'static,
{
    ObjectRef::with_function(
        ctx,
        FunctionData::Native {
            call: Some(Rc::new(f)),
            construct: None,
        },
    )
}

/// Create an interpreted function object: wired to the Function builtin
/// and carrying a fresh `prototype` object for its future instances.
pub fn eval_function(ctx: &Context, body: CallFn) -> Result<ObjectRef, RuntimeError> {
    let func = init_function(ctx, FunctionData::Eval { body })?;
    let proto = new_object(ctx)?;
    func.set_own_prototype_property(ctx, Value::Object(proto));
    Ok(func)
}

fn init_function(ctx: &Context, data: FunctionData) -> Result<ObjectRef, RuntimeError> {
    let func = ObjectRef::with_function(ctx, data);
    let base = ctx.builtin(BUILTIN_FUNCTION)?;
    if let Value::Object(proto) = base.prototype_property(ctx)? {
        func.set_prototype(Some(proto));
    }
    func.set_own_constructor_property(ctx, Value::Object(base));
    Ok(func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins;
    use crate::runtime::object::CONSTRUCTOR_PROPERTY;

    fn ctx(version: u8) -> Context {
        let mut ctx = Context::new(version);
        builtins::install(&mut ctx).unwrap();
        ctx
    }

    #[test]
    fn test_plain_object_is_not_callable() {
        let ctx = Context::new(6);
        let obj = ObjectRef::new(&ctx);
        assert!(!obj.is_function());
        assert_eq!(
            obj.call(&ctx, &Value::Undefined, &[]).unwrap_err(),
            RuntimeError::AbstractMethod("call")
        );
        assert_eq!(
            obj.construct(&ctx, &[]).unwrap_err(),
            RuntimeError::AbstractMethod("construct")
        );
    }

    #[test]
    fn test_native_function_missing_entry_points() {
        let ctx = ctx(6);
        let call_only = native_function_bare(&ctx, |_ctx, _this, _args| Ok(Value::number(1.0)));
        assert_eq!(
            call_only.call(&ctx, &Value::Undefined, &[]).unwrap(),
            Value::number(1.0)
        );
        assert_eq!(
            call_only.construct(&ctx, &[]).unwrap_err(),
            RuntimeError::NotConstructible
        );

        let construct_only = native_function(
            &ctx,
            None,
            Some(Rc::new(|ctx: &Context, _callee: &ObjectRef, _args: &[Value]| {
                Ok(ObjectRef::new(ctx))
            })),
        )
        .unwrap();
        assert_eq!(
            construct_only.call(&ctx, &Value::Undefined, &[]).unwrap_err(),
            RuntimeError::NotCallable
        );
        assert!(construct_only.construct(&ctx, &[]).is_ok());
    }

    #[test]
    fn test_native_function_wired_to_function_builtin() {
        let ctx = ctx(6);
        let func = native_function(&ctx, None, None).unwrap();
        assert!(func.is_function());

        let function_class = ctx.builtin(crate::context::BUILTIN_FUNCTION).unwrap();
        let expected = function_class.prototype_property(&ctx).unwrap();
        assert_eq!(Value::Object(func.prototype().unwrap()), expected);
        assert_eq!(
            func.constructor_property(&ctx).unwrap(),
            Value::Object(function_class)
        );
    }

    #[test]
    fn test_eval_construct_wires_instance() {
        let ctx = ctx(6);
        let func = eval_function(
            &ctx,
            Rc::new(|ctx: &Context, this: &Value, args: &[Value]| {
                let instance = this.as_object().expect("this must be the instance");
                let arg = args.first().cloned().unwrap_or_default();
                instance.put(ctx, "arg", arg)?;
                Ok(Value::Undefined)
            }),
        )
        .unwrap();

        let instance = func.construct(&ctx, &[Value::number(3.0)]).unwrap();
        assert_eq!(instance.get(&ctx, "arg").unwrap(), Value::number(3.0));
        assert_eq!(
            instance.constructor_property(&ctx).unwrap(),
            Value::Object(func.clone())
        );

        let proto = func.prototype_property(&ctx).unwrap();
        assert_eq!(Value::Object(instance.prototype().unwrap()), proto);
        // back-link is hidden from enumeration
        assert!(!instance.own_keys().contains(&CONSTRUCTOR_PROPERTY.to_string()));
    }

    #[test]
    fn test_eval_construct_object_return_replaces_instance() {
        let ctx = ctx(6);
        let replacement = ObjectRef::new(&ctx);
        let captured = replacement.clone();
        let func = eval_function(
            &ctx,
            Rc::new(move |_ctx: &Context, _this: &Value, _args: &[Value]| {
                Ok(Value::Object(captured.clone()))
            }),
        )
        .unwrap();

        let result = func.construct(&ctx, &[]).unwrap();
        assert!(result.ptr_eq(&replacement));
    }

    #[test]
    fn test_eval_construct_primitive_return_is_discarded() {
        let ctx = ctx(6);
        let func = eval_function(
            &ctx,
            Rc::new(|_ctx: &Context, _this: &Value, _args: &[Value]| {
                Ok(Value::number(42.0))
            }),
        )
        .unwrap();

        let result = func.construct(&ctx, &[]).unwrap();
        assert!(result.constructor_property(&ctx).unwrap().is_object());
    }

    #[test]
    fn test_eval_construct_non_object_prototype_falls_back() {
        let ctx = ctx(6);
        let func = eval_function(
            &ctx,
            Rc::new(|_ctx: &Context, _this: &Value, _args: &[Value]| Ok(Value::Undefined)),
        )
        .unwrap();
        func.set_own_prototype_property(&ctx, Value::number(1.0));

        let instance = func.construct(&ctx, &[]).unwrap();
        let object_class = ctx.builtin(crate::context::BUILTIN_OBJECT).unwrap();
        let base_proto = object_class.prototype_property(&ctx).unwrap();
        assert_eq!(Value::Object(instance.prototype().unwrap()), base_proto);
    }

    #[test]
    fn test_bare_callable() {
        let ctx = Context::new(6);
        let c = Callable::from_fn(|_ctx, _this, args| {
            Ok(args.first().cloned().unwrap_or_default())
        });
        assert_eq!(
            c.call(&ctx, &Value::Undefined, &[Value::number(2.0)]).unwrap(),
            Value::number(2.0)
        );
    }
}
