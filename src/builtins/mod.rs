//! Builtin class bootstrap
//!
//! Builds the core class graph — Object and Function first (their
//! prototypes are mutually entangled), then the boxing classes Boolean,
//! Number and String, then Array, Date and the Math singleton — and
//! registers everything in the context's class registry.
//!
//! The classes installed here carry only the structure the runtime itself
//! relies on: prototype objects, constructor wiring and primitive boxing.
//! Host embedders layer the script-visible methods on top of these
//! prototypes.

use std::rc::Rc;

use crate::context::{
    BUILTIN_ARRAY, BUILTIN_BOOLEAN, BUILTIN_DATE, BUILTIN_FUNCTION, BUILTIN_MATH,
    BUILTIN_NUMBER, BUILTIN_OBJECT, BUILTIN_STRING, Context,
};
use crate::convert;
use crate::error::RuntimeError;
use crate::runtime::{CallFn, FunctionData, ObjectRef};
use crate::value::Value;

type InitFn = Rc<dyn Fn(&Context, &ObjectRef, &[Value]) -> Result<(), RuntimeError>>;

/// Build and register the builtin class graph.
///
/// Must run once per context before any operation that resolves builtins
/// (allocation, boxing, `instanceof` against builtin classes).
pub fn install(ctx: &mut Context) -> Result<(), RuntimeError> {
    let object_proto = ObjectRef::new(ctx);
    let function_proto = ObjectRef::new(ctx);
    function_proto.set_prototype(Some(object_proto.clone()));

    let object_class = class_function(ctx, &function_proto, &object_proto, None, None);
    let function_class = class_function(ctx, &function_proto, &function_proto, None, None);

    let boolean_class = boxing_class(
        ctx,
        &function_proto,
        &object_proto,
        Rc::new(|ctx: &Context, v: &Value| Ok(Value::Bool(convert::to_boolean(ctx, v)))),
    );
    let number_class = boxing_class(
        ctx,
        &function_proto,
        &object_proto,
        Rc::new(|ctx: &Context, v: &Value| Ok(Value::number(convert::to_number(ctx, v)?))),
    );
    let string_class = boxing_class(
        ctx,
        &function_proto,
        &object_proto,
        Rc::new(|ctx: &Context, v: &Value| Ok(Value::string(convert::to_string(ctx, v)?))),
    );

    let array_proto = child_proto(ctx, &object_proto);
    let array_class = class_function(ctx, &function_proto, &array_proto, None, None);
    let date_proto = child_proto(ctx, &object_proto);
    let date_class = class_function(ctx, &function_proto, &date_proto, None, None);

    // Math is a plain namespace object, not a constructor
    let math = ObjectRef::new(ctx);
    math.set_prototype(Some(object_proto));

    ctx.register_class(BUILTIN_OBJECT, object_class);
    ctx.register_class(BUILTIN_FUNCTION, function_class);
    ctx.register_class(BUILTIN_BOOLEAN, boolean_class);
    ctx.register_class(BUILTIN_NUMBER, number_class);
    ctx.register_class(BUILTIN_STRING, string_class);
    ctx.register_class(BUILTIN_ARRAY, array_class);
    ctx.register_class(BUILTIN_DATE, date_class);
    ctx.register_class(BUILTIN_MATH, math);
    Ok(())
}

/// Fresh prototype object chained to the base Object prototype.
fn child_proto(ctx: &Context, object_proto: &ObjectRef) -> ObjectRef {
    let proto = ObjectRef::new(ctx);
    proto.set_prototype(Some(object_proto.clone()));
    proto
}

/// Build one class function: a native constructor allocating instances
/// linked to `instance_proto`, wired into the function-object graph.
fn class_function(
    ctx: &Context,
    function_proto: &ObjectRef,
    instance_proto: &ObjectRef,
    call: Option<CallFn>,
    init: Option<InitFn>,
) -> ObjectRef {
    let proto = instance_proto.clone();
    let construct = Rc::new(
        move |ctx: &Context, callee: &ObjectRef, args: &[Value]| -> Result<ObjectRef, RuntimeError> {
            let instance = ObjectRef::new(ctx);
            instance.set_prototype(Some(proto.clone()));
            instance.set_own_constructor_property(ctx, Value::Object(callee.clone()));
            if let Some(init) = &init {
                init(ctx, &instance, args)?;
            }
            Ok(instance)
        },
    );
    let class = ObjectRef::with_function(
        ctx,
        FunctionData::Native {
            call,
            construct: Some(construct),
        },
    );
    class.set_prototype(Some(function_proto.clone()));
    class.set_own_prototype_property(ctx, Value::Object(instance_proto.clone()));
    instance_proto.set_own_constructor_property(ctx, Value::Object(class.clone()));
    class
}

/// Build a primitive-boxing class: constructing stores the coerced
/// primitive as the instance's payload, calling returns the coerced
/// primitive directly.
fn boxing_class(
    ctx: &Context,
    function_proto: &ObjectRef,
    object_proto: &ObjectRef,
    coerce: Rc<dyn Fn(&Context, &Value) -> Result<Value, RuntimeError>>,
) -> ObjectRef {
    let proto = child_proto(ctx, object_proto);
    let call = {
        let coerce = coerce.clone();
        Rc::new(move |ctx: &Context, _this: &Value, args: &[Value]| {
            coerce(ctx, args.first().unwrap_or(&Value::Undefined))
        }) as CallFn
    };
    let init = Rc::new(
        move |ctx: &Context, instance: &ObjectRef, args: &[Value]| -> Result<(), RuntimeError> {
            let payload = coerce(ctx, args.first().unwrap_or(&Value::Undefined))?;
            instance.set_boxed_value(payload);
            Ok(())
        },
    ) as InitFn;
    class_function(ctx, function_proto, &proto, Some(call), Some(init))
}
