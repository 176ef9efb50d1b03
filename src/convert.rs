//! Value coercions
//!
//! The ECMAScript-3 abstract conversions as AVM1 content observes them,
//! including the legacy quirks gated on the content's SWF version: older
//! content sees `0` where newer content sees NaN, and an empty string where
//! newer content sees `"undefined"`.
//!
//! All conversions take the value by reference and never mutate it; the
//! object-to-primitive step goes through `[[DefaultValue]]` and may run
//! script-visible `valueOf`/`toString` methods.

use crate::context::{
    BUILTIN_ARRAY, BUILTIN_BOOLEAN, BUILTIN_NUMBER, BUILTIN_STRING, Context,
};
use crate::error::RuntimeError;
use crate::runtime::{DefaultValueHint, ObjectRef};
use crate::util::dtoa;
use crate::value::{Value, ValueKind};

/// Numeric coercion results for kinds with no intrinsic number: the value
/// is NaN from the gated SWF version on, and `0` before it. Undefined and
/// null turned NaN in SWF 7; objects that resist primitive conversion did
/// so already in SWF 5.
const NUMBER_NAN_GATES: [(ValueKind, u8); 3] = [
    (ValueKind::Undefined, 7),
    (ValueKind::Null, 7),
    (ValueKind::Object, 5),
];

fn numeric_fallback(kind: ValueKind, swf_version: u8) -> f64 {
    for (gated_kind, from_version) in NUMBER_NAN_GATES {
        if gated_kind == kind {
            return if swf_version >= from_version {
                f64::NAN
            } else {
                0.0
            };
        }
    }
    f64::NAN
}

/// `ToPrimitive`: primitives pass through, objects go through
/// `[[DefaultValue]]`.
///
/// The result may still be an object when the object has no callable
/// conversion method; the numeric and string coercions below handle that
/// residue with their version-gated fallbacks.
pub fn to_primitive(
    ctx: &Context,
    v: &Value,
    hint: DefaultValueHint,
) -> Result<Value, RuntimeError> {
    match v {
        Value::Object(obj) => obj.default_value(ctx, hint),
        _ => Ok(v.clone()),
    }
}

/// `ToBoolean`. Never fails and never runs script.
pub fn to_boolean(_ctx: &Context, v: &Value) -> bool {
    match v {
        Value::Undefined | Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Object(_) => true,
    }
}

/// `ToNumber`, with the SWF-version gates of [`NUMBER_NAN_GATES`] plus the
/// legacy empty-string rule (zero before SWF 5).
pub fn to_number(ctx: &Context, v: &Value) -> Result<f64, RuntimeError> {
    match v {
        Value::Undefined | Value::Null => Ok(numeric_fallback(v.kind(), ctx.swf_version())),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => Ok(*n),
        Value::String(s) => {
            if s.is_empty() && ctx.swf_version() < 5 {
                return Ok(0.0);
            }
            Ok(dtoa::str_to_number(s))
        }
        Value::Object(_) => {
            let prim = to_primitive(ctx, v, DefaultValueHint::Number)?;
            match prim {
                Value::Object(_) => Ok(numeric_fallback(ValueKind::Object, ctx.swf_version())),
                _ => to_number(ctx, &prim),
            }
        }
    }
}

/// `ToInteger`: NaN becomes zero, infinities and zeros pass through,
/// everything else truncates toward zero.
pub fn to_integer(ctx: &Context, v: &Value) -> Result<f64, RuntimeError> {
    let n = to_number(ctx, v)?;
    Ok(if n.is_nan() { 0.0 } else { n.trunc() })
}

/// `ToInt32`: modular reduction into the signed 32-bit range.
pub fn to_int32(ctx: &Context, v: &Value) -> Result<i32, RuntimeError> {
    let n = to_number(ctx, v)?;
    if n.is_nan() || n.is_infinite() || n == 0.0 {
        return Ok(0);
    }
    const TWO_32: f64 = 4294967296.0;
    let m = n.trunc().rem_euclid(TWO_32);
    Ok(if m >= TWO_32 / 2.0 {
        (m - TWO_32) as i32
    } else {
        m as i32
    })
}

/// `ToString`, with the SWF 7 gate for undefined (empty string before) and
/// a `[type Class]` placeholder for objects that resist conversion.
pub fn to_string(ctx: &Context, v: &Value) -> Result<String, RuntimeError> {
    match v {
        Value::Undefined => Ok(if ctx.swf_version() >= 7 {
            "undefined".to_string()
        } else {
            String::new()
        }),
        Value::Null => Ok("null".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(dtoa::number_to_string(*n)),
        Value::String(s) => Ok(s.to_string()),
        Value::Object(_) => {
            let prim = to_primitive(ctx, v, DefaultValueHint::String)?;
            match prim {
                // the tag names the class of whatever conversion left over,
                // not the receiver
                Value::Object(residue) => Ok(format!("[type {}]", object_class_name(&residue))),
                _ => to_string(ctx, &prim),
            }
        }
    }
}

/// `ToObject`: objects pass through, primitives box via their builtin
/// class, undefined and null fail.
pub fn to_object(ctx: &Context, v: &Value) -> Result<ObjectRef, RuntimeError> {
    match v {
        Value::Undefined => Err(RuntimeError::TypeConversion("undefined")),
        Value::Null => Err(RuntimeError::TypeConversion("null")),
        Value::Bool(_) => box_primitive(ctx, v, BUILTIN_BOOLEAN),
        Value::Number(_) => box_primitive(ctx, v, BUILTIN_NUMBER),
        Value::String(_) => box_primitive(ctx, v, BUILTIN_STRING),
        Value::Object(obj) => Ok(obj.clone()),
    }
}

/// Allocate a wrapper instance of the given builtin class holding the
/// primitive as its boxed payload.
fn box_primitive(ctx: &Context, v: &Value, class_name: &str) -> Result<ObjectRef, RuntimeError> {
    let class = ctx.builtin(class_name)?;
    let proto = match class.prototype_property(ctx)? {
        Value::Object(p) => p,
        _ => return Err(RuntimeError::MissingBuiltin(class_name.to_string())),
    };
    let boxed = ObjectRef::new(ctx);
    boxed.set_prototype(Some(proto));
    boxed.set_own_constructor_property(ctx, Value::Object(class));
    boxed.set_boxed_value(v.clone());
    Ok(boxed)
}

/// Check whether the value is a function object.
pub fn is_callable(v: &Value) -> bool {
    matches!(v, Value::Object(obj) if obj.is_function())
}

/// `instanceof`: walk the value's prototype chain, starting at the value
/// itself, looking for the constructor's `prototype` object. The receiver
/// is included, so a prototype object is an instance of its own class.
///
/// False for primitives and for constructors whose `prototype` property is
/// not an object.
pub fn instance_of(ctx: &Context, v: &Value, constructor: &ObjectRef) -> Result<bool, RuntimeError> {
    let target = match constructor.prototype_property(ctx)? {
        Value::Object(p) => p,
        _ => return Ok(false),
    };
    let mut cursor = match v {
        Value::Object(obj) => Some(obj.clone()),
        _ => None,
    };
    let mut depth = 0;
    while let Some(proto) = cursor {
        if depth > ctx.max_prototype_depth() {
            return Err(RuntimeError::PrototypeChainTooDeep {
                limit: ctx.max_prototype_depth(),
            });
        }
        if proto.ptr_eq(&target) {
            return Ok(true);
        }
        cursor = proto.prototype();
        depth += 1;
    }
    Ok(false)
}

/// Check whether the value names an array index: a canonical base-10
/// unsigned 32-bit integer.
pub fn is_index(ctx: &Context, v: &Value) -> Result<bool, RuntimeError> {
    match v {
        Value::Number(n) => Ok(number_is_index(*n)),
        _ => Ok(name_is_index(&to_string(ctx, v)?)),
    }
}

fn number_is_index(n: f64) -> bool {
    n >= 0.0 && n <= u32::MAX as f64 && (n as u32) as f64 == n
}

fn name_is_index(name: &str) -> bool {
    match name.parse::<u32>() {
        Ok(u) => u.to_string() == name,
        Err(_) => false,
    }
}

/// Check whether the value is an instance of the Array builtin.
pub fn is_array(ctx: &Context, v: &Value) -> Result<bool, RuntimeError> {
    instance_of(ctx, v, &ctx.builtin(BUILTIN_ARRAY)?)
}

/// Check whether the value is a primitive string.
pub fn is_string(v: &Value) -> bool {
    matches!(v, Value::String(_))
}

/// Class name an object reports in diagnostics and failed string
/// conversion: `Function` for callables, `Object` otherwise.
pub fn object_class_name(obj: &ObjectRef) -> &'static str {
    if obj.is_function() { "Function" } else { "Object" }
}

/// Visit every enumerable property name of the object and its chain, own
/// names first.
pub fn for_each_property<F>(ctx: &Context, obj: &ObjectRef, mut f: F) -> Result<(), RuntimeError>
where
    F: FnMut(&str),
{
    for key in obj.keys(ctx)? {
        f(&key);
    }
    Ok(())
}

/// Read a property and invoke it as a method with `this` bound to the
/// holder.
pub fn call_property(
    ctx: &Context,
    obj: &ObjectRef,
    name: &str,
    args: &[Value],
) -> Result<Value, RuntimeError> {
    match obj.get(ctx, name)? {
        Value::Object(func) if func.is_function() => {
            func.call(ctx, &Value::Object(obj.clone()), args)
        }
        _ => Err(RuntimeError::NotCallable),
    }
}
