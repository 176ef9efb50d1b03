//! Object runtime
//!
//! The object model and its metaobject protocol: property tables and
//! descriptors, the prototype-chain protocol, and the callable protocol.

pub mod function;
pub mod object;
pub mod property;

pub use function::{Callable, CallFn, ConstructFn, FunctionData};
pub use function::{eval_function, native_function, native_function_bare};
pub use object::{DefaultValueHint, Object, ObjectRef, new_object};
pub use object::{CONSTRUCTOR_PROPERTY, PROTO_PROPERTY, PROTOTYPE_PROPERTY};
pub use property::{PropertyDescriptor, PropertyFlags, PropertyTable, normalize_name};
