//! AVM1 object runtime
//!
//! The dynamic object model underlying ActionScript 1/2 execution: an
//! ECMAScript-3-style metaobject protocol (flagged property descriptors,
//! prototype-chain lookup, accessors, enumeration, `[[DefaultValue]]`), a
//! callable/constructible protocol for native and interpreted functions,
//! and the abstract value coercions with their SWF-version-gated legacy
//! quirks.
//!
//! # Example
//!
//! ```
//! use avm1rt::{Context, Value, builtins};
//! use avm1rt::runtime::new_object;
//!
//! let mut ctx = Context::new(6);
//! builtins::install(&mut ctx).unwrap();
//!
//! let obj = new_object(&ctx).unwrap();
//! obj.put(&ctx, "greeting", Value::string("hi")).unwrap();
//! // SWF 6 content resolves names case-insensitively
//! assert_eq!(obj.get(&ctx, "GREETING").unwrap(), Value::string("hi"));
//! ```

pub mod builtins;
pub mod context;
pub mod convert;
pub mod error;
pub mod runtime;
pub mod util;
pub mod value;

pub use context::Context;
pub use error::RuntimeError;
pub use runtime::ObjectRef;
pub use value::Value;
