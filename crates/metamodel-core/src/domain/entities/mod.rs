pub mod annotation;
pub mod class;
pub mod invocation;

pub use annotation::{Annotation, Annotations, AttrValue, names};
pub use class::{
    ClassDescriptor, ClassKind, FieldDescriptor, MethodDescriptor, MethodSignature, ParamDescriptor,
    ROOT_CLASS_NAME, Visibility,
};
pub use invocation::{Callable, DomainObject, InvocationError, MethodHandle, Value};
