mod types;

pub use types::{DiscriminatorDescriptor, Property, RustPrimitive, TypeDescriptor, TypeKind, UnionKind};
