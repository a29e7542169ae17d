use std::collections::BTreeSet;

use crate::{
  spec::{ObjectOrReference, ObjectSchema, SchemaType, SpecBundle, SpecVersion},
  utils::{SchemaExt, schema_ext::flag},
};

/// Whether `schema` admits `null` under the rules of `version`.
///
/// 3.0 reads the `nullable` keyword. 3.1 computes it from JSON Schema
/// semantics, see [`permits_null`].
pub fn is_nullable(bundle: &SpecBundle, schema: &ObjectSchema, version: SpecVersion, document: Option<&str>) -> bool {
  match version {
    SpecVersion::V3_0 => flag(schema.nullable),
    SpecVersion::V3_1 => permits_null(bundle, schema, document),
  }
}

/// JSON Schema 3.1 nullability.
///
/// An explicit `type` without `null`, or an `enum`/`const` without a `null`
/// member, forbids null outright, as does a `not` that itself accepts null.
/// Otherwise `allOf` needs every branch to accept null, `oneOf` exactly one
/// branch and `anyOf` any branch. Without composition the schema accepts null
/// when its type set or its enum holds `null`. `{}` is not nullable.
pub fn permits_null(bundle: &SpecBundle, schema: &ObjectSchema, document: Option<&str>) -> bool {
  NullCheck {
    bundle,
    visiting: BTreeSet::new(),
  }
  .schema(schema, document)
}

struct NullCheck<'a> {
  bundle: &'a SpecBundle,
  visiting: BTreeSet<(Option<String>, String)>,
}

impl NullCheck<'_> {
  fn schema(&mut self, schema: &ObjectSchema, document: Option<&str>) -> bool {
    if schema.schema_type.is_some() && !schema.has_type(SchemaType::Null) {
      return false;
    }

    let enumerated: Vec<_> = schema.enum_values.iter().chain(schema.const_value.iter()).collect();
    if !enumerated.is_empty() && !enumerated.iter().any(|value| value.is_null()) {
      return false;
    }

    if let Some(not) = schema.not.as_deref()
      && self.node(not, document)
    {
      return false;
    }

    if !schema.all_of.is_empty() {
      return schema.all_of.iter().all(|branch| self.node(branch, document));
    }
    if !schema.one_of.is_empty() {
      return schema.one_of.iter().filter(|branch| self.node(branch, document)).count() == 1;
    }
    if !schema.any_of.is_empty() {
      return schema.any_of.iter().any(|branch| self.node(branch, document));
    }

    schema.has_type(SchemaType::Null) || enumerated.iter().any(|value| value.is_null())
  }

  /// Resolves references with a cycle guard; an unresolvable or cyclic branch does not accept null.
  fn node(&mut self, node: &ObjectOrReference<ObjectSchema>, document: Option<&str>) -> bool {
    match node {
      ObjectOrReference::Object(schema) => self.schema(schema, document),
      ObjectOrReference::Ref { ref_path, .. } => {
        let key = (document.map(ToString::to_string), ref_path.clone());
        if !self.visiting.insert(key.clone()) {
          return false;
        }
        let result = match self.bundle.resolve_schema_ref(ref_path, document) {
          Ok(resolved) => self.schema(&resolved.schema, resolved.document.as_deref()),
          Err(err) => {
            tracing::debug!(ref_path, %err, "treating unresolvable branch as non-null");
            false
          }
        };
        self.visiting.remove(&key);
        result
      }
    }
  }
}
