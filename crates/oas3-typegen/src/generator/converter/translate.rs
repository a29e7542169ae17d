use std::{
  cell::RefCell,
  collections::{BTreeMap, BTreeSet},
};

use serde_json::Value;

use super::{
  merger::{MergeKind, merge_schemas},
  nullability::is_nullable,
  type_mapping::TypeMapping,
};
use crate::{
  generator::{
    ast::{DiscriminatorDescriptor, Property, RustPrimitive, TypeDescriptor, TypeKind, UnionKind},
    config::GeneratorConfig,
    errors::{GeneratorError, GeneratorResult},
    extensions::{ExtensionOverrides, TypeOverride},
    gather::GatheredSchema,
    naming::{
      NameMap,
      identifiers::{to_rust_field_name, to_rust_type_name},
    },
  },
  spec::{
    BooleanSchema, Discriminator, DocumentPath, ObjectOrReference, ObjectSchema, Schema, SchemaType, SpecBundle,
    SpecVersion,
  },
  utils::{RefError, RefTarget, SchemaExt, schema_ext::flag},
};

/// Turns schemas into [`TypeDescriptor`]s.
///
/// References are never followed structurally: a `$ref` becomes a named
/// reference looked up in the [`NameMap`], which is what keeps recursive
/// schemas finite. Inline `allOf` does follow its references, so the targets
/// of every merge in progress are tracked and a merge that re-enters one of
/// them falls back to a named reference.
pub struct Translator<'a> {
  bundle: &'a SpecBundle,
  names: &'a NameMap,
  config: &'a GeneratorConfig,
  mapping: TypeMapping,
  version: SpecVersion,
  merging: RefCell<BTreeSet<RefTarget>>,
}

impl<'a> Translator<'a> {
  pub fn new(bundle: &'a SpecBundle, names: &'a NameMap, config: &'a GeneratorConfig, version: SpecVersion) -> Self {
    Self {
      bundle,
      names,
      config,
      mapping: config.effective_type_mapping(),
      version,
      merging: RefCell::default(),
    }
  }

  /// Translates a gathered record. Client response wrappers carry no schema
  /// and come back as an empty struct for emitters to fill in.
  pub fn translate_gathered(&self, record: &GatheredSchema) -> GeneratorResult<TypeDescriptor> {
    if let Some(type_override) = &record.overrides.type_override {
      return Ok(self.custom_type(type_override, record.schema.as_ref(), None, &record.overrides));
    }

    let mut descriptor = match (&record.ref_path, &record.schema) {
      (Some(ref_path), _) => self.reference(ref_path, &record.path, None)?,
      (None, Some(schema)) => self.translate_schema(schema, &record.path, None)?,
      (None, None) => TypeDescriptor::new(TypeKind::Struct),
    };
    descriptor.skip_optional_wrap |= record.overrides.skip_optional_wrap;
    Ok(descriptor)
  }

  pub fn translate(
    &self,
    node: &ObjectOrReference<ObjectSchema>,
    path: &DocumentPath,
    document: Option<&str>,
  ) -> GeneratorResult<TypeDescriptor> {
    match node {
      ObjectOrReference::Ref {
        ref_path, description, ..
      } => {
        let mut descriptor = self.reference(ref_path, path, document)?;
        if description.is_some() {
          descriptor.description.clone_from(description);
        }
        Ok(descriptor)
      }
      ObjectOrReference::Object(schema) => self.translate_schema(schema, path, document),
    }
  }

  pub fn translate_schema(
    &self,
    schema: &ObjectSchema,
    path: &DocumentPath,
    document: Option<&str>,
  ) -> GeneratorResult<TypeDescriptor> {
    let overrides = ExtensionOverrides::extract(&schema.extensions, path)?;
    if let Some(type_override) = &overrides.type_override {
      return Ok(self.custom_type(type_override, Some(schema), document, &overrides));
    }

    let mut descriptor = if schema.has_intersection() {
      self.intersection(schema, path, document)?
    } else if schema.has_union() {
      self.union(schema, path, document)?
    } else {
      self.shape(schema, path, document)?
    };

    descriptor.nullable |= is_nullable(self.bundle, schema, self.version, document);
    if schema.description.is_some() {
      descriptor.description.clone_from(&schema.description);
    }
    if descriptor.enum_values.is_empty() {
      descriptor.enum_values = schema.non_null_enum_values();
    }
    if !overrides.enum_variant_names.is_empty() {
      descriptor.enum_variant_names = overrides.enum_variant_names;
    }
    descriptor.skip_optional_wrap |= overrides.skip_optional_wrap;

    Ok(descriptor)
  }

  fn custom_type(
    &self,
    type_override: &TypeOverride,
    schema: Option<&ObjectSchema>,
    document: Option<&str>,
    overrides: &ExtensionOverrides,
  ) -> TypeDescriptor {
    let mut descriptor = TypeDescriptor::primitive(RustPrimitive::from(type_override.name.as_str()));
    if let Some(import) = &type_override.import {
      descriptor.imports.insert(import.clone());
    }
    if let Some(schema) = schema {
      descriptor.nullable = is_nullable(self.bundle, schema, self.version, document);
      descriptor.description.clone_from(&schema.description);
    }
    descriptor.skip_optional_wrap = overrides.skip_optional_wrap;
    descriptor
  }

  /// Named reference. Local targets take their name from the name map,
  /// external ones are qualified with the module from the import mapping.
  fn reference(&self, ref_path: &str, path: &DocumentPath, document: Option<&str>) -> GeneratorResult<TypeDescriptor> {
    let target = ref_path
      .parse::<RefTarget>()
      .map_err(|err| GeneratorError::reference(path, err))?
      .within(document);
    let type_name = self.type_name_for(&target, ref_path, path)?;

    let mut descriptor = TypeDescriptor::reference(type_name);
    if let Some(external) = &target.document
      && let Some(module) = self.config.import_mapping.get(external)
    {
      descriptor.imports.insert(module.clone());
    }

    descriptor.nullable = self
      .bundle
      .resolve_schema_ref(ref_path, document)
      .is_ok_and(|resolved| is_nullable(self.bundle, &resolved.schema, self.version, resolved.document.as_deref()));

    Ok(descriptor)
  }

  fn type_name_for(&self, target: &RefTarget, ref_path: &str, path: &DocumentPath) -> GeneratorResult<String> {
    match &target.document {
      None => self
        .names
        .get(&target.document_path())
        .map(ToString::to_string)
        .ok_or_else(|| GeneratorError::UnnamedReference {
          path: path.to_string(),
          ref_path: ref_path.to_string(),
        }),
      Some(external) => {
        let module = self.config.import_mapping.get(external).ok_or_else(|| {
          GeneratorError::reference(
            path,
            RefError::UnmappedExternal {
              document: external.clone(),
              ref_path: ref_path.to_string(),
            },
          )
        })?;
        Ok(format!("{module}::{}", to_rust_type_name(&target.name)))
      }
    }
  }

  /// `allOf`: merged with the schema's own keywords, then translated as one schema.
  fn intersection(
    &self,
    schema: &ObjectSchema,
    path: &DocumentPath,
    document: Option<&str>,
  ) -> GeneratorResult<TypeDescriptor> {
    let mut own = schema.clone();
    own.all_of.clear();
    own.nullable = None;
    own.title = None;
    own.description = None;
    own.extensions.clear();
    let own_is_empty = own.is_unconstrained() && own.required.is_empty();

    if own_is_empty
      && let [ObjectOrReference::Ref { ref_path, .. }] = schema.all_of.as_slice()
    {
      return self.reference(ref_path, &path.join(["allOf", "0"]), document);
    }

    let targets = schema
      .all_of
      .iter()
      .filter_map(ObjectOrReference::ref_path)
      .map(|ref_path| {
        ref_path
          .parse::<RefTarget>()
          .map(|target| (ref_path, target.within(document)))
          .map_err(|err| GeneratorError::reference(path, err))
      })
      .collect::<GeneratorResult<Vec<_>>>()?;

    let reentered = targets
      .iter()
      .find(|(_, target)| self.merging.borrow().contains(target));
    if let Some((ref_path, target)) = reentered {
      tracing::debug!(%path, %target, "allOf re-enters a merge in progress");
      return self.reference(ref_path, path, document);
    }

    let mut siblings = schema.all_of.clone();
    if !own_is_empty {
      siblings.push(ObjectOrReference::Object(own));
    }

    self
      .merging
      .borrow_mut()
      .extend(targets.iter().map(|(_, target)| target.clone()));
    let translated = self.merge_and_translate(&siblings, path, document);
    let mut merging = self.merging.borrow_mut();
    for (_, target) in &targets {
      merging.remove(target);
    }
    translated
  }

  fn merge_and_translate(
    &self,
    siblings: &[ObjectOrReference<ObjectSchema>],
    path: &DocumentPath,
    document: Option<&str>,
  ) -> GeneratorResult<TypeDescriptor> {
    let mut merged = merge_schemas(self.bundle, siblings, MergeKind::AllOf, document)
      .map_err(|err| GeneratorError::merge(path, err))?;
    merged.extensions.clear();
    tracing::debug!(%path, siblings = siblings.len(), "merged allOf");

    self.translate_schema(&merged, path, document)
  }

  fn union(&self, schema: &ObjectSchema, path: &DocumentPath, document: Option<&str>) -> GeneratorResult<TypeDescriptor> {
    let (kind, key, branches) = if schema.one_of.is_empty() {
      (UnionKind::AnyOf, "anyOf", &schema.any_of)
    } else {
      (UnionKind::OneOf, "oneOf", &schema.one_of)
    };

    let mut variants = Vec::with_capacity(branches.len());
    for (index, branch) in branches.iter().enumerate() {
      if branch.as_object().is_some_and(SchemaExt::is_null) {
        continue;
      }
      let branch_path = path.join([key.to_string(), index.to_string()]);
      variants.push(self.translate(branch, &branch_path, document)?);
    }

    if variants.len() == 1 && schema.properties.is_empty() && schema.discriminator.is_none() {
      return Ok(variants.remove(0));
    }

    let discriminator = schema
      .discriminator
      .as_ref()
      .map(|discriminator| self.discriminator(discriminator, branches, path, document))
      .transpose()?;

    let mut descriptor = TypeDescriptor::new(TypeKind::Union { kind, variants });
    descriptor.properties = self.properties(schema, path, document)?;
    descriptor.discriminator = discriminator;
    Ok(descriptor)
  }

  /// Explicit mapping entries resolved to type names; without a mapping every
  /// referenced branch maps from its component name.
  fn discriminator(
    &self,
    discriminator: &Discriminator,
    branches: &[ObjectOrReference<ObjectSchema>],
    path: &DocumentPath,
    document: Option<&str>,
  ) -> GeneratorResult<DiscriminatorDescriptor> {
    let mut mapping = BTreeMap::new();

    match &discriminator.mapping {
      Some(explicit) => {
        for (value, target) in explicit {
          let parsed = RefTarget::from_mapping_value(target)
            .map_err(|err| GeneratorError::reference(path, err))?
            .within(document);
          mapping.insert(value.clone(), self.type_name_for(&parsed, target, path)?);
        }
      }
      None => {
        for ref_path in branches.iter().filter_map(ObjectOrReference::ref_path) {
          let parsed = ref_path
            .parse::<RefTarget>()
            .map_err(|err| GeneratorError::reference(path, err))?
            .within(document);
          let type_name = self.type_name_for(&parsed, ref_path, path)?;
          mapping.insert(parsed.name, type_name);
        }
      }
    }

    Ok(DiscriminatorDescriptor {
      property_name: discriminator.property_name.clone(),
      mapping,
    })
  }

  /// Non-composed schemas: primitives, arrays, objects and the untyped fallbacks.
  fn shape(&self, schema: &ObjectSchema, path: &DocumentPath, document: Option<&str>) -> GeneratorResult<TypeDescriptor> {
    let non_null: Vec<SchemaType> = schema
      .declared_types()
      .into_iter()
      .filter(|schema_type| *schema_type != SchemaType::Null)
      .collect();

    match non_null.as_slice() {
      [] if schema.schema_type.is_some() => Ok(TypeDescriptor::any()),
      [] => self.untyped(schema, path, document),
      [SchemaType::Array] => self.array(schema, path, document),
      [SchemaType::Object] => self.object(schema, path, document, true),
      [primitive] => Ok(self.primitive(*primitive, schema.format.as_deref())),
      _ => Ok(TypeDescriptor::any()),
    }
  }

  fn untyped(&self, schema: &ObjectSchema, path: &DocumentPath, document: Option<&str>) -> GeneratorResult<TypeDescriptor> {
    if !schema.properties.is_empty() || schema.additional_properties.is_some() {
      return self.object(schema, path, document, false);
    }
    if schema.items.is_some() {
      return self.array(schema, path, document);
    }

    let values = schema.non_null_enum_values();
    if !values.is_empty() && values.iter().all(Value::is_string) {
      return Ok(self.primitive(SchemaType::String, schema.format.as_deref()));
    }
    Ok(TypeDescriptor::any())
  }

  fn primitive(&self, schema_type: SchemaType, format: Option<&str>) -> TypeDescriptor {
    let Some(spec) = self.mapping.lookup(schema_type, format) else {
      return TypeDescriptor::any();
    };
    let mut descriptor = TypeDescriptor::primitive(RustPrimitive::from(spec.type_name.as_str()));
    if let Some(import) = &spec.import {
      descriptor.imports.insert(import.clone());
    }
    descriptor
  }

  fn array(&self, schema: &ObjectSchema, path: &DocumentPath, document: Option<&str>) -> GeneratorResult<TypeDescriptor> {
    let items = match schema.items.as_deref() {
      Some(Schema::Object(node)) => self.translate(node, &path.child("items"), document)?,
      Some(Schema::Boolean(_)) | None => TypeDescriptor::any(),
    };
    Ok(TypeDescriptor::array(items))
  }

  fn object(
    &self,
    schema: &ObjectSchema,
    path: &DocumentPath,
    document: Option<&str>,
    tagged: bool,
  ) -> GeneratorResult<TypeDescriptor> {
    let additional = match &schema.additional_properties {
      None | Some(Schema::Boolean(BooleanSchema(false))) => None,
      Some(Schema::Boolean(_)) => Some(TypeDescriptor::any()),
      Some(Schema::Object(node)) => match &**node {
        ObjectOrReference::Object(inline) if inline.is_unconstrained() => Some(TypeDescriptor::any()),
        node => Some(self.translate(node, &path.child("additionalProperties"), document)?),
      },
    };

    if schema.properties.is_empty() {
      return Ok(match additional {
        Some(values) => TypeDescriptor::map(values),
        None if tagged => TypeDescriptor::map(TypeDescriptor::any()),
        None => TypeDescriptor::any(),
      });
    }

    let mut descriptor = TypeDescriptor::new(TypeKind::Struct);
    descriptor.properties = self.properties(schema, path, document)?;
    descriptor.additional_properties = additional.map(Box::new);
    Ok(descriptor)
  }

  fn properties(&self, schema: &ObjectSchema, path: &DocumentPath, document: Option<&str>) -> GeneratorResult<Vec<Property>> {
    schema
      .properties
      .iter()
      .map(|(name, node)| {
        let property_path = path.join(["properties", name.as_str()]);
        let descriptor = self.translate(node, &property_path, document)?;

        let inline = node.as_object();
        let overrides = match inline {
          Some(inline) => ExtensionOverrides::extract(&inline.extensions, &property_path)?,
          None => ExtensionOverrides::default(),
        };
        let inline_flag = |select: fn(&ObjectSchema) -> Option<bool>| inline.is_some_and(|inline| flag(select(inline)));

        Ok(Property {
          name: name.clone(),
          field_name: overrides.field_name.clone().unwrap_or_else(|| to_rust_field_name(name)),
          required: schema.required.contains(name),
          nullable: descriptor.nullable,
          description: descriptor.description.clone(),
          read_only: inline_flag(|inline| inline.read_only),
          write_only: inline_flag(|inline| inline.write_only),
          deprecated: inline_flag(|inline| inline.deprecated) || overrides.deprecated_reason.is_some(),
          schema: descriptor,
        })
      })
      .collect()
  }
}
