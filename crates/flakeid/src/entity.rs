use std::collections::HashMap;

use crate::{BitLayout, Encoder, Error, Field, Result};

/// Separates the entity prefix from the encoded identifier in a public ID.
pub const PREFIX_SEPARATOR: char = '_';

/// A logical kind of entity sharing a generator.
///
/// Each kind reserves a fixed app-field value (`code`) and a short string
/// prefix for its public identifiers.
///
/// Because the code sits above the sequence, identifiers of one kind sort in
/// issue order, but two kinds issued in the same millisecond sort by code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityKind {
    name: String,
    code: u64,
    prefix: String,
}

impl EntityKind {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value packed into the app field of this kind's identifiers.
    pub const fn code(&self) -> u64 {
        self.code
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Entity kinds with a reverse prefix lookup, populated up front.
///
/// # Example
///
/// ```
/// use flakeid::{BitLayout, EntityRegistry};
///
/// let mut registry = EntityRegistry::for_layout(&BitLayout::default());
/// registry.register("user", 1, "usr")?;
/// registry.register("order", 2, "ord")?;
///
/// assert_eq!(registry.by_prefix("ord").map(|kind| kind.code()), Some(2));
/// assert!(registry.register("invoice", 8, "inv").is_err()); // app field holds 0..=7
/// # Ok::<(), flakeid::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct EntityRegistry {
    max_code: u64,
    kinds: Vec<EntityKind>,
    by_prefix: HashMap<String, usize>,
}

impl EntityRegistry {
    /// Creates an empty registry accepting codes up to `max_code`.
    pub fn new(max_code: u64) -> Self {
        Self {
            max_code,
            kinds: Vec::new(),
            by_prefix: HashMap::new(),
        }
    }

    /// Creates an empty registry whose codes must fit `layout`'s app field.
    pub fn for_layout(layout: &BitLayout) -> Self {
        Self::new(layout.max_app())
    }

    pub const fn max_code(&self) -> u64 {
        self.max_code
    }

    /// Registers a new kind.
    ///
    /// # Errors
    ///
    /// - [`Error::FieldOverflow`] if `code` exceeds the configured maximum
    /// - [`Error::InvalidPrefix`] if `prefix` is empty or contains
    ///   [`PREFIX_SEPARATOR`]
    /// - [`Error::DuplicateEntity`] if the name, code, or prefix is taken
    pub fn register(
        &mut self,
        name: impl Into<String>,
        code: u64,
        prefix: impl Into<String>,
    ) -> Result<&EntityKind> {
        let name = name.into();
        let prefix = prefix.into();

        if code > self.max_code {
            return Err(Error::FieldOverflow {
                field: Field::App,
                value: code,
                max: self.max_code,
            });
        }
        if prefix.is_empty() || prefix.contains(PREFIX_SEPARATOR) {
            return Err(Error::InvalidPrefix { prefix });
        }
        if let Some(existing) = self
            .kinds
            .iter()
            .find(|kind| kind.name == name || kind.code == code || kind.prefix == prefix)
        {
            return Err(Error::DuplicateEntity {
                name,
                existing: existing.name.clone(),
            });
        }

        let index = self.kinds.len();
        self.by_prefix.insert(prefix.clone(), index);
        self.kinds.push(EntityKind { name, code, prefix });
        Ok(&self.kinds[index])
    }

    pub fn get(&self, name: &str) -> Option<&EntityKind> {
        self.kinds.iter().find(|kind| kind.name == name)
    }

    pub fn by_prefix(&self, prefix: &str) -> Option<&EntityKind> {
        self.by_prefix.get(prefix).map(|&index| &self.kinds[index])
    }

    pub fn by_code(&self, code: u64) -> Option<&EntityKind> {
        self.kinds.iter().find(|kind| kind.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityKind> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Converts between raw identifiers and `"{prefix}_{encoded}"` public IDs.
///
/// # Example
///
/// ```
/// use flakeid::{AlphabetEncoder, EntityRegistry, PublicIds};
///
/// let mut registry = EntityRegistry::new(7);
/// registry.register("user", 1, "usr")?;
/// let public = PublicIds::new(registry, AlphabetEncoder::base62());
///
/// let user = public.registry().get("user").unwrap();
/// let s = public.encode(62, user);
/// assert_eq!(s, "usr_10");
///
/// let (raw, kind) = public.decode(&s)?;
/// assert_eq!((raw, kind.name()), (62, "user"));
/// # Ok::<(), flakeid::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct PublicIds<E> {
    registry: EntityRegistry,
    encoder: E,
}

impl<E> PublicIds<E>
where
    E: Encoder,
{
    pub fn new(registry: EntityRegistry, encoder: E) -> Self {
        Self { registry, encoder }
    }

    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub const fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn encode(&self, raw: u64, kind: &EntityKind) -> String {
        format!(
            "{}{PREFIX_SEPARATOR}{}",
            kind.prefix,
            self.encoder.encode(raw)
        )
    }

    /// Splits on the first separator, resolves the prefix, then decodes the
    /// remainder.
    ///
    /// # Errors
    ///
    /// - [`Error::MalformedPublicId`] if there is no separator
    /// - [`Error::UnknownPrefix`] if no kind owns the prefix
    /// - [`Error::Codec`] if the remainder does not decode
    pub fn decode(&self, public_id: &str) -> Result<(u64, &EntityKind)> {
        let (prefix, encoded) =
            public_id
                .split_once(PREFIX_SEPARATOR)
                .ok_or_else(|| Error::MalformedPublicId {
                    id: public_id.to_owned(),
                })?;
        let kind = self
            .registry
            .by_prefix(prefix)
            .ok_or_else(|| Error::UnknownPrefix {
                prefix: prefix.to_owned(),
            })?;
        let raw = self.encoder.decode(encoded)?;
        Ok((raw, kind))
    }
}
