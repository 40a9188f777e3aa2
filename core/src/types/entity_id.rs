use nutype::nutype;

pub const MAX_ENTITY_ID_LENGTH: usize = 128;

/// Identifier of a source entity (a movie) referenced by search keys.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = MAX_ENTITY_ID_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Borrow,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct EntityId(String);

#[cfg(test)]
mod tests;
