use nanoid::nanoid;

/// Canonical alphabet for generated row identifiers (no ambiguous glyphs).
const VALUE_ID_ALPHABET: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y',
    'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'j', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];
/// Default id length.
const VALUE_ID_LENGTH: usize = 20;

/// Generates the identifier for a newly inserted [`crate::types::FieldValue`]
/// row. Upserts that hit an existing row keep that row's id.
pub fn generate_value_id() -> String {
    nanoid!(VALUE_ID_LENGTH, VALUE_ID_ALPHABET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_has_expected_length_and_charset() {
        let id = generate_value_id();
        assert_eq!(id.len(), VALUE_ID_LENGTH);
        assert!(id.chars().all(|c| VALUE_ID_ALPHABET.contains(&c)));
    }
}
