//! Attending-doctor name parsing
//!
//! EMR records carry the attending doctor as one free-text field. Message
//! segments need the name split into prefix/given/other/family parts, so
//! the text is tokenized positionally: an optional honorific, a given name,
//! everything up to the last token as other names, and the last token as
//! the family name. Short inputs fill fields front to back and leave the
//! rest empty; the parser never fails.

/// Honorific prefixes recognized at the front of a doctor name
pub const HONORIFIC_PREFIXES: [&str; 5] = ["Dr", "Mr", "Ms", "Mrs", "Mdm"];

/// Doctor name split into message-segment parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorName {
    pub prefix: String,
    pub given_name: String,
    pub other_names: String,
    pub family_name: String,
}

impl DoctorName {
    /// Parses a free-text doctor name
    ///
    /// Tokens are split on whitespace. The first token is consumed as the
    /// prefix when it *starts with* a known honorific (case-insensitive),
    /// matching the legacy behavior where "Drew" also counts as prefixed.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier::domain::doctor::DoctorName;
    ///
    /// let name = DoctorName::parse("Dr John Robert Smith");
    /// assert_eq!(name.prefix, "Dr");
    /// assert_eq!(name.given_name, "John");
    /// assert_eq!(name.other_names, "Robert");
    /// assert_eq!(name.family_name, "Smith");
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut name = DoctorName::default();
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return name;
        }

        let mut index = 0;
        if starts_with_honorific(tokens[0]) {
            name.prefix = tokens[0].to_string();
            index += 1;
        }
        if tokens.len() > index {
            name.given_name = tokens[index].to_string();
            index += 1;
        }
        // Middle tokens exist only when more than one token remains
        if tokens.len() - 1 > index {
            name.other_names = tokens[index..tokens.len() - 1].join(" ");
            index = tokens.len() - 1;
        }
        if tokens.len() > index {
            name.family_name = tokens[index].to_string();
        }
        name
    }
}

fn starts_with_honorific(token: &str) -> bool {
    HONORIFIC_PREFIXES.iter().any(|prefix| {
        token
            .get(..prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(prefix))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Dr John Robert Smith", "Dr", "John", "Robert", "Smith" ; "prefix given other family")]
    #[test_case("Dr John Paul George Smith", "Dr", "John", "Paul George", "Smith" ; "multiple other names joined")]
    #[test_case("John Smith", "", "John", "", "Smith" ; "no prefix")]
    #[test_case("John Robert Smith", "", "John", "Robert", "Smith" ; "no prefix with other name")]
    #[test_case("Smith", "", "Smith", "", "" ; "single token becomes given name")]
    #[test_case("Dr Smith", "Dr", "Smith", "", "" ; "prefix then single token becomes given name")]
    #[test_case("Dr", "Dr", "", "", "" ; "prefix alone")]
    #[test_case("", "", "", "", "" ; "empty text")]
    #[test_case("   ", "", "", "", "" ; "whitespace only")]
    #[test_case("dr John Smith", "dr", "John", "", "Smith" ; "lowercase honorific consumed")]
    #[test_case("Drew Smith", "Drew", "Smith", "", "" ; "token starting with honorific consumed as prefix")]
    #[test_case("Mrs Jane Doe", "Mrs", "Jane", "", "Doe" ; "mrs prefix")]
    #[test_case("  Dr   John   Smith  ", "Dr", "John", "", "Smith" ; "extra whitespace ignored")]
    fn test_parse(text: &str, prefix: &str, given: &str, other: &str, family: &str) {
        let name = DoctorName::parse(text);
        assert_eq!(name.prefix, prefix);
        assert_eq!(name.given_name, given);
        assert_eq!(name.other_names, other);
        assert_eq!(name.family_name, family);
    }

    #[test]
    fn test_parse_is_total() {
        // Arbitrary unicode input must not panic the prefix check
        let name = DoctorName::parse("Δρ Σμιθ");
        assert_eq!(name.given_name, "Δρ");
        assert_eq!(name.family_name, "Σμιθ");
    }
}
