//! Structured declared types.

use std::fmt;

/// A declared type as written in source, split into its parts.
///
/// Renders as the qualifiers joined by spaces, the base name, then one `*`
/// per pointer level and a trailing `&` for references, with no spaces
/// around the suffixes: `const Foo*`, `std::string&`, `char**`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSpec {
    pub base: String,
    pub qualifiers: Vec<String>,
    pub pointer_depth: usize,
    pub is_reference: bool,
}

impl TypeSpec {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            ..Default::default()
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: Vec<String>) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    /// Copy of this type wrapped by the given declarator suffixes.
    pub fn wrapped(&self, pointer_depth: usize, is_reference: bool) -> Self {
        Self {
            base: self.base.clone(),
            qualifiers: self.qualifiers.clone(),
            pointer_depth: self.pointer_depth + pointer_depth,
            is_reference: self.is_reference || is_reference,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in &self.qualifiers {
            write!(f, "{} ", q)?;
        }
        f.write_str(&self.base)?;
        for _ in 0..self.pointer_depth {
            f.write_str("*")?;
        }
        if self.is_reference {
            f.write_str("&")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain() {
        assert_eq!(TypeSpec::new("int").to_string(), "int");
    }

    #[test]
    fn test_qualified_pointer() {
        let ty = TypeSpec::new("PimpXClick")
            .with_qualifiers(vec!["const".to_string()])
            .wrapped(1, false);
        assert_eq!(ty.to_string(), "const PimpXClick*");
    }

    #[test]
    fn test_double_pointer_and_reference() {
        assert_eq!(TypeSpec::new("char").wrapped(2, false).to_string(), "char**");
        assert_eq!(
            TypeSpec::new("std::string").wrapped(0, true).to_string(),
            "std::string&"
        );
    }

    #[test]
    fn test_multiple_qualifiers_keep_order() {
        let ty = TypeSpec::new("int").with_qualifiers(vec!["const".into(), "volatile".into()]);
        assert_eq!(ty.to_string(), "const volatile int");
    }
}
