//! Type expressions as written in definition files.
//!
//! ```text
//! string | optional<T> | list<T> | set<T> | map<K, V> | LocalName | ns.ForeignName
//! ```

use conjure_ir::PrimitiveType;
use std::fmt;
use std::str::FromStr;

use crate::error::ConjureError;

/// An unresolved type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(PrimitiveType),
    Optional(Box<TypeExpr>),
    List(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>, Box<TypeExpr>),
    /// A name defined or imported in the same file
    Local(String),
    /// `namespace.Name`, a name defined in an imported file
    Foreign { namespace: String, name: String },
}

impl FromStr for TypeExpr {
    type Err = ConjureError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input, pos: 0 };
        let expr = parser.expr()?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(expr)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(primitive) => f.write_str(&primitive.as_str().to_ascii_lowercase()),
            TypeExpr::Optional(inner) => write!(f, "optional<{}>", inner),
            TypeExpr::List(inner) => write!(f, "list<{}>", inner),
            TypeExpr::Set(inner) => write!(f, "set<{}>", inner),
            TypeExpr::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            TypeExpr::Local(name) => f.write_str(name),
            TypeExpr::Foreign { namespace, name } => write!(f, "{}.{}", namespace, name),
        }
    }
}

fn primitive(name: &str) -> Option<PrimitiveType> {
    PrimitiveType::VALUES
        .iter()
        .find(|p| p.as_str().to_ascii_lowercase() == name)
        .cloned()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> Result<TypeExpr, ConjureError> {
        self.skip_whitespace();
        let ident = self.identifier();
        if ident.is_empty() {
            return Err(self.error("expected a type name"));
        }

        self.skip_whitespace();
        if !self.eat('<') {
            return self.named(ident);
        }

        let mut params = vec![self.expr()?];
        self.skip_whitespace();
        while self.eat(',') {
            params.push(self.expr()?);
            self.skip_whitespace();
        }
        if !self.eat('>') {
            return Err(self.error("expected '>'"));
        }

        let arity = params.len();
        let mut params = params.into_iter().map(Box::new);
        match (ident, arity) {
            ("optional", 1) => Ok(TypeExpr::Optional(self.next(&mut params)?)),
            ("list", 1) => Ok(TypeExpr::List(self.next(&mut params)?)),
            ("set", 1) => Ok(TypeExpr::Set(self.next(&mut params)?)),
            ("map", 2) => {
                let key = self.next(&mut params)?;
                let value = self.next(&mut params)?;
                Ok(TypeExpr::Map(key, value))
            }
            (other, n) => Err(self.error(&format!(
                "'{}' does not take {} type parameter(s)",
                other, n
            ))),
        }
    }

    fn named(&self, ident: &str) -> Result<TypeExpr, ConjureError> {
        if let Some(p) = primitive(ident) {
            return Ok(TypeExpr::Primitive(p));
        }
        match ident.split_once('.') {
            None => Ok(TypeExpr::Local(ident.to_string())),
            Some((namespace, name))
                if !namespace.is_empty() && !name.is_empty() && !name.contains('.') =>
            {
                Ok(TypeExpr::Foreign {
                    namespace: namespace.to_string(),
                    name: name.to_string(),
                })
            }
            Some(_) => Err(self.error(&format!("'{}' is not a valid type reference", ident))),
        }
    }

    fn next(
        &self,
        params: &mut impl Iterator<Item = Box<TypeExpr>>,
    ) -> Result<Box<TypeExpr>, ConjureError> {
        params
            .next()
            .ok_or_else(|| self.error("missing type parameter"))
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        let rest = &self.input[start..];
        let len = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(rest.len());
        self.pos += len;
        &self.input[start..self.pos]
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.input[self.pos..].starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: &str) -> ConjureError {
        ConjureError::Parse(format!(
            "invalid type expression '{}' at offset {}: {}",
            self.input, self.pos, message
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> TypeExpr {
        input.parse().unwrap()
    }

    #[test]
    fn test_primitives_and_references() {
        assert_eq!(parse("string"), TypeExpr::Primitive(PrimitiveType::String));
        assert_eq!(parse("bearertoken"), TypeExpr::Primitive(PrimitiveType::Bearertoken));
        assert_eq!(parse("Widget"), TypeExpr::Local("Widget".to_string()));
        assert_eq!(
            parse("api.Widget"),
            TypeExpr::Foreign {
                namespace: "api".to_string(),
                name: "Widget".to_string()
            }
        );
    }

    #[test]
    fn test_nested_containers() {
        let expr = parse("map<string, optional<list<api.Widget>>>");
        assert_eq!(expr.to_string(), "map<string, optional<list<api.Widget>>>");
        assert!(matches!(expr, TypeExpr::Map(_, _)));
    }

    #[test]
    fn test_nested_optional_still_parses() {
        // rejected later, when the IR type is constructed
        assert!(matches!(parse("optional<optional<string>>"), TypeExpr::Optional(_)));
    }

    #[test]
    fn test_malformed_expressions() {
        for input in [
            "",
            "list<string",
            "map<string>",
            "optional<string, string>",
            "a.b.C",
            "list<>",
            "string>",
        ] {
            let result = input.parse::<TypeExpr>();
            assert!(
                matches!(result, Err(ConjureError::Parse(_))),
                "expected parse error for {:?}",
                input
            );
        }
    }
}
