//! Filter expressions over revision metadata.
//!
//! Grammar (keywords are case-insensitive, `AND` binds tighter than `OR`):
//!
//! ```text
//! expression := conjunction ( ("OR" | "||") conjunction )*
//! conjunction := condition ( ("AND" | "&&") condition )*
//! condition  := field ( "=" | "!=" | "~" ) value
//! field      := "name" | "project_name" | "kind" | "gi." key | "var." key
//! value      := bare-word | "double quoted"
//! ```
//!
//! `~` is a prefix match. A `!=` condition on an absent key matches.

use catalog_types::{CatalogObjectRevision, MetadataLabel, RevisionPredicate};

use crate::error::QueryError;
use crate::traits::QueryEvaluator;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Field {
    Name,
    ProjectName,
    Kind,
    Labelled(MetadataLabel, String),
}

impl Field {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "name" => Some(Field::Name),
            "project_name" | "projectName" => Some(Field::ProjectName),
            "kind" => Some(Field::Kind),
            _ => {
                let (label, key) = if let Some(key) = word.strip_prefix("gi.") {
                    (MetadataLabel::GenericInformation, key)
                } else if let Some(key) = word.strip_prefix("var.") {
                    (MetadataLabel::Variable, key)
                } else {
                    return None;
                };
                (!key.is_empty()).then(|| Field::Labelled(label, key.to_string()))
            }
        }
    }

    fn value<'r>(&self, revision: &'r CatalogObjectRevision) -> Option<&'r str> {
        match self {
            Field::Name => Some(&revision.name),
            Field::ProjectName => Some(&revision.project_name),
            Field::Kind => Some(&revision.kind),
            Field::Labelled(label, key) => revision.lookup(*label, key),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Equals,
    NotEquals,
    Prefix,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Condition {
    field: Field,
    operator: Operator,
    value: String,
}

impl Condition {
    fn matches(&self, revision: &CatalogObjectRevision) -> bool {
        let actual = self.field.value(revision);
        match self.operator {
            Operator::Equals => actual == Some(self.value.as_str()),
            Operator::NotEquals => actual != Some(self.value.as_str()),
            Operator::Prefix => actual.is_some_and(|v| v.starts_with(&self.value)),
        }
    }
}

/// A compiled filter, in disjunctive normal form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryExpression {
    any_of: Vec<Vec<Condition>>,
}

impl QueryExpression {
    pub fn parse(source: &str) -> Result<Self, QueryError> {
        let mut cursor = Cursor { src: source, pos: 0 };
        let mut any_of = Vec::new();
        loop {
            let mut all_of = vec![parse_condition(&mut cursor)?];
            loop {
                cursor.skip_ws();
                if cursor.eat("&&") || cursor.eat_keyword("and") {
                    all_of.push(parse_condition(&mut cursor)?);
                } else {
                    break;
                }
            }
            any_of.push(all_of);
            cursor.skip_ws();
            if !(cursor.eat("||") || cursor.eat_keyword("or")) {
                break;
            }
        }
        cursor.skip_ws();
        if !cursor.at_end() {
            return Err(QueryError::new(cursor.pos, "unexpected trailing input"));
        }
        Ok(Self { any_of })
    }
}

impl RevisionPredicate for QueryExpression {
    fn matches(&self, revision: &CatalogObjectRevision) -> bool {
        self.any_of
            .iter()
            .any(|all_of| all_of.iter().all(|c| c.matches(revision)))
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        let src: &'a str = self.src;
        &src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    /// Consume `keyword` only when it stands alone as a word.
    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let rest = self.rest();
        let Some(head) = rest.get(..keyword.len()) else {
            return false;
        };
        let followed_by_space = rest[keyword.len()..]
            .chars()
            .next()
            .is_some_and(char::is_whitespace);
        if head.eq_ignore_ascii_case(keyword) && followed_by_space {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !keep(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

fn parse_condition(cursor: &mut Cursor<'_>) -> Result<Condition, QueryError> {
    cursor.skip_ws();
    let field_pos = cursor.pos;
    let word = cursor.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if word.is_empty() {
        return Err(QueryError::new(field_pos, "expected field name"));
    }
    let field = Field::parse(word)
        .ok_or_else(|| QueryError::new(field_pos, format!("unknown field `{word}`")))?;

    cursor.skip_ws();
    let operator = if cursor.eat("!=") {
        Operator::NotEquals
    } else if cursor.eat("=") {
        Operator::Equals
    } else if cursor.eat("~") {
        Operator::Prefix
    } else {
        return Err(QueryError::new(cursor.pos, "expected `=`, `!=` or `~`"));
    };

    cursor.skip_ws();
    let value_pos = cursor.pos;
    let value = if cursor.peek() == Some('"') {
        cursor.pos += 1;
        let inner = cursor.take_while(|c| c != '"');
        if !cursor.eat("\"") {
            return Err(QueryError::new(value_pos, "unterminated quoted value"));
        }
        inner.to_string()
    } else {
        let bare = cursor.take_while(|c| !c.is_whitespace() && !matches!(c, '&' | '|' | '"'));
        if bare.is_empty() {
            return Err(QueryError::new(value_pos, "expected value"));
        }
        bare.to_string()
    };

    Ok(Condition {
        field,
        operator,
        value,
    })
}

/// Default [`QueryEvaluator`] backed by [`QueryExpression`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpressionQueryEvaluator;

impl QueryEvaluator for ExpressionQueryEvaluator {
    fn compile(&self, expression: &str) -> Result<Box<dyn RevisionPredicate>, QueryError> {
        Ok(Box::new(QueryExpression::parse(expression)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_types::{BucketId, CatalogObjectId, KeyValueMetadata, RevisionId};
    use chrono::Utc;

    fn revision(name: &str, project: &str) -> CatalogObjectRevision {
        CatalogObjectRevision {
            kind: "workflow".into(),
            bucket_id: BucketId::new(1),
            object_id: CatalogObjectId::new(1),
            revision_id: RevisionId::new(1),
            name: name.into(),
            project_name: project.into(),
            created_at: Utc::now(),
            layout: None,
            key_values: vec![
                KeyValueMetadata::generic_information("owner", "ops team"),
                KeyValueMetadata::variable("HOST", "db01"),
            ],
            payload: Vec::new(),
        }
    }

    fn matches(expr: &str, rev: &CatalogObjectRevision) -> bool {
        QueryExpression::parse(expr).unwrap().matches(rev)
    }

    #[test]
    fn equality_on_builtin_fields() {
        let rev = revision("backup", "ops");
        assert!(matches("name=backup", &rev));
        assert!(matches("project_name = ops", &rev));
        assert!(matches("kind=workflow", &rev));
        assert!(!matches("name=restore", &rev));
    }

    #[test]
    fn labelled_keys_and_quoted_values() {
        let rev = revision("backup", "ops");
        assert!(matches(r#"gi.owner="ops team""#, &rev));
        assert!(matches("var.HOST=db01", &rev));
        assert!(!matches("gi.HOST=db01", &rev));
    }

    #[test]
    fn not_equals_matches_absent_key() {
        let rev = revision("backup", "ops");
        assert!(matches("gi.missing!=x", &rev));
        assert!(!matches("name!=backup", &rev));
    }

    #[test]
    fn prefix_operator() {
        let rev = revision("backup-nightly", "ops");
        assert!(matches("name~backup", &rev));
        assert!(!matches("name~nightly", &rev));
        assert!(!matches("gi.missing~a", &rev));
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let rev = revision("backup", "ops");
        // (name=x AND kind=workflow) OR project_name=ops
        assert!(matches("name=x AND kind=workflow OR project_name=ops", &rev));
        // name=x AND (kind=workflow OR ...) would be false
        assert!(!matches("name=x && kind=workflow || project_name=dev", &rev));
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let rev = revision("backup", "ops");
        assert!(matches("name=backup and kind=workflow", &rev));
        assert!(matches("name=zzz Or kind=workflow", &rev));
    }

    #[test]
    fn unknown_field_is_rejected_with_position() {
        let err = QueryExpression::parse("name=a AND colour=red").unwrap_err();
        assert_eq!(err.position, 11);
        assert!(err.reason.contains("colour"));
    }

    #[test]
    fn missing_operator_is_rejected() {
        let err = QueryExpression::parse("name backup").unwrap_err();
        assert_eq!(err.position, 5);
    }

    #[test]
    fn empty_expression_is_rejected() {
        assert!(QueryExpression::parse("   ").is_err());
    }

    #[test]
    fn dangling_connective_is_rejected() {
        assert!(QueryExpression::parse("name=a AND ").is_err());
    }

    #[test]
    fn unterminated_quote_is_rejected() {
        let err = QueryExpression::parse("name=\"abc").unwrap_err();
        assert_eq!(err.position, 5);
    }

    #[test]
    fn evaluator_returns_boxed_predicate() {
        let predicate = ExpressionQueryEvaluator.compile("kind=workflow").unwrap();
        assert!(predicate.matches(&revision("a", "b")));
    }
}
