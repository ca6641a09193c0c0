//! Filter operator vocabulary

use std::fmt;
use std::str::FromStr;

use crate::core::error::FilterError;

/// Operators accepted in filter clauses.
///
/// Parsing is case-insensitive and accepts the long-form aliases
/// (`equals`, `greaterthanorequals`, `thesamedatewith`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
    NotIn,
    Any,
    NotAny,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Between,
    SameDate,
}

/// Operator families, each compiled by its own rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorFamily {
    Comparison,
    Membership,
    CollectionMembership,
    Text,
    DateRange,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::NotIn => "notin",
            Operator::Any => "any",
            Operator::NotAny => "nany",
            Operator::Contains => "contains",
            Operator::NotContains => "notcontains",
            Operator::StartsWith => "startswith",
            Operator::EndsWith => "endswith",
            Operator::Between => "between",
            Operator::SameDate => "samedate",
        }
    }

    pub fn family(&self) -> OperatorFamily {
        match self {
            Operator::Eq
            | Operator::Ne
            | Operator::Gt
            | Operator::Lt
            | Operator::Gte
            | Operator::Lte => OperatorFamily::Comparison,
            Operator::In | Operator::NotIn => OperatorFamily::Membership,
            Operator::Any | Operator::NotAny => OperatorFamily::CollectionMembership,
            Operator::Contains
            | Operator::NotContains
            | Operator::StartsWith
            | Operator::EndsWith => OperatorFamily::Text,
            Operator::Between | Operator::SameDate => OperatorFamily::DateRange,
        }
    }

    /// `gt`, `lt`, `gte`, `lte`
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte
        )
    }
}

impl FromStr for Operator {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_lowercase().as_str() {
            "eq" | "equal" | "equals" => Operator::Eq,
            "ne" | "notequal" | "notequals" => Operator::Ne,
            "gt" | "greaterthan" => Operator::Gt,
            "lt" | "lessthan" => Operator::Lt,
            "gte" | "greaterthanequal" | "greaterthanorequals" => Operator::Gte,
            "lte" | "lessthanequal" | "lessthanorequals" => Operator::Lte,
            "in" => Operator::In,
            "notin" | "nin" => Operator::NotIn,
            "any" => Operator::Any,
            "nany" => Operator::NotAny,
            "contains" => Operator::Contains,
            "notcontains" => Operator::NotContains,
            "startswith" => Operator::StartsWith,
            "endswith" => Operator::EndsWith,
            "between" => Operator::Between,
            "samedate" | "thesamedatewith" => Operator::SameDate,
            _ => {
                return Err(FilterError::UnknownOperator {
                    operation: s.to_string(),
                });
            }
        };
        Ok(op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("EQ".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("StartsWith".parse::<Operator>().unwrap(), Operator::StartsWith);
        assert_eq!(" gte ".parse::<Operator>().unwrap(), Operator::Gte);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("nin".parse::<Operator>().unwrap(), Operator::NotIn);
        assert_eq!("notin".parse::<Operator>().unwrap(), Operator::NotIn);
        assert_eq!("equals".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!(
            "greaterThanOrEquals".parse::<Operator>().unwrap(),
            Operator::Gte
        );
        assert_eq!(
            "theSameDateWith".parse::<Operator>().unwrap(),
            Operator::SameDate
        );
    }

    #[test]
    fn test_unknown_operator() {
        let err = "like".parse::<Operator>().unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownOperator {
                operation: "like".to_string()
            }
        );
    }

    #[test]
    fn test_families() {
        assert_eq!(Operator::Lte.family(), OperatorFamily::Comparison);
        assert_eq!(Operator::NotIn.family(), OperatorFamily::Membership);
        assert_eq!(Operator::NotAny.family(), OperatorFamily::CollectionMembership);
        assert_eq!(Operator::EndsWith.family(), OperatorFamily::Text);
        assert_eq!(Operator::Between.family(), OperatorFamily::DateRange);
        assert!(Operator::Gt.is_range());
        assert!(!Operator::Eq.is_range());
    }

    #[test]
    fn test_display_roundtrip() {
        for op in [Operator::Eq, Operator::NotIn, Operator::NotAny, Operator::SameDate] {
            assert_eq!(op.to_string().parse::<Operator>().unwrap(), op);
        }
    }
}
