//! Filter operators and their SQL spelling.

/// Every operator a filter document may use.
///
/// Logical operators (`$or`, `$and`, `$nor`, `$not`) combine whole filter
/// nodes. The rest apply to a single field inside an operator object such as
/// `{"age": {"$gte": 18}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Operator {
    /// `$or`: any member matches.
    Or,
    /// `$and`: all members match.
    And,
    /// `$nor`: no member matches.
    Nor,
    /// `$not`: negates a filter node.
    Not,
    /// `$gt`: `>`
    Gt,
    /// `$gte`: `>=`
    Gte,
    /// `$lt`: `<`
    Lt,
    /// `$lte`: `<=`
    Lte,
    /// `$eq`: `=`
    Eq,
    /// `$ne`: `!=`
    Ne,
    /// `$regex`: case-insensitive regex match, `~*`
    Regex,
    /// `$in`: `= ANY($N)`
    In,
    /// `$nin`: `NOT ... = ANY($N)`
    NotIn,
    /// `$exists`: JSONB key presence.
    Exists,
    /// `$elemMatch`: any array element matches.
    ElemMatch,
    /// `$field`: compare against another column.
    Field,
}

impl Operator {
    /// Parse a Mongo-style operator key. The `$` prefix is required.
    ///
    /// ```
    /// use mik_filter::Operator;
    ///
    /// assert_eq!(Operator::from_mongo("$gte"), Some(Operator::Gte));
    /// assert_eq!(Operator::from_mongo("$elemMatch"), Some(Operator::ElemMatch));
    /// assert_eq!(Operator::from_mongo("gte"), None);
    /// assert_eq!(Operator::from_mongo("$like"), None);
    /// ```
    #[must_use]
    pub fn from_mongo(s: &str) -> Option<Self> {
        match s {
            "$or" => Some(Self::Or),
            "$and" => Some(Self::And),
            "$nor" => Some(Self::Nor),
            "$not" => Some(Self::Not),
            "$gt" => Some(Self::Gt),
            "$gte" => Some(Self::Gte),
            "$lt" => Some(Self::Lt),
            "$lte" => Some(Self::Lte),
            "$eq" => Some(Self::Eq),
            "$ne" => Some(Self::Ne),
            "$regex" => Some(Self::Regex),
            "$in" => Some(Self::In),
            "$nin" => Some(Self::NotIn),
            "$exists" => Some(Self::Exists),
            "$elemMatch" => Some(Self::ElemMatch),
            "$field" => Some(Self::Field),
            _ => None,
        }
    }

    /// The Mongo-style key for this operator.
    #[must_use]
    pub const fn as_mongo(self) -> &'static str {
        match self {
            Self::Or => "$or",
            Self::And => "$and",
            Self::Nor => "$nor",
            Self::Not => "$not",
            Self::Gt => "$gt",
            Self::Gte => "$gte",
            Self::Lt => "$lt",
            Self::Lte => "$lte",
            Self::Eq => "$eq",
            Self::Ne => "$ne",
            Self::Regex => "$regex",
            Self::In => "$in",
            Self::NotIn => "$nin",
            Self::Exists => "$exists",
            Self::ElemMatch => "$elemMatch",
            Self::Field => "$field",
        }
    }

    /// Whether this operator combines filter nodes rather than testing a field.
    #[inline]
    #[must_use]
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::Or | Self::And | Self::Nor | Self::Not)
    }

    /// Infix SQL symbol for the binary comparison operators.
    ///
    /// `None` for operators that render a fixed SQL template instead.
    #[must_use]
    pub const fn sql_symbol(self) -> Option<&'static str> {
        match self {
            Self::Gt => Some(">"),
            Self::Gte => Some(">="),
            Self::Lt => Some("<"),
            Self::Lte => Some("<="),
            Self::Eq => Some("="),
            Self::Ne => Some("!="),
            Self::Regex => Some("~*"),
            _ => None,
        }
    }

    /// `$gt`, `$gte`, `$lt`, `$lte`.
    #[inline]
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }

    /// Operators that compare a JSONB text value numerically when the operand
    /// is a number.
    #[inline]
    pub(crate) const fn casts_numeric_operand(self) -> bool {
        self.is_ordering() || matches!(self, Self::Eq | Self::Ne)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Operator; 16] = [
        Operator::Or,
        Operator::And,
        Operator::Nor,
        Operator::Not,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::Eq,
        Operator::Ne,
        Operator::Regex,
        Operator::In,
        Operator::NotIn,
        Operator::Exists,
        Operator::ElemMatch,
        Operator::Field,
    ];

    #[test]
    fn test_mongo_names_are_consistent() {
        for op in ALL {
            assert_eq!(Operator::from_mongo(op.as_mongo()), Some(op));
        }
    }

    #[test]
    fn test_unknown_operators() {
        assert_eq!(Operator::from_mongo("$foo"), None);
        assert_eq!(Operator::from_mongo("$between"), None);
        assert_eq!(Operator::from_mongo("$elemmatch"), None);
        assert_eq!(Operator::from_mongo(""), None);
    }

    #[test]
    fn test_sql_symbols() {
        assert_eq!(Operator::Gt.sql_symbol(), Some(">"));
        assert_eq!(Operator::Lte.sql_symbol(), Some("<="));
        assert_eq!(Operator::Ne.sql_symbol(), Some("!="));
        assert_eq!(Operator::Regex.sql_symbol(), Some("~*"));
        assert_eq!(Operator::In.sql_symbol(), None);
        assert_eq!(Operator::Or.sql_symbol(), None);
    }

    #[test]
    fn test_logical_operators() {
        let logical: Vec<Operator> = ALL.into_iter().filter(|op| op.is_logical()).collect();
        assert_eq!(
            logical,
            [Operator::Or, Operator::And, Operator::Nor, Operator::Not]
        );
    }

    #[test]
    fn test_numeric_cast_operators() {
        assert!(Operator::Gte.casts_numeric_operand());
        assert!(Operator::Eq.casts_numeric_operand());
        assert!(Operator::Ne.casts_numeric_operand());
        assert!(!Operator::Regex.casts_numeric_operand());
        assert!(!Operator::In.casts_numeric_operand());
    }
}
