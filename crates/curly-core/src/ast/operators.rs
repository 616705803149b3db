// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Operator metadata: symbols, precedence, associativity and overload names.
//!
//! Precedence numbers grow as operators bind more loosely: member access is
//! 100, multiplication 300, assignment 500. The same table drives parsing,
//! parenthesization when rendering, overload lookup and constant folding.
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 100 | `.` `::` `?.`, postfix `++` `--`, call, index | Left |
//! | 200 | prefix `+` `-` `!` `~` `++` `--`, cast | Right |
//! | 300 | `*` `/` `%` | Left |
//! | 310 | `+` `-` | Left |
//! | 320 | `<<` `>>` | Left |
//! | 330 | `<` `>` `<=` `>=` `is` `as` | Left |
//! | 340 | `==` `!=` | Left |
//! | 350 / 360 / 370 | `&` / `^` / `\|` | Left |
//! | 380 / 385 | `&&` / `\|\|` | Left |
//! | 390 | `??` | Right |
//! | 400 | `?:` | Right |
//! | 500 | `=` and compound assignment | Right |

use ecow::EcoString;

/// Member access, call, index and postfix operators.
pub const PRIMARY: u16 = 100;
/// Prefix operators and casts.
pub const UNARY: u16 = 200;
/// The `?:` conditional operator.
pub const CONDITIONAL: u16 = 400;
/// Assignment operators.
pub const ASSIGNMENT: u16 = 500;
/// Accepts any operator; used at the top of an expression.
pub const LOOSEST: u16 = u16::MAX;

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Associativity {
    /// `a - b - c` is `(a - b) - c`
    Left,
    /// `a = b = c` is `a = (b = c)`
    Right,
}

/// Static facts about one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorInfo {
    /// Source symbol, e.g. `+=`.
    pub symbol: &'static str,
    /// Binding precedence (lower binds tighter).
    pub precedence: u16,
    /// Associativity at equal precedence.
    pub associativity: Associativity,
    /// Name a user type declares an overload under, if overloadable.
    pub overload_name: Option<&'static str>,
}

const fn info(
    symbol: &'static str,
    precedence: u16,
    associativity: Associativity,
    overload_name: Option<&'static str>,
) -> OperatorInfo {
    OperatorInfo {
        symbol,
        precedence,
        associativity,
        overload_name,
    }
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    MemberAccess,
    AliasQualifier,
    NullConditional,
    Multiply,
    Divide,
    Modulus,
    Add,
    Subtract,
    LeftShift,
    RightShift,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Is,
    As,
    Equal,
    NotEqual,
    BitwiseAnd,
    ExclusiveOr,
    BitwiseOr,
    LogicalAnd,
    LogicalOr,
    NullCoalescing,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModulusAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    NullCoalescingAssign,
}

impl BinaryOperator {
    /// Every binary operator, in table order.
    pub const ALL: [Self; 36] = [
        Self::MemberAccess,
        Self::AliasQualifier,
        Self::NullConditional,
        Self::Multiply,
        Self::Divide,
        Self::Modulus,
        Self::Add,
        Self::Subtract,
        Self::LeftShift,
        Self::RightShift,
        Self::LessThan,
        Self::GreaterThan,
        Self::LessThanOrEqual,
        Self::GreaterThanOrEqual,
        Self::Is,
        Self::As,
        Self::Equal,
        Self::NotEqual,
        Self::BitwiseAnd,
        Self::ExclusiveOr,
        Self::BitwiseOr,
        Self::LogicalAnd,
        Self::LogicalOr,
        Self::NullCoalescing,
        Self::Assign,
        Self::AddAssign,
        Self::SubtractAssign,
        Self::MultiplyAssign,
        Self::DivideAssign,
        Self::ModulusAssign,
        Self::AndAssign,
        Self::OrAssign,
        Self::XorAssign,
        Self::LeftShiftAssign,
        Self::RightShiftAssign,
        Self::NullCoalescingAssign,
    ];

    /// Returns the static metadata for this operator.
    #[must_use]
    pub const fn info(self) -> OperatorInfo {
        use Associativity::{Left, Right};
        match self {
            Self::MemberAccess => info(".", PRIMARY, Left, None),
            Self::AliasQualifier => info("::", PRIMARY, Left, None),
            Self::NullConditional => info("?.", PRIMARY, Left, None),
            Self::Multiply => info("*", 300, Left, Some("op_Multiply")),
            Self::Divide => info("/", 300, Left, Some("op_Division")),
            Self::Modulus => info("%", 300, Left, Some("op_Modulus")),
            Self::Add => info("+", 310, Left, Some("op_Addition")),
            Self::Subtract => info("-", 310, Left, Some("op_Subtraction")),
            Self::LeftShift => info("<<", 320, Left, Some("op_LeftShift")),
            Self::RightShift => info(">>", 320, Left, Some("op_RightShift")),
            Self::LessThan => info("<", 330, Left, Some("op_LessThan")),
            Self::GreaterThan => info(">", 330, Left, Some("op_GreaterThan")),
            Self::LessThanOrEqual => info("<=", 330, Left, Some("op_LessThanOrEqual")),
            Self::GreaterThanOrEqual => info(">=", 330, Left, Some("op_GreaterThanOrEqual")),
            Self::Is => info("is", 330, Left, None),
            Self::As => info("as", 330, Left, None),
            Self::Equal => info("==", 340, Left, Some("op_Equality")),
            Self::NotEqual => info("!=", 340, Left, Some("op_Inequality")),
            Self::BitwiseAnd => info("&", 350, Left, Some("op_BitwiseAnd")),
            Self::ExclusiveOr => info("^", 360, Left, Some("op_ExclusiveOr")),
            Self::BitwiseOr => info("|", 370, Left, Some("op_BitwiseOr")),
            Self::LogicalAnd => info("&&", 380, Left, None),
            Self::LogicalOr => info("||", 385, Left, None),
            Self::NullCoalescing => info("??", 390, Right, None),
            Self::Assign => info("=", ASSIGNMENT, Right, None),
            Self::AddAssign => info("+=", ASSIGNMENT, Right, None),
            Self::SubtractAssign => info("-=", ASSIGNMENT, Right, None),
            Self::MultiplyAssign => info("*=", ASSIGNMENT, Right, None),
            Self::DivideAssign => info("/=", ASSIGNMENT, Right, None),
            Self::ModulusAssign => info("%=", ASSIGNMENT, Right, None),
            Self::AndAssign => info("&=", ASSIGNMENT, Right, None),
            Self::OrAssign => info("|=", ASSIGNMENT, Right, None),
            Self::XorAssign => info("^=", ASSIGNMENT, Right, None),
            Self::LeftShiftAssign => info("<<=", ASSIGNMENT, Right, None),
            Self::RightShiftAssign => info(">>=", ASSIGNMENT, Right, None),
            Self::NullCoalescingAssign => info("??=", ASSIGNMENT, Right, None),
        }
    }

    /// Looks an operator up by its source symbol.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        self.info().symbol
    }

    /// Binding precedence.
    #[must_use]
    pub const fn precedence(self) -> u16 {
        self.info().precedence
    }

    /// Associativity.
    #[must_use]
    pub const fn associativity(self) -> Associativity {
        self.info().associativity
    }

    /// Overload lookup name; `None` for operators users cannot overload.
    #[must_use]
    pub const fn overload_name(self) -> Option<&'static str> {
        self.info().overload_name
    }

    /// `.`, `::` and `?.`.
    #[must_use]
    pub const fn is_member_access(self) -> bool {
        matches!(
            self,
            Self::MemberAccess | Self::AliasQualifier | Self::NullConditional
        )
    }

    /// Plain and compound assignment.
    #[must_use]
    pub const fn is_assignment(self) -> bool {
        self.precedence() == ASSIGNMENT
    }

    /// Operators whose right operand is a type (`is`, `as`).
    #[must_use]
    pub const fn takes_type_operand(self) -> bool {
        matches!(self, Self::Is | Self::As)
    }

    /// Comparison operators, which yield `bool` regardless of operand type.
    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan
                | Self::GreaterThan
                | Self::LessThanOrEqual
                | Self::GreaterThanOrEqual
                | Self::Equal
                | Self::NotEqual
                | Self::Is
                | Self::LogicalAnd
                | Self::LogicalOr
        )
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A prefix or postfix unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Negate,
    Not,
    Complement,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOperator {
    /// Returns the static metadata for this operator.
    #[must_use]
    pub const fn info(self) -> OperatorInfo {
        use Associativity::{Left, Right};
        match self {
            Self::Plus => info("+", UNARY, Right, Some("op_UnaryPlus")),
            Self::Negate => info("-", UNARY, Right, Some("op_UnaryNegation")),
            Self::Not => info("!", UNARY, Right, Some("op_LogicalNot")),
            Self::Complement => info("~", UNARY, Right, Some("op_OnesComplement")),
            Self::PreIncrement => info("++", UNARY, Right, Some("op_Increment")),
            Self::PreDecrement => info("--", UNARY, Right, Some("op_Decrement")),
            Self::PostIncrement => info("++", PRIMARY, Left, Some("op_Increment")),
            Self::PostDecrement => info("--", PRIMARY, Left, Some("op_Decrement")),
        }
    }

    /// Looks up a prefix operator by symbol.
    #[must_use]
    pub fn prefix(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Plus),
            "-" => Some(Self::Negate),
            "!" => Some(Self::Not),
            "~" => Some(Self::Complement),
            "++" => Some(Self::PreIncrement),
            "--" => Some(Self::PreDecrement),
            _ => None,
        }
    }

    /// Looks up a postfix operator by symbol.
    #[must_use]
    pub fn postfix(symbol: &str) -> Option<Self> {
        match symbol {
            "++" => Some(Self::PostIncrement),
            "--" => Some(Self::PostDecrement),
            _ => None,
        }
    }

    /// Source symbol.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        self.info().symbol
    }

    /// Binding precedence.
    #[must_use]
    pub const fn precedence(self) -> u16 {
        self.info().precedence
    }

    /// Overload lookup name.
    #[must_use]
    pub const fn overload_name(self) -> Option<&'static str> {
        self.info().overload_name
    }

    /// `true` for `x++` and `x--`.
    #[must_use]
    pub const fn is_postfix(self) -> bool {
        matches!(self, Self::PostIncrement | Self::PostDecrement)
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Looks up the user-declarable operator (`operator +`) behind an overload
/// name, returning its symbol and operand count.
#[must_use]
pub fn symbol_for_overload(name: &str) -> Option<(&'static str, usize)> {
    BinaryOperator::ALL
        .into_iter()
        .filter_map(|op| Some((op.overload_name()?, op.symbol(), 2)))
        .chain(
            [
                UnaryOperator::Plus,
                UnaryOperator::Negate,
                UnaryOperator::Not,
                UnaryOperator::Complement,
                UnaryOperator::PreIncrement,
                UnaryOperator::PreDecrement,
            ]
            .into_iter()
            .filter_map(|op| Some((op.overload_name()?, op.symbol(), 1))),
        )
        .find(|(overload, _, _)| *overload == name)
        .map(|(_, symbol, arity)| (symbol, arity))
}

/// Maps a declared `operator <symbol>` with `arity` parameters to its
/// overload lookup name.
#[must_use]
pub fn overload_name_for(symbol: &str, arity: usize) -> Option<&'static str> {
    match arity {
        1 => UnaryOperator::prefix(symbol).and_then(UnaryOperator::overload_name),
        2 => BinaryOperator::from_symbol(symbol).and_then(BinaryOperator::overload_name),
        _ => None,
    }
}

/// Which operand position a child occupies under an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSlot {
    /// Left operand, condition of `?:`, callee, cast operand of postfix.
    Left,
    /// Middle branch of `?:`; never needs parentheses.
    Middle,
    /// Right operand, else-branch of `?:`, operand of a prefix operator.
    Right,
}

/// Decides whether a child of precedence `child` needs parentheses under a
/// parent of precedence `parent`.
///
/// Children at member-access precedence or tighter never do. A looser child
/// always does. At equal precedence the child is left bare only in the
/// parent's natural slot (left for left-associative, right for
/// right-associative), so `a - (b - c)` keeps its parentheses while
/// `a - b - c` needs none.
#[must_use]
pub fn needs_parens(
    child: u16,
    parent: u16,
    parent_associativity: Associativity,
    slot: OperandSlot,
) -> bool {
    if child <= PRIMARY || slot == OperandSlot::Middle {
        return false;
    }
    match child.cmp(&parent) {
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Equal => !matches!(
            (parent_associativity, slot),
            (Associativity::Left, OperandSlot::Left) | (Associativity::Right, OperandSlot::Right)
        ),
    }
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(EcoString),
    Null,
}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Str(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl ConstValue {
    #[expect(clippy::cast_precision_loss, reason = "implicit int-to-double conversion")]
    fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Value equality with an integer promoted when compared to a double.
    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(_), Self::Float(_)) | (Self::Float(_), Self::Int(_)) => {
                self.as_float() == other.as_float()
            }
            _ => self == other,
        }
    }
}

/// Constant folding for an operator kind.
pub trait ConstantFold {
    /// Folds the operator over constant operands, or `None` when the result
    /// is not a compile-time constant (overflow, division by zero, type
    /// mismatch).
    fn fold(&self, operands: &[ConstValue]) -> Option<ConstValue>;
}

impl ConstantFold for BinaryOperator {
    fn fold(&self, operands: &[ConstValue]) -> Option<ConstValue> {
        use ConstValue::{Bool, Int, Null, Str};
        let [left, right] = operands else {
            return None;
        };
        let value = match (self, left, right) {
            (Self::NullCoalescing, Null, other) => other.clone(),
            (Self::NullCoalescing, other, _) => other.clone(),
            (Self::Add, Str(a), b) => Str(ecow::eco_format!("{a}{b}")),
            (Self::Add, a, Str(b)) => Str(ecow::eco_format!("{a}{b}")),
            (Self::Equal, a, b) => Bool(a.equals(b)),
            (Self::NotEqual, a, b) => Bool(!a.equals(b)),
            (op, Int(a), Int(b)) => fold_int(*op, *a, *b)?,
            (op, Bool(a), Bool(b)) => match op {
                Self::LogicalAnd | Self::BitwiseAnd => Bool(*a && *b),
                Self::LogicalOr | Self::BitwiseOr => Bool(*a || *b),
                Self::ExclusiveOr => Bool(a != b),
                _ => return None,
            },
            (op, a, b) => fold_float(*op, a.as_float()?, b.as_float()?)?,
        };
        Some(value)
    }
}

fn fold_int(op: BinaryOperator, a: i64, b: i64) -> Option<ConstValue> {
    use BinaryOperator as B;
    use ConstValue::{Bool, Int};
    Some(match op {
        B::Add => Int(a.checked_add(b)?),
        B::Subtract => Int(a.checked_sub(b)?),
        B::Multiply => Int(a.checked_mul(b)?),
        B::Divide => Int(a.checked_div(b)?),
        B::Modulus => Int(a.checked_rem(b)?),
        B::LeftShift => Int(a.checked_shl(u32::try_from(b).ok()?)?),
        B::RightShift => Int(a.checked_shr(u32::try_from(b).ok()?)?),
        B::BitwiseAnd => Int(a & b),
        B::BitwiseOr => Int(a | b),
        B::ExclusiveOr => Int(a ^ b),
        B::LessThan => Bool(a < b),
        B::GreaterThan => Bool(a > b),
        B::LessThanOrEqual => Bool(a <= b),
        B::GreaterThanOrEqual => Bool(a >= b),
        _ => return None,
    })
}

fn fold_float(op: BinaryOperator, a: f64, b: f64) -> Option<ConstValue> {
    use BinaryOperator as B;
    use ConstValue::{Bool, Float};
    Some(match op {
        B::Add => Float(a + b),
        B::Subtract => Float(a - b),
        B::Multiply => Float(a * b),
        B::Divide => Float(a / b),
        B::Modulus => Float(a % b),
        B::LessThan => Bool(a < b),
        B::GreaterThan => Bool(a > b),
        B::LessThanOrEqual => Bool(a <= b),
        B::GreaterThanOrEqual => Bool(a >= b),
        _ => return None,
    })
}

impl ConstantFold for UnaryOperator {
    fn fold(&self, operands: &[ConstValue]) -> Option<ConstValue> {
        use ConstValue::{Bool, Float, Int};
        let [operand] = operands else {
            return None;
        };
        Some(match (self, operand) {
            (Self::Plus, Int(v)) => Int(*v),
            (Self::Plus, Float(v)) => Float(*v),
            (Self::Negate, Int(v)) => Int(v.checked_neg()?),
            (Self::Negate, Float(v)) => Float(-v),
            (Self::Not, Bool(v)) => Bool(!v),
            (Self::Complement, Int(v)) => Int(!v),
            _ => return None,
        })
    }
}

/// Parses the value of a literal token's text.
#[must_use]
pub fn literal_value(text: &str) -> Option<ConstValue> {
    match text {
        "true" => return Some(ConstValue::Bool(true)),
        "false" => return Some(ConstValue::Bool(false)),
        "null" => return Some(ConstValue::Null),
        _ => {}
    }
    let first = text.chars().next()?;
    if first.is_ascii_digit() || first == '.' {
        return number_value(text);
    }
    if let Some(body) = text.strip_prefix("@\"").and_then(|t| t.strip_suffix('"')) {
        return Some(ConstValue::Str(body.replace("\"\"", "\"").into()));
    }
    if let Some(body) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return Some(ConstValue::Str(unescape(body)?.into()));
    }
    if let Some(body) = text.strip_prefix('\'').and_then(|t| t.strip_suffix('\'')) {
        let unescaped = unescape(body)?;
        let mut chars = unescaped.chars();
        let c = chars.next()?;
        return chars.next().is_none().then_some(ConstValue::Char(c));
    }
    None
}

fn number_value(text: &str) -> Option<ConstValue> {
    let clean: String = text.chars().filter(|&c| c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        let digits = hex.trim_end_matches(['u', 'l']);
        return i64::from_str_radix(digits, 16).ok().map(ConstValue::Int);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        let digits = bin.trim_end_matches(['u', 'l']);
        return i64::from_str_radix(digits, 2).ok().map(ConstValue::Int);
    }
    let is_real = lower.contains(['.', 'e']) || lower.ends_with(['f', 'd', 'm']);
    if is_real {
        let digits = lower.trim_end_matches(['f', 'd', 'm']);
        digits.parse().ok().map(ConstValue::Float)
    } else {
        let digits = lower.trim_end_matches(['u', 'l']);
        digits.parse().ok().map(ConstValue::Int)
    }
}

/// Decodes backslash escapes; `None` on a malformed escape.
fn unescape(body: &str) -> Option<String> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
            }
            other => other,
        };
        out.push(escaped);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_round_trip() {
        for op in BinaryOperator::ALL {
            assert_eq!(BinaryOperator::from_symbol(op.symbol()), Some(op));
        }
        assert_eq!(UnaryOperator::prefix("-"), Some(UnaryOperator::Negate));
        assert_eq!(UnaryOperator::postfix("++"), Some(UnaryOperator::PostIncrement));
        assert_eq!(UnaryOperator::postfix("-"), None);
    }

    #[test]
    fn precedence_bands() {
        assert!(BinaryOperator::MemberAccess.precedence() < BinaryOperator::Multiply.precedence());
        assert!(BinaryOperator::Multiply.precedence() < BinaryOperator::Add.precedence());
        assert!(BinaryOperator::Equal.precedence() < BinaryOperator::NullCoalescing.precedence());
        assert_eq!(BinaryOperator::AddAssign.precedence(), ASSIGNMENT);
        assert_eq!(BinaryOperator::Assign.associativity(), Associativity::Right);
        assert_eq!(BinaryOperator::NullCoalescing.associativity(), Associativity::Right);
        assert_eq!(BinaryOperator::Subtract.associativity(), Associativity::Left);
    }

    #[test]
    fn only_overloadable_operators_have_names() {
        assert_eq!(BinaryOperator::Equal.overload_name(), Some("op_Equality"));
        assert_eq!(BinaryOperator::Add.overload_name(), Some("op_Addition"));
        assert_eq!(BinaryOperator::Assign.overload_name(), None);
        assert_eq!(BinaryOperator::MemberAccess.overload_name(), None);
        assert_eq!(BinaryOperator::LogicalAnd.overload_name(), None);
        assert_eq!(UnaryOperator::Negate.overload_name(), Some("op_UnaryNegation"));
    }

    #[test]
    fn overload_names_map_both_ways() {
        assert_eq!(overload_name_for("+", 2), Some("op_Addition"));
        assert_eq!(overload_name_for("-", 1), Some("op_UnaryNegation"));
        assert_eq!(overload_name_for("=", 2), None);
        assert_eq!(symbol_for_overload("op_Equality"), Some(("==", 2)));
        assert_eq!(symbol_for_overload("op_LogicalNot"), Some(("!", 1)));
        assert_eq!(symbol_for_overload("op_Nothing"), None);
    }

    #[test]
    fn parens_follow_precedence_and_associativity() {
        let add = BinaryOperator::Add.precedence();
        let mul = BinaryOperator::Multiply.precedence();
        let coalesce = BinaryOperator::NullCoalescing.precedence();
        // (a + b) * c
        assert!(needs_parens(add, mul, Associativity::Left, OperandSlot::Left));
        // a + b * c
        assert!(!needs_parens(mul, add, Associativity::Left, OperandSlot::Right));
        // a - b - c
        assert!(!needs_parens(add, add, Associativity::Left, OperandSlot::Left));
        // a - (b - c)
        assert!(needs_parens(add, add, Associativity::Left, OperandSlot::Right));
        // a ?? b ?? c
        assert!(!needs_parens(coalesce, coalesce, Associativity::Right, OperandSlot::Right));
        // (a ?? b) ?? c
        assert!(needs_parens(coalesce, coalesce, Associativity::Right, OperandSlot::Left));
        // member access chains never need them
        assert!(!needs_parens(PRIMARY, PRIMARY, Associativity::Left, OperandSlot::Right));
        assert!(!needs_parens(ASSIGNMENT, CONDITIONAL, Associativity::Right, OperandSlot::Middle));
    }

    #[test]
    fn folds_constants() {
        use ConstValue::{Bool, Float, Int, Null, Str};
        assert_eq!(BinaryOperator::Add.fold(&[Int(2), Int(3)]), Some(Int(5)));
        assert_eq!(BinaryOperator::Divide.fold(&[Int(1), Int(0)]), None);
        assert_eq!(BinaryOperator::Add.fold(&[Int(i64::MAX), Int(1)]), None);
        assert_eq!(BinaryOperator::Multiply.fold(&[Int(2), Float(1.5)]), Some(Float(3.0)));
        assert_eq!(BinaryOperator::Add.fold(&[Str("a".into()), Int(1)]), Some(Str("a1".into())));
        assert_eq!(BinaryOperator::LessThan.fold(&[Int(1), Int(2)]), Some(Bool(true)));
        assert_eq!(BinaryOperator::NullCoalescing.fold(&[Null, Int(7)]), Some(Int(7)));
        assert_eq!(BinaryOperator::LogicalAnd.fold(&[Bool(true), Bool(false)]), Some(Bool(false)));
        assert_eq!(BinaryOperator::Assign.fold(&[Int(1), Int(2)]), None);
        assert_eq!(UnaryOperator::Negate.fold(&[Int(4)]), Some(Int(-4)));
        assert_eq!(UnaryOperator::Not.fold(&[Bool(false)]), Some(Bool(true)));
    }

    #[test]
    fn equality_promotes_integers() {
        use ConstValue::{Bool, Float, Int, Str};
        assert_eq!(BinaryOperator::Equal.fold(&[Int(1), Float(1.0)]), Some(Bool(true)));
        assert_eq!(BinaryOperator::NotEqual.fold(&[Float(2.0), Int(2)]), Some(Bool(false)));
        assert_eq!(BinaryOperator::Equal.fold(&[Int(1), Float(1.5)]), Some(Bool(false)));
        assert_eq!(BinaryOperator::Equal.fold(&[Int(1), Str("1".into())]), Some(Bool(false)));
    }

    #[test]
    fn parses_literal_values() {
        use ConstValue::{Bool, Char, Float, Int, Null, Str};
        assert_eq!(literal_value("42"), Some(Int(42)));
        assert_eq!(literal_value("0xFF"), Some(Int(255)));
        assert_eq!(literal_value("1_000UL"), Some(Int(1000)));
        assert_eq!(literal_value("2.5f"), Some(Float(2.5)));
        assert_eq!(literal_value("1e3"), Some(Float(1000.0)));
        assert_eq!(literal_value("\"a\\tb\""), Some(Str("a\tb".into())));
        assert_eq!(literal_value("@\"C:\\x\"\"\""), Some(Str("C:\\x\"".into())));
        assert_eq!(literal_value("'\\n'"), Some(Char('\n')));
        assert_eq!(literal_value("'\\u0041'"), Some(Char('A')));
        assert_eq!(literal_value("true"), Some(Bool(true)));
        assert_eq!(literal_value("null"), Some(Null));
        assert_eq!(literal_value("$\"{x}\""), None);
    }
}
