// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Node kinds of the syntax tree.
//!
//! Each kind documents its child slots. Fixed slots come first and may be
//! empty (`None`); variadic children follow.

use ecow::EcoString;

use super::name_ref::NameRef;
use super::operators::{self, BinaryOperator, UnaryOperator};
use crate::semantic_analysis::SymbolId;

/// The kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
}

impl TypeKind {
    /// Parses the introducing keyword.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            "interface" => Some(Self::Interface),
            "enum" => Some(Self::Enum),
            "record" => Some(Self::Record),
            _ => None,
        }
    }

    /// The introducing keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Record => "record",
        }
    }
}

/// Property accessor kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Get,
    Set,
    Init,
}

impl AccessorKind {
    /// Parses an accessor keyword.
    #[must_use]
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "get" => Some(Self::Get),
            "set" => Some(Self::Set),
            "init" => Some(Self::Init),
            _ => None,
        }
    }

    /// The accessor keyword.
    #[must_use]
    pub const fn word(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Init => "init",
        }
    }
}

/// Declaration modifiers as written, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub Vec<EcoString>);

/// Words accepted as declaration modifiers.
pub const MODIFIER_WORDS: &[&str] = &[
    "abstract", "async", "const", "extern", "internal", "new", "override", "partial", "private",
    "protected", "public", "readonly", "sealed", "static", "unsafe", "virtual", "volatile",
];

impl Modifiers {
    /// Returns `true` if `word` is present.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.0.iter().any(|m| m == word)
    }

    /// Returns `true` for `static` (or `const`, which is implicitly static).
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains("static") || self.contains("const")
    }
}

/// A type, namespace-level or member declaration's shared data.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: EcoString,
    pub modifiers: Modifiers,
    pub type_params: Vec<EcoString>,
    /// Number of leading children that are base types.
    pub base_count: usize,
    /// Symbol registered for this declaration.
    pub symbol: Option<SymbolId>,
}

/// A method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: EcoString,
    pub modifiers: Modifiers,
    pub type_params: Vec<EcoString>,
    pub is_constructor: bool,
    pub symbol: Option<SymbolId>,
}

/// Literal categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Integer,
    Float,
    String,
    InterpolatedString,
    Character,
    Boolean,
    Null,
}

/// The kind of a syntax node with its kind-specific data.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // === Declarations ===
    /// A source file: `[members...]`.
    CompilationUnit,
    /// `using A.B;`, `using X = A.B;`, `using static A.B;`: `[target]`.
    Using { alias: Option<EcoString>, is_static: bool },
    /// `namespace A.B { ... }` or `namespace A.B;`: `[name, members...]`.
    Namespace { file_scoped: bool },
    /// A type declaration: `[bases..., members...]`.
    TypeDecl(TypeDecl),
    /// `int x = 1, y;` at member level: `[type, declarators...]`.
    Field { modifiers: Modifiers },
    /// Method or constructor: `[return_type, body, params...]`; the return
    /// type is empty for constructors and the body for abstract methods.
    Method(MethodDecl),
    /// `public static T operator +(T a, T b) ...`: `[return_type, body, params...]`.
    OperatorDecl { symbol_text: EcoString, modifiers: Modifiers, symbol: Option<SymbolId> },
    /// `T Name { get; set; } = init;`: `[type, initializer, accessors...]`.
    Property { name: EcoString, modifiers: Modifiers, symbol: Option<SymbolId> },
    /// `get;`, `set { ... }`, `init => ...;`: `[body]`.
    Accessor { kind: AccessorKind, modifiers: Modifiers },
    /// `ref T name = default`: `[type, default]`.
    Parameter { name: EcoString, modifier: Option<EcoString> },
    /// `name = init` inside a field or local declaration: `[init]`. Field
    /// declarators carry the symbol registered for them.
    Declarator { name: EcoString, symbol: Option<SymbolId> },
    /// `Name = value` inside an enum: `[value]`.
    EnumMember { name: EcoString, symbol: Option<SymbolId> },
    /// `=> expr;`: `[expr]`.
    ExpressionBody,

    // === Statements ===
    /// `{ ... }`: `[statements...]`.
    Block,
    /// `T a = 1, b;` or `const T a = 1;`: `[type, declarators...]`.
    LocalDecl { is_const: bool },
    /// `expr;`: `[expr]`.
    ExpressionStatement,
    /// `if (cond) then else other`: `[cond, then, else]`.
    If,
    /// `while (cond) body`: `[cond, body]`.
    While,
    /// `do body while (cond);`: `[body, cond]`.
    Do,
    /// `for (init; cond; updates) body`: `[init, cond, body, updates...]`.
    For,
    /// `foreach (T name in collection) body`: `[type, collection, body]`.
    Foreach { name: EcoString },
    /// `return expr;`: `[expr]`.
    Return,
    /// `break;`
    Break,
    /// `continue;`
    Continue,
    /// `throw expr;`: `[expr]`.
    Throw,
    /// `;`
    Empty,

    // === Expressions ===
    /// A literal; `text` is the canonical source text.
    Literal { kind: LiteralKind, text: EcoString },
    /// A name reference: `[type_args...]`.
    Name(NameRef),
    /// `this`
    This,
    /// `base`
    Base,
    /// `left op right`: `[left, right]`. The overload is a cached,
    /// non-owning reference to a user operator declaration.
    Binary { op: BinaryOperator, overload: Option<SymbolId> },
    /// Prefix or postfix operator: `[operand]`.
    Unary { op: UnaryOperator, overload: Option<SymbolId> },
    /// `cond ? then : else`: `[cond, then, else]`.
    Conditional,
    /// `callee(args...)`: `[callee, args...]`.
    Call,
    /// `target[args...]`: `[target, args...]`.
    Index,
    /// `new T(args) { init }`, `new T[n]`, `new[] { ... }`:
    /// `[type, initializer, args...]`.
    New { array: bool },
    /// `{ a, b }` collection or object initializer: `[elements...]`.
    Initializer,
    /// `(T)operand`: `[type, operand]`.
    Cast,
    /// `typeof(T)`: `[type]`.
    Typeof,
    /// A node kind registered by an extension of the parse registry:
    /// `[children...]`.
    Custom { tag: EcoString },
    /// Tokens the grammar did not recognize, kept for later passes.
    Unrecognized,
}

/// Broad classification of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Declaration,
    Statement,
    Expression,
    Other,
}

impl NodeKind {
    /// Returns the broad class of this kind.
    #[must_use]
    pub const fn class(&self) -> NodeClass {
        match self {
            Self::CompilationUnit
            | Self::Using { .. }
            | Self::Namespace { .. }
            | Self::TypeDecl(_)
            | Self::Field { .. }
            | Self::Method(_)
            | Self::OperatorDecl { .. }
            | Self::Property { .. }
            | Self::Accessor { .. }
            | Self::EnumMember { .. } => NodeClass::Declaration,
            Self::Block
            | Self::LocalDecl { .. }
            | Self::ExpressionStatement
            | Self::If
            | Self::While
            | Self::Do
            | Self::For
            | Self::Foreach { .. }
            | Self::Return
            | Self::Break
            | Self::Continue
            | Self::Throw
            | Self::Empty => NodeClass::Statement,
            Self::Literal { .. }
            | Self::Name(_)
            | Self::This
            | Self::Base
            | Self::Binary { .. }
            | Self::Unary { .. }
            | Self::Conditional
            | Self::Call
            | Self::Index
            | Self::New { .. }
            | Self::Initializer
            | Self::Cast
            | Self::Typeof => NodeClass::Expression,
            Self::Parameter { .. }
            | Self::Declarator { .. }
            | Self::ExpressionBody
            | Self::Custom { .. }
            | Self::Unrecognized => NodeClass::Other,
        }
    }

    /// Returns `true` for expression kinds.
    #[must_use]
    pub const fn is_expression(&self) -> bool {
        matches!(self.class(), NodeClass::Expression)
    }

    /// Returns `true` for statement kinds.
    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(self.class(), NodeClass::Statement)
    }

    /// Number of leading fixed child slots.
    #[must_use]
    pub const fn fixed_slots(&self) -> usize {
        match self {
            Self::Using { .. }
            | Self::Accessor { .. }
            | Self::Declarator { .. }
            | Self::EnumMember { .. }
            | Self::ExpressionBody
            | Self::ExpressionStatement
            | Self::Return
            | Self::Throw
            | Self::Typeof
            | Self::Unary { .. }
            | Self::Namespace { .. }
            | Self::Field { .. }
            | Self::LocalDecl { .. }
            | Self::Call
            | Self::Index => 1,
            Self::Method(_)
            | Self::OperatorDecl { .. }
            | Self::Property { .. }
            | Self::Parameter { .. }
            | Self::While
            | Self::Do
            | Self::Binary { .. }
            | Self::New { .. }
            | Self::Cast => 2,
            Self::If | Self::Conditional | Self::Foreach { .. } | Self::For => 3,
            _ => 0,
        }
    }

    /// Precedence of the expression this node forms, for parenthesization.
    /// Primary expressions report 0.
    #[must_use]
    pub const fn precedence(&self) -> u16 {
        match self {
            Self::Binary { op, .. } => op.precedence(),
            Self::Unary { op, .. } => op.precedence(),
            Self::Conditional => operators::CONDITIONAL,
            Self::Cast => operators::UNARY,
            Self::Call | Self::Index => operators::PRIMARY,
            _ => 0,
        }
    }

    /// Short human-readable name of this kind.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CompilationUnit => "compilation unit",
            Self::Using { .. } => "using directive",
            Self::Namespace { .. } => "namespace",
            Self::TypeDecl(decl) => decl.kind.keyword(),
            Self::Field { .. } => "field",
            Self::Method(m) if m.is_constructor => "constructor",
            Self::Method(_) => "method",
            Self::OperatorDecl { .. } => "operator",
            Self::Property { .. } => "property",
            Self::Accessor { .. } => "accessor",
            Self::Parameter { .. } => "parameter",
            Self::Declarator { .. } => "declarator",
            Self::EnumMember { .. } => "enum member",
            Self::ExpressionBody => "expression body",
            Self::Block => "block",
            Self::LocalDecl { .. } => "local declaration",
            Self::ExpressionStatement => "expression statement",
            Self::If => "if statement",
            Self::While => "while loop",
            Self::Do => "do loop",
            Self::For => "for loop",
            Self::Foreach { .. } => "foreach loop",
            Self::Return => "return statement",
            Self::Break => "break statement",
            Self::Continue => "continue statement",
            Self::Throw => "throw statement",
            Self::Empty => "empty statement",
            Self::Literal { .. } => "literal",
            Self::Name(_) => "name",
            Self::This => "this",
            Self::Base => "base",
            Self::Binary { .. } => "binary operator",
            Self::Unary { .. } => "unary operator",
            Self::Conditional => "conditional",
            Self::Call => "call",
            Self::Index => "element access",
            Self::New { .. } => "object creation",
            Self::Initializer => "initializer",
            Self::Cast => "cast",
            Self::Typeof => "typeof",
            Self::Custom { .. } => "extension node",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Returns the name reference of a `Name` node.
    #[must_use]
    pub const fn as_name(&self) -> Option<&NameRef> {
        match self {
            Self::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Returns the binary operator of a `Binary` node.
    #[must_use]
    pub const fn binary_op(&self) -> Option<BinaryOperator> {
        match self {
            Self::Binary { op, .. } => Some(*op),
            _ => None,
        }
    }

    /// Returns `true` for kinds whose children are laid out one per line
    /// between braces.
    #[must_use]
    pub const fn is_block_like(&self) -> bool {
        matches!(
            self,
            Self::Block | Self::TypeDecl(_) | Self::Namespace { file_scoped: false }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(NodeKind::Block.class(), NodeClass::Statement);
        assert_eq!(NodeKind::Conditional.class(), NodeClass::Expression);
        assert_eq!(NodeKind::CompilationUnit.class(), NodeClass::Declaration);
        assert!(NodeKind::This.is_expression());
        assert!(!NodeKind::Unrecognized.is_statement());
    }

    #[test]
    fn precedence_of_kinds() {
        let add = NodeKind::Binary {
            op: BinaryOperator::Add,
            overload: None,
        };
        assert_eq!(add.precedence(), 310);
        assert_eq!(NodeKind::Cast.precedence(), operators::UNARY);
        assert_eq!(NodeKind::This.precedence(), 0);
    }

    #[test]
    fn keyword_tables() {
        assert_eq!(TypeKind::from_keyword("record"), Some(TypeKind::Record));
        assert_eq!(TypeKind::Struct.keyword(), "struct");
        assert_eq!(AccessorKind::from_word("init"), Some(AccessorKind::Init));
        let mods = Modifiers(vec!["public".into(), "const".into()]);
        assert!(mods.is_static());
        assert!(mods.contains("public"));
    }
}
