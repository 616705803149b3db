// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Built-in `System` types and the predefined type keywords that alias
//! them.

use super::name_table::{NameTable, Symbol, SymbolId, SymbolKind};
use crate::ast::TypeKind;

/// Types declared in the `System` namespace of every new table.
pub const SYSTEM_TYPES: &[(&str, TypeKind)] = &[
    ("Object", TypeKind::Class),
    ("String", TypeKind::Class),
    ("Boolean", TypeKind::Struct),
    ("Char", TypeKind::Struct),
    ("Byte", TypeKind::Struct),
    ("SByte", TypeKind::Struct),
    ("Int16", TypeKind::Struct),
    ("UInt16", TypeKind::Struct),
    ("Int32", TypeKind::Struct),
    ("UInt32", TypeKind::Struct),
    ("Int64", TypeKind::Struct),
    ("UInt64", TypeKind::Struct),
    ("Single", TypeKind::Struct),
    ("Double", TypeKind::Struct),
    ("Decimal", TypeKind::Struct),
    ("Void", TypeKind::Struct),
];

/// Predefined type keywords and the `System` type each one names.
pub const KEYWORD_ALIASES: &[(&str, &str)] = &[
    ("bool", "Boolean"),
    ("byte", "Byte"),
    ("char", "Char"),
    ("decimal", "Decimal"),
    ("double", "Double"),
    ("float", "Single"),
    ("int", "Int32"),
    ("long", "Int64"),
    ("object", "Object"),
    ("sbyte", "SByte"),
    ("short", "Int16"),
    ("string", "String"),
    ("uint", "UInt32"),
    ("ulong", "UInt64"),
    ("ushort", "UInt16"),
    ("void", "Void"),
];

fn system_type(table: &NameTable, name: &str) -> Option<SymbolId> {
    let entry = table.lookup_path(&format!("System.{name}"))?;
    match entry.single()? {
        super::Entity::Symbol(id) => Some(id),
        super::Entity::Scope(_) => None,
    }
}

/// Declares the built-ins in `table`.
pub(super) fn register(table: &NameTable) {
    let system = table.find_or_create_path("System");
    for (name, kind) in SYSTEM_TYPES {
        table.declare(system, Symbol::new(*name, SymbolKind::Type(*kind)));
    }
    for (keyword, name) in KEYWORD_ALIASES {
        if let Some(target) = system_type(table, name) {
            table.alias_keyword(keyword, target);
        }
    }

    let object = system_type(table, "Object");
    let string = system_type(table, "String");
    let boolean = system_type(table, "Boolean");
    let int32 = system_type(table, "Int32");

    let object_members = object.and_then(|o| table.symbol(o)?.members());
    if let Some(members) = object_members {
        table.declare(
            members,
            Symbol::new("ToString", SymbolKind::Method).with_type(string),
        );
        table.declare(
            members,
            Symbol::new("Equals", SymbolKind::Method)
                .with_type(boolean)
                .with_params(vec![object]),
        );
        table.declare(
            members,
            Symbol::new("GetHashCode", SymbolKind::Method).with_type(int32),
        );
    }
    if let Some(members) = string.and_then(|s| table.symbol(s)?.members()) {
        table.declare(
            members,
            Symbol::new("Length", SymbolKind::Property).with_type(int32),
        );
        table.declare(
            members,
            Symbol::new("Empty", SymbolKind::Field)
                .with_type(string)
                .with_static(true),
        );
    }
    // Every built-in type other than Object derives from it.
    if let Some(object) = object {
        for (name, _) in &SYSTEM_TYPES[1..] {
            if let Some(ty) = system_type(table, name) {
                table.update_symbol(ty, |s| s.bases = vec![object]);
            }
        }
    }
}
