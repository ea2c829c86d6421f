//! Occurrence records and the syntactic categories the front-end assigns.

use smol_str::SmolStr;

/// Syntactic category of an occurrence, as reported by the front-end.
///
/// Named variants carry the front-end's numeric codes (see
/// [`SymbolKind::code`]); any other category is kept as `Other(code)`.
/// [`SymbolKind::from_code`] always yields the named variant for a known
/// code, so a category maps to exactly one value everywhere in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    StructDecl,
    UnionDecl,
    ClassDecl,
    EnumDecl,
    FieldDecl,
    EnumConstantDecl,
    FunctionDecl,
    VarDecl,
    ParmDecl,
    TypedefDecl,
    CxxMethod,
    Namespace,
    Constructor,
    Destructor,
    ConversionFunction,
    FunctionTemplate,
    ClassTemplate,
    TypeRef,
    DeclRefExpr,
    MemberRefExpr,
    CallExpr,
    MacroDefinition,
    MacroExpansion,
    InclusionDirective,
    Other(u16),
}

impl SymbolKind {
    /// Largest code that fits beside the definition bit of a packed weight.
    pub const MAX_CODE: u16 = TargetWeight::DEFINITION_BIT - 1;

    /// Numeric category code.
    pub const fn code(self) -> u16 {
        match self {
            SymbolKind::StructDecl => 2,
            SymbolKind::UnionDecl => 3,
            SymbolKind::ClassDecl => 4,
            SymbolKind::EnumDecl => 5,
            SymbolKind::FieldDecl => 6,
            SymbolKind::EnumConstantDecl => 7,
            SymbolKind::FunctionDecl => 8,
            SymbolKind::VarDecl => 9,
            SymbolKind::ParmDecl => 10,
            SymbolKind::TypedefDecl => 20,
            SymbolKind::CxxMethod => 21,
            SymbolKind::Namespace => 22,
            SymbolKind::Constructor => 24,
            SymbolKind::Destructor => 25,
            SymbolKind::ConversionFunction => 26,
            SymbolKind::FunctionTemplate => 30,
            SymbolKind::ClassTemplate => 31,
            SymbolKind::TypeRef => 43,
            SymbolKind::DeclRefExpr => 101,
            SymbolKind::MemberRefExpr => 102,
            SymbolKind::CallExpr => 103,
            SymbolKind::MacroDefinition => 501,
            SymbolKind::MacroExpansion => 502,
            SymbolKind::InclusionDirective => 503,
            SymbolKind::Other(code) => code & Self::MAX_CODE,
        }
    }

    /// Category for a numeric code. Bits above [`Self::MAX_CODE`] are ignored.
    pub const fn from_code(code: u16) -> Self {
        match code & Self::MAX_CODE {
            2 => SymbolKind::StructDecl,
            3 => SymbolKind::UnionDecl,
            4 => SymbolKind::ClassDecl,
            5 => SymbolKind::EnumDecl,
            6 => SymbolKind::FieldDecl,
            7 => SymbolKind::EnumConstantDecl,
            8 => SymbolKind::FunctionDecl,
            9 => SymbolKind::VarDecl,
            10 => SymbolKind::ParmDecl,
            20 => SymbolKind::TypedefDecl,
            21 => SymbolKind::CxxMethod,
            22 => SymbolKind::Namespace,
            24 => SymbolKind::Constructor,
            25 => SymbolKind::Destructor,
            26 => SymbolKind::ConversionFunction,
            30 => SymbolKind::FunctionTemplate,
            31 => SymbolKind::ClassTemplate,
            43 => SymbolKind::TypeRef,
            101 => SymbolKind::DeclRefExpr,
            102 => SymbolKind::MemberRefExpr,
            103 => SymbolKind::CallExpr,
            501 => SymbolKind::MacroDefinition,
            502 => SymbolKind::MacroExpansion,
            503 => SymbolKind::InclusionDirective,
            other => SymbolKind::Other(other),
        }
    }

    /// Same category, with an `Other` that shadows a named code folded
    /// back onto the named variant.
    pub const fn normalized(self) -> Self {
        Self::from_code(self.code())
    }

    /// Whether this category names a declaration (as opposed to a use).
    pub fn is_declaration(&self) -> bool {
        !matches!(
            self.normalized(),
            SymbolKind::TypeRef
                | SymbolKind::DeclRefExpr
                | SymbolKind::MemberRefExpr
                | SymbolKind::CallExpr
                | SymbolKind::MacroExpansion
                | SymbolKind::InclusionDirective
                | SymbolKind::Other(_)
        )
    }

    /// Get a human-readable name for this kind.
    pub fn display(&self) -> &'static str {
        match self.normalized() {
            SymbolKind::StructDecl => "struct",
            SymbolKind::UnionDecl => "union",
            SymbolKind::ClassDecl => "class",
            SymbolKind::EnumDecl => "enum",
            SymbolKind::FieldDecl => "field",
            SymbolKind::EnumConstantDecl => "enum constant",
            SymbolKind::FunctionDecl => "function",
            SymbolKind::VarDecl => "variable",
            SymbolKind::ParmDecl => "parameter",
            SymbolKind::TypedefDecl => "typedef",
            SymbolKind::CxxMethod => "method",
            SymbolKind::Namespace => "namespace",
            SymbolKind::Constructor => "constructor",
            SymbolKind::Destructor => "destructor",
            SymbolKind::ConversionFunction => "conversion function",
            SymbolKind::FunctionTemplate => "function template",
            SymbolKind::ClassTemplate => "class template",
            SymbolKind::TypeRef => "type reference",
            SymbolKind::DeclRefExpr => "reference",
            SymbolKind::MemberRefExpr => "member reference",
            SymbolKind::CallExpr => "call",
            SymbolKind::MacroDefinition => "macro",
            SymbolKind::MacroExpansion => "macro expansion",
            SymbolKind::InclusionDirective => "include",
            SymbolKind::Other(_) => "other",
        }
    }
}

/// Weight of one candidate target: its category and whether the candidate
/// is a definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetWeight {
    pub kind: SymbolKind,
    pub definition: bool,
}

impl TargetWeight {
    /// Flag bit of the packed 16-bit form.
    pub const DEFINITION_BIT: u16 = 0x1000;

    pub const fn new(kind: SymbolKind, definition: bool) -> Self {
        Self {
            kind: kind.normalized(),
            definition,
        }
    }

    pub const fn declaration(kind: SymbolKind) -> Self {
        Self::new(kind, false)
    }

    pub const fn definition(kind: SymbolKind) -> Self {
        Self::new(kind, true)
    }

    /// Compact form: category code in the low bits, [`Self::DEFINITION_BIT`]
    /// when the candidate is a definition.
    pub const fn pack(self) -> u16 {
        let flag = if self.definition { Self::DEFINITION_BIT } else { 0 };
        self.kind.code() | flag
    }

    pub const fn unpack(value: u16) -> Self {
        Self {
            kind: SymbolKind::from_code(value),
            definition: value & Self::DEFINITION_BIT != 0,
        }
    }

    /// Priority of this candidate; see [`target_rank`](super::target_rank).
    pub fn rank(self) -> i32 {
        super::resolve::target_rank(self.kind)
    }
}

impl From<&SymbolInfo> for TargetWeight {
    fn from(info: &SymbolInfo) -> Self {
        TargetWeight::new(info.kind, info.definition)
    }
}

/// One syntactic occurrence of a symbol.
///
/// A record is stored once, in the store's arena, and shared by every
/// index that mentions its location. Later translation units amend it
/// through [`SymbolInfo::unite`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    pub definition: bool,
    /// Spelling used for name search.
    pub symbol_name: Option<SmolStr>,
    /// Cross-unit identifier of the entity this occurrence declares or uses.
    pub usr: Option<SmolStr>,
    pub type_name: Option<SmolStr>,
    /// Length of the occurrence in bytes.
    pub symbol_length: u32,
}

impl SymbolInfo {
    pub fn new(kind: SymbolKind) -> Self {
        Self {
            kind: kind.normalized(),
            definition: false,
            symbol_name: None,
            usr: None,
            type_name: None,
            symbol_length: 0,
        }
    }

    pub fn definition(mut self) -> Self {
        self.definition = true;
        self
    }

    pub fn with_name(mut self, name: impl Into<SmolStr>) -> Self {
        self.symbol_name = Some(name.into());
        self
    }

    pub fn with_usr(mut self, usr: impl Into<SmolStr>) -> Self {
        self.usr = Some(usr.into());
        self
    }

    pub fn with_type(mut self, type_name: impl Into<SmolStr>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_length(mut self, length: u32) -> Self {
        self.symbol_length = length;
        self
    }

    /// Merge what another unit learned about the same occurrence.
    ///
    /// A definition upgrades a declaration (its category and type win),
    /// missing metadata is filled in and the longer extent is kept.
    /// Returns whether anything changed.
    pub fn unite(&mut self, other: &SymbolInfo) -> bool {
        let before = self.clone();

        if other.definition && !self.definition {
            self.definition = true;
            self.kind = other.kind;
            if other.type_name.is_some() {
                self.type_name = other.type_name.clone();
            }
        }
        if self.symbol_name.is_none() {
            self.symbol_name = other.symbol_name.clone();
        }
        if self.usr.is_none() {
            self.usr = other.usr.clone();
        }
        if self.type_name.is_none() {
            self.type_name = other.type_name.clone();
        }
        self.symbol_length = self.symbol_length.max(other.symbol_length);

        *self != before
    }
}
