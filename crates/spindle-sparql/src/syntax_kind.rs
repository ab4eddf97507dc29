//! Token kinds of the SPARQL 1.1 grammar.
//!
//! Declaration order matters to the grammar only through logos' longest-match rule:
//! `a` is a case-sensitive keyword of its own and every other keyword is
//! case-insensitive. Trivia kinds never reach the parser.

use std::fmt;

use logos::Logos;
use spindle_core::Lookahead;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[logos(subpattern pn_chars_base = r"[A-Za-z\x{C0}-\x{D6}\x{D8}-\x{F6}\x{F8}-\x{2FF}\x{370}-\x{37D}\x{37F}-\x{1FFF}\x{200C}-\x{200D}\x{2070}-\x{218F}\x{2C00}-\x{2FEF}\x{3001}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFFD}\x{10000}-\x{EFFFF}]")]
#[logos(subpattern pn_chars_u = r"((?&pn_chars_base)|_)")]
#[logos(subpattern pn_chars = r"((?&pn_chars_u)|-|[0-9]|\x{B7}|[\x{300}-\x{36F}]|[\x{203F}-\x{2040}])")]
#[logos(subpattern plx = r"(%[0-9A-Fa-f][0-9A-Fa-f]|\\[_~.\-!$&'()*+,;=/?#@%])")]
#[logos(subpattern pn_prefix = r"(?&pn_chars_base)((?&pn_chars)|\.)*")]
#[logos(subpattern pn_local = r"((?&pn_chars_u)|:|[0-9]|(?&plx))((?&pn_chars)|\.|:|(?&plx))*")]
#[logos(subpattern varname = r"((?&pn_chars_u)|[0-9])((?&pn_chars_u)|[0-9]|\x{B7}|[\x{300}-\x{36F}]|[\x{203F}-\x{2040}])*")]
#[logos(subpattern exponent = r"[eE][+-]?[0-9]+")]
#[logos(subpattern echar = r#"\\([tbnrf\\"']|u[0-9A-Fa-f]{4}|U[0-9A-Fa-f]{8})"#)]
pub enum SyntaxKind {
    #[regex(r#"<[^<>"{}|^`\\\x00-\x20]*>"#)]
    IriRef = 0,

    #[regex(r"(?&pn_prefix)?:")]
    PnameNs,

    /// May swallow trailing dots; the lexer splits them off.
    #[regex(r"(?&pn_prefix)?:(?&pn_local)")]
    PnameLn,

    /// May swallow trailing dots; the lexer splits them off.
    #[regex(r"_:((?&pn_chars_u)|[0-9])((?&pn_chars)|\.)*")]
    BlankNodeLabel,

    #[regex(r"\?(?&varname)")]
    Var1,

    #[regex(r"\$(?&varname)")]
    Var2,

    #[regex(r"@[a-zA-Z]+(-[a-zA-Z0-9]+)*")]
    LangTag,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]*\.[0-9]+")]
    Decimal,

    #[regex(r"[0-9]+\.[0-9]*(?&exponent)|\.[0-9]+(?&exponent)|[0-9]+(?&exponent)")]
    Double,

    #[regex(r"\+[0-9]+")]
    IntegerPositive,

    #[regex(r"\+[0-9]*\.[0-9]+")]
    DecimalPositive,

    #[regex(r"\+([0-9]+\.[0-9]*(?&exponent)|\.[0-9]+(?&exponent)|[0-9]+(?&exponent))")]
    DoublePositive,

    #[regex(r"-[0-9]+")]
    IntegerNegative,

    #[regex(r"-[0-9]*\.[0-9]+")]
    DecimalNegative,

    #[regex(r"-([0-9]+\.[0-9]*(?&exponent)|\.[0-9]+(?&exponent)|[0-9]+(?&exponent))")]
    DoubleNegative,

    #[regex(r#"'([^'\\\n\r]|(?&echar))*'"#)]
    StringLiteral1,

    #[regex(r#""([^"\\\n\r]|(?&echar))*""#)]
    StringLiteral2,

    #[regex(r#"'''(('|'')?([^'\\]|(?&echar)))*'''"#)]
    StringLiteralLong1,

    #[regex(r#""""(("|"")?([^"\\]|(?&echar)))*""""#)]
    StringLiteralLong2,

    /// `()`, whitespace allowed inside.
    #[regex(r"\([ \t\r\n]*\)")]
    Nil,

    /// `[]`, whitespace allowed inside.
    #[regex(r"\[[ \t\r\n]*\]")]
    Anon,

    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("|")]
    Pipe,

    #[token("||")]
    PipePipe,

    #[token("&&")]
    AmpAmp,

    #[token("/")]
    Slash,

    #[token("^")]
    Caret,

    #[token("^^")]
    CaretCaret,

    #[token("?")]
    Question,

    #[token("*")]
    Star,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("!")]
    Bang,

    #[token("!=")]
    BangEq,

    #[token("=")]
    Eq,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    /// `rdf:type` shorthand. Case-sensitive, unlike every other keyword.
    #[token("a")]
    KwA,

    #[token("base", ignore(case))]
    KwBase,

    #[token("prefix", ignore(case))]
    KwPrefix,

    #[token("select", ignore(case))]
    KwSelect,

    #[token("construct", ignore(case))]
    KwConstruct,

    #[token("describe", ignore(case))]
    KwDescribe,

    #[token("ask", ignore(case))]
    KwAsk,

    #[token("distinct", ignore(case))]
    KwDistinct,

    #[token("reduced", ignore(case))]
    KwReduced,

    #[token("as", ignore(case))]
    KwAs,

    #[token("from", ignore(case))]
    KwFrom,

    #[token("named", ignore(case))]
    KwNamed,

    #[token("where", ignore(case))]
    KwWhere,

    #[token("group", ignore(case))]
    KwGroup,

    #[token("by", ignore(case))]
    KwBy,

    #[token("having", ignore(case))]
    KwHaving,

    #[token("order", ignore(case))]
    KwOrder,

    #[token("asc", ignore(case))]
    KwAsc,

    #[token("desc", ignore(case))]
    KwDesc,

    #[token("limit", ignore(case))]
    KwLimit,

    #[token("offset", ignore(case))]
    KwOffset,

    #[token("values", ignore(case))]
    KwValues,

    #[token("undef", ignore(case))]
    KwUndef,

    #[token("optional", ignore(case))]
    KwOptional,

    #[token("union", ignore(case))]
    KwUnion,

    #[token("minus", ignore(case))]
    KwMinus,

    #[token("graph", ignore(case))]
    KwGraph,

    #[token("service", ignore(case))]
    KwService,

    #[token("silent", ignore(case))]
    KwSilent,

    #[token("filter", ignore(case))]
    KwFilter,

    #[token("bind", ignore(case))]
    KwBind,

    #[token("load", ignore(case))]
    KwLoad,

    #[token("into", ignore(case))]
    KwInto,

    #[token("clear", ignore(case))]
    KwClear,

    #[token("drop", ignore(case))]
    KwDrop,

    #[token("create", ignore(case))]
    KwCreate,

    #[token("add", ignore(case))]
    KwAdd,

    #[token("move", ignore(case))]
    KwMove,

    #[token("copy", ignore(case))]
    KwCopy,

    #[token("to", ignore(case))]
    KwTo,

    #[token("insert", ignore(case))]
    KwInsert,

    #[token("delete", ignore(case))]
    KwDelete,

    #[token("data", ignore(case))]
    KwData,

    #[token("with", ignore(case))]
    KwWith,

    #[token("using", ignore(case))]
    KwUsing,

    #[token("default", ignore(case))]
    KwDefault,

    #[token("all", ignore(case))]
    KwAll,

    #[token("true", ignore(case))]
    KwTrue,

    #[token("false", ignore(case))]
    KwFalse,

    #[token("not", ignore(case))]
    KwNot,

    #[token("in", ignore(case))]
    KwIn,

    #[token("exists", ignore(case))]
    KwExists,

    #[token("str", ignore(case))]
    KwStr,

    #[token("lang", ignore(case))]
    KwLang,

    #[token("langmatches", ignore(case))]
    KwLangMatches,

    #[token("datatype", ignore(case))]
    KwDatatype,

    #[token("bound", ignore(case))]
    KwBound,

    #[token("iri", ignore(case))]
    KwIri,

    #[token("uri", ignore(case))]
    KwUri,

    #[token("bnode", ignore(case))]
    KwBnode,

    #[token("rand", ignore(case))]
    KwRand,

    #[token("abs", ignore(case))]
    KwAbs,

    #[token("ceil", ignore(case))]
    KwCeil,

    #[token("floor", ignore(case))]
    KwFloor,

    #[token("round", ignore(case))]
    KwRound,

    #[token("concat", ignore(case))]
    KwConcat,

    #[token("strlen", ignore(case))]
    KwStrLen,

    #[token("ucase", ignore(case))]
    KwUcase,

    #[token("lcase", ignore(case))]
    KwLcase,

    #[token("encode_for_uri", ignore(case))]
    KwEncodeForUri,

    #[token("contains", ignore(case))]
    KwContains,

    #[token("strstarts", ignore(case))]
    KwStrStarts,

    #[token("strends", ignore(case))]
    KwStrEnds,

    #[token("strbefore", ignore(case))]
    KwStrBefore,

    #[token("strafter", ignore(case))]
    KwStrAfter,

    #[token("year", ignore(case))]
    KwYear,

    #[token("month", ignore(case))]
    KwMonth,

    #[token("day", ignore(case))]
    KwDay,

    #[token("hours", ignore(case))]
    KwHours,

    #[token("minutes", ignore(case))]
    KwMinutes,

    #[token("seconds", ignore(case))]
    KwSeconds,

    #[token("timezone", ignore(case))]
    KwTimezone,

    #[token("tz", ignore(case))]
    KwTz,

    #[token("now", ignore(case))]
    KwNow,

    #[token("uuid", ignore(case))]
    KwUuid,

    #[token("struuid", ignore(case))]
    KwStrUuid,

    #[token("md5", ignore(case))]
    KwMd5,

    #[token("sha1", ignore(case))]
    KwSha1,

    #[token("sha256", ignore(case))]
    KwSha256,

    #[token("sha384", ignore(case))]
    KwSha384,

    #[token("sha512", ignore(case))]
    KwSha512,

    #[token("coalesce", ignore(case))]
    KwCoalesce,

    #[token("if", ignore(case))]
    KwIf,

    #[token("strlang", ignore(case))]
    KwStrLang,

    #[token("strdt", ignore(case))]
    KwStrDt,

    #[token("sameterm", ignore(case))]
    KwSameTerm,

    #[token("isiri", ignore(case))]
    KwIsIri,

    #[token("isuri", ignore(case))]
    KwIsUri,

    #[token("isblank", ignore(case))]
    KwIsBlank,

    #[token("isliteral", ignore(case))]
    KwIsLiteral,

    #[token("isnumeric", ignore(case))]
    KwIsNumeric,

    #[token("regex", ignore(case))]
    KwRegex,

    #[token("substr", ignore(case))]
    KwSubstr,

    #[token("replace", ignore(case))]
    KwReplace,

    #[token("count", ignore(case))]
    KwCount,

    #[token("sum", ignore(case))]
    KwSum,

    #[token("min", ignore(case))]
    KwMin,

    #[token("max", ignore(case))]
    KwMax,

    #[token("avg", ignore(case))]
    KwAvg,

    #[token("sample", ignore(case))]
    KwSample,

    #[token("group_concat", ignore(case))]
    KwGroupConcat,

    #[token("separator", ignore(case))]
    KwSeparator,

    /// Extension built-in, only reachable from the `adjust` dialect.
    #[token("adjust", ignore(case))]
    KwAdjust,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    #[regex(r"#[^\n]*", allow_greedy = true)]
    Comment,

    /// Coalesced unrecognized characters
    Garbage,

    /// Synthetic end-of-input marker, never produced by the lexer.
    Eof,
}

use SyntaxKind::*;

impl SyntaxKind {
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Comment)
    }

    pub fn is_keyword(self) -> bool {
        (KwA as u16..=KwAdjust as u16).contains(&(self as u16))
    }

    /// Every kind a grammar rule may mention.
    pub fn vocabulary() -> spindle_core::TokenSet {
        let mut set = spindle_core::TokenSet::EMPTY;
        for raw in IriRef as u16..Whitespace as u16 {
            set.insert_raw(raw);
        }
        set
    }

    fn describe(self) -> &'static str {
        match self {
            IriRef => "IRI",
            PnameNs => "prefix",
            PnameLn => "prefixed name",
            BlankNodeLabel => "blank node label",
            Var1 | Var2 => "variable",
            LangTag => "language tag",
            Integer | IntegerPositive | IntegerNegative => "integer",
            Decimal | DecimalPositive | DecimalNegative => "decimal",
            Double | DoublePositive | DoubleNegative => "double",
            StringLiteral1 | StringLiteral2 | StringLiteralLong1 | StringLiteralLong2 => "string",
            Nil => "`()`",
            Anon => "`[]`",
            BraceOpen => "`{`",
            BraceClose => "`}`",
            ParenOpen => "`(`",
            ParenClose => "`)`",
            BracketOpen => "`[`",
            BracketClose => "`]`",
            Semicolon => "`;`",
            Comma => "`,`",
            Dot => "`.`",
            Pipe => "`|`",
            PipePipe => "`||`",
            AmpAmp => "`&&`",
            Slash => "`/`",
            Caret => "`^`",
            CaretCaret => "`^^`",
            Question => "`?`",
            Star => "`*`",
            Plus => "`+`",
            Minus => "`-`",
            Bang => "`!`",
            BangEq => "`!=`",
            Eq => "`=`",
            Lt => "`<`",
            Gt => "`>`",
            LtEq => "`<=`",
            GtEq => "`>=`",
            KwA => "`a`",
            KwBase => "`BASE`",
            KwPrefix => "`PREFIX`",
            KwSelect => "`SELECT`",
            KwConstruct => "`CONSTRUCT`",
            KwDescribe => "`DESCRIBE`",
            KwAsk => "`ASK`",
            KwDistinct => "`DISTINCT`",
            KwReduced => "`REDUCED`",
            KwAs => "`AS`",
            KwFrom => "`FROM`",
            KwNamed => "`NAMED`",
            KwWhere => "`WHERE`",
            KwGroup => "`GROUP`",
            KwBy => "`BY`",
            KwHaving => "`HAVING`",
            KwOrder => "`ORDER`",
            KwAsc => "`ASC`",
            KwDesc => "`DESC`",
            KwLimit => "`LIMIT`",
            KwOffset => "`OFFSET`",
            KwValues => "`VALUES`",
            KwUndef => "`UNDEF`",
            KwOptional => "`OPTIONAL`",
            KwUnion => "`UNION`",
            KwMinus => "`MINUS`",
            KwGraph => "`GRAPH`",
            KwService => "`SERVICE`",
            KwSilent => "`SILENT`",
            KwFilter => "`FILTER`",
            KwBind => "`BIND`",
            KwLoad => "`LOAD`",
            KwInto => "`INTO`",
            KwClear => "`CLEAR`",
            KwDrop => "`DROP`",
            KwCreate => "`CREATE`",
            KwAdd => "`ADD`",
            KwMove => "`MOVE`",
            KwCopy => "`COPY`",
            KwTo => "`TO`",
            KwInsert => "`INSERT`",
            KwDelete => "`DELETE`",
            KwData => "`DATA`",
            KwWith => "`WITH`",
            KwUsing => "`USING`",
            KwDefault => "`DEFAULT`",
            KwAll => "`ALL`",
            KwTrue => "`true`",
            KwFalse => "`false`",
            KwNot => "`NOT`",
            KwIn => "`IN`",
            KwExists => "`EXISTS`",
            KwStr => "`STR`",
            KwLang => "`LANG`",
            KwLangMatches => "`LANGMATCHES`",
            KwDatatype => "`DATATYPE`",
            KwBound => "`BOUND`",
            KwIri => "`IRI`",
            KwUri => "`URI`",
            KwBnode => "`BNODE`",
            KwRand => "`RAND`",
            KwAbs => "`ABS`",
            KwCeil => "`CEIL`",
            KwFloor => "`FLOOR`",
            KwRound => "`ROUND`",
            KwConcat => "`CONCAT`",
            KwStrLen => "`STRLEN`",
            KwUcase => "`UCASE`",
            KwLcase => "`LCASE`",
            KwEncodeForUri => "`ENCODE_FOR_URI`",
            KwContains => "`CONTAINS`",
            KwStrStarts => "`STRSTARTS`",
            KwStrEnds => "`STRENDS`",
            KwStrBefore => "`STRBEFORE`",
            KwStrAfter => "`STRAFTER`",
            KwYear => "`YEAR`",
            KwMonth => "`MONTH`",
            KwDay => "`DAY`",
            KwHours => "`HOURS`",
            KwMinutes => "`MINUTES`",
            KwSeconds => "`SECONDS`",
            KwTimezone => "`TIMEZONE`",
            KwTz => "`TZ`",
            KwNow => "`NOW`",
            KwUuid => "`UUID`",
            KwStrUuid => "`STRUUID`",
            KwMd5 => "`MD5`",
            KwSha1 => "`SHA1`",
            KwSha256 => "`SHA256`",
            KwSha384 => "`SHA384`",
            KwSha512 => "`SHA512`",
            KwCoalesce => "`COALESCE`",
            KwIf => "`IF`",
            KwStrLang => "`STRLANG`",
            KwStrDt => "`STRDT`",
            KwSameTerm => "`sameTerm`",
            KwIsIri => "`isIRI`",
            KwIsUri => "`isURI`",
            KwIsBlank => "`isBLANK`",
            KwIsLiteral => "`isLITERAL`",
            KwIsNumeric => "`isNUMERIC`",
            KwRegex => "`REGEX`",
            KwSubstr => "`SUBSTR`",
            KwReplace => "`REPLACE`",
            KwCount => "`COUNT`",
            KwSum => "`SUM`",
            KwMin => "`MIN`",
            KwMax => "`MAX`",
            KwAvg => "`AVG`",
            KwSample => "`SAMPLE`",
            KwGroupConcat => "`GROUP_CONCAT`",
            KwSeparator => "`SEPARATOR`",
            KwAdjust => "`ADJUST`",
            Whitespace => "whitespace",
            Comment => "comment",
            Garbage => "garbage",
            Eof => "end of input",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

impl From<SyntaxKind> for Lookahead<SyntaxKind> {
    fn from(kind: SyntaxKind) -> Self {
        Lookahead::Token(kind)
    }
}
