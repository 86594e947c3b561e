//! Recursive-descent docblock parser
//!
//! One [`DocParser`] holds the name-resolution setup (imports or fallback
//! namespaces, ignored names, target) and can parse any number of docblocks.
//! Each [`DocParser::parse`] call runs a private session over a fresh token
//! stream; the only state shared between calls is the metadata cache.

use super::constant::{type_exists, ConstantResolver};
use super::error::SyntaxError;
use crate::config::compile_time::syntax::{MAX_ANNOTATIONS_PER_DOCBLOCK, MAX_NESTING_DEPTH};
use crate::config::runtime::parser_preferences;
use crate::grammar::{Annotation, ArrayKey, ArrayValue, Target, Value, ValueMap};
use crate::imports::{IgnoreSet, ImportError, ImportResult, ImportTable};
use crate::lexical::{prepare_docblock, DocLexer};
use crate::metadata::MetadataCache;
use crate::pipeline::AnnotationError;
use crate::registry::TypeOracle;
use crate::semantic_analysis::{check_attributes, check_enums, instantiate, CheckContext, SemanticError};
use crate::tokens::token::NAME_SEGMENT_KINDS;
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::Span;
use std::sync::Arc;

type ParseResult<T> = Result<T, AnnotationError>;

pub struct DocParser {
    oracle: Arc<dyn TypeOracle>,
    cache: Arc<MetadataCache>,
    target: Target,
    imports: ImportTable,
    namespaces: Vec<String>,
    ignore: IgnoreSet,
    ignore_not_imported: bool,
}

impl DocParser {
    /// Parser with no imports, no ignored names and no target restriction
    pub fn new(oracle: Arc<dyn TypeOracle>, cache: Arc<MetadataCache>) -> Self {
        Self {
            oracle,
            cache,
            target: Target::NONE,
            imports: ImportTable::new(),
            namespaces: Vec::new(),
            ignore: IgnoreSet::new(),
            ignore_not_imported: false,
        }
    }

    /// A parser resolving names through `imports` from the start
    pub fn with_imports(
        oracle: Arc<dyn TypeOracle>,
        cache: Arc<MetadataCache>,
        imports: ImportTable,
    ) -> Self {
        Self {
            imports,
            ..Self::new(oracle, cache)
        }
    }

    /// Resolve names through an import table; excludes fallback namespaces
    pub fn set_imports(&mut self, imports: ImportTable) -> ImportResult<()> {
        if !self.namespaces.is_empty() {
            return Err(ImportError::ConflictingModes);
        }
        self.imports = imports;
        Ok(())
    }

    /// Add a fallback namespace probed for every short name; excludes imports
    pub fn add_namespace(&mut self, namespace: &str) -> ImportResult<()> {
        if !self.imports.is_empty() {
            return Err(ImportError::ConflictingModes);
        }
        self.namespaces
            .push(namespace.trim_matches('\\').to_string());
        Ok(())
    }

    pub fn set_ignored(&mut self, ignore: IgnoreSet) {
        self.ignore = ignore;
    }

    pub fn set_ignore_not_imported(&mut self, ignore_not_imported: bool) {
        self.ignore_not_imported = ignore_not_imported;
    }

    pub fn set_target(&mut self, target: Target) {
        self.target = target;
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn imports(&self) -> &ImportTable {
        &self.imports
    }

    /// Parse every annotation in `input`; `context` names the declaring
    /// element in error messages ("class Foo", "property Foo::$bar")
    pub fn parse(&self, input: &str, context: &str) -> Result<Vec<Annotation>, AnnotationError> {
        let Some(text) = prepare_docblock(input)? else {
            return Ok(Vec::new());
        };

        let mut session = Session {
            parser: self,
            stream: TokenStream::new(DocLexer::new(text)),
            context,
            nested: false,
            depth: 0,
        };

        match session.annotations() {
            Ok(annotations) => {
                crate::log_debug!("Docblock parsed",
                    "context" => context,
                    "annotations" => annotations.len()
                );
                Ok(annotations)
            }
            Err(error) => {
                crate::log_error!(error.error_code(), &error.to_string(), "context" => context);
                Err(error)
            }
        }
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore_not_imported || self.ignore.is_ignored(name)
    }

    fn exists(&self, name: &str) -> bool {
        type_exists(self.oracle.as_ref(), name)
    }

    /// Qualify a name as written after `@`
    ///
    /// `Err` carries the last name probed when nothing matched.
    fn qualify(&self, name: &str) -> Result<String, String> {
        if name.starts_with('\\') {
            return Ok(name.to_string());
        }

        let (alias, rest) = name.find('\\').map_or((name, ""), |pos| name.split_at(pos));

        if !self.namespaces.is_empty() {
            return self
                .namespaces
                .iter()
                .map(|namespace| format!("{}\\{}", namespace, name))
                .find(|candidate| self.exists(candidate))
                .ok_or_else(|| name.to_string());
        }

        if let Some(import) = self.imports.get(alias) {
            let spliced = format!("{}{}", import.trim_start_matches('\\'), rest);
            return if self.exists(&spliced) {
                Ok(spliced)
            } else {
                Err(spliced)
            };
        }

        if self.ignore.contains_name(name) {
            return Err(name.to_string());
        }

        if let Some(namespace) = self.imports.enclosing_namespace() {
            let candidate = format!("{}\\{}", namespace, name);
            if self.exists(&candidate) {
                return Ok(candidate);
            }
        }

        if self.exists(name) {
            Ok(name.to_string())
        } else {
            Err(name.to_string())
        }
    }

    fn constants(&self) -> ConstantResolver<'_> {
        ConstantResolver {
            oracle: self.oracle.as_ref(),
            imports: &self.imports,
            namespaces: &self.namespaces,
        }
    }
}

impl std::fmt::Debug for DocParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocParser")
            .field("target", &self.target)
            .field("imports", &self.imports)
            .field("namespaces", &self.namespaces)
            .field("ignore_not_imported", &self.ignore_not_imported)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// PARSE SESSION
// ============================================================================

enum Entry {
    Field(String, Value),
    Positional(Value),
}

struct Session<'p, 'a> {
    parser: &'p DocParser,
    stream: TokenStream<DocLexer<'a>>,
    context: &'p str,
    /// Set once the first annotation of a run is accepted; later ones are
    /// argument values and check against `Target::ANNOTATION`
    nested: bool,
    depth: usize,
}

impl Session<'_, '_> {
    fn syntax_error(&self, expected: &str) -> SyntaxError {
        match self.stream.lookahead() {
            Some(token) => SyntaxError::unexpected_token(
                expected,
                token.value.literal(),
                token.span,
                self.context,
            ),
            None => SyntaxError::unexpected_end_of_input(expected, self.context),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), SyntaxError> {
        if !self.stream.is_next(kind) {
            return Err(self.syntax_error(kind.describe()));
        }
        self.stream.move_next();
        Ok(())
    }

    fn expect_any(&mut self, kinds: &[TokenKind]) -> Result<TokenKind, SyntaxError> {
        let kind = self.stream.lookahead_kind();
        if !kinds.contains(&kind) {
            return Err(self.syntax_error(&TokenKind::describe_any(kinds)));
        }
        self.stream.move_next();
        Ok(kind)
    }

    fn current_literal(&self) -> &str {
        self.stream.token().map_or("", |token| token.value.literal())
    }

    fn lookahead_span(&self) -> Option<Span> {
        self.stream.lookahead().map(|token| token.span)
    }

    fn enter(&mut self) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            let span = self.lookahead_span().unwrap_or_default();
            return Err(SyntaxError::max_nesting_depth(MAX_NESTING_DEPTH, span, self.context));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // Annotations ::= { skip-to-next '@' ; Annotation }*
    fn annotations(&mut self) -> ParseResult<Vec<Annotation>> {
        let mut annotations = Vec::new();

        loop {
            let Some((kind, at_end)) = self
                .stream
                .lookahead()
                .map(|token| (token.value.kind(), token.span.end().offset))
            else {
                break;
            };

            if kind != TokenKind::At {
                self.stream.move_next();
                continue;
            }

            // `@` glued to preceding text, as in an e-mail address
            if self.stream.next_is_adjacent() {
                self.stream.move_next();
                continue;
            }

            let opens_name = self.stream.glimpse().is_some_and(|peek| {
                (peek.value.kind() == TokenKind::NamespaceSeparator || peek.value.is_name_segment())
                    && peek.span.start().offset == at_end
            });
            if !opens_name {
                self.stream.move_next();
                continue;
            }

            self.nested = false;
            if let Some(annotation) = self.annotation()? {
                if annotations.len() >= MAX_ANNOTATIONS_PER_DOCBLOCK {
                    return Err(SyntaxError::too_many_annotations(
                        MAX_ANNOTATIONS_PER_DOCBLOCK,
                        self.context,
                    )
                    .into());
                }
                annotations.push(annotation);
            }
        }

        Ok(annotations)
    }

    /// The lexer folds `-2` into a signed number, so a hyphen may hide in a literal
    fn next_is_hyphen(&self) -> bool {
        match self.stream.lookahead().map(|t| &t.value) {
            Some(Token::Minus) => true,
            Some(Token::Integer(literal) | Token::Float(literal)) => literal.starts_with('-'),
            _ => false,
        }
    }

    // Annotation ::= '@' Name [ '(' Values? ')' ]
    fn annotation(&mut self) -> ParseResult<Option<Annotation>> {
        self.expect(TokenKind::At)?;
        let original = self.identifier()?;

        // `@foo-bar` and `@foo-2` are prose, not annotations
        if self.stream.next_is_adjacent() && self.next_is_hyphen() {
            return Ok(None);
        }

        let parser = self.parser;
        let qualified = match parser.qualify(&original) {
            Ok(qualified) => qualified,
            Err(probed) if parser.is_ignored(&original) || parser.is_ignored(&probed) => {
                if parser_preferences().log_ignored_annotations {
                    crate::log_debug!("Ignoring annotation", "name" => original, "context" => self.context);
                }
                return Ok(None);
            }
            Err(probed) => return Err(SemanticError::never_imported(&probed, self.context).into()),
        };

        let name = qualified.trim_start_matches('\\');
        if !parser.exists(name) {
            return Err(SemanticError::type_not_loadable(name, self.context).into());
        }

        let descriptor = parser.cache.get_or_collect(name, &parser.oracle)?;

        if !descriptor.is_annotation {
            if parser.is_ignored(&original) || parser.is_ignored(name) {
                if parser_preferences().log_ignored_annotations {
                    crate::log_debug!("Ignoring non-annotation type", "name" => name, "context" => self.context);
                }
                return Ok(None);
            }
            return Err(SemanticError::not_an_annotation(name, &original, self.context).into());
        }

        let target = if self.nested {
            Target::ANNOTATION
        } else {
            parser.target
        };
        self.nested = true;

        if !target.is_empty() && !descriptor.targets.intersects(target) {
            return Err(SemanticError::target_not_allowed(
                &original,
                self.context,
                &descriptor.targets_literal,
            )
            .into());
        }

        self.enter()?;
        let mut values = self.method_call()?;
        self.leave();

        let check = CheckContext {
            name,
            original: &original,
            context: self.context,
            oracle: parser.oracle.as_ref(),
        };
        check_enums(&descriptor, &values, &check)?;
        check_attributes(&descriptor, &mut values, &check)?;
        Ok(Some(instantiate(&descriptor, values, &check)?))
    }

    fn method_call(&mut self) -> ParseResult<ValueMap> {
        if !self.stream.is_next(TokenKind::OpenParen) {
            return Ok(ValueMap::new());
        }
        self.expect(TokenKind::OpenParen)?;

        let values = if self.stream.is_next(TokenKind::CloseParen) {
            ValueMap::new()
        } else {
            self.values()?
        };

        self.expect(TokenKind::CloseParen)?;
        Ok(values)
    }

    // Values ::= Value { ',' Value }* [',']
    fn values(&mut self) -> ParseResult<ValueMap> {
        let mut entries = vec![self.value()?];
        while self.stream.is_next(TokenKind::Comma) {
            self.stream.move_next();
            if self.stream.is_next(TokenKind::CloseParen) {
                break;
            }
            entries.push(self.value()?);
        }

        let mut values = ValueMap::new();
        for entry in entries {
            match entry {
                Entry::Field(name, value) => {
                    values.insert(name, value);
                }
                Entry::Positional(value) => match values.get_mut("value") {
                    None => {
                        values.insert("value".to_string(), value);
                    }
                    Some(Value::Array(items)) => items.push(value),
                    Some(existing) => {
                        let first = std::mem::replace(existing, Value::Null);
                        *existing = Value::Array([first, value].into_iter().collect());
                    }
                },
            }
        }
        Ok(values)
    }

    // Value ::= FieldAssignment | PlainValue
    fn value(&mut self) -> ParseResult<Entry> {
        if self.stream.glimpse_kind() == TokenKind::Equals {
            self.expect(TokenKind::Identifier)?;
            let field = self.current_literal().to_string();
            self.expect(TokenKind::Equals)?;
            return Ok(Entry::Field(field, self.plain_value()?));
        }
        Ok(Entry::Positional(self.plain_value()?))
    }

    fn plain_value(&mut self) -> ParseResult<Value> {
        let kind = self.stream.lookahead_kind();
        match kind {
            TokenKind::OpenCurly => self.array(),
            TokenKind::At => Ok(self
                .annotation()?
                .map_or(Value::Null, |annotation| Value::Object(Box::new(annotation)))),
            TokenKind::Identifier | TokenKind::NamespaceSeparator => self.constant(),
            TokenKind::String
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => {
                self.stream.move_next();
                Ok(literal_value(kind, self.current_literal()))
            }
            _ => Err(self.syntax_error("PlainValue").into()),
        }
    }

    // Array ::= '{' [ ArrayEntry { ',' ArrayEntry }* [','] ] '}'
    fn array(&mut self) -> ParseResult<Value> {
        self.enter()?;
        self.expect(TokenKind::OpenCurly)?;

        let mut array = ArrayValue::new();
        if !self.stream.is_next(TokenKind::CloseCurly) {
            self.array_entry(&mut array)?;
            while self.stream.is_next(TokenKind::Comma) {
                self.stream.move_next();
                if self.stream.is_next(TokenKind::CloseCurly) {
                    break;
                }
                self.array_entry(&mut array)?;
            }
        }

        self.expect(TokenKind::CloseCurly)?;
        self.leave();
        Ok(Value::Array(array))
    }

    // ArrayEntry ::= ( Constant | INTEGER | STRING ) ( '=' | ':' ) PlainValue | Value
    fn array_entry(&mut self, array: &mut ArrayValue) -> ParseResult<()> {
        const SEPARATORS: &[TokenKind] = &[TokenKind::Equals, TokenKind::Colon];

        if self
            .stream
            .is_next_any(&[TokenKind::Identifier, TokenKind::NamespaceSeparator])
        {
            let span = self.lookahead_span().unwrap_or_default();
            let value = self.constant()?;
            if !self.stream.is_next_any(SEPARATORS) {
                array.push(value);
                return Ok(());
            }
            let key = ArrayKey::from_value(&value).ok_or_else(|| {
                SyntaxError::unexpected_token("scalar array key", value.type_name(), span, self.context)
            })?;
            self.stream.move_next();
            let value = self.plain_value()?;
            array.insert(key, value);
            return Ok(());
        }

        if self.stream.is_next_any(&[TokenKind::Integer, TokenKind::String])
            && SEPARATORS.contains(&self.stream.glimpse_kind())
        {
            self.stream.move_next();
            let key = ArrayKey::from_string(self.current_literal());
            self.expect_any(SEPARATORS)?;
            let value = self.plain_value()?;
            array.insert(key, value);
            return Ok(());
        }

        array.push(self.plain_value()?);
        Ok(())
    }

    fn constant(&mut self) -> ParseResult<Value> {
        let identifier = self.identifier()?;
        Ok(self.parser.constants().resolve(&identifier, self.context)?)
    }

    // Name ::= ['\'] Identifier { '\' Identifier }
    fn identifier(&mut self) -> Result<String, SyntaxError> {
        let mut name = String::new();
        if self.stream.is_next(TokenKind::NamespaceSeparator) {
            self.stream.move_next();
            name.push('\\');
        }

        if !self.stream.is_next_any(NAME_SEGMENT_KINDS) {
            return Err(self.syntax_error("namespace separator or identifier"));
        }
        self.stream.move_next();
        name.push_str(self.current_literal());

        while self.joins_next_segment() {
            self.stream.move_next();
            self.stream.move_next();
            name.push('\\');
            name.push_str(self.current_literal());
        }
        Ok(name)
    }

    /// A `\` touching both the current token and a following name segment
    fn joins_next_segment(&mut self) -> bool {
        if !self.stream.is_next(TokenKind::NamespaceSeparator) || !self.stream.next_is_adjacent() {
            return false;
        }
        let Some(separator_end) = self.stream.lookahead().map(|t| t.span.end().offset) else {
            return false;
        };
        self.stream
            .glimpse()
            .is_some_and(|t| t.value.is_name_segment() && t.span.start().offset == separator_end)
    }
}

fn literal_value(kind: TokenKind, literal: &str) -> Value {
    match kind {
        TokenKind::String => Value::from(literal),
        TokenKind::Integer => Value::Integer(literal.parse().unwrap_or(if literal.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        })),
        TokenKind::Float => Value::Float(literal.parse().unwrap_or_default()),
        TokenKind::True => Value::Bool(true),
        TokenKind::False => Value::Bool(false),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AnnotationRegistry, ClassDefinition, Constructor, PropertyDefinition};
    use assert_matches::assert_matches;

    fn registry() -> AnnotationRegistry {
        let registry = AnnotationRegistry::new();
        registry.register_class(
            ClassDefinition::new("Acme\\Foo")
                .with_doc("/** @Annotation */")
                .with_property(PropertyDefinition::new("value"))
                .with_property(PropertyDefinition::new("bar").with_doc("/** @var string */"))
                .with_property(PropertyDefinition::new("baz").with_doc("/** @var array<int> */")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Route")
                .with_doc("/** @Annotation @Target(\"METHOD\") */")
                .with_property(PropertyDefinition::new("path").with_doc("/** @var string @Required */"))
                .with_property(PropertyDefinition::new("name")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Column")
                .with_doc("/** @Annotation @Target({\"PROPERTY\", \"ANNOTATION\"}) */")
                .with_property(PropertyDefinition::new("type").with_doc("/** @Enum({\"a\", \"b\"}) */"))
                .with_property(PropertyDefinition::new("length").with_doc("/** @var int */")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Table")
                .with_doc("/** @Annotation */")
                .with_property(PropertyDefinition::new("columns").with_doc("/** @var array<Acme\\Column> */")),
        );
        registry.register_class(
            ClassDefinition::new("Acme\\Options")
                .with_doc("/** @Annotation */")
                .with_constructor(Constructor::ValueMap),
        );
        registry.register_class(ClassDefinition::new("Acme\\Service"));
        registry.register_class(
            ClassDefinition::new("Acme\\Status").with_constant("ACTIVE", Value::from("active")),
        );
        registry
    }

    fn parser() -> DocParser {
        let oracle: Arc<dyn TypeOracle> = Arc::new(registry());
        let mut parser = DocParser::new(oracle, Arc::new(MetadataCache::new()));
        parser
            .set_imports(
                ImportTable::new()
                    .with_namespace("Acme\\Blog")
                    .with_import("foo", "Acme\\Foo")
                    .with_import("route", "Acme\\Route")
                    .with_import("orm", "Acme")
                    .with_import("status", "Acme\\Status"),
            )
            .unwrap();
        parser.set_ignored(IgnoreSet::with_defaults());
        parser
    }

    fn parse(parser: &DocParser, input: &str) -> Result<Vec<Annotation>, AnnotationError> {
        parser.parse(input, "class Acme\\Post")
    }

    #[test]
    fn test_field_values_round_trip() {
        let annotations = parse(&parser(), r#"/** @Foo(bar="x", baz={1,2,3}) */"#).unwrap();
        assert_eq!(annotations.len(), 1);
        assert!(annotations[0].is("Acme\\Foo"));
        assert_eq!(annotations[0].get("bar"), Some(&Value::from("x")));
        assert_eq!(annotations[0].get("baz"), Some(&Value::from(vec![1i64, 2, 3])));
    }

    #[test]
    fn test_parse_is_idempotent_across_cache_states() {
        let parser = parser();
        let input = r#"/** @Foo("x") @ORM\Column(type="a") */"#;
        let first = parse(&parser, input).unwrap();
        let second = parse(&parser, input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_default_property_collapsing() {
        let parser = parser();
        let single = parse(&parser, r#"@Foo("x")"#).unwrap();
        assert_eq!(single[0].get("value"), Some(&Value::from("x")));

        let pair = parse(&parser, r#"@Foo("x", "y")"#).unwrap();
        assert_eq!(pair[0].get("value"), Some(&Value::from(vec!["x", "y"])));
    }

    #[test]
    fn test_default_ignored_names() {
        let parser = parser();
        for target in [Target::CLASS, Target::METHOD, Target::PROPERTY] {
            let mut parser = DocParser::new(parser.oracle.clone(), parser.cache.clone());
            parser.set_target(target);
            parser.set_ignored(IgnoreSet::with_defaults());
            let annotations = parser.parse("/** @param string $x */", "method Acme\\Post::edit()").unwrap();
            assert!(annotations.is_empty());
        }
    }

    #[test]
    fn test_target_rejection() {
        let mut parser = parser();
        parser.set_target(Target::PROPERTY);
        let error = parse(&parser, r#"@Route("/home")"#).unwrap_err();
        assert_matches!(error, AnnotationError::Semantic(SemanticError::TargetNotAllowed { .. }));
        assert_eq!(
            error.to_string(),
            "[Semantical Error] Annotation @Route is not allowed to be declared on class Acme\\Post. \
             You may only use this annotation on these code elements: METHOD."
        );

        parser.set_target(Target::METHOD);
        assert_eq!(parse(&parser, r#"@Route("/home")"#).unwrap().len(), 1);
    }

    #[test]
    fn test_enum_rejection() {
        let mut parser = parser();
        parser.set_target(Target::PROPERTY);
        let error = parse(&parser, r#"@ORM\Column(type="c")"#).unwrap_err();
        assert_matches!(error, AnnotationError::Semantic(SemanticError::InvalidEnumerator { .. }));
        assert!(error.to_string().contains("accepts only [a, b], but got c."));

        assert!(parse(&parser, r#"@ORM\Column(type="a")"#).is_ok());
    }

    #[test]
    fn test_hyphen_guard() {
        let parser = parser();
        assert!(parse(&parser, "/** see @foo-bar for details */").unwrap().is_empty());
        assert!(parse(&parser, "/** @unknown-thing */").unwrap().is_empty());
    }

    #[test]
    fn test_hyphen_guard_before_digits() {
        let parser = parser();
        assert!(parse(&parser, "/** see @unknown-2 for details */").unwrap().is_empty());
        assert!(parse(&parser, "/** @unknown-1.5 */").unwrap().is_empty());
        assert_matches!(
            parse(&parser, "/** @unknown -2 */"),
            Err(AnnotationError::Semantic(SemanticError::NeverImported { .. }))
        );
    }

    #[test]
    fn test_with_imports_excludes_namespaces() {
        let registry = registry();
        registry.register_class(ClassDefinition::new("Foo\\Bar").with_doc("/** @Annotation */"));
        let oracle: Arc<dyn TypeOracle> = Arc::new(registry);
        let mut parser = DocParser::with_imports(
            oracle,
            Arc::new(MetadataCache::new()),
            ImportTable::new().with_import("fb", "Foo\\Bar"),
        );

        let annotations = parser.parse("@FB", "").unwrap();
        assert!(annotations[0].is("Foo\\Bar"));
        assert_matches!(parser.add_namespace("Foo"), Err(ImportError::ConflictingModes));
    }

    #[test]
    fn test_fully_qualified_escape() {
        let registry = registry();
        registry.register_class(
            ClassDefinition::new("Foo\\Bar")
                .with_doc("/** @Annotation */")
                .with_property(PropertyDefinition::new("value")),
        );
        let oracle: Arc<dyn TypeOracle> = Arc::new(registry);
        let mut parser = DocParser::new(oracle, Arc::new(MetadataCache::new()));
        parser
            .set_imports(ImportTable::new().with_import("foo", "Acme\\Foo"))
            .unwrap();

        let annotations = parser.parse(r#"@\Foo\Bar("x")"#, "").unwrap();
        assert!(annotations[0].is("Foo\\Bar"));
    }

    #[test]
    fn test_never_imported() {
        let error = parse(&parser(), "@Unknown").unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Semantical Error] The annotation \"@Unknown\" in class Acme\\Post was never imported. \
             Did you maybe forget to add a \"use\" statement for this annotation?"
        );

        let mut lenient = parser();
        lenient.set_ignore_not_imported(true);
        assert!(parse(&lenient, "@Unknown").unwrap().is_empty());
    }

    #[test]
    fn test_not_an_annotation() {
        let mut parser = parser();
        parser.set_imports(ImportTable::new().with_import("service", "Acme\\Service")).unwrap();
        let error = parse(&parser, "@Service").unwrap_err();
        assert_matches!(error, AnnotationError::Semantic(SemanticError::NotAnAnnotation { .. }));

        parser.set_ignored(IgnoreSet::new().with_name("Service"));
        assert!(parse(&parser, "@Service").unwrap().is_empty());
    }

    #[test]
    fn test_nested_annotations_use_annotation_target() {
        let mut parser = parser();
        parser.set_target(Target::CLASS);
        let annotations = parse(
            &parser,
            r#"@ORM\Table(columns={@ORM\Column(type="a", length=10), @ORM\Column(type="b")})"#,
        )
        .unwrap();

        let columns = annotations[0].get("columns").and_then(Value::as_array).unwrap();
        assert_eq!(columns.len(), 2);
        let first = columns.values().next().and_then(Value::as_object).unwrap();
        assert_eq!(first.get("length"), Some(&Value::Integer(10)));
    }

    #[test]
    fn test_array_keys_and_constants() {
        let annotations = parse(
            &parser(),
            r#"@ORM\Options({"a"=1, 2: "two", Status::ACTIVE = true, "x"}, kind=Status::class)"#,
        )
        .unwrap();
        let options = &annotations[0];
        assert!(options.is("Acme\\Options"));
        assert_eq!(options.get("kind"), Some(&Value::from("Acme\\Status")));

        let array = options.get("value").and_then(Value::as_array).unwrap();
        assert_eq!(array.get(&ArrayKey::Str("a".into())), Some(&Value::Integer(1)));
        assert_eq!(array.get(&ArrayKey::Int(2)), Some(&Value::from("two")));
        assert_eq!(array.get(&ArrayKey::Str("active".into())), Some(&Value::Bool(true)));
        assert_eq!(array.get(&ArrayKey::Int(3)), Some(&Value::from("x")));
    }

    #[test]
    fn test_literals() {
        let annotations = parse(
            &parser(),
            r#"@ORM\Options(i=-42, f=1.5e3, t=TRUE, n=null, s="say ""hi""", e={})"#,
        )
        .unwrap();
        let options = &annotations[0];
        assert_eq!(options.get("i"), Some(&Value::Integer(-42)));
        assert_eq!(options.get("f"), Some(&Value::Float(1500.0)));
        assert_eq!(options.get("t"), Some(&Value::Bool(true)));
        assert_eq!(options.get("n"), Some(&Value::Null));
        assert_eq!(options.get("s"), Some(&Value::from("say \"hi\"")));
        assert_eq!(options.get("e"), Some(&Value::Array(ArrayValue::new())));
    }

    #[test]
    fn test_syntax_errors() {
        let parser = parser();
        let error = parse(&parser, r#"@Foo("x""#).unwrap_err();
        assert_eq!(
            error.to_string(),
            "[Syntax Error] Expected ')', got end of string in class Acme\\Post."
        );

        let error = parse(&parser, "@Foo(bar=)").unwrap_err();
        assert_matches!(error, AnnotationError::Syntax(SyntaxError::UnexpectedToken { ref found, .. }) if found == ")");
        assert!(error.to_string().contains("Expected PlainValue, got ')' at position 9"));
    }

    #[test]
    fn test_email_addresses_and_prose_are_skipped() {
        let parser = parser();
        let annotations = parse(&parser, "/** Contact @Foo or me@example.com, not @ Foo */").unwrap();
        assert_eq!(annotations.len(), 1);
    }

    #[test]
    fn test_required_attribute() {
        let mut parser = parser();
        parser.set_target(Target::METHOD);
        let error = parse(&parser, "@Route(name=\"home\")").unwrap_err();
        assert_matches!(error, AnnotationError::Semantic(SemanticError::RequiredAttributeMissing { .. }));
    }

    #[test]
    fn test_import_modes_are_exclusive() {
        let mut parser = parser();
        assert_eq!(parser.add_namespace("Acme"), Err(ImportError::ConflictingModes));

        let oracle: Arc<dyn TypeOracle> = Arc::new(registry());
        let mut simple = DocParser::new(oracle, Arc::new(MetadataCache::new()));
        simple.add_namespace("Acme").unwrap();
        assert_eq!(
            simple.set_imports(ImportTable::new().with_import("a", "B")),
            Err(ImportError::ConflictingModes)
        );
        assert!(simple.parse("@Foo(\"x\")", "").unwrap()[0].is("Acme\\Foo"));
    }

    #[test]
    fn test_nesting_limit() {
        let depth = MAX_NESTING_DEPTH + 1;
        let input = format!("@ORM\\Options({}{})", "{".repeat(depth), "}".repeat(depth));
        let error = parse(&parser(), &input).unwrap_err();
        assert_matches!(error, AnnotationError::Syntax(SyntaxError::MaxNestingDepth { .. }));
    }
}
