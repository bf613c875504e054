use crate::error::SyntaxError;
use crate::tpl::ast::{AstNode, Delimiter, FragmentList};
use crate::tpl::scanner::Scanner;
use crate::tpl::token::{Token, TokenKind};

/// Doubled control characters and what they stand for in literal SQL.
const ESCAPES: [(&str, &str); 6] = [
    (";;", ";"),
    ("@@", "@"),
    ("{{", "{"),
    ("[[", "["),
    ("]]", "]"),
    ("}}", "}"),
];

/// Deepest allowed nesting of conditionals and delimited lists.
pub(crate) const MAX_DEPTH: usize = 256;

/// A recursive-descent parser for the template grammar:
///
/// ```text
/// Template      := FragmentList EOF
/// FragmentList  := Fragment*            (stops at EOF, ';', '}' or ']')
/// Fragment      := RawSQL
///                | @name
///                | @name??literal
///                | @name?{ FragmentList } [ :{ FragmentList } ]
///                | (&)[ List ] | (|)[ List ] | (,)[ List ]
/// List          := ...@name
///                | ';'* ( FragmentList ';'* )*
/// ```
///
/// Tokens are pulled from the scanner on demand; any unexpected token aborts
/// the parse. Nesting is capped at [`MAX_DEPTH`] so that condensing and
/// rendering never recurse deeper than that.
struct Parser<'a> {
    scanner: Scanner<'a>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(template: &'a str) -> Self {
        Self {
            scanner: Scanner::new(template),
            depth: 0,
        }
    }

    fn peek(&self) -> TokenKind {
        self.scanner.peek().kind
    }

    fn unexpected(&self, expected: Option<TokenKind>) -> SyntaxError {
        SyntaxError {
            found: self.peek(),
            expected,
            offset: self.scanner.offset(),
        }
    }

    /// Steps into a conditional or list opened by the next token.
    fn enter(&mut self) -> Result<(), SyntaxError> {
        if self.depth == MAX_DEPTH {
            return Err(self.unexpected(None));
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Consumes the next token, which must be of kind `kind`.
    fn eat(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        if self.peek() != kind {
            return Err(self.unexpected(Some(kind)));
        }
        Ok(self.scanner.advance())
    }

    /// Consumes a token expected to carry text (`Key`, `Fallback`, `RawSql`).
    fn eat_text(&mut self, kind: TokenKind) -> Result<String, SyntaxError> {
        Ok(self.eat(kind)?.text.unwrap_or_default())
    }

    fn parse(mut self) -> Result<FragmentList, SyntaxError> {
        let list = self.parse_fragment_list()?;
        if !self.scanner.at_end() {
            return Err(self.unexpected(Some(TokenKind::Eof)));
        }
        Ok(list)
    }

    fn parse_fragment_list(&mut self) -> Result<FragmentList, SyntaxError> {
        match self.peek() {
            TokenKind::Eof
            | TokenKind::Separator
            | TokenKind::BlockClose
            | TokenKind::ListClose
            | TokenKind::Key
            | TokenKind::AndListOpen
            | TokenKind::OrListOpen
            | TokenKind::CommaListOpen
            | TokenKind::RawSql => {}
            TokenKind::Fallback
            | TokenKind::ConditionalOpen
            | TokenKind::ElseOpen
            | TokenKind::Spread => return Err(self.unexpected(None)),
        }

        let mut children = Vec::new();
        while !matches!(
            self.peek(),
            TokenKind::Eof | TokenKind::ListClose | TokenKind::Separator | TokenKind::BlockClose
        ) {
            children.push(self.parse_fragment()?);
        }
        Ok(FragmentList::new(children))
    }

    fn parse_fragment(&mut self) -> Result<AstNode, SyntaxError> {
        let delimiter = match self.peek() {
            TokenKind::Key => return self.parse_insertion(),
            TokenKind::RawSql => {
                let text = self.eat_text(TokenKind::RawSql)?;
                return Ok(AstNode::RawSql(unescape(&text)));
            }
            TokenKind::AndListOpen => Delimiter::And,
            TokenKind::OrListOpen => Delimiter::Or,
            TokenKind::CommaListOpen => Delimiter::Comma,
            _ => return Err(self.unexpected(None)),
        };

        self.enter()?;
        self.scanner.advance();
        let node = self.parse_delimited_list(delimiter)?;
        self.eat(TokenKind::ListClose)?;
        self.leave();
        Ok(node)
    }

    fn parse_insertion(&mut self) -> Result<AstNode, SyntaxError> {
        let name = self.eat_text(TokenKind::Key)?;

        match self.peek() {
            TokenKind::ConditionalOpen => self.parse_conditional(name),
            TokenKind::Fallback => {
                let fallback = self.eat_text(TokenKind::Fallback)?;
                Ok(AstNode::Fallback { name, fallback })
            }
            _ => Ok(AstNode::Variable(name)),
        }
    }

    fn parse_conditional(&mut self, name: String) -> Result<AstNode, SyntaxError> {
        self.enter()?;
        self.eat(TokenKind::ConditionalOpen)?;
        let success = self.parse_fragment_list()?;
        self.eat(TokenKind::BlockClose)?;

        let failure = if self.peek() == TokenKind::ElseOpen {
            self.scanner.advance();
            let failure = self.parse_fragment_list()?;
            self.eat(TokenKind::BlockClose)?;
            Some(failure)
        } else {
            None
        };
        self.leave();

        Ok(AstNode::Conditional {
            name,
            success,
            failure,
        })
    }

    fn parse_delimited_list(&mut self, delimiter: Delimiter) -> Result<AstNode, SyntaxError> {
        if self.peek() == TokenKind::Spread {
            self.scanner.advance();
            let name = self.eat_text(TokenKind::Key)?;
            return Ok(AstNode::Spread { name, delimiter });
        }

        let mut items = Vec::new();
        self.skip_separators();
        while !matches!(
            self.peek(),
            TokenKind::Eof | TokenKind::ListClose | TokenKind::BlockClose
        ) {
            items.push(self.parse_fragment_list()?);
            self.skip_separators();
        }
        Ok(AstNode::DelimitedList { delimiter, items })
    }

    fn skip_separators(&mut self) {
        while self.peek() == TokenKind::Separator {
            self.scanner.advance();
        }
    }
}

/// Collapses each doubled control character in literal SQL to a single one.
fn unescape(text: &str) -> String {
    let mut out = text.to_string();
    for (escaped, plain) in ESCAPES {
        if out.contains(escaped) {
            out = out.replace(escaped, plain);
        }
    }
    out
}

/// Parses a template into its (uncondensed) syntax tree.
pub fn parse_template(template: &str) -> Result<FragmentList, SyntaxError> {
    Parser::new(template).parse()
}
