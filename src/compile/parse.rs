//! Expression parser.
//!
//! Utilizes a Lexer to receive instances of Token and Region, which it uses
//! to construct an Expression tree. Operators bind in the usual order, from
//! loosest to tightest: `|`, `&&` and `||`, comparisons, `+` and `-`,
//! `*` and `/`, and finally `!`.
pub mod tree;

use crate::{
    compile::{
        lex::{token::Token, LexResult, Lexer},
        parse::tree::{
            Arguments, Base, Binary, Call, Expression, Identifier, Key, Literal, Not, Variable,
        },
        Operator,
    },
    log::{error_eof, Error, UNEXPECTED_EOF, UNEXPECTED_TOKEN},
    region::Region,
};
use serde_json::{Number, Value};

pub struct Parser<'source> {
    /// Lexer used to pull from source as tokens instead of raw text.
    lexer: Lexer<'source>,
    /// Store peeked tokens.
    ///
    /// Double option is used to remember when the next token is None.
    buffer: Option<Option<(Token, Region)>>,
}

impl<'source> Parser<'source> {
    /// Create a new Parser from the given string.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            lexer: Lexer::new(source),
            buffer: None,
        }
    }

    /// Parse the entire source as one Expression.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is not a valid expression, or if any
    /// tokens remain after the expression.
    pub fn parse(mut self) -> Result<Expression, Error> {
        let expression = self.parse_expression()?;

        match self.next()? {
            None => Ok(expression),
            Some((_, region)) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help("expected end of expression, is an operator missing?")),
        }
    }

    /// Parse an expression.
    ///
    /// An expression may contain one or more calls, separated by a pipe,
    /// which are used to modify the value.
    fn parse_expression(&mut self) -> Result<Expression, Error> {
        // name | prepend 1: "hello, " | append "!" | upper
        let mut expression = self.parse_logical()?;

        while self.next_is(Token::Pipe)? {
            self.next_must(Token::Pipe)?;
            let name = self.parse_ident()?;
            let arguments = self.parse_args()?;

            let end_as = match &arguments {
                Some(arguments) => arguments.region,
                None => name.region,
            };
            let region = expression.get_region().combine(end_as);

            expression = Expression::Call(Call {
                name,
                arguments,
                receiver: Box::new(expression),
                region,
            })
        }

        Ok(expression)
    }

    /// Parse a chain of comparisons joined by `&&` or `||`.
    fn parse_logical(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_comparison()?;

        while let Some(operator) = self.next_operator(&[Operator::And, Operator::Or])? {
            let right = self.parse_comparison()?;
            left = binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse a single optional comparison.
    ///
    /// Comparisons do not chain, `a < b < c` is an error.
    fn parse_comparison(&mut self) -> Result<Expression, Error> {
        let left = self.parse_additive()?;

        let operator = match self.peek()? {
            Some((Token::Operator(operator), _)) if operator.is_comparison() => operator,
            _ => return Ok(left),
        };
        self.next()?;
        let right = self.parse_additive()?;

        Ok(binary(left, operator, right))
    }

    /// Parse a chain of terms joined by `+` or `-`.
    fn parse_additive(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_term()?;

        while let Some(operator) = self.next_operator(&[Operator::Add, Operator::Subtract])? {
            let right = self.parse_term()?;
            left = binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse a chain of unary expressions joined by `*` or `/`.
    fn parse_term(&mut self) -> Result<Expression, Error> {
        let mut left = self.parse_unary()?;

        while let Some(operator) = self.next_operator(&[Operator::Multiply, Operator::Divide])? {
            let right = self.parse_unary()?;
            left = binary(left, operator, right);
        }

        Ok(left)
    }

    /// Parse an expression that may be negated with `!`.
    fn parse_unary(&mut self) -> Result<Expression, Error> {
        if self.next_is(Token::Exclamation)? {
            let (_, region) = self.next_must(Token::Exclamation)?;
            let operand = self.parse_unary()?;
            let region = region.combine(operand.get_region());

            return Ok(Expression::Not(Not {
                operand: Box::new(operand),
                region,
            }));
        }

        self.parse_primary()
    }

    /// Parse a Base or a parenthesized expression.
    fn parse_primary(&mut self) -> Result<Expression, Error> {
        if self.next_is(Token::LeftParen)? {
            self.next_must(Token::LeftParen)?;
            let expression = self.parse_expression()?;
            self.next_must(Token::RightParen)?;

            return Ok(expression);
        }

        Ok(Expression::Base(self.parse_base()?))
    }

    /// Consume the next token if it is one of the given operators.
    fn next_operator(&mut self, accept: &[Operator]) -> Result<Option<Operator>, Error> {
        match self.peek()? {
            Some((Token::Operator(operator), _)) if accept.contains(&operator) => {
                self.next()?;
                Ok(Some(operator))
            }
            _ => Ok(None),
        }
    }

    /// Parse an Arguments.
    ///
    /// A call's arguments may come in two different forms, named or anonymous.
    ///
    /// ## Named
    ///
    /// Named arguments have an explicit name. An argument name is an identifier
    /// or string followed by a colon (:), and is always treated as a string.
    ///
    /// In this example, the name of the argument is "separator" and the value is ", ".
    ///
    /// separator: ", "
    ///
    /// ## Anonymous
    ///
    /// Anonymous arguments have no explicitly assigned name, and are numbered
    /// in order from "1" when the call is evaluated.
    ///
    /// Arguments may optionally be separated with a comma.
    fn parse_args(&mut self) -> Result<Option<Arguments>, Error> {
        let mut values: Vec<(Option<String>, Base)> = vec![];
        let mut region: Option<Region> = None;

        loop {
            match self.peek()? {
                None | Some((Token::Pipe, _)) | Some((Token::RightParen, _)) => break,
                Some((Token::Comma, _)) if !values.is_empty() => {
                    self.next()?;
                    continue;
                }
                _ => (),
            }

            let name_or_value = self.parse_base()?;
            let mut span = name_or_value.get_region();

            if self.next_is(Token::Colon)? {
                self.next_must(Token::Colon)?;
                let name = self.parse_arg_name(&name_or_value)?;
                let value = self.parse_base()?;
                span = span.combine(value.get_region());
                values.push((Some(name), value));
            } else {
                values.push((None, name_or_value));
            }

            region = Some(match region {
                Some(region) => region.combine(span),
                None => span,
            });
        }

        Ok(region.map(|region| Arguments { values, region }))
    }

    /// Return the name of a named argument.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a single identifier, string or number.
    fn parse_arg_name(&self, base: &Base) -> Result<String, Error> {
        match base {
            Base::Variable(variable) if variable.path.len() == 1 => {
                Ok(self.lexer.source[variable.get_region()].to_owned())
            }
            Base::Literal(Literal {
                value: Value::String(name),
                ..
            }) => Ok(name.clone()),
            Base::Literal(Literal {
                value: Value::Number(name),
                ..
            }) => Ok(name.to_string()),
            _ => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, base.get_region())
                .with_help("argument names must be an identifier, string or number")),
        }
    }

    /// Parse an Identifier.
    ///
    /// # Errors
    ///
    /// Propagates an error from next_must if the next token is not an
    /// Identifier.
    fn parse_ident(&mut self) -> Result<Identifier, Error> {
        let (_, region) = self.next_must(Token::Identifier)?;
        Ok(Identifier { region })
    }

    /// Parse a Base.
    ///
    /// A Base may be returned as a Literal or Variable based on the value.
    ///
    /// ## Literal
    ///
    /// "hello world"
    ///
    /// -1000
    ///
    /// 10.2
    ///
    /// true, false, null
    ///
    /// ## Variable
    ///
    /// person.name
    fn parse_base(&mut self) -> Result<Base, Error> {
        let base = match self.next_any_must()? {
            (Token::True, region) => Base::Literal(Literal {
                value: Value::Bool(true),
                region,
            }),
            (Token::False, region) => Base::Literal(Literal {
                value: Value::Bool(false),
                region,
            }),
            (Token::Null, region) => Base::Literal(Literal {
                value: Value::Null,
                region,
            }),
            (Token::Operator(operator), region) => match operator {
                Operator::Add | Operator::Subtract => {
                    let (_, next_region) = self.next_must(Token::Number)?;

                    // -1000 | +1000  <- valid, negative/positive numbers
                    // - 1000 | + 1000<- invalid
                    if !region.is_neighbor(next_region) {
                        return Err(Error::build(UNEXPECTED_TOKEN)
                            .with_pointer(self.lexer.source, region)
                            .with_help(format!(
                                "if you want to indicate that {} is a positive or negative number \
                                try removing the separating whitespace",
                                &self.lexer.source[next_region]
                            )));
                    }

                    let merge = region.combine(next_region);
                    Base::Literal(self.parse_number_literal(merge)?)
                }
                _ => {
                    return Err(Error::build(UNEXPECTED_TOKEN)
                        .with_pointer(self.lexer.source, region)
                        .with_help(format!(
                            "only `{}` or `{}` operators to indicate a positive or negative numbers \
                            are valid here",
                            Operator::Add,
                            Operator::Subtract
                        )));
                }
            },
            (Token::Number, region) => Base::Literal(self.parse_number_literal(region)?),
            (Token::String, region) => Base::Literal(Literal {
                value: Value::String(self.parse_string(region)?),
                region,
            }),
            (Token::Identifier, region) => {
                let mut path = vec![Key::from(Identifier { region })];

                // Keep chaining keys as long as we see a period.
                while self.next_is(Token::Period)? {
                    self.next_must(Token::Period)?;
                    path.push(self.parse_key()?);
                }
                Base::Variable(Variable { path })
            }
            (token, region) => {
                return Err(Error::build(UNEXPECTED_TOKEN)
                    .with_pointer(self.lexer.source, region)
                    .with_help(format!(
                        "expected a string, number, `true`, `false`, `null` or a variable, \
                        found `{token}`"
                    )))
            }
        };

        Ok(base)
    }

    /// Parse a Key.
    ///
    /// # Errors
    ///
    /// Returns an error if the next token is not a valid Identifier such as "one.two".
    fn parse_key(&mut self) -> Result<Key, Error> {
        match self.next_any_must()? {
            (Token::Identifier, region) => Ok(Key::from(Identifier { region })),
            (_, region) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help("expected an unquoted identifier such as `one.two`")),
        }
    }

    /// Parse a String from the literal value of the given Region.
    ///
    /// # Errors
    ///
    /// Returns an error if an unrecognized escape character is found.
    fn parse_string(&self, region: Region) -> Result<String, Error> {
        let window = region.literal(self.lexer.source);
        let window = &window[1..window.len() - 1];

        if !window.contains('\\') {
            return Ok(window.to_owned());
        }

        let mut iter = window.chars();
        let mut string = String::with_capacity(window.len());
        while let Some(c) = iter.next() {
            if c != '\\' {
                string.push(c);
                continue;
            }
            let c = match iter.next() {
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                Some('\\') => '\\',
                Some('"') => '"',
                _ => {
                    return Err(Error::build("unexpected escape character")
                        .with_pointer(self.lexer.source, region)
                        .with_help("recognized escapes are `\\n`, `\\r`, `\\t`, `\\\\`, `\\\"`"))
                }
            };
            string.push(c);
        }

        Ok(string)
    }

    /// Parse a Literal containing a Value::Number from the given Region.
    ///
    /// # Errors
    ///
    /// Returns an error if the literal value of the Region cannot be converted
    /// to a Value::Number.
    fn parse_number_literal(&self, region: Region) -> Result<Literal, Error> {
        let window = region.literal(self.lexer.source);
        let window = window.strip_prefix('+').unwrap_or(window);
        let as_number: Number = window.parse().map_err(|_| {
            Error::build("unrecognizable number")
                .with_pointer(self.lexer.source, region)
                .with_help(format!(
                    "numbers may begin with `{}` to indicate a negative \
                    number and must not end with a decimal",
                    Operator::Subtract
                ))
        })?;

        // `-0` is written without a fraction, so it stays an integer.
        let value = if as_number.as_f64() == Some(0.0) && !window.contains(['.', 'e', 'E']) {
            Value::from(0)
        } else {
            Value::Number(as_number)
        };

        Ok(Literal { value, region })
    }

    /// Peek the next token.
    ///
    /// # Errors
    ///
    /// Propagates any error reported by the underlying Lexer.
    fn peek(&mut self) -> LexResult {
        if let o @ None = &mut self.buffer {
            *o = Some(self.lexer.next()?);
        }

        Ok(self.buffer.flatten())
    }

    /// Get the next token.
    ///
    /// Prefers to pull a token from the internal buffer first, but will pull from
    /// the lexer when the buffer is empty.
    fn next(&mut self) -> LexResult {
        match self.buffer.take() {
            Some(t) => Ok(t),
            None => self.lexer.next(),
        }
    }

    /// Returns true if the given token matches the upcoming token.
    ///
    /// # Errors
    ///
    /// Propagates any errors reported by the underlying lexer.
    fn next_is(&mut self, expect: Token) -> Result<bool, Error> {
        Ok(self
            .peek()?
            .map(|(token, _)| token == expect)
            .unwrap_or(false))
    }

    /// Get the next token, and compare it to the given token.
    ///
    /// # Errors
    ///
    /// An error is returned if the next token does not match the given token,
    /// or when [next()] returns None.
    fn next_must(&mut self, expect: Token) -> Result<(Token, Region), Error> {
        match self.next()? {
            Some((token, region)) if token == expect => Ok((token, region)),
            Some((_, region)) => Err(Error::build(UNEXPECTED_TOKEN)
                .with_pointer(self.lexer.source, region)
                .with_help(format!("expected `{expect}`"))),
            None => {
                let source_len = self.lexer.source.len();
                Err(Error::build(UNEXPECTED_EOF)
                    .with_pointer(self.lexer.source, source_len..source_len)
                    .with_help(format!("expected `{expect}`")))
            }
        }
    }

    /// Get the next token.
    ///
    /// Similar to "next()" but requires that a token is returned.
    ///
    /// # Errors
    ///
    /// An error is returned if no more tokens are left.
    fn next_any_must(&mut self) -> Result<(Token, Region), Error> {
        self.next()?.ok_or_else(|| error_eof(self.lexer.source))
    }
}

/// Join two expressions with an operator.
fn binary(left: Expression, operator: Operator, right: Expression) -> Expression {
    let region = left.get_region().combine(right.get_region());

    Expression::Binary(Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
        region,
    })
}
