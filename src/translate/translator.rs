//! Expression tree to WHERE clause translation.
//!
//! Members resolve to mapped column names through the [`SqlGenerator`];
//! constants are always bound through the [`ParamList`], never inlined.

use serde::Serialize;

use crate::generator::SqlGenerator;
use crate::sql::{ParamList, Parameter, Token, TokenStream};
use crate::value::{FieldType, Value};

use super::expr::{CompareOp, Expr, LikeKind};
use super::{TranslateError, TranslateResult};

/// A translated WHERE clause body and its bindings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuerySql {
    pub where_sql: String,
    pub parameters: Vec<Parameter>,
}

/// Renders predicate trees for one entity mapping and dialect.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'g> {
    generator: &'g SqlGenerator,
}

impl<'g> Translator<'g> {
    pub fn new(generator: &'g SqlGenerator) -> Self {
        Self { generator }
    }

    /// Translate a standalone predicate; parameters are named `p0, p1, ...`.
    pub fn translate(&self, expr: &Expr) -> TranslateResult<QuerySql> {
        let mut params = ParamList::new(self.generator.dialect());
        let ts = self.translate_into(expr, &mut params)?;
        Ok(QuerySql {
            where_sql: ts.serialize(self.generator.dialect()),
            parameters: params.into_vec(),
        })
    }

    /// Translate into tokens, binding constants into a shared parameter list.
    pub fn translate_into(&self, expr: &Expr, params: &mut ParamList) -> TranslateResult<TokenStream> {
        let mut ts = TokenStream::new();
        self.predicate(expr, params, &mut ts)?;
        Ok(ts)
    }

    fn predicate(&self, expr: &Expr, params: &mut ParamList, ts: &mut TokenStream) -> TranslateResult<()> {
        match expr {
            Expr::And(left, right) => {
                self.logical_operand(left, params, ts)?;
                ts.space().push(Token::And).space();
                self.logical_operand(right, params, ts)
            }
            Expr::Or(left, right) => {
                self.require_predicate(left)?;
                self.require_predicate(right)?;
                self.predicate(left, params, ts)?;
                ts.space().push(Token::Or).space();
                self.predicate(right, params, ts)
            }
            Expr::Not(inner) => {
                self.require_predicate(inner)?;
                ts.push(Token::Not).space().lparen();
                self.predicate(inner, params, ts)?;
                ts.rparen();
                Ok(())
            }
            Expr::Compare { op, left, right } => self.compare(*op, left, right, params, ts),
            Expr::IsNull { expr, negated } => {
                self.column(expr, ts)?;
                ts.space()
                    .push(if *negated { Token::IsNotNull } else { Token::IsNull });
                Ok(())
            }
            Expr::InList { expr, list, negated } => {
                if list.is_empty() {
                    let constant = if *negated { "1 = 1" } else { "1 = 0" };
                    ts.push(Token::Raw(constant.to_string()));
                    return Ok(());
                }
                self.column(expr, ts)?;
                ts.space();
                if *negated {
                    ts.push(Token::Not).space();
                }
                ts.push(Token::In).space().lparen();
                let items = list.iter().map(|v| {
                    let mut item = TokenStream::new();
                    item.push(params.bind(v.clone()));
                    item
                });
                ts.join_comma(items.collect::<Vec<_>>());
                ts.rparen();
                Ok(())
            }
            Expr::Like { expr, pattern, kind } => {
                let text = match pattern.as_ref() {
                    Expr::Const(Value::String(text)) => text,
                    other => {
                        return Err(TranslateError::UnsupportedExpression(format!(
                            "string match requires a string pattern, found {other}"
                        )))
                    }
                };
                self.column(expr, ts)?;
                ts.space().push(Token::Like).space();
                ts.push(params.bind(Value::String(kind.pattern(text))));
                ts.space()
                    .push(Token::Raw(format!("ESCAPE '{}'", LikeKind::ESCAPE)));
                Ok(())
            }
            Expr::Member(_) => {
                self.boolean_member(expr, ts)?;
                ts.space().push(Token::Eq).space();
                ts.push(params.bind(Value::Bool(true)));
                Ok(())
            }
            Expr::Const(_) => Err(TranslateError::UnsupportedExpression(format!(
                "constant {expr} is not a predicate"
            ))),
        }
    }

    /// AND operand; OR children are parenthesized.
    fn logical_operand(&self, expr: &Expr, params: &mut ParamList, ts: &mut TokenStream) -> TranslateResult<()> {
        self.require_predicate(expr)?;
        if matches!(expr, Expr::Or(..)) {
            ts.lparen();
            self.predicate(expr, params, ts)?;
            ts.rparen();
            Ok(())
        } else {
            self.predicate(expr, params, ts)
        }
    }

    /// Operands of AND/OR/NOT must themselves be boolean-valued.
    fn require_predicate(&self, expr: &Expr) -> TranslateResult<()> {
        match expr {
            Expr::Const(_) => Err(TranslateError::UnsupportedExpression(format!(
                "logical operator over non-boolean operand {expr}"
            ))),
            Expr::Member(_) => {
                let mut scratch = TokenStream::new();
                self.boolean_member(expr, &mut scratch).map_err(|err| match err {
                    TranslateError::UnsupportedExpression(_) => TranslateError::UnsupportedExpression(
                        format!("logical operator over non-boolean operand {expr}"),
                    ),
                    other => other,
                })
            }
            _ => Ok(()),
        }
    }

    fn compare(
        &self,
        op: CompareOp,
        left: &Expr,
        right: &Expr,
        params: &mut ParamList,
        ts: &mut TokenStream,
    ) -> TranslateResult<()> {
        match (left, right) {
            (Expr::Const(_), Expr::Const(_)) => Err(TranslateError::UnsupportedExpression(format!(
                "comparison between two constants: {left} {right}"
            ))),
            (Expr::Member(_), Expr::Const(Value::Null)) | (Expr::Const(Value::Null), Expr::Member(_)) => {
                let member = if matches!(left, Expr::Member(_)) { left } else { right };
                let null_check = match op {
                    CompareOp::Eq => Token::IsNull,
                    CompareOp::Ne => Token::IsNotNull,
                    _ => {
                        return Err(TranslateError::UnsupportedExpression(format!(
                            "ordering comparison with NULL: {}",
                            Expr::compare(op, left.clone(), right.clone())
                        )))
                    }
                };
                self.column(member, ts)?;
                ts.space().push(null_check);
                Ok(())
            }
            (Expr::Member(_) | Expr::Const(_), Expr::Member(_) | Expr::Const(_)) => {
                self.operand(left, params, ts)?;
                ts.space().push(op.token()).space();
                self.operand(right, params, ts)
            }
            _ => Err(TranslateError::UnsupportedExpression(format!(
                "comparison operands must be members or constants: {}",
                Expr::compare(op, left.clone(), right.clone())
            ))),
        }
    }

    fn operand(&self, expr: &Expr, params: &mut ParamList, ts: &mut TokenStream) -> TranslateResult<()> {
        match expr {
            Expr::Const(value) => {
                ts.push(params.bind(value.clone()));
                Ok(())
            }
            _ => self.column(expr, ts),
        }
    }

    fn column(&self, expr: &Expr, ts: &mut TokenStream) -> TranslateResult<()> {
        match expr {
            Expr::Member(name) => {
                let property = self.generator.property(name.as_str())?;
                ts.append(&self.generator.column_tokens(property, false, false));
                Ok(())
            }
            other => Err(TranslateError::UnsupportedExpression(format!(
                "expected a property reference, found {other}"
            ))),
        }
    }

    fn boolean_member(&self, expr: &Expr, ts: &mut TokenStream) -> TranslateResult<()> {
        if let Expr::Member(name) = expr {
            let property = self.generator.property(name.as_str())?;
            if property.field_type() != FieldType::Bool {
                return Err(TranslateError::UnsupportedExpression(format!(
                    "property {name} of type {} used as a predicate",
                    property.field_type()
                )));
            }
        }
        self.column(expr, ts)
    }
}
