/**
 * Unparser
 *
 * Prints an expression AST back to source text so parser tests can compare
 * strings instead of trees. No parentheses are emitted.
 */
use template_parser::expression_parser::ast::*;

pub fn unparse(ast: &AST) -> String {
    let mut unparser = Unparser {
        expression: String::new(),
    };
    unparser.visit(ast);
    unparser.expression
}

struct Unparser {
    expression: String,
}

impl Unparser {
    fn visit(&mut self, ast: &AST) {
        match ast {
            AST::EmptyExpr(_) | AST::ImplicitReceiver(_) => {}
            AST::ThisReceiver(_) => self.expression.push_str("this"),
            AST::Conditional(node) => {
                self.visit(&node.condition);
                self.expression.push_str(" ? ");
                self.visit(&node.true_exp);
                self.expression.push_str(" : ");
                self.visit(&node.false_exp);
            }
            AST::PropertyRead(node) => {
                self.visit_receiver_then(&node.receiver, ".");
                self.expression.push_str(&node.name);
            }
            AST::PropertyWrite(node) => {
                self.visit_receiver_then(&node.receiver, ".");
                self.expression.push_str(&node.name);
                self.expression.push_str(" = ");
                self.visit(&node.value);
            }
            AST::SafePropertyRead(node) => {
                self.visit(&node.receiver);
                self.expression.push_str("?.");
                self.expression.push_str(&node.name);
            }
            AST::KeyedRead(node) => {
                self.visit(&node.receiver);
                self.visit_key("[", &node.key);
            }
            AST::KeyedWrite(node) => {
                self.visit(&node.receiver);
                self.visit_key("[", &node.key);
                self.expression.push_str(" = ");
                self.visit(&node.value);
            }
            AST::SafeKeyedRead(node) => {
                self.visit(&node.receiver);
                self.visit_key("?.[", &node.key);
            }
            AST::Call(node) => {
                self.visit(&node.receiver);
                self.visit_args("(", &node.args);
            }
            AST::SafeCall(node) => {
                self.visit(&node.receiver);
                self.visit_args("?.(", &node.args);
            }
            AST::Binary(node) => {
                self.visit(&node.left);
                self.expression.push_str(&format!(" {} ", node.operation));
                self.visit(&node.right);
            }
            AST::Unary(node) => {
                self.expression.push_str(&node.operator);
                self.visit(&node.expr);
            }
            AST::PrefixNot(node) => {
                self.expression.push('!');
                self.visit(&node.expression);
            }
            AST::LiteralPrimitive(node) => self.visit_literal_primitive(node),
            AST::LiteralArray(node) => {
                self.expression.push('[');
                self.visit_all(&node.expressions);
                self.expression.push(']');
            }
            AST::LiteralMap(node) => self.visit_literal_map(node),
            AST::Interpolation(node) => {
                for (i, string) in node.strings.iter().enumerate() {
                    self.expression.push_str(string);
                    if let Some(expression) = node.expressions.get(i) {
                        self.expression.push_str("{{ ");
                        self.visit(expression);
                        self.expression.push_str(" }}");
                    }
                }
            }
        }
    }

    /// Bare names read from the implicit receiver print without a prefix.
    fn visit_receiver_then(&mut self, receiver: &AST, separator: &str) {
        if !receiver.is_implicit_receiver() {
            self.visit(receiver);
            self.expression.push_str(separator);
        }
    }

    fn visit_key(&mut self, open: &str, key: &AST) {
        self.expression.push_str(open);
        self.visit(key);
        self.expression.push(']');
    }

    fn visit_args(&mut self, open: &str, args: &[AST]) {
        self.expression.push_str(open);
        self.visit_all(args);
        self.expression.push(')');
    }

    fn visit_all(&mut self, asts: &[AST]) {
        for (i, ast) in asts.iter().enumerate() {
            if i > 0 {
                self.expression.push_str(", ");
            }
            self.visit(ast);
        }
    }

    fn visit_literal_primitive(&mut self, ast: &LiteralPrimitive) {
        let text = match &ast.value {
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
            LiteralValue::Boolean(value) => value.to_string(),
            LiteralValue::Number(value) => value.to_string(),
            LiteralValue::String(value) => format!("\"{}\"", value.replace('"', "\\\"")),
        };
        self.expression.push_str(&text);
    }

    fn visit_literal_map(&mut self, ast: &LiteralMap) {
        self.expression.push('{');
        for (i, (key, value)) in ast.keys.iter().zip(&ast.values).enumerate() {
            if i > 0 {
                self.expression.push_str(", ");
            }
            if key.quoted {
                self.expression.push_str(&format!("\"{}\"", key.key));
            } else {
                self.expression.push_str(&key.key);
            }
            self.expression.push_str(": ");
            self.visit(value);
        }
        self.expression.push('}');
    }
}
