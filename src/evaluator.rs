//! Tree-walking evaluator for the lpm language.
//!
//! `evaluate` recurses over the AST, producing a `Value` for every node.
//! Two `Value` variants are signals rather than data: `ReturnValue` unwinds
//! a block to the nearest enclosing function call, and `Error` short-
//! circuits: every rule here that evaluates a sub-expression checks the
//! result with `is_error()` before doing anything further with it, which is
//! what keeps an error from a deeply nested expression from being silently
//! swallowed by an enclosing operator.

use crate::ast::{Block, Expression, Program, Statement};
use crate::object::{Environment, Value};

const TRUE: Value = Value::Boolean(true);
const FALSE: Value = Value::Boolean(false);
const NULL: Value = Value::Null;

fn native_bool(value: bool) -> Value {
    if value {
        TRUE
    } else {
        FALSE
    }
}

pub fn evaluate_program(program: &Program, env: &Environment) -> Value {
    let mut result = NULL;

    for statement in &program.statements {
        result = evaluate_statement(statement, env);
        match result {
            Value::ReturnValue(inner) => return *inner,
            Value::Error(_) => return result,
            _ => {}
        }
    }

    result
}

fn evaluate_block(block: &Block, env: &Environment) -> Value {
    let mut result = NULL;

    for statement in &block.statements {
        result = evaluate_statement(statement, env);
        // Unlike the program level, a block returns the signal itself
        // unopened (it is only unwrapped at the function-call boundary),
        // so a `regresa` inside a nested block still escapes every
        // enclosing `si`/bare block on its way out.
        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }

    result
}

fn evaluate_statement(statement: &Statement, env: &Environment) -> Value {
    match statement {
        Statement::Let { name, value, .. } => {
            let value = evaluate_expression(value, env);
            if value.is_error() {
                return value;
            }
            env.set(name.value.clone(), value);
            NULL
        }
        Statement::Return { value, .. } => {
            let value = evaluate_expression(value, env);
            if value.is_error() {
                return value;
            }
            Value::ReturnValue(Box::new(value))
        }
        Statement::Expression { expression, .. } => evaluate_expression(expression, env),
        Statement::Block(block) => evaluate_block(block, env),
    }
}

fn evaluate_expression(expression: &Expression, env: &Environment) -> Value {
    match expression {
        Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
        Expression::BooleanLiteral { value, .. } => native_bool(*value),
        Expression::StringLiteral { value, .. } => Value::String(value.clone()),
        Expression::Identifier(ident) => match env.get(&ident.value) {
            Some(value) => value,
            None => match builtins::lookup(&ident.value) {
                Some(builtin) => builtin,
                None => Value::Error(format!("Identificador no encontrado: {}", ident.value)),
            },
        },
        Expression::Prefix { operator, right, .. } => {
            let right = evaluate_expression(right, env);
            if right.is_error() {
                return right;
            }
            evaluate_prefix(operator, &right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = evaluate_expression(left, env);
            if left.is_error() {
                return left;
            }
            let right = evaluate_expression(right, env);
            if right.is_error() {
                return right;
            }
            evaluate_infix(operator, &left, &right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => evaluate_if(condition, consequence, alternative.as_ref(), env),
        Expression::FunctionLiteral {
            parameters, body, ..
        } => Value::Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
        },
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            let function = evaluate_expression(function, env);
            if function.is_error() {
                return function;
            }

            let args = evaluate_expressions(arguments, env);
            if let [only] = args.as_slice() {
                if only.is_error() {
                    return only.clone();
                }
            }

            apply_function(&function, &args)
        }
    }
}

fn evaluate_expressions(expressions: &[Expression], env: &Environment) -> Vec<Value> {
    let mut values = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let value = evaluate_expression(expression, env);
        if value.is_error() {
            return vec![value];
        }
        values.push(value);
    }
    values
}

fn evaluate_prefix(operator: &str, right: &Value) -> Value {
    match operator {
        "!" => native_bool(!right.is_truthy()),
        "-" => match right {
            Value::Integer(n) => Value::Integer(-n),
            _ => Value::Error(format!("Operador desconocido: -{}", right.type_name())),
        },
        _ => Value::Error(format!(
            "Operador desconocido: {}{}",
            operator,
            right.type_name()
        )),
    }
}

fn evaluate_infix(operator: &str, left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => evaluate_integer_infix(operator, *l, *r),
        (Value::String(l), Value::String(r)) => evaluate_string_infix(operator, l, r),
        _ if operator == "==" => native_bool(left == right),
        _ if operator == "!=" => native_bool(left != right),
        _ if left.type_name() != right.type_name() => Value::Error(format!(
            "Discrepancia de tipos: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
        _ => Value::Error(format!(
            "Operador desconocido: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
    }
}

/// Integer division truncates toward zero, matching Rust's (and the host
/// language's) native `/` on signed integers.
fn evaluate_integer_infix(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left + right),
        "-" => Value::Integer(left - right),
        "*" => Value::Integer(left * right),
        "/" => Value::Integer(left / right),
        "<" => native_bool(left < right),
        ">" => native_bool(left > right),
        "==" => native_bool(left == right),
        "!=" => native_bool(left != right),
        _ => Value::Error(format!("Operador desconocido: INTEGER {} INTEGER", operator)),
    }
}

fn evaluate_string_infix(operator: &str, left: &str, right: &str) -> Value {
    match operator {
        "+" => Value::String(format!("{}{}", left, right)),
        "==" => native_bool(left == right),
        "!=" => native_bool(left != right),
        _ => Value::Error(format!("Operador desconocido: STRING {} STRING", operator)),
    }
}

fn evaluate_if(
    condition: &Expression,
    consequence: &Block,
    alternative: Option<&Block>,
    env: &Environment,
) -> Value {
    let condition = evaluate_expression(condition, env);
    if condition.is_error() {
        return condition;
    }

    if condition.is_truthy() {
        evaluate_block(consequence, env)
    } else if let Some(alternative) = alternative {
        evaluate_block(alternative, env)
    } else {
        NULL
    }
}

fn apply_function(function: &Value, args: &[Value]) -> Value {
    match function {
        Value::Function {
            parameters, body, env, ..
        } => {
            let call_env = Environment::enclosed(env);
            for (param, arg) in parameters.iter().zip(args.iter()) {
                call_env.set(param.value.clone(), arg.clone());
            }
            let evaluated = evaluate_block(body, &call_env);
            match evaluated {
                Value::ReturnValue(inner) => *inner,
                other => other,
            }
        }
        Value::Builtin(builtin) => builtin(args),
        other => Value::Error(format!("No es una función: {}", other.type_name())),
    }
}

/// Built-in functions, resolved as a fallback when an identifier isn't
/// bound in any enclosing scope. Modeled as `Value::Builtin` so they flow
/// through `apply_function` exactly like a user-defined function value.
mod builtins {
    use crate::object::Value;

    pub fn lookup(name: &str) -> Option<Value> {
        match name {
            "longitud" => Some(Value::Builtin(longitud)),
            "imprimir" => Some(Value::Builtin(imprimir)),
            _ => None,
        }
    }

    fn longitud(args: &[Value]) -> Value {
        if args.len() != 1 {
            return Value::Error(format!(
                "número incorrecto de argumentos para longitud, se recibieron {}, se requieren 1",
                args.len()
            ));
        }
        match &args[0] {
            Value::String(s) => Value::Integer(s.chars().count() as i64),
            other => Value::Error(format!(
                "argumento para longitud sin soporte, se recibió {}",
                other.type_name()
            )),
        }
    }

    /// Prints every argument's `inspect()` form separated by a space,
    /// followed by a newline, and evaluates to `NULL`. A side-effecting
    /// builtin in the same vein as the host's own output primitives.
    fn imprimir(args: &[Value]) -> Value {
        let rendered: Vec<String> = args.iter().map(|v| v.inspect()).collect();
        println!("{}", rendered.join(" "));
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn eval(source: &str) -> Value {
        let lexer = Lexer::new(source);
        let mut parser = Parser::new(lexer);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "{:?}", parser.errors());
        let env = Environment::new();
        evaluate_program(&program, &env)
    }

    #[test]
    fn test_integer_expressions() {
        let cases = [
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("7 / 2", 3),
        ];
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::Integer(expected), "source: {}", source);
        }
    }

    #[test]
    fn test_boolean_expressions() {
        let cases = [
            ("verdadero", true),
            ("falso", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("verdadero == verdadero", true),
            ("falso == falso", true),
            ("verdadero == falso", false),
            ("verdadero != falso", true),
            ("(1 < 2) == verdadero", true),
            ("(1 < 2) == falso", false),
        ];
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::Boolean(expected), "source: {}", source);
        }
    }

    #[test]
    fn test_bang_operator() {
        let cases = [
            ("!verdadero", false),
            ("!falso", true),
            ("!5", false),
            ("!!verdadero", true),
            ("!!falso", false),
            ("!!5", true),
        ];
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::Boolean(expected), "source: {}", source);
        }
    }

    #[test]
    fn test_if_else_expressions() {
        assert_eq!(eval("si (verdadero) { 10 }"), Value::Integer(10));
        assert_eq!(eval("si (falso) { 10 }"), Value::Null);
        assert_eq!(eval("si (1) { 10 }"), Value::Integer(10));
        assert_eq!(eval("si (1 < 2) { 10 }"), Value::Integer(10));
        assert_eq!(eval("si (1 > 2) { 10 }"), Value::Null);
        assert_eq!(eval("si (1 > 2) { 10 } si_no { 20 }"), Value::Integer(20));
        assert_eq!(eval("si (1 < 2) { 10 } si_no { 20 }"), Value::Integer(10));
    }

    #[test]
    fn test_return_statements() {
        let cases = [
            ("regresa 10;", 10),
            ("regresa 10; 9;", 10),
            ("regresa 2 * 5; 9;", 10),
            ("9; regresa 2 * 5; 9;", 10),
            (
                "si (10 > 1) { si (10 > 1) { regresa 10; } regresa 1; }",
                10,
            ),
        ];
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::Integer(expected), "source: {}", source);
        }
    }

    #[test]
    fn test_error_handling() {
        let cases = [
            ("5 + verdadero;", "Discrepancia de tipos: INTEGER + BOOLEAN"),
            (
                "5 + verdadero; 5;",
                "Discrepancia de tipos: INTEGER + BOOLEAN",
            ),
            ("-verdadero", "Operador desconocido: -BOOLEAN"),
            (
                "verdadero + falso;",
                "Operador desconocido: BOOLEAN + BOOLEAN",
            ),
            (
                "5; verdadero + falso; 5",
                "Operador desconocido: BOOLEAN + BOOLEAN",
            ),
            (
                "si (10 > 1) { verdadero + falso; }",
                "Operador desconocido: BOOLEAN + BOOLEAN",
            ),
            (
                "si (10 > 1) { si (10 > 1) { regresa verdadero + falso; } regresa 1; }",
                "Operador desconocido: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "Identificador no encontrado: foobar"),
            (
                "\"Hola\" - \"Mundo\"",
                "Operador desconocido: STRING - STRING",
            ),
        ];
        for (source, expected) in cases {
            match eval(source) {
                Value::Error(message) => assert_eq!(message, expected, "source: {}", source),
                other => panic!("expected error for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_assignment_statements() {
        let cases = [
            ("variable a = 5; a;", 5),
            ("variable a = 5 * 5; a;", 25),
            ("variable a = 5; variable b = a; b;", 5),
            ("variable a = 5; variable b = a; variable c = a + b + 5; c;", 15),
        ];
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::Integer(expected), "source: {}", source);
        }
    }

    #[test]
    fn test_function_value() {
        match eval("procedimiento(x) { x + 2; };") {
            Value::Function {
                parameters, body, ..
            } => {
                assert_eq!(parameters.len(), 1);
                assert_eq!(parameters[0].value, "x");
                assert_eq!(body.to_string(), "(x + 2)");
            }
            other => panic!("expected function value, got {:?}", other),
        }
    }

    #[test]
    fn test_function_calls() {
        let cases = [
            ("variable identidad = procedimiento(x) { x; }; identidad(5);", 5),
            (
                "variable identidad = procedimiento(x) { regresa x; }; identidad(5);",
                5,
            ),
            ("variable doble = procedimiento(x) { x * 2; }; doble(5);", 10),
            ("variable suma = procedimiento(x, y) { x + y; }; suma(5, 5);", 10),
            (
                "variable suma = procedimiento(x, y) { x + y; }; suma(5 + 5, suma(5, 5));",
                20,
            ),
            ("procedimiento(x) { x; }(5)", 5),
        ];
        for (source, expected) in cases {
            assert_eq!(eval(source), Value::Integer(expected), "source: {}", source);
        }
    }

    #[test]
    fn test_closures() {
        let source = "
            variable nuevo_sumador = procedimiento(x) {
                procedimiento(y) { x + y; };
            };
            variable sumador_dos = nuevo_sumador(2);
            sumador_dos(3);
        ";
        assert_eq!(eval(source), Value::Integer(5));
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(eval(r#""Hola mundo!""#), Value::String("Hola mundo!".to_string()));
    }

    #[test]
    fn test_string_concatenation() {
        let source = r#"
            variable saludo = procedimiento(nombre) {
                "Hola " + nombre + "!"
            };
            saludo("David");
        "#;
        assert_eq!(eval(source), Value::String("Hola David!".to_string()));
    }

    #[test]
    fn test_string_comparison() {
        assert_eq!(eval(r#""a" == "a""#), Value::Boolean(true));
        assert_eq!(eval(r#""a" != "b""#), Value::Boolean(true));
    }

    #[test]
    fn test_longitud_builtin() {
        assert_eq!(eval(r#"longitud("")"#), Value::Integer(0));
        assert_eq!(eval(r#"longitud("cuatro")"#), Value::Integer(6));
        assert_eq!(eval(r#"longitud("hola mundo")"#), Value::Integer(10));

        match eval("longitud(1)") {
            Value::Error(message) => {
                assert_eq!(message, "argumento para longitud sin soporte, se recibió INTEGER")
            }
            other => panic!("expected error, got {:?}", other),
        }

        match eval(r#"longitud("uno", "dos")"#) {
            Value::Error(message) => assert_eq!(
                message,
                "número incorrecto de argumentos para longitud, se recibieron 2, se requieren 1"
            ),
            other => panic!("expected error, got {:?}", other),
        }
    }
}
