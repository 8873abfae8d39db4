use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};

use num::rational::Rational64;
use thiserror::Error;

use crate::backends::smtlib_printer::{sort_to_smtlib, to_smtlib};
use crate::numeral::parse_rational;
use crate::script::LOGIC;
use crate::solver::{Model, ModelValue, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

#[derive(Debug, Error)]
pub enum Cvc5Error {
    #[error("cvc5 I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cvc5 not found: {0}")]
    NotFound(String),
    #[error("cvc5 error: {0}")]
    SolverError(String),
    #[error("Failed to parse cvc5 output: {0}")]
    ParseError(String),
}

pub struct Cvc5Solver {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr: BufReader<ChildStderr>,
    vars: HashMap<String, SmtSort>,
}

impl Cvc5Solver {
    pub fn new() -> Result<Self, Cvc5Error> {
        Self::with_command_and_timeout("cvc5", None)
    }

    pub fn with_timeout_secs(timeout_secs: u64) -> Result<Self, Cvc5Error> {
        if timeout_secs == 0 {
            return Self::with_command_and_timeout("cvc5", None);
        }
        let timeout_ms = timeout_secs.saturating_mul(1000);
        Self::with_command_and_timeout("cvc5", Some(timeout_ms))
    }

    pub fn with_command(cmd: &str) -> Result<Self, Cvc5Error> {
        Self::with_command_and_timeout(cmd, None)
    }

    pub fn with_command_and_timeout(cmd: &str, timeout_ms: Option<u64>) -> Result<Self, Cvc5Error> {
        let mut args = vec![
            "--lang".to_string(),
            "smt2".to_string(),
            "--incremental".to_string(),
            "--produce-models".to_string(),
        ];
        if let Some(ms) = timeout_ms {
            args.push(format!("--tlimit-per={ms}"));
        }

        let mut child = Command::new(cmd)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Cvc5Error::NotFound(format!("{cmd}: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| Cvc5Error::SolverError("failed to capture cvc5 stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Cvc5Error::SolverError("failed to capture cvc5 stdout".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Cvc5Error::SolverError("failed to capture cvc5 stderr".into()))?;

        let mut solver = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr: BufReader::new(stderr),
            vars: HashMap::new(),
        };

        solver.send_command_no_response(&format!("(set-logic {LOGIC})"))?;
        Ok(solver)
    }

    fn send_command(&mut self, cmd: &str) -> Result<String, Cvc5Error> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;

        // Read one line of response
        let mut response = String::new();
        self.stdout.read_line(&mut response)?;
        if response.is_empty() {
            let mut stderr = String::new();
            let _ = self.stderr.read_line(&mut stderr);
            return Err(Cvc5Error::SolverError(format!(
                "No response from cvc5 for command `{cmd}`. stderr: {}",
                stderr.trim()
            )));
        }
        Ok(response.trim_end().to_string())
    }

    fn send_command_no_response(&mut self, cmd: &str) -> Result<(), Cvc5Error> {
        writeln!(self.stdin, "{cmd}")?;
        self.stdin.flush()?;
        Ok(())
    }
}

impl Drop for Cvc5Solver {
    fn drop(&mut self) {
        let _ = writeln!(self.stdin, "(exit)");
        let _ = self.stdin.flush();
        let _ = self.child.wait();
    }
}

fn parse_check_sat(response: &str) -> Result<SatResult, Cvc5Error> {
    match response {
        "sat" => Ok(SatResult::Sat),
        "unsat" => Ok(SatResult::Unsat),
        "unknown" => Ok(SatResult::Unknown("cvc5 returned unknown".into())),
        other => Err(Cvc5Error::SolverError(other.to_string())),
    }
}

impl SmtSolver for Cvc5Solver {
    type Error = Cvc5Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Cvc5Error> {
        let sort_str = sort_to_smtlib(sort);
        self.send_command_no_response(&format!("(declare-const {name} {sort_str})"))?;
        self.vars.insert(name.to_string(), sort.clone());
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Cvc5Error> {
        let smt_str = to_smtlib(term);
        self.send_command_no_response(&format!("(assert {smt_str})"))?;
        Ok(())
    }

    fn push(&mut self) -> Result<(), Cvc5Error> {
        self.send_command_no_response("(push 1)")?;
        Ok(())
    }

    fn pop(&mut self) -> Result<(), Cvc5Error> {
        self.send_command_no_response("(pop 1)")?;
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Cvc5Error> {
        let response = self.send_command("(check-sat)")?;
        parse_check_sat(&response)
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Cvc5Error> {
        let result = self.check_sat()?;
        if result != SatResult::Sat {
            return Ok((result, None));
        }

        let mut values = HashMap::new();
        for &(name, sort) in var_names {
            let response = self.send_command(&format!("(get-value ({name}))"))?;
            // Response format: ((name value))
            let value = parse_cvc5_value(&response, name, sort).ok_or_else(|| {
                Cvc5Error::ParseError(format!("value of `{name}`: {response}"))
            })?;
            values.insert(name.to_string(), value);
        }

        Ok((SatResult::Sat, Some(Model { values })))
    }

    fn reset(&mut self) -> Result<(), Cvc5Error> {
        self.send_command_no_response("(reset)")?;
        self.send_command_no_response(&format!("(set-logic {LOGIC})"))?;
        self.vars.clear();
        Ok(())
    }
}

fn parse_cvc5_value(response: &str, name: &str, sort: &SmtSort) -> Option<ModelValue> {
    // ((name value)) → value
    let inner = response.trim().strip_prefix("((")?.strip_suffix("))")?;
    let val_str = inner.trim_start().strip_prefix(name)?.trim();

    match sort {
        SmtSort::Real => parse_real_sexpr(val_str).map(ModelValue::Real),
        SmtSort::Bool => match val_str {
            "true" => Some(ModelValue::Bool(true)),
            "false" => Some(ModelValue::Bool(false)),
            _ => None,
        },
    }
}

/// Parse a Real-sorted SMT-LIB2 value: `1.0`, `(- 1.0)`, `(/ 46 5)`,
/// `(/ (- 46) 5)`.
fn parse_real_sexpr(text: &str) -> Option<Rational64> {
    let text = text.trim();
    let Some(body) = text.strip_prefix('(') else {
        return parse_rational(text);
    };
    let body = body.strip_suffix(')')?.trim();
    let (op, rest) = body.split_once(char::is_whitespace)?;
    match op {
        "-" => parse_real_sexpr(rest).map(|v| -v),
        "/" => {
            let (numer, denom) = split_operands(rest.trim())?;
            let denom = parse_real_sexpr(denom)?;
            if denom == Rational64::from_integer(0) {
                return None;
            }
            Some(parse_real_sexpr(numer)? / denom)
        }
        _ => None,
    }
}

/// Split `a b` where either side may be a parenthesized expression.
fn split_operands(text: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            c if c.is_whitespace() && depth == 0 => {
                return Some((&text[..idx], text[idx..].trim()));
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cvc5_decimal_value() {
        let v = parse_cvc5_value("((x 1.0))", "x", &SmtSort::Real);
        assert_eq!(v, Some(ModelValue::Real(Rational64::from_integer(1))));
    }

    #[test]
    fn parse_cvc5_negative_value() {
        let v = parse_cvc5_value("((x (- 7.0)))", "x", &SmtSort::Real);
        assert_eq!(v, Some(ModelValue::Real(Rational64::from_integer(-7))));
    }

    #[test]
    fn parse_cvc5_fraction_values() {
        let v = parse_cvc5_value("((x (/ 46 5)))", "x", &SmtSort::Real);
        assert_eq!(v, Some(ModelValue::Real(Rational64::new(46, 5))));
        let v = parse_cvc5_value("((x (/ (- 1) 3)))", "x", &SmtSort::Real);
        assert_eq!(v, Some(ModelValue::Real(Rational64::new(-1, 3))));
        let v = parse_cvc5_value("((x (- (/ 1 3))))", "x", &SmtSort::Real);
        assert_eq!(v, Some(ModelValue::Real(Rational64::new(-1, 3))));
    }

    #[test]
    fn parse_cvc5_bool_value() {
        let t = parse_cvc5_value("((b true))", "b", &SmtSort::Bool);
        let f = parse_cvc5_value("((b false))", "b", &SmtSort::Bool);
        assert_eq!(t, Some(ModelValue::Bool(true)));
        assert_eq!(f, Some(ModelValue::Bool(false)));
    }

    #[test]
    fn parse_cvc5_rejects_other_names_and_garbage() {
        assert_eq!(parse_cvc5_value("((y 1.0))", "x", &SmtSort::Real), None);
        assert_eq!(parse_cvc5_value("((x (root-obj 1)))", "x", &SmtSort::Real), None);
        assert_eq!(parse_cvc5_value("((x (/ 1 0)))", "x", &SmtSort::Real), None);
    }

    #[test]
    fn check_sat_tokens() {
        assert_eq!(parse_check_sat("sat").ok(), Some(SatResult::Sat));
        assert_eq!(parse_check_sat("unsat").ok(), Some(SatResult::Unsat));
        assert!(matches!(
            parse_check_sat("unknown"),
            Ok(SatResult::Unknown(_))
        ));
        assert!(parse_check_sat("(error \"boom\")").is_err());
    }
}
