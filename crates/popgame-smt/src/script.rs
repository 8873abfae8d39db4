//! Standalone SMT-LIB2 scripts for dumping a query to disk.

use std::fmt::Write as _;

use crate::backends::smtlib_printer::{sort_to_smtlib, to_smtlib};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Logic used by every query in this workspace: quantifier-free nonlinear
/// real arithmetic.
pub const LOGIC: &str = "QF_NRA";

/// Render declarations and assertions as a self-contained SMT-LIB2 script
/// that any conforming solver can replay.
pub fn query_to_smt2_script(declarations: &[(String, SmtSort)], assertions: &[SmtTerm]) -> String {
    let mut smt = String::new();
    let _ = writeln!(smt, "(set-logic {LOGIC})");
    for (name, sort) in declarations {
        let _ = writeln!(smt, "(declare-const {} {})", name, sort_to_smtlib(sort));
    }
    for assertion in assertions {
        let _ = writeln!(smt, "(assert {})", to_smtlib(assertion));
    }
    smt.push_str("(check-sat)\n");
    smt.push_str("(get-model)\n");
    smt.push_str("(exit)\n");
    smt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_declares_before_asserting() {
        let script = query_to_smt2_script(
            &[("x".to_string(), SmtSort::Real)],
            &[SmtTerm::var("x").ge(SmtTerm::int(0))],
        );
        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "(set-logic QF_NRA)");
        assert_eq!(lines[1], "(declare-const x Real)");
        assert_eq!(lines[2], "(assert (>= x 0.0))");
        assert_eq!(lines.last().copied(), Some("(exit)"));
    }
}
