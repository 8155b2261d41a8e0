//! TDM delay formula parser (`design.tdm`, §4.1).
//!
//! Precompiled `regex::Regex` patterns behind `lazy_static` for the line
//! grammar, rather than hand-rolled string splitting.

use std::collections::HashMap;
use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::graph::{Symbol, TdmFn};

lazy_static! {
    /// Form B: `tK  (BIAS+ r/BASE)/FREQ` — tried first because form A's
    /// `FREQ .. BIAS` pattern would otherwise also match its numerator.
    static ref FORM_B: Regex =
        Regex::new(r"^\s*(?P<id>t\d+)\s+\(\s*(?P<bias>\d+(?:\.\d+)?)\s*\+\s*r\s*/\s*(?P<base>\d+(?:\.\d+)?)\s*\)\s*/\s*(?P<freq>\d+(?:\.\d+)?)").unwrap();

    /// Form C: `tK  r/BASE`
    static ref FORM_C: Regex = Regex::new(r"^\s*(?P<id>t\d+)\s+r\s*/\s*(?P<base>\d+(?:\.\d+)?)\s*$").unwrap();

    /// Form A: `tK  FREQ/(r+BIAS)`
    static ref FORM_A: Regex =
        Regex::new(r"^\s*(?P<id>t\d+)\s+(?P<freq>\d+(?:\.\d+)?)\s*/\s*\(\s*r\s*\+\s*(?P<bias>\d+(?:\.\d+)?)\s*\)").unwrap();
}

/// Parse `design.tdm` into a map from TDM identifier to its delay formula.
///
/// Unrecognized lines are ignored silently (§4.1); there is no fatal error
/// kind for a malformed TDM line in the §7 taxonomy.
pub fn parse_tdm(input: &str) -> HashMap<Symbol, TdmFn> {
    let mut formulas = HashMap::new();

    for line in input.lines() {
        if let Some(caps) = FORM_B.captures(line) {
            let bias: f64 = caps["bias"].parse().unwrap();
            let base: f64 = caps["base"].parse().unwrap();
            let freq: f64 = caps["freq"].parse().unwrap();
            let f: TdmFn = Rc::new(move |r: f64| (bias + r / base) / freq);
            formulas.insert(Symbol::from(&caps["id"]), f);
            continue;
        }
        if let Some(caps) = FORM_C.captures(line) {
            let base: f64 = caps["base"].parse().unwrap();
            let f: TdmFn = Rc::new(move |r: f64| r / base);
            formulas.insert(Symbol::from(&caps["id"]), f);
            continue;
        }
        if let Some(caps) = FORM_A.captures(line) {
            let freq: f64 = caps["freq"].parse().unwrap();
            let bias: f64 = caps["bias"].parse().unwrap();
            let f: TdmFn = Rc::new(move |r: f64| freq / (r + bias));
            formulas.insert(Symbol::from(&caps["id"]), f);
            continue;
        }
    }

    formulas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_c() {
        let formulas = parse_tdm("t0  r/100\n");
        let f = &formulas[&Symbol::from("t0")];
        assert_eq!(f(50.0), 0.5);
    }

    #[test]
    fn parses_form_a() {
        let formulas = parse_tdm("t1  1000/(r+5)\n");
        let f = &formulas[&Symbol::from("t1")];
        assert_eq!(f(5.0), 1000.0 / 10.0);
    }

    #[test]
    fn parses_form_b() {
        let formulas = parse_tdm("t2  (2+ r/10)/4\n");
        let f = &formulas[&Symbol::from("t2")];
        assert_eq!(f(8.0), (2.0 + 8.0 / 10.0) / 4.0);
    }

    #[test]
    fn form_b_takes_priority_over_form_a_pattern() {
        // Form B's "FREQ .. BIAS" shape subsumes form A's; this line should
        // only ever match FORM_B since FORM_A is tried last.
        let formulas = parse_tdm("t3  (1+ r/2)/8\n");
        let f = &formulas[&Symbol::from("t3")];
        assert_eq!(f(4.0), (1.0 + 4.0 / 2.0) / 8.0);
    }

    #[test]
    fn ignores_unrecognized_lines() {
        let formulas = parse_tdm("not a tdm line\n\nt9 garbage(((\n");
        assert!(formulas.is_empty());
    }

    #[test]
    fn multi_dot_numbers_do_not_match_and_do_not_panic() {
        let formulas = parse_tdm("t1  1.2.3/(r+5)\nt2  r/1.2.3\n");
        assert!(formulas.is_empty());
    }
}
