use dotlisp::desugar::desugar;
use dotlisp::{Environment, Expr, evaluator, parser};
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn arb_atom() -> impl Strategy<Value = Expr> {
    "[a-zA-Z]{1,8}".prop_map(|name| Expr::atom(&name).unwrap())
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    arb_atom().prop_recursive(
        6,  // depth
        64, // max size
        2,  // items per pair
        |inner| (inner.clone(), inner).prop_map(|(head, tail)| Expr::cons(head, tail)),
    )
}

fn eval_canonical(text: &str) -> Expr {
    let expr = parser::parse(text).unwrap();
    evaluator::eval(&expr, &Environment::new()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_canonical_print_reads_back(e in arb_expr()) {
        prop_assert_eq!(parser::parse(&e.to_string()).unwrap(), e);
    }

    #[test]
    fn prop_loose_print_desugars_back(e in arb_expr()) {
        let loose = format!("{:#}", e);
        prop_assert_eq!(parser::parse(&desugar(&loose)).unwrap(), e);
    }

    #[test]
    fn prop_desugar_keeps_canonical_text(e in arb_expr()) {
        let text = e.to_string();
        prop_assert_eq!(desugar(&text), text);
    }

    #[test]
    fn prop_quote_returns_its_argument(e in arb_expr()) {
        prop_assert_eq!(eval_canonical(&format!("(quote.{})", e)), e);
    }

    #[test]
    fn prop_car_cdr_of_cons(a in arb_expr(), b in arb_expr()) {
        let cons = format!("(cons.((quote.{}).(quote.{})))", a, b);
        prop_assert_eq!(eval_canonical(&format!("(car.{})", cons)), a);
        prop_assert_eq!(eval_canonical(&format!("(cdr.{})", cons)), b);
    }

    #[test]
    fn prop_atom_and_eq_agree(e in arb_expr()) {
        let is_atom = eval_canonical(&format!("(atom.(quote.{}))", e));
        let self_eq = eval_canonical(&format!("(eq.((quote.{}).(quote.{})))", e, e));
        prop_assert_eq!(&is_atom, &Expr::truth(e.is_atom()));
        // Only atoms are eq to themselves
        prop_assert_eq!(self_eq, is_atom);
    }
}
