use std::collections::{BTreeSet, HashMap};

use num_bigint::BigInt;
use planexpr::prelude::*;

struct Ints {
    env: Environment,
    x: Variable,
    y: Variable,
}

impl Ints {
    fn new() -> Self {
        let env = Environment::new();
        let int = env.type_manager().int_type();
        let x = env.expression_manager().declare_variable("x", &int).unwrap();
        let y = env.expression_manager().declare_variable("y", &int).unwrap();
        Self { env, x, y }
    }

    fn em(&self) -> &ExpressionManager {
        self.env.expression_manager()
    }

    fn var(&self, v: &Variable) -> Expr {
        self.em().variable_exp(v).unwrap()
    }
}

#[test]
fn quantifiers_close_their_variables() {
    let t = Ints::new();
    let em = t.em();
    let oracle = t.env.free_vars_oracle();

    let positive = em.gt(t.var(&t.x), em.int_constant(0)).unwrap();
    assert_eq!(*oracle.free_variables(&positive), BTreeSet::from([t.x.clone()]));

    let exists = em.exists([t.x.clone()], positive.clone()).unwrap();
    assert!(oracle.free_variables(&exists).is_empty());
    assert!(oracle.is_closed(&exists));
}

#[test]
fn shadowed_variables_are_not_free() {
    let t = Ints::new();
    let em = t.em();
    let oracle = t.env.free_vars_oracle();

    // exists x. (x < y & forall y. y <= x)
    let inner = em
        .forall([t.y.clone()], em.le(t.var(&t.y), t.var(&t.x)).unwrap())
        .unwrap();
    let body = em
        .and([em.lt(t.var(&t.x), t.var(&t.y)).unwrap(), inner.clone()])
        .unwrap();
    let outer = em.exists([t.x.clone()], body.clone()).unwrap();

    assert_eq!(*oracle.free_variables(&inner), BTreeSet::from([t.x.clone()]));
    assert_eq!(
        *oracle.free_variables(&body),
        BTreeSet::from([t.x.clone(), t.y.clone()])
    );
    assert_eq!(*oracle.free_variables(&outer), BTreeSet::from([t.y.clone()]));
}

#[test]
fn binders_hide_same_name_variables_of_any_type() {
    let t = Ints::new();
    let em = t.em();
    let oracle = t.env.free_vars_oracle();
    let real_x = em
        .declare_variable("x", &t.env.type_manager().real_type())
        .unwrap();

    // exists (x: real). x:int < x:real
    let body = em.lt(t.var(&t.x), t.var(&real_x)).unwrap();
    let q = em.exists([real_x.clone()], body.clone()).unwrap();

    assert_eq!(
        *oracle.free_variables(&body),
        BTreeSet::from([t.x.clone(), real_x.clone()])
    );
    assert!(oracle.is_closed(&q));

    let mapping = HashMap::from([(t.x.clone(), em.int_constant(5))]);
    assert_eq!(em.substitute(&q, &mapping).unwrap(), q);
    assert_ne!(em.substitute(&body, &mapping).unwrap(), body);

    // The int-typed y is still visible below the binder.
    let with_y = em
        .exists([real_x], em.and([body, em.lt(t.var(&t.y), em.int_constant(0)).unwrap()]).unwrap())
        .unwrap();
    assert_eq!(*oracle.free_variables(&with_y), BTreeSet::from([t.y.clone()]));
}

#[test]
fn substitution_replaces_free_occurrences() {
    let t = Ints::new();
    let em = t.em();
    let oracle = t.env.free_vars_oracle();

    let gt = em.gt(t.var(&t.x), t.var(&t.y)).unwrap();
    let five = em
        .constant(Literal::from(BigInt::from(5)), &t.env.type_manager().int_type())
        .unwrap();
    let mapping = HashMap::from([(t.x.clone(), five.clone())]);

    let replaced = em.substitute(&gt, &mapping).unwrap();
    assert_eq!(replaced, em.gt(five, t.var(&t.y)).unwrap());
    assert_eq!(*oracle.free_variables(&replaced), BTreeSet::from([t.y.clone()]));
}

#[test]
fn substitution_respects_shadowing() {
    let t = Ints::new();
    let em = t.em();

    // x > 0 & exists x. x < y
    let bound = em
        .exists([t.x.clone()], em.lt(t.var(&t.x), t.var(&t.y)).unwrap())
        .unwrap();
    let free = em.gt(t.var(&t.x), em.int_constant(0)).unwrap();
    let formula = em.and([free, bound.clone()]).unwrap();

    let mapping = HashMap::from([(t.x.clone(), em.int_constant(1))]);
    let out = em.substitute(&formula, &mapping).unwrap();
    // `1 > 0` folds to true, the quantified part is untouched.
    assert_eq!(out, em.and([em.true_(), bound]).unwrap());
}

#[test]
fn substituting_absent_variables_is_the_identity() {
    let t = Ints::new();
    let em = t.em();
    let z = em
        .declare_variable("z", &t.env.type_manager().int_type())
        .unwrap();

    let e = em
        .le(em.plus([t.var(&t.x), t.var(&t.y)]).unwrap(), em.int_constant(3))
        .unwrap();
    let before = em.len();
    let mapping = HashMap::from([(z, t.var(&t.x))]);
    assert_eq!(em.substitute(&e, &mapping).unwrap(), e);
    assert_eq!(em.len(), before);

    let renaming = HashMap::from([(t.x.clone(), t.var(&t.x))]);
    assert_eq!(em.substitute(&e, &renaming).unwrap(), e);
}

#[test]
fn location_scenario() {
    let env = Environment::new();
    let tm = env.type_manager();
    let em = env.expression_manager();

    let location = tm.declare_user_type("Location", None).unwrap();
    let l1 = em.declare_variable("l1", &location).unwrap();
    let l2 = em.declare_variable("l2", &location).unwrap();
    let at = em
        .declare_fluent("at", &tm.bool_type(), vec![Parameter::new("l", &location)])
        .unwrap();

    let build = || {
        let a = em.variable_exp(&l1).unwrap();
        let b = em.variable_exp(&l2).unwrap();
        let here = em.fluent_exp(&at, [a.clone()]).unwrap();
        let distinct = em.not(em.equals(a, b).unwrap()).unwrap();
        em.forall([l1.clone()], em.implies(here, distinct).unwrap())
            .unwrap()
    };

    let formula = build();
    assert!(formula.ty().is_bool_type());
    assert_eq!(
        *env.free_vars_oracle().free_variables(&formula),
        BTreeSet::from([l2.clone()])
    );

    let nodes = em.len();
    assert_eq!(build(), formula);
    assert_eq!(em.len(), nodes);
    assert_eq!(
        formula.to_string(),
        "forall (l1: Location). at(l1) -> !(l1 == l2)"
    );
}
