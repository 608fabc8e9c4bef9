use num_bigint::BigInt;
use num_rational::BigRational;
use planexpr::prelude::*;

fn int_fluent(em: &ExpressionManager, name: &str) -> Expr {
    let f = em.declare_fluent(name, &em.types().int_type(), vec![]).unwrap();
    em.fluent_exp(&f, []).unwrap()
}

fn real_fluent(em: &ExpressionManager, name: &str) -> Expr {
    let f = em.declare_fluent(name, &em.types().real_type(), vec![]).unwrap();
    em.fluent_exp(&f, []).unwrap()
}

#[test]
fn boolean_connectives_reject_numbers() {
    let em = ExpressionManager::new();
    let p = em.declare_fluent("p", &em.types().bool_type(), vec![]).unwrap();
    let p = em.fluent_exp(&p, []).unwrap();
    let n = int_fluent(&em, "n");

    let err = em.and([p.clone(), n.clone()]).unwrap_err();
    assert!(err.is_type());
    let message = err.to_string();
    assert!(message.contains("and"), "{message}");
    assert!(message.contains("integer"), "{message}");

    assert!(em.not(n.clone()).unwrap_err().is_type());
    assert!(em.implies(n, p).unwrap_err().is_type());
}

#[test]
fn mixed_numeric_comparisons_are_boolean() {
    let em = ExpressionManager::new();
    let n = int_fluent(&em, "n");
    let r = real_fluent(&em, "r");

    let lt = em.lt(n.clone(), r.clone()).unwrap();
    assert!(lt.ty().is_bool_type());
    assert!(em.le(r.clone(), n.clone()).unwrap().ty().is_bool_type());
    assert!(em.equals(n.clone(), r.clone()).unwrap().ty().is_bool_type());

    let sum = em.plus([n.clone(), r.clone()]).unwrap();
    assert!(sum.ty().is_real_type());
    let diff = em.minus(n.clone(), n.clone()).unwrap();
    assert!(diff.ty().is_int_type());
}

#[test]
fn bounded_types_compare_regardless_of_bounds() {
    let em = ExpressionManager::new();
    let tm = em.types();
    let small = tm
        .int_type_with_bounds(Some(BigInt::from(0)), Some(BigInt::from(5)))
        .unwrap();
    let large = tm
        .int_type_with_bounds(Some(BigInt::from(3)), Some(BigInt::from(100)))
        .unwrap();
    let a = em.declare_fluent("a", &small, vec![]).unwrap();
    let b = em.declare_fluent("b", &large, vec![]).unwrap();
    let a = em.fluent_exp(&a, []).unwrap();
    let b = em.fluent_exp(&b, []).unwrap();

    assert!(em.lt(a.clone(), b.clone()).is_ok());
    assert!(em.equals(a, b).is_ok());
    assert!(!tm.is_compatible(&large, &small));
    assert!(tm.is_compatible(&small, &tm.int_type()));
}

#[test]
fn user_types_follow_the_hierarchy() {
    let em = ExpressionManager::new();
    let tm = em.types();
    let location = tm.declare_user_type("Location", None).unwrap();
    let room = tm.declare_user_type("Room", Some(&location)).unwrap();
    let robot = tm.declare_user_type("Robot", None).unwrap();

    let kitchen = em.declare_object("kitchen", &room).unwrap();
    let hall = em.declare_object("hall", &location).unwrap();
    let r2 = em.declare_object("r2", &robot).unwrap();
    let kitchen = em.object_exp(&kitchen).unwrap();
    let hall = em.object_exp(&hall).unwrap();
    let r2 = em.object_exp(&r2).unwrap();

    assert!(em.equals(kitchen.clone(), hall.clone()).is_ok());
    assert!(em.equals(kitchen.clone(), r2.clone()).unwrap_err().is_type());
    assert!(em.lt(kitchen, hall).unwrap_err().is_type());
    assert!(em.equals(em.true_(), em.true_()).unwrap_err().is_type());

    assert!(
        tm.declare_user_type("Room", Some(&robot))
            .unwrap_err()
            .is_duplicate_type()
    );
    assert_eq!(tm.declare_user_type("Room", Some(&location)).unwrap(), room);
}

#[test]
fn strict_widening_rules() {
    let config = EnvironmentConfig::from_toml_str(
        "[compatibility]\ninteger_to_real_in_equality = false\n",
    )
    .unwrap();
    let env = Environment::with_config(config);
    let em = env.expression_manager();
    let n = int_fluent(em, "n");
    let r = real_fluent(em, "r");

    // Ordering still widens, equality does not.
    assert!(em.lt(n.clone(), r.clone()).is_ok());
    assert!(em.equals(n, r).unwrap_err().is_type());
}

#[test]
fn constants_are_checked_against_their_type() {
    let em = ExpressionManager::new();
    let tm = em.types();
    let unit = tm
        .real_type_with_bounds(
            Some(BigRational::from_integer(BigInt::from(0))),
            Some(BigRational::from_integer(BigInt::from(1))),
        )
        .unwrap();

    let half = BigRational::new(BigInt::from(1), BigInt::from(2));
    let c = em.constant(Literal::from(half), &unit).unwrap();
    assert_eq!(c.ty(), &unit);
    assert!(
        em.constant(Literal::from(2i64), &unit)
            .unwrap_err()
            .is_invalid_literal()
    );
    assert!(
        tm.int_type_with_bounds(Some(BigInt::from(3)), Some(BigInt::from(1)))
            .unwrap_err()
            .is_invalid_bounds()
    );
}

#[test]
fn failed_constructions_leave_no_trace() {
    let em = ExpressionManager::new();
    let n = int_fluent(&em, "n");
    let p = em.declare_fluent("p", &em.types().bool_type(), vec![]).unwrap();
    let p = em.fluent_exp(&p, []).unwrap();
    let before = em.len();

    assert!(em.or([p.clone(), n.clone()]).is_err());
    assert!(em.plus([n.clone(), p.clone()]).is_err());
    assert!(em.create(ExprKind::Minus, vec![n.clone()], Payload::None).is_err());
    assert!(em.exists(Vec::<Variable>::new(), p).is_err());
    assert_eq!(em.len(), before);
}
