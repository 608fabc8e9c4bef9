//! RcDoc-based pretty-printer with termcolor annotations for [`Expr`].
//!
//! Role
//! - Convert an expression into an annotated document suitable for width-aware rendering.
//! - Provide colored output for terminals (TTY-aware) and plain strings for logs and tests.
//!
//! Syntax
//! - Connectives: `!p`, `p & q`, `p | q`, `p -> q`, `p <-> q`.
//! - Comparisons and arithmetic: `a == b`, `a < b`, `a <= b`, `a + b`, `a - b`, `a * b`, `a / b`.
//! - Quantifiers: `forall (x: T, y: U). body`, `exists (x: T). body`.
//! - Fluent applications: `at(r, l)`; nullary fluents print as their bare name.
//!
//! Parentheses are inserted from operator precedence only, and are colored by nesting depth.
//! Subterms nested more than [`MAX_NESTING`] levels below the printed node are elided as `...`.
use std::io::{self, Write};

use num_traits::{Signed, Zero};
use pretty::{FmtWrite, RcDoc, RenderAnnotated};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::expr::{Expr, kind::ExprKind};

/// Nesting levels rendered before a subterm is replaced by `...`.
pub const MAX_NESTING: usize = 256;

/// Annotations carried by the pretty-printed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Punct,
    /// Parenthesis at the given nesting depth; matching pairs share a color.
    Paren(u8),
    Keyword,
    Operator,
    Ident,
    Literal,
    /// Type of a bound variable.
    Type,
    /// Placeholder for a subterm past the nesting limit.
    Elided,
}

const PAREN_PALETTE: [Color; 4] = [Color::Blue, Color::Green, Color::Yellow, Color::Magenta];

impl Style {
    fn color_spec(self) -> ColorSpec {
        let (fg, bold) = match self {
            Style::Punct => (None, false),
            Style::Paren(depth) => (Some(PAREN_PALETTE[depth as usize % PAREN_PALETTE.len()]), false),
            Style::Keyword => (Some(Color::Cyan), true),
            Style::Operator => (Some(Color::Yellow), true),
            Style::Ident => (Some(Color::Green), false),
            Style::Literal => (Some(Color::Blue), false),
            Style::Type => (Some(Color::Magenta), false),
            Style::Elided => (Some(Color::Red), false),
        };
        let mut spec = ColorSpec::new();
        spec.set_fg(fg).set_bold(bold);
        spec
    }

    fn doc(self, text: impl std::fmt::Display) -> RcDoc<'static, Style> {
        RcDoc::as_string(text).annotate(self)
    }
}

fn parenthesize(inner: RcDoc<'static, Style>, depth: u8) -> RcDoc<'static, Style> {
    Style::Paren(depth)
        .doc("(")
        .append(inner)
        .append(Style::Paren(depth).doc(")"))
}

fn infix_symbol(kind: ExprKind) -> &'static str {
    match kind {
        ExprKind::And => "&",
        ExprKind::Or => "|",
        ExprKind::Implies => "->",
        ExprKind::Iff => "<->",
        ExprKind::Equals => "==",
        ExprKind::Le => "<=",
        ExprKind::Lt => "<",
        ExprKind::Plus => "+",
        ExprKind::Minus => "-",
        ExprKind::Times => "*",
        ExprKind::Div => "/",
        _ => unreachable!("{kind} is not an infix operator"),
    }
}

fn precedence(e: &Expr) -> u8 {
    use ExprKind::*;

    match e.kind() {
        Exists | Forall => 1,
        Iff => 2,
        Implies => 3,
        Or => 4,
        And => 5,
        Equals | Le | Lt => 7,
        Plus | Minus => 8,
        Times | Div => 9,
        Not => 10,
        // Leaves whose textual form contains an operator.
        IntConstant if e.int_constant_value().is_some_and(|i| i.is_negative()) => 8,
        RealConstant if e.real_constant_value().is_some_and(|r| r.is_negative()) => 8,
        RealConstant if e.real_constant_value().is_some_and(|r| !r.is_integer()) => 9,
        TimingExp if e.timing().is_some_and(|t| !t.delay().is_zero()) => 8,
        BoolConstant | IntConstant | RealConstant | FluentExp | ObjectExp | VariableExp
        | TimingExp => 255,
    }
}

fn requires_parens(child: &Expr, parent: &Expr) -> bool {
    let (inner, outer) = (precedence(child), precedence(parent));
    outer > inner
        || (outer == inner && (child.kind() != parent.kind() || !child.kind().is_associative()))
}

/// Document builder; `budget` is the number of nesting levels still allowed.
struct Printer {
    budget: usize,
}

impl Printer {
    fn below(&self) -> Printer {
        Printer {
            budget: self.budget.saturating_sub(1),
        }
    }

    fn operand(&self, e: &Expr, parent: &Expr, depth: u8) -> RcDoc<'static, Style> {
        if requires_parens(e, parent) {
            parenthesize(self.below().doc(e, depth.wrapping_add(1)), depth).group()
        } else {
            self.below().doc(e, depth)
        }
    }

    fn doc(&self, e: &Expr, depth: u8) -> RcDoc<'static, Style> {
        if self.budget == 0 && !e.args().is_empty() {
            return Style::Elided.doc("...");
        }

        match e.kind() {
            ExprKind::BoolConstant => Style::Keyword.doc(if e.is_true() { "true" } else { "false" }),
            ExprKind::IntConstant | ExprKind::RealConstant | ExprKind::TimingExp => {
                Style::Literal.doc(e.payload())
            }
            ExprKind::ObjectExp | ExprKind::VariableExp => Style::Ident.doc(e.payload()),
            ExprKind::FluentExp if e.args().is_empty() => Style::Ident.doc(e.payload()),
            ExprKind::FluentExp => {
                let args = RcDoc::intersperse(
                    e.args()
                        .iter()
                        .map(|a| self.below().doc(a, depth.wrapping_add(1))),
                    Style::Punct.doc(",").append(RcDoc::line()),
                );
                Style::Ident
                    .doc(e.payload())
                    .append(parenthesize(args.nest(2), depth))
                    .group()
            }
            ExprKind::Not => Style::Operator
                .doc("!")
                .append(self.operand(e.arg(0), e, depth))
                .group(),
            ExprKind::Exists | ExprKind::Forall => {
                let binders = RcDoc::intersperse(
                    e.quantifier_variables().iter().map(|v| {
                        Style::Ident
                            .doc(v.name())
                            .append(Style::Punct.doc(":"))
                            .append(RcDoc::space())
                            .append(Style::Type.doc(v.ty()))
                    }),
                    Style::Punct.doc(",").append(RcDoc::space()),
                );
                Style::Keyword
                    .doc(if e.is_forall() { "forall" } else { "exists" })
                    .append(RcDoc::space())
                    .append(parenthesize(binders, depth))
                    .append(Style::Punct.doc("."))
                    .append(RcDoc::line())
                    .append(self.operand(e.arg(0), e, depth))
                    .nest(2)
                    .group()
            }
            kind => RcDoc::intersperse(
                e.args().iter().map(|a| self.operand(a, e, depth)),
                RcDoc::line()
                    .append(Style::Operator.doc(infix_symbol(kind)))
                    .append(RcDoc::space()),
            )
            .nest(2)
            .group(),
        }
    }
}

/// Adapter from `Style` annotations to a termcolor sink.
struct ColorSink<'w, W: WriteColor + Write> {
    out: &'w mut W,
}

impl<'a, W: WriteColor + Write> RenderAnnotated<'a, Style> for ColorSink<'_, W> {
    fn push_annotation(&mut self, style: &'a Style) -> io::Result<()> {
        self.out.set_color(&style.color_spec())
    }

    fn pop_annotation(&mut self) -> io::Result<()> {
        self.out.reset()
    }
}

impl<W: WriteColor + Write> pretty::Render for ColorSink<'_, W> {
    type Error = io::Error;

    fn write_str(&mut self, s: &str) -> io::Result<usize> {
        self.write_str_all(s).map(|()| s.len())
    }

    fn write_str_all(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())
    }

    fn fail_doc(&self) -> Self::Error {
        io::Error::other("failed to render expression")
    }
}

/// Pretty-printing conveniences for expressions.
pub trait PrettyExpr {
    /// Annotated document for this expression.
    fn pretty_doc(&self) -> RcDoc<'static, Style>;

    /// Render with colors to any termcolor writer, breaking lines at `width`.
    fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()>;

    /// Print to stdout with colors when it is a terminal, at the terminal width (80 otherwise).
    fn pretty_print(&self) -> io::Result<()>;

    /// Plain rendering, breaking lines at 80 columns.
    fn pretty_string(&self) -> String;
}

impl PrettyExpr for Expr {
    fn pretty_doc(&self) -> RcDoc<'static, Style> {
        Printer {
            budget: MAX_NESTING,
        }
        .doc(self, 0)
    }

    fn pretty_render_to<W: WriteColor + Write>(&self, width: usize, out: &mut W) -> io::Result<()> {
        self.pretty_doc().render_raw(width, &mut ColorSink { out })
    }

    fn pretty_print(&self) -> io::Result<()> {
        let width = term_size::dimensions().map_or(80, |(w, _)| w);
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        self.pretty_render_to(width, &mut stdout)?;
        writeln!(stdout)
    }

    fn pretty_string(&self) -> String {
        let mut buf = String::new();
        let _ = self.pretty_doc().render_fmt(80, &mut buf);
        buf
    }
}

// Wide enough that groups never break.
const SINGLE_LINE_WIDTH: usize = 1 << 24;

/// Single-line rendering, used by error messages and logs.
impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut w = FmtWrite::new(f);
        self.pretty_doc().render_raw(SINGLE_LINE_WIDTH, &mut w)
    }
}

#[cfg(test)]
mod tests {
    use num_rational::BigRational;
    use termcolor::{Buffer, NoColor};

    use crate::{expr::manager::ExpressionManager, symbol::Parameter, timing::Timing};

    use super::*;

    #[test]
    fn precedence_drives_parentheses() {
        let em = ExpressionManager::new();
        let b = em.types().bool_type();
        let p = em.declare_fluent("p", &b, vec![]).unwrap();
        let q = em.declare_fluent("q", &b, vec![]).unwrap();
        let r = em.declare_fluent("r", &b, vec![]).unwrap();
        let p = em.fluent_exp(&p, []).unwrap();
        let q = em.fluent_exp(&q, []).unwrap();
        let r = em.fluent_exp(&r, []).unwrap();

        let pq = em.or([p.clone(), q.clone()]).unwrap();
        let e = em.and([pq.clone(), r.clone()]).unwrap();
        assert_eq!(e.to_string(), "r & (p | q)");

        let not = em.not(pq).unwrap();
        assert_eq!(not.to_string(), "!(p | q)");

        let imp = em.implies(p.clone(), em.implies(q, r).unwrap()).unwrap();
        assert_eq!(imp.to_string(), "p -> (q -> r)");
    }

    #[test]
    fn arithmetic_and_comparisons() {
        let em = ExpressionManager::new();
        let int = em.types().int_type();
        let x = em.declare_variable("x", &int).unwrap();
        let y = em.declare_variable("y", &int).unwrap();
        let x = em.variable_exp(&x).unwrap();
        let y = em.variable_exp(&y).unwrap();

        let diff = em.minus(x.clone(), y.clone()).unwrap();
        let prod = em.times([diff, em.int_constant(2)]).unwrap();
        let cmp = em.le(prod, em.int_constant(10)).unwrap();
        assert_eq!(cmp.to_string(), "(x - y) * 2 <= 10");

        let half = em.real_constant(BigRational::new(1.into(), 2.into()));
        let scaled = em.times([x, half]).unwrap();
        assert_eq!(scaled.to_string(), "x * (1/2)");
    }

    #[test]
    fn negative_literals_are_parenthesised_under_arithmetic() {
        let em = ExpressionManager::new();
        let x = em.declare_variable("x", &em.types().int_type()).unwrap();
        let x = em.variable_exp(&x).unwrap();
        let minus_three = em.int_constant(-3i64);

        let diff = em.minus(x.clone(), minus_three.clone()).unwrap();
        assert_eq!(diff.to_string(), "x - (-3)");
        let prod = em.times([x.clone(), minus_three.clone()]).unwrap();
        assert_eq!(prod.to_string(), "x * (-3)");
        let cmp = em.lt(minus_three, x.clone()).unwrap();
        assert_eq!(cmp.to_string(), "-3 < x");

        let minus_half = em.real_constant(BigRational::new((-1).into(), 2.into()));
        let diff = em.minus(x, minus_half).unwrap();
        assert_eq!(diff.to_string(), "x - (-1/2)");
    }

    #[test]
    fn deep_nesting_is_elided() {
        let em = ExpressionManager::new();
        let b = em.types().bool_type();
        let p = em.declare_fluent("p", &b, vec![]).unwrap();
        let p = em.fluent_exp(&p, []).unwrap();
        let mut e = p.clone();
        for _ in 0..50_000 {
            e = em.not(em.implies(p.clone(), e).unwrap()).unwrap();
        }

        let text = e.to_string();
        assert!(text.starts_with("!(p -> !(p -> "));
        assert!(text.contains("..."));
        assert!(text.len() < 20 * MAX_NESTING);
    }

    #[test]
    fn quantifiers_and_applications() {
        let em = ExpressionManager::new();
        let tm = em.types();
        let robot = tm.declare_user_type("Robot", None).unwrap();
        let location = tm.declare_user_type("Location", None).unwrap();
        let at = em
            .declare_fluent(
                "at",
                &tm.bool_type(),
                vec![Parameter::new("r", &robot), Parameter::new("l", &location)],
            )
            .unwrap();
        let r = em.declare_variable("r", &robot).unwrap();
        let home = em.declare_object("home", &location).unwrap();

        let body = em
            .fluent_exp(
                &at,
                [em.variable_exp(&r).unwrap(), em.object_exp(&home).unwrap()],
            )
            .unwrap();
        let q = em.forall([r], body).unwrap();
        assert_eq!(q.to_string(), "forall (r: Robot). at(r, home)");

        let guarded = em.and([q, em.true_()]).unwrap();
        assert!(guarded.to_string().contains("(forall (r: Robot). at(r, home))"));
    }

    #[test]
    fn timings_render_as_literals() {
        let em = ExpressionManager::new();
        let t = em.timing_exp(Timing::end().delayed(BigRational::from_integer(3.into())));
        assert_eq!(t.to_string(), "end + 3");
        let later = em.lt(em.timing_exp(Timing::start()), t).unwrap();
        assert_eq!(later.to_string(), "start < end + 3");
    }

    #[test]
    fn rendering_to_writers() {
        let em = ExpressionManager::new();
        let e = em.not(em.lt(em.int_constant(1), em.timing_exp(Timing::start())).unwrap()).unwrap();

        let mut plain = NoColor::new(Vec::new());
        e.pretty_render_to(80, &mut plain).unwrap();
        assert_eq!(String::from_utf8(plain.into_inner()).unwrap(), e.pretty_string());

        let mut colored = Buffer::ansi();
        e.pretty_render_to(80, &mut colored).unwrap();
        assert!(colored.as_slice().len() > e.pretty_string().len());
    }
}
