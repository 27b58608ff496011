use std::collections::HashSet;
use std::io;

use candy_rust::sat::formula::{Lit, Var};
use candy_rust::sat::minisat::budget::Budget;
use candy_rust::sat::minisat::{CoreSolver, SimpSolver};
use candy_rust::sat::{dimacs, SolveRes, Solver};


fn new_vars<S: Solver>(solver: &mut S, n: usize) -> Vec<Var> {
    (0..n).map(|_| solver.new_var(None, true)).collect()
}

fn model_set(model: &[Lit]) -> HashSet<Lit> {
    model.iter().cloned().collect()
}

fn clause_satisfied(clause: &[Lit], model: &HashSet<Lit>) -> bool {
    clause.iter().any(|l| model.contains(l))
}


#[test]
fn unit_clause_is_sat() {
    let mut solver = CoreSolver::new(Default::default());
    let vs = new_vars(&mut solver, 1);
    assert!(solver.add_clause(&[vs[0].pos_lit()]));

    match solver.solve_limited(&Budget::new(), &[]) {
        SolveRes::SAT(model, _) => {
            assert!(model.contains(&vs[0].pos_lit()));
        }
        _ => panic!("expected SAT"),
    }
}

#[test]
fn conflicting_units_are_unsat() {
    let mut solver = CoreSolver::new(Default::default());
    let vs = new_vars(&mut solver, 1);
    assert!(solver.add_clause(&[vs[0].pos_lit()]));
    assert!(!solver.add_clause(&[vs[0].neg_lit()]));

    match solver.solve_limited(&Budget::new(), &[]) {
        SolveRes::UnSAT(_) => {}
        _ => panic!("expected UNSAT"),
    }
}

#[test]
fn small_satisfiable_formula_has_valid_model() {
    // (a | b | c) & (-a | b) & (-b | c) & (-c | a)
    let mut solver = CoreSolver::new(Default::default());
    let vs = new_vars(&mut solver, 3);
    let (a, b, c) = (vs[0], vs[1], vs[2]);

    let clauses: Vec<Vec<Lit>> = vec![
        vec![a.pos_lit(), b.pos_lit(), c.pos_lit()],
        vec![a.neg_lit(), b.pos_lit()],
        vec![b.neg_lit(), c.pos_lit()],
        vec![c.neg_lit(), a.pos_lit()],
    ];
    for cl in &clauses {
        assert!(solver.add_clause(cl));
    }

    match solver.solve_limited(&Budget::new(), &[]) {
        SolveRes::SAT(model, _) => {
            let set = model_set(&model);
            for cl in &clauses {
                assert!(clause_satisfied(cl, &set), "clause {:?} violated", cl);
            }
        }
        _ => panic!("expected SAT"),
    }
}

#[test]
fn pigeonhole_two_into_one_is_unsat() {
    // Two pigeons, one hole: p1 and p2 can't both hold the single hole bit,
    // and each pigeon must be assigned somewhere.
    let mut solver = CoreSolver::new(Default::default());
    let vs = new_vars(&mut solver, 2);
    let (p1, p2) = (vs[0], vs[1]);

    assert!(solver.add_clause(&[p1.pos_lit()]));
    assert!(solver.add_clause(&[p2.pos_lit()]));
    assert!(solver.add_clause(&[p1.neg_lit(), p2.neg_lit()]));

    match solver.solve_limited(&Budget::new(), &[]) {
        SolveRes::UnSAT(_) => {}
        _ => panic!("expected UNSAT"),
    }
}

#[test]
fn assumption_forces_branch() {
    // (a | b), assuming -a must derive b = true.
    let mut solver = CoreSolver::new(Default::default());
    let vs = new_vars(&mut solver, 2);
    let (a, b) = (vs[0], vs[1]);
    assert!(solver.add_clause(&[a.pos_lit(), b.pos_lit()]));

    match solver.solve_limited(&Budget::new(), &[a.neg_lit()]) {
        SolveRes::SAT(model, _) => {
            assert!(model.contains(&b.pos_lit()));
        }
        _ => panic!("expected SAT"),
    }
}

#[test]
fn assumption_conflicting_with_unit_is_unsat() {
    let mut solver = CoreSolver::new(Default::default());
    let vs = new_vars(&mut solver, 1);
    assert!(solver.add_clause(&[vs[0].pos_lit()]));

    match solver.solve_limited(&Budget::new(), &[vs[0].neg_lit()]) {
        SolveRes::UnSAT(_) => {}
        _ => panic!("expected UNSAT under a contradicting assumption"),
    }
}

#[test]
fn simp_solver_preprocessing_keeps_model_valid() {
    // b is pure/resolvable away by variable elimination; the reconstructed
    // model must still satisfy every original clause.
    let mut solver = SimpSolver::new(Default::default());
    let vs = new_vars(&mut solver, 3);
    let (a, b, c) = (vs[0], vs[1], vs[2]);

    let clauses: Vec<Vec<Lit>> = vec![
        vec![a.pos_lit(), b.pos_lit()],
        vec![b.neg_lit(), c.pos_lit()],
        vec![a.neg_lit(), c.pos_lit()],
    ];
    for cl in &clauses {
        assert!(solver.add_clause(cl));
    }

    let mut budget = Budget::new();
    budget.off();
    assert!(solver.preprocess(&budget));

    match solver.solve_limited(&budget, &[]) {
        SolveRes::SAT(model, _) => {
            let set = model_set(&model);
            for cl in &clauses {
                assert!(clause_satisfied(cl, &set), "clause {:?} violated", cl);
            }
        }
        _ => panic!("expected SAT"),
    }
}

#[test]
fn dimacs_round_trip_solves_and_writes_result() -> io::Result<()> {
    let cnf = b"c a trivial satisfiable instance\np cnf 2 2\n1 2 0\n-1 2 0\n";
    let mut solver = CoreSolver::new(Default::default());
    let backward_subst = dimacs::parse(&mut io::Cursor::new(&cnf[..]), &mut solver, true)?;
    assert_eq!(solver.n_vars(), 2);
    assert_eq!(solver.n_clauses(), 2);

    let res = solver.solve_limited(&Budget::new(), &[]);
    assert!(matches!(res, SolveRes::SAT(..)));

    let out = tempfile_result(res, &backward_subst)?;
    assert!(out.starts_with("s SATISFIABLE"));
    Ok(())
}

fn tempfile_result<S>(
    result: SolveRes<S>,
    backward_subst: &candy_rust::sat::formula::VarMap<i32>,
) -> io::Result<String> {
    let mut out_file = tempfile::NamedTempFile::new()?;
    dimacs::write_result(out_file.reopen()?, result, backward_subst)?;
    let mut content = String::new();
    io::Read::read_to_string(&mut out_file, &mut content)?;
    Ok(content)
}
