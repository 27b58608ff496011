use std::{fs, io, path, str};
use std::collections::{HashMap, HashSet};
use std::io::Write as _;
use flate2::read::GzDecoder;
use crate::sat::formula::{Lit, Var, VarMap};
use crate::sat::{SolveRes, Solver};


pub fn parse_file<P: AsRef<path::Path>, S: Solver>(
    path: &P,
    solver: &mut S,
    validate: bool,
) -> io::Result<VarMap<i32>> {
    let open = || fs::File::open(path).map(io::BufReader::new);
    match GzDecoder::new(open()?) {
        Ok(mut gz) => parse(&mut gz, solver, validate),
        Err(_) => parse(&mut open()?, solver, validate),
    }
}


pub fn parse<R: io::Read, S: Solver>(
    stream: &mut R,
    solver: &mut S,
    validate: bool,
) -> io::Result<VarMap<i32>> {
    let mut subst = Subst::new(solver);
    DimacsParser::parse(stream, validate, |cl| subst.add_clause(cl))?;
    Ok(subst.backward_subst)
}


pub fn write_result<S>(
    mut stream: fs::File,
    result: SolveRes<S>,
    backward_subst: &VarMap<i32>,
) -> io::Result<()> {
    match result {
        SolveRes::UnSAT(_) => writeln!(stream, "s UNSATISFIABLE"),

        SolveRes::Interrupted(_, _) => writeln!(stream, "s INDETERMINATE"),

        SolveRes::SAT(ref model, _) => {
            writeln!(stream, "s SATISFIABLE")?;
            write_model(&mut stream, backward_subst, model)
        }
    }
}


fn write_model<W: io::Write>(
    stream: &mut W,
    backward_subst: &VarMap<i32>,
    model: &[Lit],
) -> io::Result<()> {
    write!(stream, "v ")?;
    for &lit in model {
        let var_id = backward_subst[&lit.var()];
        write!(stream, "{} ", if lit.sign() { -var_id } else { var_id })?;
    }
    writeln!(stream, "0")
}


pub fn validate_model_file<P: AsRef<path::Path>>(
    path: &P,
    backward_subst: &VarMap<i32>,
    model: &[Lit],
) -> io::Result<bool> {
    let open = || fs::File::open(path).map(io::BufReader::new);
    match GzDecoder::new(open()?) {
        Ok(mut gz) => validate_model(&mut gz, backward_subst, model),
        Err(_) => validate_model(&mut open()?, backward_subst, model),
    }
}

fn validate_model<R: io::Read>(
    stream: &mut R,
    backward_subst: &VarMap<i32>,
    model: &[Lit],
) -> io::Result<bool> {
    let mut lits = HashSet::new();
    for &lit in model {
        let var_id = backward_subst[&lit.var()];
        let lit_id = if lit.sign() { -var_id } else { var_id };
        lits.insert(lit_id);
    }

    let mut ok = true;
    DimacsParser::parse(stream, false, |cl| {
        let mut found = false;
        for lit in cl {
            if lits.contains(&lit) {
                found = true;
                break;
            }
        }

        if !found {
            ok = false;
        }
    })?;

    Ok(ok)
}


struct Subst<'s, S: 's> {
    solver: &'s mut S,
    forward_subst: HashMap<i32, Var>,
    backward_subst: VarMap<i32>,
}

impl<'s, S: Solver> Subst<'s, S> {
    pub fn new(solver: &'s mut S) -> Self {
        Subst {
            solver,
            forward_subst: HashMap::new(),
            backward_subst: VarMap::new(),
        }
    }

    pub fn add_clause(&mut self, raw: Vec<i32>) {
        let lits: Vec<Lit> = raw.iter().map(|&lit_id| self.lit_by_id(lit_id)).collect();
        self.solver.add_clause(&lits[..]);
    }

    fn lit_by_id(&mut self, lit_id: i32) -> Lit {
        while !self.forward_subst.contains_key(&lit_id.abs()) {
            let idx = (self.solver.n_vars() + 1) as i32;
            self.new_var(idx);
        }

        self.forward_subst[&lit_id.abs()].sign_lit(lit_id < 0)
    }

    fn new_var(&mut self, var_id: i32) {
        let v = self.solver.new_var(None, true);
        self.forward_subst.insert(var_id, v);
        self.backward_subst.insert(&v, var_id);
    }
}


struct DimacsParser<'p> {
    reader: str::Chars<'p>,
    cur: Option<char>,
    vars: HashSet<i32>,
    clauses: usize,
}

impl<'p> DimacsParser<'p> {
    pub fn parse<R: io::Read, F: FnMut(Vec<i32>) -> ()>(
        reader: &'p mut R,
        validate: bool,
        clause: F,
    ) -> io::Result<()> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;

        let mut p = DimacsParser {
            reader: buf.chars(),
            cur: None,
            vars: HashSet::new(),
            clauses: 0,
        };
        p.next();
        p.parse_me(validate, clause)
    }

    fn parse_me<F: FnMut(Vec<i32>) -> ()>(
        &mut self,
        validate: bool,
        mut clause: F,
    ) -> io::Result<()> {
        enum State {
            Waiting,
            Parsing(usize, usize),
        }

        let mut state = State::Waiting;
        loop {
            self.skip_whitespace();
            match state {
                State::Waiting => match self.current() {
                    Some('c') => self.skip_line(),

                    _ => {
                        self.consume("p cnf")?;
                        let vars = self.next_uint()?;
                        let clauses = self.next_uint()?;
                        state = State::Parsing(vars, clauses);
                    }
                },

                State::Parsing(vars, clauses) => match self.current() {
                    Some('c') => self.skip_line(),

                    None => {
                        if validate {
                            if clauses != self.clauses {
                                warn!(
                                    "DIMACS header mismatch: {} clauses declared, {} found",
                                    clauses, self.clauses
                                );
                            }

                            if vars < self.vars.len() {
                                warn!(
                                    "DIMACS header mismatch: {} vars declared, {} discovered",
                                    vars, self.vars.len()
                                );
                            }
                        }
                        return Ok(());
                    }

                    _ => {
                        let c = self.parse_clause()?;
                        clause(c);
                    }
                },
            }
        }
    }

    fn parse_clause(&mut self) -> io::Result<Vec<i32>> {
        let mut lits = Vec::new();
        loop {
            let lit = self.next_int()?;
            if lit == 0 {
                self.clauses += 1;
                return Ok(lits);
            } else {
                self.vars.insert(lit.abs());
                lits.push(lit);
            }
        }
    }

    #[inline]
    pub fn next(&mut self) {
        self.cur = self.reader.next();
    }

    #[inline]
    pub fn current(&self) -> Option<char> {
        self.cur
    }

    pub fn skip_whitespace(&mut self) {
        loop {
            match self.cur {
                None => break,
                Some(c) if !c.is_whitespace() => break,
                _ => self.next(),
            }
        }
    }

    pub fn skip_line(&mut self) {
        loop {
            match self.cur {
                None => break,
                Some('\n') => {
                    self.next();
                    break;
                }
                _ => self.next(),
            }
        }
    }

    pub fn consume(&mut self, target: &str) -> io::Result<()> {
        for tc in target.chars() {
            match self.cur {
                Some(c) if c == tc => self.next(),
                _ => {
                    return Err(io::Error::new(
                        io::ErrorKind::Other,
                        format!("failed to consume; expected '{}'", target),
                    ));
                }
            }
        }
        Ok(())
    }

    fn read_int_body(&mut self) -> io::Result<usize> {
        let mut len: usize = 0;
        let mut value = 0;
        loop {
            match self.cur.and_then(|c| c.to_digit(10)) {
                Some(d) => {
                    value = value * 10 + (d as usize);
                    len += 1;
                    self.next()
                }

                _ if len > 0 => return Ok(value),

                _ => {
                    return Err(io::Error::new(io::ErrorKind::Other, "int expected"));
                }
            }
        }
    }

    pub fn next_int(&mut self) -> io::Result<i32> {
        self.skip_whitespace();
        let sign = match self.cur {
            Some('+') => {
                self.next();
                1
            }
            Some('-') => {
                self.next();
                -1
            }
            _ => 1,
        };

        let val = self.read_int_body()?;
        Ok(sign * (val as i32))
    }

    pub fn next_uint(&mut self) -> io::Result<usize> {
        self.skip_whitespace();
        if let Some('+') = self.cur {
            self.next()
        }
        self.read_int_body()
    }
}
