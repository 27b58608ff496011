use crate::sat::formula::{Lit, Var, VarMap};
use crate::sat::formula::assignment::*;
use crate::sat::formula::clause::*;
use crate::sat::formula::subsumes::*;
use crate::sat::formula::util::*;
use super::{AddClauseRes, SearchRes, Searcher};
use super::super::budget::Budget;
use self::subsumption_queue::*;

pub mod elim_clauses;
mod elim_queue;
mod subsumption_queue;


pub struct SimplificatorSettings {
    pub grow: usize, // Allow a variable elimination step to grow by a number of clauses (default to zero).
    pub clause_lim: i32, // Variables are not eliminated if it produces a resolvent with a length above this limit. -1 means no limit.
    pub subsumption_lim: i32, // Do not check if subsumption against a clause larger than this. -1 means no limit.
    pub simp_garbage_frac: f64, // A different limit for when to issue a GC during simplification (Also see 'garbage_frac').
    pub use_asymm: bool,        // Shrink clauses by asymmetric branching.
    pub use_elim: bool,         // Perform variable elimination.
}

impl Default for SimplificatorSettings {
    fn default() -> Self {
        SimplificatorSettings {
            grow: 0,
            clause_lim: 20,
            subsumption_lim: 1000,
            simp_garbage_frac: 0.5,
            use_asymm: false,
            use_elim: true,
        }
    }
}


#[derive(Default)]
struct Stats {
    merges: u64,
    asymm_lits: u64,
    eliminated_vars: u64,
}


pub struct Simplificator {
    settings: SimplificatorSettings,
    stats: Stats,
    var_status: VarMap<elim_queue::VarStatus>,
    occurs: elim_queue::OccLists,
    elim: elim_queue::ElimQueue,
    touched: VarMap<i8>,
    n_touched: usize,
    subsumption_queue: SubsumptionQueue,
}

impl Simplificator {
    pub fn new(settings: SimplificatorSettings) -> Self {
        Simplificator {
            settings,
            stats: Stats::default(),
            var_status: VarMap::new(),
            occurs: elim_queue::OccLists::new(),
            elim: elim_queue::ElimQueue::new(),
            touched: VarMap::new(),
            n_touched: 0,
            subsumption_queue: SubsumptionQueue::new(),
        }
    }

    pub fn init_var(&mut self, v: Var) {
        self.var_status.insert(
            &v,
            elim_queue::VarStatus {
                frozen: false,
                eliminated: false,
            },
        );
        self.occurs.init_var(&v);
        self.touched.insert(&v, 0);
        self.elim.init_var(v);
    }

    pub fn add_clause(&mut self, search: &mut Searcher, ps: &[Lit]) -> bool {
        //#ifndef NDEBUG
        for l in ps.iter() {
            assert!(!self.var_status[&l.var()].eliminated);
        }
        //#endif

        match search.add_clause(ps) {
            AddClauseRes::UnSAT => false,
            AddClauseRes::Consumed => true,
            AddClauseRes::Added(cr) => {
                // NOTE: the clause is added to the queue immediately and then
                // again during 'gather_touched_clauses()'. If nothing happens
                // in between, it will only be checked once. Otherwise, it may
                // be checked twice unnecessarily. This is an unfortunate
                // consequence of how backward subsumption is used to mimic
                // forward subsumption.
                self.subsumption_queue.push(cr);

                let lits = search.bt.ca.view(cr).lits().to_vec();
                for &lit in lits.iter() {
                    self.occurs.push_occ(&lit.var(), cr);
                    self.touched[&lit.var()] = 1;
                    self.n_touched += 1;
                    self.elim.bump_lit_occ(&lit, 1);
                }

                true
            }
        }
    }

    pub fn solve_limited(
        &mut self,
        mut search: Searcher,
        budget: &Budget,
        elimclauses: &mut elim_clauses::ElimClauses,
        assumptions: &[Lit],
    ) -> SearchRes {
        let mut extra_frozen: Vec<Var> = Vec::new();

        // Assumptions must be temporarily frozen to run variable elimination:
        for lit in assumptions.iter() {
            let ref mut st = self.var_status[&lit.var()];

            // If an assumption has been eliminated, remember it.
            assert!(!st.eliminated);
            if !st.frozen {
                // Freeze and store.
                st.frozen = true;
                extra_frozen.push(lit.var());
            }
        }

        if search.preprocess() && self.eliminate(&mut search, budget, elimclauses) {
            match search.search(budget, assumptions) {
                SearchRes::Interrupted(prog, ns) => {
                    // Unfreeze the assumptions that were frozen:
                    for &v in extra_frozen.iter() {
                        self.var_status[&v].frozen = false;
                        self.elim.update_elim_heap(v, &self.var_status, &ns.bt.assigns);
                    }

                    SearchRes::Interrupted(prog, ns)
                }

                other => other,
            }
        } else {
            SearchRes::UnSAT(search.stats())
        }
    }

    pub fn eliminate(
        &mut self,
        search: &mut Searcher,
        budget: &Budget,
        elimclauses: &mut elim_clauses::ElimClauses,
    ) -> bool {
        // Main simplification loop:
        while self.n_touched > 0 || self.subsumption_queue.assigns_left(&search.bt.assigns) > 0
            || self.elim.len() > 0
        {
            self.gather_touched_clauses(&mut search.bt.ca);

            if !self.backward_subsumption_check(search, budget, true) {
                return false;
            }

            // Empty elim_heap and return immediately on user-interrupt:
            if budget.interrupted() {
                assert_eq!(self.subsumption_queue.assigns_left(&search.bt.assigns), 0);
                assert!(self.subsumption_queue.is_empty());
                assert_eq!(self.n_touched, 0);
                self.elim.clear();
                return true;
            }

            trace!("ELIM: vars = {}", self.elim.len());
            let mut cnt = 0;
            while let Some(var) = self.elim.pop() {
                if budget.interrupted() {
                    break;
                }
                if !self.var_status[&var].eliminated && search.bt.assigns.is_undef(var) {
                    if cnt % 100 == 0 {
                        trace!("elimination left: {:10}", self.elim.len());
                    }

                    if self.settings.use_asymm {
                        // Temporarily freeze variable. Otherwise, it would immediately end up on the queue again:
                        let was_frozen = self.var_status[&var].frozen;
                        self.var_status[&var].frozen = true;
                        if !self.asymm_var(search, budget, var) {
                            return false;
                        }
                        self.var_status[&var].frozen = was_frozen;
                    }

                    // At this point, the variable may have been set by asymmetric branching, so check it
                    // again. Also, don't eliminate frozen variables:
                    if self.settings.use_elim && search.bt.assigns.is_undef(var)
                        && !self.var_status[&var].frozen
                        && !self.eliminate_var(search, budget, elimclauses, var)
                    {
                        return false;
                    }

                    if search.bt.ca.check_garbage(self.settings.simp_garbage_frac) {
                        self.garbage_collect(search);
                    }
                }

                cnt += 1;
            }

            assert!(self.subsumption_queue.is_empty());
        }

        true
    }

    fn asymm_var(&mut self, search: &mut Searcher, budget: &Budget, v: Var) -> bool {
        let cls = {
            let cls = self.occurs.lookup(&search.bt.ca, v);
            if !search.bt.assigns.is_undef(v) || cls.len() == 0 {
                return true;
            }
            cls.clone()
        };

        let mut bug = false;
        for &cr in cls.iter() {
            // TODO: this mimics original MiniSat bug. Fix it?
            if bug {
                bug = false;
                continue;
            }

            if let Some(l) = asymmetric_branching(search, v, cr) {
                if search.bt.ca.view(cr).len() > 2 {
                    bug = true;
                }

                self.stats.asymm_lits += 1;
                if !self.strengthen_clause(search, cr, l) {
                    return false;
                }
            }
        }

        self.backward_subsumption_check(search, budget, false)
    }

    fn remove_clause(&mut self, search: &mut Searcher, cr: ClauseRef) {
        let lits = search.bt.ca.view(cr).lits().to_vec();
        for &lit in lits.iter() {
            self.elim.bump_lit_occ(&lit, -1);
            self.elim
                .update_elim_heap(lit.var(), &self.var_status, &search.bt.assigns);
            self.occurs.smudge(&lit.var());
        }

        search.bt.lazy_detach(cr);
        search.ctx.db.remove_clause(&mut search.bt.ca, cr);
        search.ctx.proof.removed(&lits);
    }

    fn strengthen_clause(&mut self, search: &mut Searcher, cr: ClauseRef, l: Lit) -> bool {
        assert!(search.bt.assigns.is_ground_level());

        // FIX: this is too inefficient but would be nice to have (properly implemented)
        // if (!find(subsumption_queue, &c))
        self.subsumption_queue.push(cr);

        let len = search.bt.ca.view(cr).len();
        let learnt = search.bt.ca.view(cr).is_learnt();
        if len == 2 {
            self.remove_clause(search, cr);
            let unit = {
                let c = search.bt.ca.edit(cr);
                c.strengthen(l);
                c.head()
            }; // TODO: it produces clauses of length 1. Not good.
            search.ctx.proof.added(&[unit]);
            try_assign_lit(&mut search.bt.assigns, unit, None)
                && search.bt.watches.propagate(&mut search.bt.ca, &mut search.bt.assigns).is_none()
        } else {
            let old_lits = search.bt.ca.view(cr).lits().to_vec();
            search.bt.force_detach(cr);
            {
                let c = search.bt.ca.edit(cr);
                c.strengthen(l);
                assert_eq!(c.len(), len - 1);
            }
            if learnt {
                search.ctx.db.stats.learnts_literals -= 1;
            } else {
                search.ctx.db.stats.clauses_literals -= 1;
            }
            search.bt.attach(cr);
            search.ctx.proof.removed(&old_lits);
            search.ctx.proof.added(search.bt.ca.view(cr).lits());

            self.occurs.remove_occ(&l.var(), cr);
            self.elim.bump_lit_occ(&l, -1);
            self.elim.update_elim_heap(l.var(), &self.var_status, &search.bt.assigns);
            true
        }
    }

    fn eliminate_var(
        &mut self,
        search: &mut Searcher,
        budget: &Budget,
        elimclauses: &mut elim_clauses::ElimClauses,
        v: Var,
    ) -> bool {
        assert!({
            let ref st = self.var_status[&v];
            !st.frozen && !st.eliminated
        });
        assert!(search.bt.assigns.is_undef(v));

        // Split the occurrences into positive and negative:
        let cls = self.occurs.lookup(&search.bt.ca, v).clone();
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for &cr in cls.iter() {
            for l in search.bt.ca.view(cr).lits() {
                if l.var() == v {
                    if l.sign() {
                        neg.push(cr);
                    } else {
                        pos.push(cr);
                    }
                    break;
                }
            }
        }

        // Check wether the increase in number of clauses stays within the allowed ('grow'). Moreover, no
        // clause must exceed the limit on the maximal clause size (if it is set):
        let mut cnt = 0;
        for &pr in pos.iter() {
            for &nr in neg.iter() {
                self.stats.merges += 1;
                let (ps, qs) = (search.bt.ca.view(pr).lits(), search.bt.ca.view(nr).lits());
                if let Some(resolvent) = merge(v, ps, qs) {
                    cnt += 1;
                    if cnt > cls.len() + self.settings.grow
                        || (self.settings.clause_lim != -1
                            && (resolvent.len() as i32) > self.settings.clause_lim)
                    {
                        return true;
                    }
                }
            }
        }

        // Delete and store old clauses:
        self.var_status[&v].eliminated = true;
        search.ctx.heur.set_decision_var(v, false);
        self.stats.eliminated_vars += 1;

        if pos.len() > neg.len() {
            for &cr in neg.iter() {
                elimclauses.mk_elim_clause(v, search.bt.ca.view(cr).lits());
            }
            elimclauses.mk_elim_unit(v.pos_lit());
        } else {
            for &cr in pos.iter() {
                elimclauses.mk_elim_clause(v, search.bt.ca.view(cr).lits());
            }
            elimclauses.mk_elim_unit(v.neg_lit());
        }

        for &cr in cls.iter() {
            self.remove_clause(search, cr);
        }

        // Produce clauses in cross product:
        for &pr in pos.iter() {
            for &nr in neg.iter() {
                self.stats.merges += 1;
                let resolvent = {
                    let (ps, qs) = (search.bt.ca.view(pr).lits(), search.bt.ca.view(nr).lits());
                    merge(v, ps, qs)
                };
                if let Some(resolvent) = resolvent {
                    if !self.add_clause(search, &resolvent[..]) {
                        return false;
                    }
                }
            }
        }

        // Free occurs list for this variable:
        self.occurs.clear_var(&v);

        // Free watchers lists for this variable, if possible:
        search.bt.try_clear_var(v);

        self.backward_subsumption_check(search, budget, false)
    }

    // Backward subsumption + backward subsumption resolution
    fn backward_subsumption_check(
        &mut self,
        search: &mut Searcher,
        budget: &Budget,
        verbose: bool,
    ) -> bool {
        assert!(search.bt.assigns.is_ground_level());

        if verbose {
            trace!(
                "BWD-SUB: queue = {}, trail = {}",
                self.subsumption_queue.len(),
                self.subsumption_queue.assigns_left(&search.bt.assigns)
            );
        }

        let mut cnt = 0u64;
        let mut subsumed = 0u64;
        let mut deleted_literals = 0u64;

        while let Some(job) = self.subsumption_queue.pop(&search.bt.ca, &search.bt.assigns) {
            // Empty subsumption queue and return immediately on user-interrupt:
            if budget.interrupted() {
                self.subsumption_queue.clear(&search.bt.assigns);
                break;
            }

            if verbose && cnt % 1000 == 0 {
                trace!(
                    "subsumption left: {:10} ({:10} subsumed, {:10} deleted literals)",
                    self.subsumption_queue.len(),
                    subsumed,
                    deleted_literals
                );
            }
            cnt += 1;

            match job {
                SubsumptionJob::Assign(unit) => {
                    for &cj in self.occurs.lookup(&search.bt.ca, unit.var()).clone().iter() {
                        if {
                            let c = search.bt.ca.view(cj);
                            !c.is_deleted()
                                && (self.settings.subsumption_lim == -1
                                    || (c.len() as i32) < self.settings.subsumption_lim)
                        } {
                            match unit_subsumes(unit, search.bt.ca.view(cj)) {
                                Subsumes::Different => {}

                                Subsumes::Exact => {
                                    subsumed += 1;
                                    self.remove_clause(search, cj);
                                }

                                Subsumes::LitSign(l) => {
                                    deleted_literals += 1;
                                    if !self.strengthen_clause(search, cj, !l) {
                                        return false;
                                    }
                                }
                            }
                        }
                    }
                }

                SubsumptionJob::Clause(cr) => {
                    let best = {
                        let c = search.bt.ca.view(cr);
                        let mut best = c.head().var();
                        for &lit in &c.lits()[1..] {
                            // TODO: why not use n_occ?
                            if self.occurs.occs_dirty(lit.var()) < self.occurs.occs_dirty(best) {
                                best = lit.var();
                            }
                        }
                        best
                    };

                    for &cj in self.occurs.lookup(&search.bt.ca, best).clone().iter() {
                        if search.bt.ca.is_deleted(cr) {
                            break;
                        }

                        if cj != cr && {
                            let c = search.bt.ca.view(cj);
                            !c.is_deleted()
                                && (self.settings.subsumption_lim == -1
                                    || (c.len() as i32) < self.settings.subsumption_lim)
                        } {
                            match subsumes(search.bt.ca.view(cr), search.bt.ca.view(cj)) {
                                Subsumes::Different => {}

                                Subsumes::Exact => {
                                    subsumed += 1;
                                    self.remove_clause(search, cj);
                                }

                                Subsumes::LitSign(l) => {
                                    deleted_literals += 1;
                                    if !self.strengthen_clause(search, cj, !l) {
                                        return false;
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        true
    }

    fn gather_touched_clauses(&mut self, ca: &mut ClauseAllocator) {
        if self.n_touched == 0 {
            return;
        }

        self.subsumption_queue.remark_touched(ca, false);

        for (v, touched) in self.touched.iter_mut() {
            if *touched != 0 && !self.var_status[&v].eliminated {
                for &cr in self.occurs.lookup(ca, v) {
                    let c = ca.edit(cr);
                    if !c.is_touched() {
                        self.subsumption_queue.push(cr);
                        c.set_touched(true);
                    }
                }
                *touched = 0;
            }
        }

        self.subsumption_queue.remark_touched(ca, true);
        self.n_touched = 0;
    }

    fn garbage_collect(&mut self, search: &mut Searcher) {
        let mut to = ClauseAllocator::new_for_gc(&search.bt.ca);
        self.reloc_gc(&mut search.bt.ca, &mut to);
        search.reloc_gc(to);
    }

    fn reloc_gc(&mut self, from: &mut ClauseAllocator, to: &mut ClauseAllocator) {
        self.occurs.reloc_gc(from, to);
        self.subsumption_queue.reloc_gc(from, to);
    }

    // TODO: remove
    pub fn off(search: &mut Searcher) {
        search.ctx.db.settings.remove_satisfied = true;
        search.bt.ca.set_extra_clause_field(false);

        // Force full cleanup (this is safe and desirable since it only happens once):
        search.ctx.heur.rebuild_order_heap(&search.bt.assigns);
        search.garbage_collect();
    }

    pub fn on(search: &mut Searcher) {
        search.bt.ca.set_extra_clause_field(true);
        search.ctx.db.settings.remove_satisfied = false;
    }
}


fn asymmetric_branching(search: &mut Searcher, v: Var, cr: ClauseRef) -> Option<Lit> {
    assert!(search.bt.assigns.is_ground_level());

    let l = {
        let c = search.bt.ca.view(cr);
        if c.is_deleted() || satisfied_with_assignment(c.lits(), &search.bt.assigns) {
            return None;
        }

        search.bt.assigns.new_decision_level();

        let mut vl = None;
        for &lit in c.lits() {
            if v == lit.var() {
                vl = Some(lit);
            } else if search.bt.assigns.is_undef(lit.var()) {
                search.bt.assigns.assign_lit(!lit, None);
            }
        }

        vl.unwrap()
    };

    let res = search.bt.watches.propagate(&mut search.bt.ca, &mut search.bt.assigns);
    search.cancel_until(GROUND_LEVEL);
    res.map(|_| l)
}
