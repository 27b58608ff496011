use crate::sat::formula::{assignment::Assignment, clause::*, util::*, Lit};


pub struct ClauseDBSettings {
    pub remove_satisfied: bool, // Indicates whether possibly inefficient linear scan for satisfied clauses should be performed in 'simplify'.
    pub clause_decay: f64,
    pub persistent_lbd: u16, // Learnt clauses with an LBD at or below this are never reclaimed by reduceDB.
    pub first_reduce_db: u64, // Conflict count before the first reduceDB pass.
    pub inc_reduce_db: u64,  // Increment added to the reduceDB schedule after each pass.
}

impl Default for ClauseDBSettings {
    fn default() -> ClauseDBSettings {
        ClauseDBSettings {
            remove_satisfied: true,
            clause_decay: 0.999,
            persistent_lbd: 3,
            first_reduce_db: 3000,
            inc_reduce_db: 1300,
        }
    }
}


#[derive(Clone, Copy, Debug, Default)]
pub struct Stats {
    pub num_clauses: usize,
    pub num_learnts: usize,
    pub clauses_literals: u64,
    pub learnts_literals: u64,
}

impl Stats {
    fn add(&mut self, clause: &Clause) {
        if clause.is_learnt() {
            self.num_learnts += 1;
            self.learnts_literals += clause.len() as u64;
        } else {
            self.num_clauses += 1;
            self.clauses_literals += clause.len() as u64;
        }
    }

    fn del(&mut self, clause: &Clause) {
        if clause.is_learnt() {
            self.num_learnts -= 1;
            self.learnts_literals -= clause.len() as u64;
        } else {
            self.num_clauses -= 1;
            self.clauses_literals -= clause.len() as u64;
        }
    }
}


/// Owns every clause reachable from the solver's trail: original input clauses,
/// and learnt clauses split between a dedicated binary list (never touched by
/// reduceDB) and a general list ordered/reclaimed by LBD.
pub struct ClauseDB {
    pub settings: ClauseDBSettings,
    cla_inc: f64, // Amount to bump next clause with.
    clauses: Vec<ClauseRef>,        // Original problem clauses.
    learnts: Vec<ClauseRef>,        // Learnt clauses of size > 2.
    binary_learnt: Vec<ClauseRef>,  // Learnt clauses of size == 2; exempt from reduceDB.
    next_reduce_db: u64,
    pub stats: Stats,
}

impl ClauseDB {
    pub fn new(settings: ClauseDBSettings) -> ClauseDB {
        let next_reduce_db = settings.first_reduce_db;
        ClauseDB {
            settings,
            cla_inc: 1.0,
            clauses: Vec::new(),
            learnts: Vec::new(),
            binary_learnt: Vec::new(),
            next_reduce_db,
            stats: Stats::default(),
        }
    }

    pub fn add_clause(&mut self, ca: &mut ClauseAllocator, literals: &[Lit]) -> ClauseRef {
        let (c, cr) = ca.alloc(literals.to_vec().into_boxed_slice(), LBD_PERSISTENT);
        self.stats.add(c);
        self.clauses.push(cr);
        cr
    }

    /// Allocates a learnt clause with the given LBD. Binary learnt clauses are filed
    /// separately and never considered for reduceDB.
    pub fn learn_clause(&mut self, ca: &mut ClauseAllocator, literals: &[Lit], lbd: u16) -> ClauseRef {
        let lbd = lbd.max(1);
        let (c, cr) = ca.alloc(literals.to_vec().into_boxed_slice(), lbd);
        self.stats.add(c);
        if literals.len() == 2 {
            self.binary_learnt.push(cr);
        } else {
            self.learnts.push(cr);
        }
        self.bump_activity(ca, cr);
        cr
    }

    pub fn remove_clause(&mut self, ca: &mut ClauseAllocator, cr: ClauseRef) {
        self.stats.del(ca.view(cr));
        ca.free(cr);
    }

    pub fn bump_activity(&mut self, ca: &mut ClauseAllocator, cr: ClauseRef) {
        let c = ca.edit(cr);
        if !c.is_learnt() {
            return;
        }

        let new = c.activity() + self.cla_inc;
        c.set_activity(new);

        if new > 1e20 {
            self.cla_inc *= 1e-20;
            for &cri in self.learnts.iter().chain(self.binary_learnt.iter()) {
                let c = ca.edit(cri);
                let scaled = c.activity() * 1e-20;
                c.set_activity(scaled);
            }
        }
    }

    pub fn decay_activity(&mut self) {
        self.cla_inc *= 1.0 / self.settings.clause_decay;
    }

    pub fn number_of_learnts(&self) -> usize {
        self.learnts.len() + self.binary_learnt.len()
    }

    pub fn next_reduce_db(&self) -> u64 {
        self.next_reduce_db
    }

    /// True once enough conflicts have happened since the last reduceDB pass
    /// (or since solver start) to trigger another one.
    pub fn should_reduce_db(&self, conflicts: u64) -> bool {
        conflicts >= self.next_reduce_db
    }

    /// Removes roughly half of the non-persistent, non-locked clauses in `learnts`,
    /// preferring to discard the ones with the worst (highest) LBD (and, among ties,
    /// the lowest activity). Binary learnt clauses, clauses at or below
    /// `persistent_lbd`, and clauses currently frozen (their LBD was improved since
    /// the last pass) are kept. If the learnt set is already mostly high-quality
    /// (median clause at or below `persistent_lbd`), the whole pass is skipped.
    /// `notify` is called for every clause actually reclaimed, so the caller can
    /// detach it from the watch lists before the allocator frees it.
    pub fn reduce<F: FnMut(&Clause) -> ()>(
        &mut self,
        ca: &mut ClauseAllocator,
        assigns: &Assignment,
        conflicts: u64,
        mut notify: F,
    ) {
        self.next_reduce_db = conflicts + self.settings.inc_reduce_db;

        self.learnts.sort_by(|&rx, &ry| {
            let x = ca.view(rx);
            let y = ca.view(ry);
            y.lbd().cmp(&x.lbd()).then_with(|| {
                x.activity().partial_cmp(&y.activity()).unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        let persistent_lbd = self.settings.persistent_lbd;
        let index_lim = self.learnts.len() / 2;

        if index_lim >= self.learnts.len()
            || ca.view(self.learnts[index_lim]).lbd() <= persistent_lbd
        {
            return;
        }

        let stats = &mut self.stats;

        let mut i = 0;
        self.learnts.retain(|&cr| {
            if ca.is_deleted(cr) {
                i += 1;
                return false;
            }

            let remove = {
                let c = ca.view(cr);
                i < index_lim && c.lbd() > persistent_lbd && !c.is_frozen() && !assigns.is_locked(ca, cr)
            };

            i += 1;
            if remove {
                let c = ca.view(cr);
                notify(c);
                stats.del(c);
                ca.free(cr);
                false
            } else {
                ca.edit(cr).set_frozen(false);
                true
            }
        });
    }

    pub fn remove_satisfied<F>(&mut self, ca: &mut ClauseAllocator, assigns: &Assignment, mut notify: F)
    where
        F: FnMut(&Clause) -> (),
    {
        let stats = &mut self.stats;

        for list in [&mut self.learnts, &mut self.binary_learnt] {
            list.retain(|&cr| Self::retain_clause(stats, ca, assigns, &mut notify, cr));
        }

        if self.settings.remove_satisfied {
            self.clauses.retain(|&cr| Self::retain_clause(stats, ca, assigns, &mut notify, cr));
        }
    }

    fn retain_clause<F: FnMut(&Clause) -> ()>(
        stats: &mut Stats,
        ca: &mut ClauseAllocator,
        assigns: &Assignment,
        notify: &mut F,
        cr: ClauseRef,
    ) -> bool {
        if ca.is_deleted(cr) {
            return false;
        }

        if satisfied_with_assignment(ca.view(cr).lits(), assigns) {
            notify(ca.view(cr));
            stats.del(ca.view(cr));
            ca.free(cr);
            return false;
        }

        true
    }

    pub fn reloc_gc(&mut self, from: &mut ClauseAllocator, to: &mut ClauseAllocator) {
        for list in [&mut self.clauses, &mut self.learnts, &mut self.binary_learnt] {
            let mut j = 0;
            for i in 0..list.len() {
                if !from.is_deleted(list[i]) {
                    list[j] = from.reloc_to(to, list[i]);
                    j += 1;
                }
            }
            list.truncate(j);
        }
    }
}
