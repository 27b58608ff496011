use crate::sat::formula::{assignment::Assignment, clause::*, Lit, LitMap, Var};


#[derive(Clone, Copy, Debug)]
struct Watcher {
    cref: ClauseRef,
    blocker: Lit,
}


#[derive(Default, Debug)]
struct WatchesLine {
    watchers: Vec<Watcher>,
    dirty: bool,
}


/// Two-watched-literal propagator. `watches[!l]` holds every clause that has `l` as
/// one of its two watched literals and must be re-examined when `l` becomes false.
pub struct Watches {
    watches: LitMap<WatchesLine>,
    pub propagations: u64,
}

impl Watches {
    pub fn new() -> Self {
        Watches {
            watches: LitMap::new(),
            propagations: 0,
        }
    }

    pub fn init_var(&mut self, v: Var) {
        self.watches.insert(&v.pos_lit(), WatchesLine::default());
        self.watches.insert(&v.neg_lit(), WatchesLine::default());
    }

    pub fn try_clear_var(&mut self, _: Var) {}

    pub fn watch_clause(&mut self, c: &Clause, cr: ClauseRef) {
        let (c0, c1) = c.head_pair();
        self.watches[&!c0].watchers.push(Watcher { cref: cr, blocker: c1 });
        self.watches[&!c1].watchers.push(Watcher { cref: cr, blocker: c0 });
    }

    pub fn unwatch_clause_strict(&mut self, c: &Clause, cr: ClauseRef) {
        let (c0, c1) = c.head_pair();
        self.watches[&!c0].watchers.retain(|w| w.cref != cr);
        self.watches[&!c1].watchers.retain(|w| w.cref != cr);
    }

    pub fn unwatch_clause_lazy(&mut self, c: &Clause) {
        let (c0, c1) = c.head_pair();
        self.watches[&!c0].dirty = true;
        self.watches[&!c1].dirty = true;
    }

    /// Every literal `x` such that a binary clause `(lit \/ x)` currently watches `lit`.
    pub fn binary_clause_neighbors<'a>(
        &'a self,
        ca: &'a ClauseAllocator,
        lit: Lit,
    ) -> impl Iterator<Item = Lit> + 'a {
        self.watches[&lit].watchers.iter().filter_map(move |w| {
            let c = ca.view(w.cref);
            if c.len() == 2 {
                Some(w.blocker)
            } else {
                None
            }
        })
    }

    /// Propagates all enqueued facts. Returns the conflicting clause, if any; the
    /// propagation queue is always drained by the time this returns.
    pub fn propagate(&mut self, ca: &mut ClauseAllocator, assigns: &mut Assignment) -> Option<ClauseRef> {
        let mut confl = None;

        while let Some(p) = assigns.dequeue() {
            self.propagations += 1;
            let false_lit = !p;

            if self.watches[&p].dirty {
                self.watches[&p].watchers.retain(|w| !ca.is_deleted(w.cref));
                self.watches[&p].dirty = false;
            }

            let pending = std::mem::take(&mut self.watches[&p].watchers);
            let mut kept = Vec::with_capacity(pending.len());

            let mut iter = pending.into_iter();
            while let Some(pwi) = iter.next() {
                if assigns.is_assigned_pos(pwi.blocker) {
                    kept.push(pwi);
                    continue;
                }

                let c = ca.edit(pwi.cref);
                if c.head() == false_lit {
                    c.swap(0, 1);
                }

                let cw = Watcher { cref: pwi.cref, blocker: c.head() };
                if cw.blocker != pwi.blocker && assigns.is_assigned_pos(cw.blocker) {
                    kept.push(cw);
                    continue;
                }

                match c.pull_literal(1, |lit| !assigns.is_assigned_neg(lit)) {
                    Some(lit) => {
                        self.watches[&!lit].watchers.push(cw);
                    }

                    None => {
                        // Clause is unit (or conflicting) under the current assignment.
                        kept.push(cw);

                        if assigns.is_assigned_neg(cw.blocker) {
                            assigns.dequeue_all();
                            kept.extend(iter);
                            confl = Some(cw.cref);
                            break;
                        } else {
                            assigns.assign_lit(cw.blocker, Some(cw.cref));
                        }
                    }
                }
            }

            self.watches[&p].watchers = kept;

            if confl.is_some() {
                break;
            }
        }

        confl
    }

    pub fn reloc_gc(&mut self, from: &mut ClauseAllocator, to: &mut ClauseAllocator) {
        for (_, line) in self.watches.iter_mut() {
            line.dirty = false;
            line.watchers.retain(|w| !from.is_deleted(w.cref));
            for w in line.watchers.iter_mut() {
                w.cref = from.reloc_to(to, w.cref);
            }
        }
    }
}
