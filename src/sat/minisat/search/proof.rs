use std::fs;
use std::io::{self, Write};
use std::path;
use crate::sat::formula::{Idx, Lit};


/// Sink for a DRAT-like refutation trace: one record per learnt/strengthened
/// clause addition and one per clause deletion/tombstoning.
pub trait ProofSink {
    fn added(&mut self, lits: &[Lit]);
    fn removed(&mut self, lits: &[Lit]);
    fn proof(&mut self) {}
}


pub struct NoProofSink;

impl ProofSink for NoProofSink {
    fn added(&mut self, _lits: &[Lit]) {}
    fn removed(&mut self, _lits: &[Lit]) {}
}


/// Writes clauses as signed DIMACS literals terminated by `0`, deletions
/// prefixed `d `, emitting a trailing bare `0` line on `proof()`.
pub struct FileProofSink {
    file: fs::File,
}

impl FileProofSink {
    pub fn create<P: AsRef<path::Path>>(path: P) -> io::Result<Self> {
        Ok(FileProofSink {
            file: fs::File::create(path)?,
        })
    }

    fn write_clause(&mut self, prefix: &str, lits: &[Lit]) -> io::Result<()> {
        write!(self.file, "{}", prefix)?;
        for &lit in lits {
            let id = (lit.var().idx() + 1) as i32;
            write!(self.file, "{} ", if lit.sign() { -id } else { id })?;
        }
        writeln!(self.file, "0")
    }
}

impl ProofSink for FileProofSink {
    fn added(&mut self, lits: &[Lit]) {
        if let Err(e) = self.write_clause("", lits) {
            warn!("failed to write proof addition record: {}", e);
        }
    }

    fn removed(&mut self, lits: &[Lit]) {
        if let Err(e) = self.write_clause("d ", lits) {
            warn!("failed to write proof deletion record: {}", e);
        }
    }

    fn proof(&mut self) {
        if let Err(e) = writeln!(self.file, "0") {
            warn!("failed to write proof finalization record: {}", e);
        }
    }
}
