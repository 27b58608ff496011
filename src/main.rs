#[macro_use]
extern crate clap;

use std::default::Default;
use candy_rust::sat::minisat;
use candy_rust::sat::minisat::{CCMinMode, PhaseSaving, SimplificatorSettings};
use candy_rust::{solve, MainOptions, SolverOptions};

fn main() {
    let ls012 = ["0", "1", "2"];
    let matches = clap::App::new("candy-rust")
        .version(&crate_version!()[..])
        .about("CDCL SAT solver")
        .arg(clap::Arg::with_name("verb").long("verb").takes_value(true).possible_values(&ls012).help("Verbosity level (0=silent, 1=some, 2=more)"))
        .arg(clap::Arg::with_name("core").long("core").help("Use core solver without preprocessing"))
        .arg(clap::Arg::with_name("strict").long("strict").help("Validate DIMACS header during parsing"))
        .arg(clap::Arg::with_name("pre").long("pre").help("Completely turn on/off any preprocessing"))
        .arg(clap::Arg::with_name("no-pre").long("no-pre").conflicts_with("pre"))
        .arg(clap::Arg::with_name("solve").long("solve").help("Completely turn on/off solving after preprocessing"))
        .arg(clap::Arg::with_name("no-solve").long("no-solve").conflicts_with("solve"))
        .arg(clap::Arg::with_name("dimacs").long("dimacs").takes_value(true).requires("no-solve").help("If given, stop after preprocessing and write the simplified instance to this file"))
        .arg(clap::Arg::with_name("proof").long("proof").takes_value(true).help("If given, write a DRAT-like refutation trace to this file"))
        .arg(clap::Arg::with_name("input").required(true))
        .arg(clap::Arg::with_name("output").required(false))

        .arg(clap::Arg::with_name("var-decay").long("var-decay").takes_value(true).help("The variable activity decay factor"))
        .arg(clap::Arg::with_name("cla-decay").long("cla-decay").takes_value(true).help("The clause activity decay factor"))
        .arg(clap::Arg::with_name("rnd-freq").long("rnd-freq").takes_value(true).help("The frequency with which the decision heuristic tries to choose a random variable"))
        .arg(clap::Arg::with_name("rnd-seed").long("rnd-seed").takes_value(true).help("Used by the random variable selection"))
        .arg(clap::Arg::with_name("ccmin-mode").long("ccmin-mode").takes_value(true).possible_values(&ls012).help("Controls conflict clause minimization (0=none, 1=basic, 2=deep)"))
        .arg(clap::Arg::with_name("phase-saving").long("phase-saving").takes_value(true).possible_values(&ls012).help("Controls the level of phase saving (0=none, 1=limited, 2=full)"))
        .arg(clap::Arg::with_name("rnd-init").long("rnd-init").help("Randomize the initial activity"))
        .arg(clap::Arg::with_name("no-rnd-init").long("no-rnd-init").conflicts_with("rnd-init"))
        .arg(clap::Arg::with_name("gc-frac").long("gc-frac").takes_value(true).help("The fraction of wasted memory allowed before a garbage collection is triggered"))
        .arg(clap::Arg::with_name("rcheck").long("rcheck").help("Check if a clause is already implied before learning it (costly)"))
        .arg(clap::Arg::with_name("no-rcheck").long("no-rcheck").conflicts_with("rcheck"))

        .arg(clap::Arg::with_name("first-reduce-db").long("first-reduce-db").takes_value(true).help("Conflict count before the first reduceDB pass"))
        .arg(clap::Arg::with_name("inc-reduce-db").long("inc-reduce-db").takes_value(true).help("Increment added to the reduceDB schedule after each pass"))
        .arg(clap::Arg::with_name("persistent-lbd").long("persistent-lbd").takes_value(true).help("Learnt clauses with an LBD at or below this are never reclaimed by reduceDB"))

        .arg(clap::Arg::with_name("lbd-queue-len").long("lbd-queue-len").takes_value(true).help("Window size for the short-term LBD moving average"))
        .arg(clap::Arg::with_name("trail-queue-len").long("trail-queue-len").takes_value(true).help("Window size for the long-term trail-size moving average"))
        .arg(clap::Arg::with_name("force-restart-factor").long("force-restart-factor").takes_value(true).help("Force a restart once the short-term LBD average exceeds this factor times the global average"))
        .arg(clap::Arg::with_name("block-restart-factor").long("block-restart-factor").takes_value(true).help("Block a restart while the trail is larger than this factor times its moving average"))

        .arg(clap::Arg::with_name("asymm").long("asymm").help("Shrink clauses by asymmetric branching"))
        .arg(clap::Arg::with_name("no-asymm").long("no-asymm").conflicts_with("asymm"))
        .arg(clap::Arg::with_name("elim").long("elim").help("Perform variable elimination"))
        .arg(clap::Arg::with_name("no-elim").long("no-elim").conflicts_with("elim"))
        .arg(clap::Arg::with_name("grow").long("grow").takes_value(true).help("Allow a variable elimination step to grow by a number of clauses"))
        .arg(clap::Arg::with_name("cl-lim").long("cl-lim").takes_value(true).help("Variables are not eliminated if it produces a resolvent with a length above this limit. -1 means no limit"))
        .arg(clap::Arg::with_name("sub-lim").long("sub-lim").takes_value(true).help("Do not check subsumption against a clause larger than this. -1 means no limit"))
        .arg(clap::Arg::with_name("simp-gc-frac").long("simp-gc-frac").takes_value(true).help("The fraction of wasted memory allowed before a garbage collection is triggered during simplification"))

        .get_matches();

    {
        let level = matches
            .value_of("verb")
            .map(|v| match v {
                "1" => log::LevelFilter::Info,
                "2" => log::LevelFilter::Trace,
                _ => log::LevelFilter::Off,
            })
            .unwrap_or(log::LevelFilter::Info);
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .format(|buf, record| {
                use std::io::Write;
                writeln!(buf, "{}", record.args())
            })
            .init();
    }

    let core_options = {
        let mut s: minisat::CoreSettings = Default::default();

        if let Some(x) = matches.value_of("var-decay").and_then(|s| s.parse().ok()) {
            if 0.0 < x && x < 1.0 {
                s.heur.var_decay = x;
            }
        }

        if let Some(x) = matches.value_of("cla-decay").and_then(|s| s.parse().ok()) {
            if 0.0 < x && x < 1.0 {
                s.db.clause_decay = x;
            }
        }

        if let Some(x) = matches.value_of("rnd-freq").and_then(|s| s.parse().ok()) {
            if 0.0 <= x && x <= 1.0 {
                s.heur.random_var_freq = x;
            }
        }

        if let Some(x) = matches.value_of("rnd-seed").and_then(|s| s.parse().ok()) {
            if 0.0 < x {
                s.heur.random_seed = x;
            }
        }

        if let Some(x) = matches.value_of("ccmin-mode") {
            s.ccmin_mode = match x {
                "0" => CCMinMode::None,
                "1" => CCMinMode::Basic,
                _ => CCMinMode::Deep,
            };
        }

        if let Some(x) = matches.value_of("phase-saving") {
            s.heur.phase_saving = match x {
                "0" => PhaseSaving::None,
                "1" => PhaseSaving::Limited,
                _ => PhaseSaving::Full,
            };
        }

        if matches.is_present("rnd-init") {
            s.heur.rnd_init_act = true;
        }
        if matches.is_present("no-rnd-init") {
            s.heur.rnd_init_act = false;
        }

        if let Some(x) = matches.value_of("gc-frac").and_then(|s| s.parse().ok()) {
            if 0.0 < x && x <= 1.0 {
                s.core.garbage_frac = x;
            }
        }

        if matches.is_present("rcheck") {
            s.core.use_rcheck = true;
        }
        if matches.is_present("no-rcheck") {
            s.core.use_rcheck = false;
        }

        if let Some(x) = matches.value_of("first-reduce-db").and_then(|s| s.parse().ok()) {
            s.db.first_reduce_db = x;
        }
        if let Some(x) = matches.value_of("inc-reduce-db").and_then(|s| s.parse().ok()) {
            s.db.inc_reduce_db = x;
        }
        if let Some(x) = matches.value_of("persistent-lbd").and_then(|s| s.parse().ok()) {
            s.db.persistent_lbd = x;
        }

        if let Some(x) = matches.value_of("lbd-queue-len").and_then(|s| s.parse().ok()) {
            s.restart.lbd_queue_len = x;
        }
        if let Some(x) = matches.value_of("trail-queue-len").and_then(|s| s.parse().ok()) {
            s.restart.trail_queue_len = x;
        }
        if let Some(x) = matches.value_of("force-restart-factor").and_then(|s| s.parse().ok()) {
            s.restart.force_restart_factor = x;
        }
        if let Some(x) = matches.value_of("block-restart-factor").and_then(|s| s.parse().ok()) {
            s.restart.block_restart_factor = x;
        }

        s
    };

    let simp_options = {
        let mut s: SimplificatorSettings = Default::default();

        if matches.is_present("asymm") {
            s.use_asymm = true;
        }
        if matches.is_present("no-asymm") {
            s.use_asymm = false;
        }

        if matches.is_present("elim") {
            s.use_elim = true;
        }
        if matches.is_present("no-elim") {
            s.use_elim = false;
        }

        if let Some(x) = matches.value_of("grow").and_then(|s| s.parse().ok()) {
            s.grow = x;
        }

        if let Some(x) = matches.value_of("cl-lim").and_then(|s| s.parse().ok()) {
            if -1 <= x {
                s.clause_lim = x;
            }
        }

        if let Some(x) = matches.value_of("sub-lim").and_then(|s| s.parse().ok()) {
            if -1 <= x {
                s.subsumption_lim = x;
            }
        }

        if let Some(x) = matches.value_of("simp-gc-frac").and_then(|s| s.parse().ok()) {
            if 0.0 < x && x <= 1.0 {
                s.simp_garbage_frac = x;
            }
        }

        s
    };

    let main_options = MainOptions {
        strict: matches.is_present("strict"),
        pre: !matches.is_present("no-pre"),
        solve: !matches.is_present("no-solve"),
        in_path: matches.value_of("input").unwrap().into(),
        out_path: matches.value_of("output").map(|x| x.into()),
        dimacs_path: matches.value_of("dimacs").map(|x| x.into()),
        proof_path: matches.value_of("proof").map(|x| x.into()),
    };

    let solver_options = if matches.is_present("core") {
        SolverOptions::Core(core_options)
    } else {
        SolverOptions::Simp(minisat::SimpSettings {
            core: core_options,
            simp: simp_options,
            extend_model: true,
        })
    };

    solve(main_options, solver_options).expect("solver error");
}
