//! The select suite as a data-driven test binary.
//!
//! Every case of an enabled group becomes one trial named
//! `<group>::<case>`. Disabled groups appear as a single ignored trial so
//! they stay visible in `--list` output without running.

mod common;

use std::sync::Arc;

use libtest_mimic::{Arguments, Failed, Trial};
use sqlcase::{CaseLoader, EngineExecutorFactory, ExecutorFactory, FixtureLoader, Suite};

use common::{fixtures_root, MemoryEngine};

fn main() {
    sqlcase::logging::init();
    let args = Arguments::from_args();
    let engine = Arc::new(MemoryEngine::new());
    let loader = FixtureLoader::new(fixtures_root());

    let mut trials = Vec::new();
    for group in Suite::select().groups {
        if !group.enabled {
            trials.push(
                Trial::test(group.name.clone(), || Ok(()))
                    .with_kind("disabled")
                    .with_ignored_flag(true),
            );
            continue;
        }
        match loader.load(&group.fixture) {
            Ok(cases) => {
                for case in cases {
                    let engine = Arc::clone(&engine);
                    let name = format!("{}::{}", group.name, case.name());
                    trials.push(Trial::test(name, move || {
                        let mut executor =
                            EngineExecutorFactory::default().build(engine.as_ref(), &case);
                        executor.run().map_err(Failed::from)
                    }));
                }
            }
            Err(err) => {
                let message = err.to_string();
                trials.push(Trial::test(format!("{}::setup", group.name), move || {
                    Err(Failed::from(message))
                }));
            }
        }
    }

    libtest_mimic::run(&args, trials).exit();
}
